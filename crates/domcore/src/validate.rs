//! Name validation
//!
//! The tree only needs two predicates from a validator. The default
//! implementation follows the XML 1.0 (fifth edition) `Name` production and
//! its namespace-aware `NCName` restriction.

/// Name validation contract
pub trait NameValidator {
    /// XML `Name`
    fn is_valid_name(&self, name: &str) -> bool;

    /// XML `NCName` (a `Name` without colons)
    fn is_valid_ncname(&self, name: &str) -> bool;
}

/// XML 1.0 fifth edition name rules
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlNameValidator;

impl NameValidator for XmlNameValidator {
    fn is_valid_name(&self, name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if is_name_start_char(c) => chars.all(is_name_char),
            _ => false,
        }
    }

    fn is_valid_ncname(&self, name: &str) -> bool {
        !name.contains(':') && self.is_valid_name(name)
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9'
            | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}
