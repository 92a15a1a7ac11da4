//! DOM strings
//!
//! Immutable, cheaply clonable strings with two backings: a private buffer,
//! or an entry of an [`InternPool`]. All editing operations return new
//! strings; offsets and counts are code-point indices.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::error::{DomError, DomResult};
use crate::interner::InternPool;

/// Immutable DOM string
#[derive(Clone)]
pub struct DomString {
    repr: Repr,
}

#[derive(Clone)]
enum Repr {
    Owned(Arc<str>),
    Interned(Arc<str>),
}

impl DomString {
    /// Create a string holding its own copy of `s`
    pub fn new(s: &str) -> Self {
        Self {
            repr: Repr::Owned(Arc::from(s)),
        }
    }

    /// Resolve `s` through the process-wide intern pool
    pub fn interned(s: &str) -> Self {
        InternPool::global().intern(s)
    }

    pub(crate) fn from_pool(entry: Arc<str>) -> Self {
        Self {
            repr: Repr::Interned(entry),
        }
    }

    /// Intern this string's content in the global pool
    pub fn intern(&self) -> Self {
        if self.is_interned() {
            self.clone()
        } else {
            Self::interned(self.as_str())
        }
    }

    /// Build a string from UCS-4 code points
    pub fn from_code_points(code_points: &[u32]) -> DomResult<Self> {
        let s: String = code_points
            .iter()
            .map(|&cp| char::from_u32(cp).ok_or(DomError::InvalidCharacter))
            .collect::<DomResult<_>>()?;
        Ok(Self::from(s))
    }

    /// Decode `bytes` with an external codec
    pub fn decode_with(codec: &dyn CharsetCodec, bytes: &[u8]) -> DomResult<Self> {
        Self::from_code_points(&codec.decode(bytes)?)
    }

    /// Encode this string with an external codec
    pub fn encode_with(&self, codec: &dyn CharsetCodec) -> DomResult<Vec<u8>> {
        let code_points: Vec<u32> = self.as_str().chars().map(u32::from).collect();
        codec.encode(&code_points)
    }

    /// Whether this string is a pool entry
    pub fn is_interned(&self) -> bool {
        matches!(self.repr, Repr::Interned(_))
    }

    /// Whether both strings share the same backing allocation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(self.arc(), other.arc())
    }

    #[inline]
    fn arc(&self) -> &Arc<str> {
        match &self.repr {
            Repr::Owned(s) | Repr::Interned(s) => s,
        }
    }

    /// Borrow the content
    #[inline]
    pub fn as_str(&self) -> &str {
        self.arc()
    }

    /// Length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    /// Length in code points
    pub fn char_len(&self) -> usize {
        self.as_str().chars().count()
    }

    /// Byte offset of code point `index`; `index == char_len()` is allowed
    fn byte_offset(&self, index: usize) -> DomResult<usize> {
        let s = self.as_str();
        if index == 0 {
            return Ok(0);
        }
        match s.char_indices().nth(index) {
            Some((offset, _)) => Ok(offset),
            None if s.chars().count() == index => Ok(s.len()),
            None => Err(DomError::IndexSize),
        }
    }

    /// Byte range covering `count` code points from `offset`, clipped at the end
    fn byte_range(&self, offset: usize, count: usize) -> DomResult<(usize, usize)> {
        let start = self.byte_offset(offset)?;
        let end = self.as_str()[start..]
            .char_indices()
            .nth(count)
            .map_or(self.len(), |(i, _)| start + i);
        Ok((start, end))
    }

    /// Concatenate two strings
    pub fn concat(&self, other: &DomString) -> DomString {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut s = String::with_capacity(self.len() + other.len());
        s.push_str(self.as_str());
        s.push_str(other.as_str());
        Self::from(s)
    }

    /// Extract `count` code points starting at `offset`
    pub fn substr(&self, offset: usize, count: usize) -> DomResult<DomString> {
        let (start, end) = self.byte_range(offset, count)?;
        Ok(Self::new(&self.as_str()[start..end]))
    }

    /// Insert `other` before code point `offset`
    pub fn insert(&self, other: &DomString, offset: usize) -> DomResult<DomString> {
        let at = self.byte_offset(offset)?;
        let s = self.as_str();
        let mut out = String::with_capacity(s.len() + other.len());
        out.push_str(&s[..at]);
        out.push_str(other.as_str());
        out.push_str(&s[at..]);
        Ok(Self::from(out))
    }

    /// Replace `count` code points at `offset` with `replacement`
    pub fn replace_range(
        &self,
        offset: usize,
        count: usize,
        replacement: &DomString,
    ) -> DomResult<DomString> {
        let (start, end) = self.byte_range(offset, count)?;
        let s = self.as_str();
        let mut out = String::with_capacity(s.len() - (end - start) + replacement.len());
        out.push_str(&s[..start]);
        out.push_str(replacement.as_str());
        out.push_str(&s[end..]);
        Ok(Self::from(out))
    }

    /// Code point index of the first `ch`
    pub fn index_of(&self, ch: char) -> Option<usize> {
        self.as_str().chars().position(|c| c == ch)
    }

    /// Code point index of the last `ch`
    pub fn rindex_of(&self, ch: char) -> Option<usize> {
        let total = self.char_len();
        self.as_str()
            .chars()
            .rev()
            .position(|c| c == ch)
            .map(|from_end| total - 1 - from_end)
    }

    /// Code point at `index`
    pub fn char_at(&self, index: usize) -> DomResult<char> {
        self.as_str().chars().nth(index).ok_or(DomError::IndexSize)
    }

    /// Compare ignoring ASCII case
    pub fn caseless_eq(&self, other: &DomString) -> bool {
        if self.is_interned() && other.is_interned() && self.ptr_eq(other) {
            return true;
        }
        self.as_str().eq_ignore_ascii_case(other.as_str())
    }

    /// ASCII lowercase copy; non-ASCII content is refused
    pub fn to_lower(&self) -> DomResult<DomString> {
        self.map_ascii(str::to_ascii_lowercase)
    }

    /// ASCII uppercase copy; non-ASCII content is refused
    pub fn to_upper(&self) -> DomResult<DomString> {
        self.map_ascii(str::to_ascii_uppercase)
    }

    fn map_ascii(&self, f: fn(&str) -> String) -> DomResult<DomString> {
        if !self.as_str().is_ascii() {
            return Err(DomError::NotSupported);
        }
        let mapped = f(self.as_str());
        if mapped == self.as_str() {
            return Ok(self.clone());
        }
        Ok(if self.is_interned() {
            Self::interned(&mapped)
        } else {
            Self::from(mapped)
        })
    }

    /// Whether every code point is XML whitespace
    pub fn is_whitespace(&self) -> bool {
        self.as_str()
            .chars()
            .all(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
    }
}

impl PartialEq for DomString {
    fn eq(&self, other: &Self) -> bool {
        if self.is_interned() && other.is_interned() && self.ptr_eq(other) {
            return true;
        }
        self.as_str() == other.as_str()
    }
}

impl Eq for DomString {}

impl PartialEq<str> for DomString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for DomString {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialOrd for DomString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DomString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for DomString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Borrow<str> for DomString {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl Deref for DomString {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for DomString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Default for DomString {
    fn default() -> Self {
        Self::new("")
    }
}

impl From<&str> for DomString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DomString {
    fn from(s: String) -> Self {
        Self {
            repr: Repr::Owned(Arc::from(s)),
        }
    }
}

impl fmt::Display for DomString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for DomString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

/// Character-set codec contract
///
/// Transcoders live outside this crate; they only need to map bytes to
/// UCS-4 code points and back.
pub trait CharsetCodec {
    /// Decode bytes into code points
    fn decode(&self, bytes: &[u8]) -> DomResult<Vec<u32>>;

    /// Encode code points into bytes
    fn encode(&self, code_points: &[u32]) -> DomResult<Vec<u8>>;
}

/// UTF-8 codec
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Codec;

impl CharsetCodec for Utf8Codec {
    fn decode(&self, bytes: &[u8]) -> DomResult<Vec<u32>> {
        let s = std::str::from_utf8(bytes).map_err(|_| DomError::InvalidCharacter)?;
        Ok(s.chars().map(u32::from).collect())
    }

    fn encode(&self, code_points: &[u32]) -> DomResult<Vec<u8>> {
        let mut out = Vec::with_capacity(code_points.len());
        let mut buf = [0u8; 4];
        for &cp in code_points {
            let ch = char::from_u32(cp).ok_or(DomError::InvalidCharacter)?;
            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substr_uses_code_points() {
        let s = DomString::new("héllo wörld");
        assert_eq!(s.substr(1, 4).unwrap(), "éllo");
        assert_eq!(s.substr(6, 100).unwrap(), "wörld");
        assert_eq!(s.substr(11, 1).unwrap(), "");
        assert_eq!(s.substr(12, 1), Err(DomError::IndexSize));
    }

    #[test]
    fn test_insert_and_replace() {
        let s = DomString::new("abcdef");
        assert_eq!(s.insert(&"XY".into(), 2).unwrap(), "abXYcdef");
        assert_eq!(s.insert(&"!".into(), 6).unwrap(), "abcdef!");
        assert_eq!(s.insert(&"!".into(), 7), Err(DomError::IndexSize));
        assert_eq!(s.replace_range(1, 2, &"__".into()).unwrap(), "a__def");
        assert_eq!(s.replace_range(4, 10, &"".into()).unwrap(), "abcd");
    }

    #[test]
    fn test_index_of() {
        let s = DomString::new("a.b.c");
        assert_eq!(s.index_of('.'), Some(1));
        assert_eq!(s.rindex_of('.'), Some(3));
        assert_eq!(s.index_of('z'), None);
        assert_eq!(s.char_at(4).unwrap(), 'c');
        assert_eq!(s.char_at(5), Err(DomError::IndexSize));
    }

    #[test]
    fn test_equality_across_backings() {
        let owned = DomString::new("div");
        let interned = DomString::interned("div");
        assert_eq!(owned, interned);
        assert!(!owned.ptr_eq(&interned));
        assert!(DomString::new("DIV").caseless_eq(&interned));
    }

    #[test]
    fn test_case_mapping_refuses_non_ascii() {
        assert_eq!(DomString::new("AbC").to_lower().unwrap(), "abc");
        assert_eq!(DomString::new("Straße").to_upper(), Err(DomError::NotSupported));
    }

    #[test]
    fn test_codec_round_trip() {
        let s = DomString::decode_with(&Utf8Codec, "καλή".as_bytes()).unwrap();
        assert_eq!(s.char_len(), 4);
        assert_eq!(s.encode_with(&Utf8Codec).unwrap(), "καλή".as_bytes());
        assert_eq!(
            DomString::decode_with(&Utf8Codec, &[0xff, 0xfe]),
            Err(DomError::InvalidCharacter)
        );
        assert_eq!(DomString::from_code_points(&[0xD800]), Err(DomError::InvalidCharacter));
    }
}
