//! DOM Node - arena slot representation
//!
//! One `Node` struct for every node type; per-type state lives in
//! [`NodeData`]. Links are arena indices:
//! - the parent's ownership of its children is the only owning edge
//! - parent, sibling, and owner-document links never hold a reference
//! - an Attr's `parent` is its owner element, but it never appears in the
//!   element's child chain

use crate::attributes::AttrList;
use crate::string::DomString;
use crate::user_data::UserData;
use crate::NodeId;

/// Node type, numbered as in DOM Core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CdataSection = 4,
    EntityReference = 5,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
}

impl NodeType {
    /// DOM `nodeType` code
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Text or CDATA section
    #[inline]
    pub fn is_text(self) -> bool {
        matches!(self, Self::Text | Self::CdataSection)
    }

    /// Carries character data
    #[inline]
    pub fn is_character_data(self) -> bool {
        matches!(self, Self::Text | Self::CdataSection | Self::Comment)
    }
}

/// DOM Node - Core structure
#[derive(Debug)]
pub(crate) struct Node {
    /// Local name, PI target, doctype or entity reference name
    pub(crate) name: DomString,
    pub(crate) namespace: Option<DomString>,
    pub(crate) prefix: Option<DomString>,
    /// Character data or PI data
    pub(crate) value: Option<DomString>,

    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,

    /// External strong holders
    pub(crate) refcount: u32,
    pub(crate) user_data: UserData,

    pub(crate) data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData, name: DomString) -> Self {
        Self {
            name,
            namespace: None,
            prefix: None,
            value: None,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            refcount: 0,
            user_data: UserData::default(),
            data,
        }
    }

    pub(crate) fn with_value(mut self, value: DomString) -> Self {
        self.value = Some(value);
        self
    }

    pub(crate) fn with_namespace(
        mut self,
        namespace: Option<DomString>,
        prefix: Option<DomString>,
    ) -> Self {
        self.namespace = namespace;
        self.prefix = prefix;
        self
    }

    #[inline]
    pub(crate) fn node_type(&self) -> NodeType {
        match self.data {
            NodeData::Document => NodeType::Document,
            NodeData::DocumentType(_) => NodeType::DocumentType,
            NodeData::DocumentFragment => NodeType::DocumentFragment,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Attr(_) => NodeType::Attribute,
            NodeData::Text { .. } => NodeType::Text,
            NodeData::CdataSection => NodeType::CdataSection,
            NodeData::Comment => NodeType::Comment,
            NodeData::ProcessingInstruction => NodeType::ProcessingInstruction,
            NodeData::EntityReference => NodeType::EntityReference,
        }
    }

    /// `prefix:local` for elements and attributes
    pub(crate) fn qualified_name(&self) -> DomString {
        match &self.prefix {
            Some(prefix) => DomString::from(format!("{}:{}", prefix, self.name)),
            None => self.name.clone(),
        }
    }

    /// DOM `nodeName`
    pub(crate) fn node_name(&self) -> DomString {
        match self.node_type() {
            NodeType::Element | NodeType::Attribute => self.qualified_name(),
            NodeType::Text => DomString::interned("#text"),
            NodeType::CdataSection => DomString::interned("#cdata-section"),
            NodeType::Comment => DomString::interned("#comment"),
            NodeType::Document => DomString::interned("#document"),
            NodeType::DocumentFragment => DomString::interned("#document-fragment"),
            NodeType::DocumentType
            | NodeType::ProcessingInstruction
            | NodeType::EntityReference => self.name.clone(),
        }
    }

    #[inline]
    pub(crate) fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn as_attr(&self) -> Option<&AttrData> {
        match &self.data {
            NodeData::Attr(a) => Some(a),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn as_attr_mut(&mut self) -> Option<&mut AttrData> {
        match &mut self.data {
            NodeData::Attr(a) => Some(a),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Document,
    DocumentType(DoctypeData),
    DocumentFragment,
    Element(ElementData),
    Attr(AttrData),
    Text { element_content_whitespace: bool },
    CdataSection,
    Comment,
    ProcessingInstruction,
    EntityReference,
}

/// Element-specific data
#[derive(Debug, Clone, Default)]
pub(crate) struct ElementData {
    pub(crate) attrs: AttrList,
    /// Split `class` value; `None` until first needed or after invalidation
    pub(crate) classes: Option<Vec<DomString>>,
    /// Attribute explicitly marked as this element's ID
    pub(crate) id_attr: Option<NodeId>,
}

/// Attribute-specific data
#[derive(Debug, Clone)]
pub(crate) struct AttrData {
    pub(crate) value: AttrValue,
    pub(crate) specified: bool,
    pub(crate) is_id: bool,
    pub(crate) read_only: bool,
}

impl Default for AttrData {
    fn default() -> Self {
        Self {
            value: AttrValue::Unset,
            specified: true,
            is_id: false,
            read_only: false,
        }
    }
}

/// Typed attribute value; the type is fixed by the first write
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttrValue {
    #[default]
    Unset,
    String(DomString),
    Integer(u32),
    Short(u16),
    Bool(bool),
}

impl AttrValue {
    /// Render as a DOM string
    pub fn to_dom_string(&self) -> DomString {
        match self {
            Self::Unset => DomString::default(),
            Self::String(s) => s.clone(),
            Self::Integer(n) => DomString::from(n.to_string()),
            Self::Short(n) => DomString::from(n.to_string()),
            Self::Bool(b) => DomString::from(if *b { "true" } else { "false" }),
        }
    }

    /// Whether `other` may overwrite this value
    pub(crate) fn same_kind(&self, other: &AttrValue) -> bool {
        matches!(self, Self::Unset)
            || std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Document type declaration data
#[derive(Debug, Clone, Default)]
pub(crate) struct DoctypeData {
    pub(crate) public_id: DomString,
    pub(crate) system_id: DomString,
    pub(crate) internal_subset: Option<DomString>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_name_by_type() {
        let text = Node::new(NodeData::Text { element_content_whitespace: false }, DomString::default());
        assert_eq!(text.node_name(), "#text");

        let el = Node::new(NodeData::Element(ElementData::default()), "rect".into())
            .with_namespace(Some("urn:svg".into()), Some("svg".into()));
        assert_eq!(el.node_name(), "svg:rect");
        assert_eq!(el.node_type(), NodeType::Element);
    }

    #[test]
    fn test_attr_value_kind_is_sticky() {
        let unset = AttrValue::Unset;
        assert!(unset.same_kind(&AttrValue::Integer(3)));
        let int = AttrValue::Integer(3);
        assert!(int.same_kind(&AttrValue::Integer(4)));
        assert!(!int.same_kind(&AttrValue::String("x".into())));
        assert_eq!(AttrValue::Bool(true).to_dom_string(), "true");
    }
}
