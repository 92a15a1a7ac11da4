//! Typed node handles
//!
//! Thin wrappers over [`NodeRef`] for each node interface. They deref to
//! their base interface, so every handle exposes the generic node API.

use std::ops::Deref;

use crate::node::NodeType;
use crate::node_ref::NodeRef;

impl NodeRef {
    #[inline]
    pub(crate) fn from_node(node: NodeRef) -> Self {
        node
    }
}

macro_rules! node_handle {
    ($(#[$meta:meta])* $name:ident($base:ty), $as_fn:ident, $($kind:ident)|+) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name($base);

        impl $name {
            #[inline]
            pub(crate) fn from_node(node: NodeRef) -> Self {
                Self(<$base>::from_node(node))
            }

            /// Generic node handle
            #[inline]
            pub fn as_node(&self) -> &NodeRef {
                self
            }
        }

        impl Deref for $name {
            type Target = $base;

            #[inline]
            fn deref(&self) -> &$base {
                &self.0
            }
        }

        impl From<$name> for NodeRef {
            fn from(handle: $name) -> NodeRef {
                NodeRef::from(handle.0)
            }
        }

        impl TryFrom<NodeRef> for $name {
            type Error = NodeRef;

            fn try_from(node: NodeRef) -> Result<Self, NodeRef> {
                if matches!(node.node_type(), $(NodeType::$kind)|+) {
                    Ok(Self::from_node(node))
                } else {
                    Err(node)
                }
            }
        }

        impl NodeRef {
            /// Typed handle, if the node has this interface
            pub fn $as_fn(&self) -> Option<$name> {
                $name::try_from(self.clone()).ok()
            }
        }
    };
}

node_handle!(
    /// Element node
    Element(NodeRef), as_element, Element
);
node_handle!(
    /// Attribute node
    Attr(NodeRef), as_attr, Attribute
);
node_handle!(
    /// Text, CDATA section, or comment
    CharacterData(NodeRef), as_character_data, Text | CdataSection | Comment
);
node_handle!(
    /// Text or CDATA section node
    Text(CharacterData), as_text, Text | CdataSection
);
node_handle!(
    /// Comment node
    Comment(CharacterData), as_comment, Comment
);
node_handle!(
    /// Processing instruction node
    ProcessingInstruction(NodeRef), as_processing_instruction, ProcessingInstruction
);
node_handle!(
    /// Document type node
    DocumentType(NodeRef), as_document_type, DocumentType
);
node_handle!(
    /// Document fragment node
    DocumentFragment(NodeRef), as_document_fragment, DocumentFragment
);
node_handle!(
    /// Entity reference node
    EntityReference(NodeRef), as_entity_reference, EntityReference
);
node_handle!(
    /// Document node
    Document(NodeRef), as_document, Document
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_conversions() {
        let doc = Document::new().unwrap();
        let text = doc.create_text_node("hi").unwrap();
        let node: NodeRef = text.clone().into();

        assert!(node.as_text().is_some());
        assert!(node.as_character_data().is_some());
        assert!(node.as_element().is_none());
        assert!(node.as_comment().is_none());

        let back = Element::try_from(node).unwrap_err();
        assert_eq!(back.node_type(), NodeType::Text);
        assert_eq!(text.length(), 2);
    }
}
