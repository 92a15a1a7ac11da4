//! Element Attributes
//!
//! Insertion-ordered attribute storage keyed by (namespace, local name).
//! Entries point at Attr nodes in the document arena; the element owns them.

use indexmap::IndexMap;

use crate::string::DomString;
use crate::NodeId;

/// Attribute lookup key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct AttrKey {
    pub(crate) namespace: Option<DomString>,
    pub(crate) local_name: DomString,
}

impl AttrKey {
    pub(crate) fn new(namespace: Option<DomString>, local_name: DomString) -> Self {
        Self { namespace, local_name }
    }
}

/// Attribute list of one element
#[derive(Debug, Clone, Default)]
pub(crate) struct AttrList {
    entries: IndexMap<AttrKey, NodeId>,
}

impl AttrList {
    /// Get number of attributes
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get attribute by position
    pub(crate) fn get_index(&self, index: usize) -> Option<NodeId> {
        self.entries.get_index(index).map(|(_, &id)| id)
    }

    /// Get attribute by (namespace, local name)
    pub(crate) fn get(&self, key: &AttrKey) -> Option<NodeId> {
        self.entries.get(key).copied()
    }

    /// First attribute whose qualified name satisfies `matches`
    pub(crate) fn find(&self, mut matches: impl FnMut(NodeId) -> bool) -> Option<NodeId> {
        self.entries.values().copied().find(|&id| matches(id))
    }

    /// Position of a listed attribute node
    pub(crate) fn position(&self, attr: NodeId) -> Option<usize> {
        self.entries.values().position(|&id| id == attr)
    }

    /// Insert or replace at `key`, keeping the original position on
    /// replacement. Returns the displaced node.
    pub(crate) fn insert(&mut self, key: AttrKey, attr: NodeId) -> Option<NodeId> {
        self.entries.insert(key, attr)
    }

    /// Remove a listed attribute node
    pub(crate) fn remove_node(&mut self, attr: NodeId) -> Option<AttrKey> {
        let index = self.position(attr)?;
        self.entries.shift_remove_index(index).map(|(key, _)| key)
    }

    /// Iterate over attribute nodes in insertion order
    pub(crate) fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.values().copied()
    }
}

/// Split a `class` attribute value into tokens.
///
/// Separators are ASCII whitespace; empty tokens are dropped and duplicates
/// are kept in source order.
pub(crate) fn split_class_tokens(value: &str) -> Vec<DomString> {
    value
        .split(|c: char| c.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
        .map(DomString::interned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::NodeArena;
    use crate::node::{AttrData, Node, NodeData};

    fn attr_ids(n: usize) -> Vec<NodeId> {
        let mut arena = NodeArena::new();
        (0..n)
            .map(|_| {
                arena
                    .insert(Node::new(NodeData::Attr(AttrData::default()), "a".into()))
                    .unwrap()
            })
            .collect()
    }

    fn key(local: &str) -> AttrKey {
        AttrKey::new(None, local.into())
    }

    #[test]
    fn test_set_get_attribute() {
        let ids = attr_ids(2);
        let mut attrs = AttrList::default();
        attrs.insert(key("class"), ids[0]);
        attrs.insert(key("id"), ids[1]);

        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get(&key("class")), Some(ids[0]));
        assert_eq!(attrs.get_index(1), Some(ids[1]));
        assert!(attrs.get(&AttrKey::new(Some("urn:x".into()), "class".into())).is_none());
    }

    #[test]
    fn test_replace_keeps_position() {
        let ids = attr_ids(3);
        let mut attrs = AttrList::default();
        attrs.insert(key("a"), ids[0]);
        attrs.insert(key("b"), ids[1]);

        let old = attrs.insert(key("a"), ids[2]);
        assert_eq!(old, Some(ids[0]));
        assert_eq!(attrs.get_index(0), Some(ids[2]));
    }

    #[test]
    fn test_remove_attribute() {
        let ids = attr_ids(3);
        let mut attrs = AttrList::default();
        attrs.insert(key("a"), ids[0]);
        attrs.insert(key("b"), ids[1]);
        attrs.insert(key("c"), ids[2]);

        assert_eq!(attrs.remove_node(ids[0]), Some(key("a")));
        assert_eq!(attrs.get_index(0), Some(ids[1]));
        assert_eq!(attrs.remove_node(ids[2]), Some(key("c")));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_split_class_tokens() {
        let tokens = split_class_tokens("  btn\tprimary\n btn ");
        assert_eq!(tokens, vec!["btn", "primary", "btn"]);
        assert!(split_class_tokens("   ").is_empty());
    }
}
