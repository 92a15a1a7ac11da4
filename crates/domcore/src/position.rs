//! Document order comparison

use std::rc::Rc;

use crate::node::NodeType;
use crate::node_ref::NodeRef;
use crate::store::DocumentData;
use crate::NodeId;

/// Result of [`NodeRef::compare_document_position`], describing the other
/// node relative to the receiver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct DocumentPosition(pub u16);

impl DocumentPosition {
    pub const DISCONNECTED: u16 = 1 << 0;
    pub const PRECEDING: u16 = 1 << 1;
    pub const FOLLOWING: u16 = 1 << 2;
    pub const CONTAINS: u16 = 1 << 3;
    pub const CONTAINED_BY: u16 = 1 << 4;
    pub const IMPLEMENTATION_SPECIFIC: u16 = 1 << 5;

    #[inline]
    pub fn has(&self, flag: u16) -> bool {
        (self.0 & flag) != 0
    }

    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.has(Self::DISCONNECTED)
    }

    fn ordered(before: bool) -> u16 {
        if before { Self::PRECEDING } else { Self::FOLLOWING }
    }
}

impl DocumentData {
    /// `id` and its ancestors, root last; attributes step to their owner
    fn ancestry(&self, id: NodeId) -> Vec<NodeId> {
        std::iter::successors(Some(id), |&n| self.node(n).parent).collect()
    }

    /// Whether sibling-level node `a` comes before `b` under `parent`.
    /// Attributes come before children, in attribute order.
    fn precedes_under(&self, parent: NodeId, a: NodeId, b: NodeId) -> bool {
        let attr_pos = |id| {
            self.node(parent)
                .as_element()
                .and_then(|e| e.attrs.position(id))
        };
        match (attr_pos(a), attr_pos(b)) {
            (Some(x), Some(y)) => x < y,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => self.children(parent).find(|&c| c == a || c == b) == Some(a),
        }
    }

    pub(crate) fn compare_position(&self, this: NodeId, other: NodeId) -> u16 {
        if this == other {
            return 0;
        }
        let mine = self.ancestry(this);
        let theirs = self.ancestry(other);
        let (Some(&my_root), Some(&their_root)) = (mine.last(), theirs.last()) else {
            return DocumentPosition::DISCONNECTED;
        };
        if my_root != their_root {
            return DocumentPosition::DISCONNECTED
                | DocumentPosition::IMPLEMENTATION_SPECIFIC
                | DocumentPosition::ordered(their_root.index() < my_root.index());
        }
        if mine.contains(&other) {
            return DocumentPosition::CONTAINS | DocumentPosition::PRECEDING;
        }
        if theirs.contains(&this) {
            return DocumentPosition::CONTAINED_BY | DocumentPosition::FOLLOWING;
        }

        // Walk down from the shared root until the chains split
        let mut mine = mine.iter().rev().peekable();
        let mut theirs = theirs.iter().rev().peekable();
        let mut common = my_root;
        while let (Some(&&a), Some(&&b)) = (mine.peek(), theirs.peek()) {
            if a != b {
                break;
            }
            common = a;
            mine.next();
            theirs.next();
        }
        let (Some(&a), Some(&b)) = (mine.next(), theirs.next()) else {
            return DocumentPosition::DISCONNECTED;
        };
        let both_attrs =
            self.node_type(a) == NodeType::Attribute && self.node_type(b) == NodeType::Attribute;
        let order = DocumentPosition::ordered(self.precedes_under(common, b, a));
        if both_attrs {
            order | DocumentPosition::IMPLEMENTATION_SPECIFIC
        } else {
            order
        }
    }
}

impl NodeRef {
    /// Position of `other` relative to this node
    pub fn compare_document_position(&self, other: &NodeRef) -> DocumentPosition {
        if !self.same_document(other) {
            let before = Rc::as_ptr(&other.doc) < Rc::as_ptr(&self.doc);
            return DocumentPosition(
                DocumentPosition::DISCONNECTED
                    | DocumentPosition::IMPLEMENTATION_SPECIFIC
                    | DocumentPosition::ordered(before),
            );
        }
        let other = other.id;
        DocumentPosition(self.read(|d, id| d.compare_position(id, other)))
    }
}
