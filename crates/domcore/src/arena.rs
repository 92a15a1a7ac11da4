//! Node arena
//!
//! Generational slot map owning every node of one document. Freed slots go
//! on a free list and bump their generation, so a [`NodeId`] held past the
//! node's destruction never resolves to whatever reuses the slot.

use std::ops::{Index, IndexMut};

use crate::error::{DomError, DomResult};
use crate::generation::Generation;
use crate::node::Node;

/// Generational node index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: Generation,
}

impl NodeId {
    /// Slot index
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at allocation time
    #[inline]
    pub fn generation(self) -> Generation {
        self.generation
    }
}

#[derive(Debug)]
struct Slot {
    generation: Generation,
    node: Option<Node>,
}

/// Generational arena (slot map) of nodes
#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live: usize,
}

impl NodeArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert a node, reusing a freed slot when one exists
    pub(crate) fn insert(&mut self, node: Node) -> DomResult<NodeId> {
        let id = if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId { index, generation: slot.generation }
        } else {
            let index = u32::try_from(self.slots.len()).map_err(|_| DomError::NoMemory)?;
            self.slots.try_reserve(1).map_err(|_| DomError::NoMemory)?;
            self.slots.push(Slot {
                generation: Generation::INITIAL,
                node: Some(node),
            });
            NodeId { index, generation: Generation::INITIAL }
        };
        self.live += 1;
        Ok(id)
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    #[inline]
    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Free a slot, invalidating every outstanding id for it
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation.bump();
        self.free_list.push(id.index);
        self.live -= 1;
        Some(node)
    }

    /// Number of live nodes
    pub(crate) fn len(&self) -> usize {
        self.live
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("stale node id {:?}", id),
        }
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("stale node id {:?}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeData;

    fn comment() -> Node {
        Node::new(NodeData::Comment, Default::default())
    }

    #[test]
    fn test_insert_and_remove() {
        let mut arena = NodeArena::new();
        let a = arena.insert(comment()).unwrap();
        let b = arena.insert(comment()).unwrap();
        assert_eq!(arena.len(), 2);
        assert!(arena.contains(a));

        assert!(arena.remove(a).is_some());
        assert!(!arena.contains(a));
        assert!(arena.remove(a).is_none());
        assert!(arena.contains(b));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_stale_id_after_reuse() {
        let mut arena = NodeArena::new();
        let a = arena.insert(comment()).unwrap();
        arena.remove(a);

        let c = arena.insert(comment()).unwrap();
        assert_eq!(c.index(), a.index());
        assert_ne!(c.generation(), a.generation());
        assert!(arena.get(a).is_none());
        assert!(arena.get(c).is_some());
    }
}
