//! Reference counting and deferred destruction
//!
//! A node is freed when nothing refers to it: no handles, no parent, and
//! not listed on a live element. Freeing a node frees its unreferenced
//! descendants and attributes; referenced ones are cut loose into the
//! pending set and outlive it.

use crate::node::NodeData;
use crate::store::{DocumentData, DocumentState};
use crate::user_data::DeletedNotice;
use crate::NodeId;

impl DocumentData {
    pub(crate) fn retain(&mut self, id: NodeId) {
        if let Some(node) = self.arena.get_mut(id) {
            node.refcount += 1;
        }
    }

    pub(crate) fn release(&mut self, id: NodeId) {
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        node.refcount = node.refcount.saturating_sub(1);
        if node.refcount == 0 {
            self.try_destroy(id);
        }
    }

    /// Free `id` if nothing keeps it alive; otherwise park it as pending
    /// when it has no parent.
    pub(crate) fn try_destroy(&mut self, id: NodeId) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        if node.parent.is_some() {
            return;
        }
        if node.refcount > 0 {
            self.mark_pending(id);
            return;
        }
        if id == self.root {
            self.finalise();
        } else {
            self.destroy(id);
        }
    }

    pub(crate) fn mark_pending(&mut self, id: NodeId) {
        if id != self.root && self.pending.insert(id) {
            tracing::trace!("node {} deferred to pending", id.index());
        }
    }

    pub(crate) fn remove_pending(&mut self, id: NodeId) {
        if self.pending.swap_remove(&id) {
            self.check_destroyed();
        }
    }

    pub(crate) fn is_pending(&self, id: NodeId) -> bool {
        self.pending.contains(&id)
    }

    /// Free an unreferenced, parentless subtree
    fn destroy(&mut self, id: NodeId) {
        let mut work = vec![id];
        while let Some(id) = work.pop() {
            for child in self.child_ids(id) {
                self.release_edge(child, &mut work);
            }
            let attrs: Vec<NodeId> = match self.arena.get(id).and_then(|n| n.as_element()) {
                Some(element) => element.attrs.ids().collect(),
                None => Vec::new(),
            };
            for attr in attrs {
                self.release_edge(attr, &mut work);
            }

            self.pending.swap_remove(&id);
            if let Some(node) = self.arena.remove(id) {
                for (key, entry) in node.user_data.into_entries() {
                    if entry.handler.is_some() {
                        self.deleted.push(DeletedNotice { key, entry });
                    }
                }
                tracing::trace!("freed node {}", id.index());
            }
        }
        self.touch();
        self.check_destroyed();
    }

    /// Cut the owning edge to `id` during teardown of its owner: queue it
    /// for freeing, or make it pending if it is still referenced
    fn release_edge(&mut self, id: NodeId, work: &mut Vec<NodeId>) {
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        if node.refcount == 0 {
            work.push(id);
            return;
        }
        if matches!(node.data, NodeData::Attr(_)) {
            node.parent = None;
            if let Some(attr) = node.as_attr_mut() {
                attr.is_id = false;
            }
        } else {
            self.unlink(id);
        }
        self.mark_pending(id);
    }

    /// Tear down the document's children once no handle refers to it
    fn finalise(&mut self) {
        if self.state != DocumentState::Live {
            return;
        }
        for child in self.child_ids(self.root) {
            self.unlink(child);
            if self.node(child).refcount == 0 {
                self.destroy(child);
            } else {
                self.mark_pending(child);
            }
        }
        let user_data = std::mem::take(&mut self.node_mut(self.root).user_data);
        for (key, entry) in user_data.into_entries() {
            if entry.handler.is_some() {
                self.deleted.push(DeletedNotice { key, entry });
            }
        }
        self.state = DocumentState::Finalised;
        tracing::debug!("document finalised, {} nodes pending", self.pending.len());
        self.check_destroyed();
    }

    /// Free the Document node once finalised and nothing is pending
    fn check_destroyed(&mut self) {
        if self.state == DocumentState::Finalised && self.pending.is_empty() {
            self.arena.remove(self.root);
            self.state = DocumentState::Destroyed;
            tracing::debug!("document destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Document;

    #[test]
    fn test_factory_nodes_start_pending() {
        let doc = Document::new().unwrap();
        let el = doc.create_element("div").unwrap();
        assert!(el.is_pending());
        assert_eq!(el.refcount(), 1);
        assert_eq!(doc.pending_len(), 1);

        drop(el);
        assert_eq!(doc.pending_len(), 0);
    }

    #[test]
    fn test_attached_node_leaves_pending() {
        let doc = Document::new().unwrap();
        let root = doc.create_element("root").unwrap();
        doc.append_child(&root).unwrap();
        assert!(!root.is_pending());

        let removed = doc.remove_child(&root);
        assert!(removed.is_err());
    }

    #[test]
    fn test_referenced_descendant_survives_teardown() {
        let doc = Document::new().unwrap();
        let parent = doc.create_element("p").unwrap();
        let child = doc.create_element("c").unwrap();
        parent.append_child(&child).unwrap();
        assert!(!child.is_pending());

        drop(parent);
        assert!(child.is_pending());
        assert!(child.parent_node().is_none());
        assert_eq!(child.node_name(), "c");
    }
}
