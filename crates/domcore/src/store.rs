//! Document storage
//!
//! Every node of a document lives in one [`DocumentData`] behind a
//! `RefCell`, shared by all handles through an `Rc<DocumentCell>`. Handle
//! drops that happen while the data is borrowed are queued on `released`
//! and applied once the borrow ends, together with any user-data handler
//! calls the mutation produced.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexSet;

use crate::arena::NodeArena;
use crate::config::DocumentConfig;
use crate::error::DomResult;
use crate::generation::Generation;
use crate::node::{Node, NodeData};
use crate::node_list::NodeListInner;
use crate::string::DomString;
use crate::user_data::DeletedNotice;
use crate::validate::NameValidator;
use crate::NodeId;

/// Document lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DocumentState {
    Live,
    /// Last document handle dropped; children torn down but some nodes are
    /// still referenced from outside
    Finalised,
    /// Document node freed
    Destroyed,
}

/// Names every document compares against
#[derive(Debug, Clone)]
pub(crate) struct WellKnownNames {
    pub(crate) class: DomString,
    pub(crate) id: DomString,
    pub(crate) xmlns: DomString,
    pub(crate) wildcard: DomString,
}

impl WellKnownNames {
    fn new(config: &DocumentConfig) -> Self {
        Self {
            class: DomString::interned("class"),
            id: DomString::interned(&config.id_attribute_name),
            xmlns: DomString::interned("xmlns"),
            wildcard: DomString::interned("*"),
        }
    }
}

/// All state of one document
pub(crate) struct DocumentData {
    pub(crate) arena: NodeArena,
    /// The Document node
    pub(crate) root: NodeId,
    pub(crate) config: DocumentConfig,
    pub(crate) validator: Rc<dyn NameValidator>,
    pub(crate) names: WellKnownNames,
    /// Parentless nodes that are still referenced
    pub(crate) pending: IndexSet<NodeId>,
    /// Live node lists, for deduplication
    pub(crate) lists: Vec<Weak<NodeListInner>>,
    /// Bumped on every structural or attribute change
    pub(crate) generation: Generation,
    pub(crate) state: DocumentState,
    pub(crate) deleted: Vec<DeletedNotice>,
}

impl DocumentData {
    fn new(config: DocumentConfig, validator: Rc<dyn NameValidator>) -> DomResult<Self> {
        let mut arena = NodeArena::new();
        let root = arena.insert(Node::new(NodeData::Document, DomString::default()))?;
        Ok(Self {
            arena,
            root,
            names: WellKnownNames::new(&config),
            config,
            validator,
            pending: IndexSet::new(),
            lists: Vec::new(),
            generation: Generation::INITIAL,
            state: DocumentState::Live,
            deleted: Vec::new(),
        })
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.arena[id]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.arena[id]
    }

    /// Record a change visible to live node lists
    #[inline]
    pub(crate) fn touch(&mut self) {
        self.generation.bump();
    }

    /// Name string, interned when the document is configured to
    pub(crate) fn name(&self, s: &str) -> DomString {
        if self.config.intern_names {
            DomString::interned(s)
        } else {
            DomString::new(s)
        }
    }

    pub(crate) fn is_html(&self) -> bool {
        self.config.is_html()
    }

    /// Allocate a node owned by this document: one reference, pending
    pub(crate) fn create(&mut self, node: Node) -> DomResult<NodeId> {
        let id = self.arena.insert(node)?;
        self.arena[id].refcount = 1;
        self.pending.insert(id);
        Ok(id)
    }

    /// Allocate a node that is about to be attached somewhere
    pub(crate) fn create_detached(&mut self, node: Node) -> DomResult<NodeId> {
        self.arena.insert(node)
    }

    /// Iterate over the children of `id`
    pub(crate) fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            data: self,
            next: self.arena.get(id).and_then(|n| n.first_child),
        }
    }

    /// Children collected, for loops that mutate the tree
    pub(crate) fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).collect()
    }

    /// Element children of the Document node
    pub(crate) fn document_element(&self) -> Option<NodeId> {
        self.children(self.root)
            .find(|&id| self.node(id).as_element().is_some())
    }

    pub(crate) fn doctype(&self) -> Option<NodeId> {
        self.children(self.root)
            .find(|&id| matches!(self.node(id).data, NodeData::DocumentType(_)))
    }

    /// Descendants of `root` in document order, excluding `root`
    pub(crate) fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            data: self,
            root,
            next: self.arena.get(root).and_then(|n| n.first_child),
        }
    }

    pub(crate) fn is_live(&self) -> bool {
        self.state == DocumentState::Live
    }
}

impl fmt::Debug for DocumentData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentData")
            .field("nodes", &self.arena.len())
            .field("pending", &self.pending.len())
            .field("lists", &self.lists.len())
            .field("generation", &self.generation)
            .field("state", &self.state)
            .finish()
    }
}

/// Child iterator
pub(crate) struct Children<'a> {
    data: &'a DocumentData,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.data.node(id).next_sibling;
        Some(id)
    }
}

/// Pre-order subtree iterator
pub(crate) struct Descendants<'a> {
    data: &'a DocumentData,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        let node = self.data.node(id);
        self.next = if let Some(child) = node.first_child {
            Some(child)
        } else {
            let mut current = id;
            loop {
                if current == self.root {
                    break None;
                }
                let n = self.data.node(current);
                if let Some(sibling) = n.next_sibling {
                    break Some(sibling);
                }
                match n.parent {
                    Some(parent) if parent != self.root => current = parent,
                    _ => break None,
                }
            }
        };
        Some(id)
    }
}

/// Shared document storage
pub(crate) struct DocumentCell {
    data: RefCell<DocumentData>,
    released: RefCell<Vec<NodeId>>,
}

impl DocumentCell {
    pub(crate) fn new(
        config: DocumentConfig,
        validator: Rc<dyn NameValidator>,
    ) -> DomResult<Rc<Self>> {
        Ok(Rc::new(Self {
            data: RefCell::new(DocumentData::new(config, validator)?),
            released: RefCell::new(Vec::new()),
        }))
    }

    /// Run `f` with shared access
    pub(crate) fn read<R>(&self, f: impl FnOnce(&DocumentData) -> R) -> R {
        f(&self.data.borrow())
    }

    /// Run `f` with exclusive access, then apply deferred work
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut DocumentData) -> R) -> R {
        let result = f(&mut self.data.borrow_mut());
        self.settle();
        result
    }

    /// Add a reference to `id`
    pub(crate) fn retain(&self, id: NodeId) {
        self.data.borrow_mut().retain(id);
    }

    /// Drop a reference to `id`, deferring when the data is busy
    pub(crate) fn release(&self, id: NodeId) {
        match self.data.try_borrow_mut() {
            Ok(mut data) => data.release(id),
            Err(_) => {
                self.released.borrow_mut().push(id);
                return;
            }
        }
        self.settle();
    }

    pub(crate) fn register_list(&self, list: Weak<NodeListInner>) {
        let mut data = self.data.borrow_mut();
        data.lists.retain(|l| l.strong_count() > 0);
        data.lists.push(list);
    }

    /// Forget dropped lists; skipped while the data is busy
    pub(crate) fn prune_lists(&self) {
        if let Ok(mut data) = self.data.try_borrow_mut() {
            data.lists.retain(|l| l.strong_count() > 0);
        }
    }

    /// Apply queued releases and deliver queued notifications
    fn settle(&self) {
        loop {
            let notices = {
                let Ok(mut data) = self.data.try_borrow_mut() else {
                    return;
                };
                let released = std::mem::take(&mut *self.released.borrow_mut());
                for id in released {
                    data.release(id);
                }
                std::mem::take(&mut data.deleted)
            };
            if notices.is_empty() && self.released.borrow().is_empty() {
                return;
            }
            for notice in notices {
                notice.dispatch();
            }
        }
    }
}

impl fmt::Debug for DocumentCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data.try_borrow() {
            Ok(data) => data.fmt(f),
            Err(_) => f.write_str("DocumentData { <borrowed> }"),
        }
    }
}
