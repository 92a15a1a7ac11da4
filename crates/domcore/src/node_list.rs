//! Live node lists
//!
//! A list is a root plus a filter; membership is recomputed by traversal
//! whenever the document's mutation generation moved since the last access.
//! The document keeps a weak registry so equal requests share one list.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::element::normalize_ns;
use crate::generation::Cached;
use crate::node_ref::NodeRef;
use crate::store::{DocumentCell, DocumentData};
use crate::string::DomString;
use crate::NodeId;

/// Which nodes a list holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeListFilter {
    /// Children of the root, in sibling order
    Children,
    /// Descendant elements by qualified name; `*` matches all
    ByName { name: DomString, caseless: bool },
    /// Descendant elements by namespace and local name; either may be `*`
    ByNamespace {
        namespace: Option<DomString>,
        local_name: DomString,
    },
}

impl NodeListFilter {
    pub(crate) fn by_name(d: &DocumentData, name: &str) -> Self {
        Self::ByName {
            name: DomString::from(name),
            caseless: d.is_html(),
        }
    }

    pub(crate) fn by_namespace(namespace: Option<&str>, local_name: &str) -> Self {
        Self::ByNamespace {
            namespace: normalize_ns(namespace).map(DomString::from),
            local_name: DomString::from(local_name),
        }
    }

    fn matches_name(d: &DocumentData, id: NodeId, name: &DomString, caseless: bool) -> bool {
        let node = d.node(id);
        if node.as_element().is_none() {
            return false;
        }
        if *name == d.names.wildcard {
            return true;
        }
        let qname = node.qualified_name();
        if caseless {
            qname.caseless_eq(name)
        } else {
            qname == *name
        }
    }

    fn matches_namespace(d: &DocumentData, id: NodeId, namespace: Option<&DomString>, local_name: &DomString) -> bool {
        let node = d.node(id);
        if node.as_element().is_none() {
            return false;
        }
        let namespace_ok = match namespace {
            Some(ns) if *ns == d.names.wildcard => true,
            other => node.namespace.as_ref() == other,
        };
        namespace_ok && (*local_name == d.names.wildcard || node.name == *local_name)
    }
}

pub(crate) struct NodeListInner {
    doc: Rc<DocumentCell>,
    /// Not counted: the list never keeps its root alive
    root: NodeId,
    filter: NodeListFilter,
    cache: RefCell<Option<Cached<Vec<NodeId>>>>,
}

impl NodeListInner {
    fn collect(&self, d: &DocumentData) -> Vec<NodeId> {
        if !d.arena.contains(self.root) {
            return Vec::new();
        }
        match &self.filter {
            NodeListFilter::Children => d.child_ids(self.root),
            NodeListFilter::ByName { name, caseless } => d
                .descendants(self.root)
                .filter(|&id| NodeListFilter::matches_name(d, id, name, *caseless))
                .collect(),
            NodeListFilter::ByNamespace { namespace, local_name } => d
                .descendants(self.root)
                .filter(|&id| NodeListFilter::matches_namespace(d, id, namespace.as_ref(), local_name))
                .collect(),
        }
    }

    fn with_items<R>(&self, f: impl FnOnce(&[NodeId]) -> R) -> R {
        self.doc.read(|d| {
            let mut cache = self.cache.borrow_mut();
            if let Some(items) = cache.as_ref().and_then(|c| c.get_if_valid(d.generation)) {
                tracing::trace!("node list cache hit ({} items)", items.len());
                return f(items);
            }
            let items = self.collect(d);
            tracing::trace!("node list cache miss, recomputed {} items", items.len());
            let result = f(&items);
            *cache = Some(Cached::new(items, d.generation));
            result
        })
    }
}

impl Drop for NodeListInner {
    fn drop(&mut self) {
        self.doc.prune_lists();
    }
}

/// Live, ordered view of nodes under a root
#[derive(Clone)]
pub struct NodeList {
    inner: Rc<NodeListInner>,
}

impl NodeList {
    /// The registered list for (`root`, `filter`), created on first request
    pub(crate) fn get_or_create(doc: &Rc<DocumentCell>, root: NodeId, filter: NodeListFilter) -> NodeList {
        let existing = doc.read(|d| {
            d.lists
                .iter()
                .filter_map(Weak::upgrade)
                .find(|list| list.root == root && list.filter == filter)
        });
        if let Some(inner) = existing {
            return NodeList { inner };
        }

        let inner = Rc::new(NodeListInner {
            doc: doc.clone(),
            root,
            filter,
            cache: RefCell::new(None),
        });
        doc.register_list(Rc::downgrade(&inner));
        NodeList { inner }
    }

    /// Number of nodes currently in the list
    pub fn length(&self) -> usize {
        self.inner.with_items(|items| items.len())
    }

    /// Node at `index`, if in range
    pub fn item(&self, index: usize) -> Option<NodeRef> {
        let id = self.inner.with_items(|items| items.get(index).copied())?;
        Some(NodeRef::new(self.inner.doc.clone(), id))
    }

    /// Current members
    pub fn to_vec(&self) -> Vec<NodeRef> {
        let ids = self.inner.with_items(|items| items.to_vec());
        ids.into_iter()
            .map(|id| NodeRef::new(self.inner.doc.clone(), id))
            .collect()
    }

    /// Whether both handles view the same registered list
    pub fn ptr_eq(&self, other: &NodeList) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for NodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeList")
            .field("root", &self.inner.root.index())
            .field("filter", &self.inner.filter)
            .finish()
    }
}
