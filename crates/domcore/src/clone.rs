//! Copying subtrees: clone, import, adopt, and structural equality
//!
//! A subtree is first read into an owned [`Snapshot`], then instantiated in
//! the target document. The two steps never hold both documents at once,
//! so the same code serves copies within a document and across documents.

use std::rc::Rc;

use crate::attributes::AttrKey;
use crate::error::{DomError, DomResult};
use crate::handles::Document;
use crate::node::{ElementData, Node, NodeData, NodeType};
use crate::node_ref::NodeRef;
use crate::store::{DocumentCell, DocumentData};
use crate::string::DomString;
use crate::user_data::{UserData, UserDataEntry, UserDataOperation};
use crate::NodeId;

/// Owned copy of a subtree
#[derive(Clone)]
pub(crate) struct Snapshot {
    source: NodeId,
    name: DomString,
    namespace: Option<DomString>,
    prefix: Option<DomString>,
    value: Option<DomString>,
    data: NodeData,
    attrs: Vec<Snapshot>,
    children: Vec<Snapshot>,
    user_data: UserData,
}

impl Snapshot {
    fn node_type(&self) -> NodeType {
        Node::new(self.data.clone(), DomString::default()).node_type()
    }

    /// String value used for equality: flattened attribute value, or the
    /// character data
    fn string_value(&self) -> Option<DomString> {
        match &self.data {
            NodeData::Attr(attr) if self.children.is_empty() => Some(attr.value.to_dom_string()),
            NodeData::Attr(_) => None,
            _ => self.value.clone(),
        }
    }

    /// DOM Level 3 `isEqualNode` over two snapshots
    fn equals(&self, other: &Snapshot) -> bool {
        if self.node_type() != other.node_type()
            || self.name != other.name
            || self.namespace != other.namespace
            || self.prefix != other.prefix
            || self.string_value() != other.string_value()
            || self.attrs.len() != other.attrs.len()
            || self.children.len() != other.children.len()
        {
            return false;
        }
        let attrs_equal = self.attrs.iter().all(|a| {
            other
                .attrs
                .iter()
                .find(|b| a.namespace == b.namespace && a.name == b.name)
                .is_some_and(|b| a.equals(b))
        });
        attrs_equal
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.equals(b))
    }

    fn set_specified(&mut self) {
        if let NodeData::Attr(attr) = &mut self.data {
            attr.specified = true;
        }
    }
}

/// A node created from a snapshot, with the handlers its source carried
pub(crate) struct Created {
    source: NodeId,
    copy: NodeId,
    handlers: Vec<(String, UserDataEntry)>,
}

impl DocumentData {
    /// Capture `id`, its attributes, and (when `deep`) its descendants.
    /// Attribute children are always captured.
    pub(crate) fn snapshot(&self, id: NodeId, deep: bool) -> Snapshot {
        let node = self.node(id);
        let attrs = node
            .as_element()
            .map(|e| e.attrs.ids().map(|attr| self.snapshot(attr, true)).collect())
            .unwrap_or_default();
        let deep = deep || node.node_type() == NodeType::Attribute;
        let children = if deep {
            self.children(id).map(|child| self.snapshot(child, true)).collect()
        } else {
            Vec::new()
        };
        let data = match &node.data {
            NodeData::Element(_) => NodeData::Element(ElementData::default()),
            other => other.clone(),
        };
        Snapshot {
            source: id,
            name: node.name.clone(),
            namespace: node.namespace.clone(),
            prefix: node.prefix.clone(),
            value: node.value.clone(),
            data,
            attrs,
            children,
            user_data: node.user_data.clone(),
        }
    }

    /// Snapshot for cloning or importing, applying the per-type rules
    fn copy_snapshot(&self, id: NodeId, deep: bool) -> DomResult<Snapshot> {
        let deep = match self.node_type(id) {
            NodeType::Document | NodeType::DocumentType => return Err(DomError::NotSupported),
            NodeType::Attribute => true,
            NodeType::EntityReference => false,
            _ => deep,
        };
        let mut snapshot = self.snapshot(id, deep);
        snapshot.set_specified();
        Ok(snapshot)
    }

    /// Build the snapshot as new nodes; the root gets one reference and is
    /// pending
    pub(crate) fn instantiate(
        &mut self,
        snapshot: &Snapshot,
        keep_user_data: bool,
    ) -> DomResult<(NodeId, Vec<Created>)> {
        let mut created = Vec::new();
        let root = self.build(snapshot, keep_user_data, &mut created)?;
        self.retain(root);
        self.mark_pending(root);
        Ok((root, created))
    }

    fn build(&mut self, snap: &Snapshot, keep_user_data: bool, created: &mut Vec<Created>) -> DomResult<NodeId> {
        let mut node = Node::new(snap.data.clone(), snap.name.clone())
            .with_namespace(snap.namespace.clone(), snap.prefix.clone());
        node.value = snap.value.clone();
        if keep_user_data {
            node.user_data = snap.user_data.clone();
        }
        let id = self.create_detached(node)?;

        for attr_snap in &snap.attrs {
            let attr = match self.build(attr_snap, keep_user_data, created) {
                Ok(attr) => attr,
                Err(err) => {
                    self.try_destroy(id);
                    return Err(err);
                }
            };
            let key = AttrKey::new(attr_snap.namespace.clone(), attr_snap.name.clone());
            let is_id = self.node(attr).as_attr().is_some_and(|a| a.is_id);
            self.node_mut(attr).parent = Some(id);
            if let Some(element) = self.node_mut(id).as_element_mut() {
                element.attrs.insert(key, attr);
                if is_id {
                    element.id_attr = Some(attr);
                }
            }
        }
        for child_snap in &snap.children {
            match self.build(child_snap, keep_user_data, created) {
                Ok(child) => self.link(id, child, None),
                Err(err) => {
                    self.try_destroy(id);
                    return Err(err);
                }
            }
        }

        let handlers = snap.user_data.with_handlers();
        if !handlers.is_empty() {
            created.push(Created {
                source: snap.source,
                copy: id,
                handlers,
            });
        }
        Ok(id)
    }
}

/// Handle to `id` if it still exists
fn live_handle(doc: &Rc<DocumentCell>, id: NodeId) -> Option<NodeRef> {
    doc.read(|d| d.arena.contains(id))
        .then(|| NodeRef::new(doc.clone(), id))
}

/// Tell source handlers about their copies
fn notify(op: UserDataOperation, created: Vec<Created>, from: &Rc<DocumentCell>, to: &Rc<DocumentCell>) {
    for Created { source, copy, handlers } in created {
        let src = live_handle(from, source);
        let dst = live_handle(to, copy);
        for (key, entry) in handlers {
            entry.notify(op, &key, src.as_ref(), dst.as_ref());
        }
    }
}

impl NodeRef {
    /// Copy this node (and its subtree when `deep`). Attributes are always
    /// copied deep; entity references never are.
    pub fn clone_node(&self, deep: bool) -> DomResult<NodeRef> {
        let snapshot = self.read(|d, id| d.copy_snapshot(id, deep))?;
        let (copy, created) = self.write(|d, _| d.instantiate(&snapshot, false))?;
        let copy = NodeRef::adopt(self.doc.clone(), copy);
        notify(UserDataOperation::Cloned, created, &self.doc, &self.doc);
        Ok(copy)
    }

    /// Structural equality
    pub fn is_equal_node(&self, other: &NodeRef) -> DomResult<bool> {
        let unsupported = |t: NodeType| matches!(t, NodeType::Document | NodeType::DocumentType);
        if unsupported(self.node_type()) || unsupported(other.node_type()) {
            return Err(DomError::NotSupported);
        }
        let a = self.read(|d, id| d.snapshot(id, true));
        let b = other.read(|d, id| d.snapshot(id, true));
        Ok(a.equals(&b))
    }
}

impl Document {
    /// Copy a node from any document into this one
    pub fn import_node(&self, node: &NodeRef, deep: bool) -> DomResult<NodeRef> {
        let snapshot = node.read(|d, id| d.copy_snapshot(id, deep))?;
        let (copy, created) = self.write(|d, _| d.instantiate(&snapshot, false))?;
        let copy = NodeRef::adopt(self.doc.clone(), copy);
        notify(UserDataOperation::Imported, created, &node.doc, &self.doc);
        Ok(copy)
    }

    /// Move a node into this document, detaching it from its parent or
    /// owner element. A node from another document is moved as a copy
    /// carrying its user data; the copy is returned.
    pub fn adopt_node(&self, node: &NodeRef) -> DomResult<NodeRef> {
        let writable = node.read(|d, id| {
            if matches!(d.node_type(id), NodeType::Document | NodeType::DocumentType) {
                return Err(DomError::NotSupported);
            }
            let parent_readonly = d.node(id).parent.is_some_and(|p| d.is_readonly(p));
            if d.is_readonly(id) || parent_readonly {
                return Err(DomError::NoModificationAllowed);
            }
            Ok(())
        });
        writable?;

        if self.same_document(node) {
            node.write(|d, id| detach_any(d, id));
            let handlers = node.read(|d, id| d.node(id).user_data.with_handlers());
            for (key, entry) in handlers {
                entry.notify(UserDataOperation::Adopted, &key, Some(node), None);
            }
            return Ok(node.clone());
        }

        let mut snapshot = node.read(|d, id| d.snapshot(id, true));
        snapshot.set_specified();
        let (copy, created) = self.write(|d, _| d.instantiate(&snapshot, true))?;
        let copy = NodeRef::adopt(self.doc.clone(), copy);
        node.write(|d, id| detach_any(d, id));
        notify(UserDataOperation::Adopted, created, &node.doc, &self.doc);
        Ok(copy)
    }
}

/// Cut a node loose from its parent or owner element
fn detach_any(d: &mut DocumentData, id: NodeId) {
    let parent = d.node(id).parent;
    match parent {
        Some(owner) if d.node_type(id) == NodeType::Attribute => d.detach_attr(owner, id),
        Some(_) => {
            d.unlink(id);
            d.try_destroy(id);
        }
        None => {}
    }
}
