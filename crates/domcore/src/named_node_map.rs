//! Named node maps
//!
//! Views over an element's attributes, or over a document type's entities
//! and notations (always empty and read-only here). Indices are 0-based in
//! attribute insertion order.

use std::fmt;
use std::rc::Rc;

use crate::error::{DomError, DomResult};
use crate::node_ref::NodeRef;
use crate::store::{DocumentCell, DocumentData};
use crate::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MapKind {
    Attributes,
    Entities,
    Notations,
}

/// Live name-keyed view
pub struct NamedNodeMap {
    doc: Rc<DocumentCell>,
    /// Not counted
    owner: NodeId,
    kind: MapKind,
}

impl NamedNodeMap {
    pub(crate) fn new(doc: Rc<DocumentCell>, owner: NodeId, kind: MapKind) -> Self {
        Self { doc, owner, kind }
    }

    fn read<R>(&self, f: impl FnOnce(&DocumentData) -> Option<R>) -> Option<R> {
        if self.kind != MapKind::Attributes {
            return None;
        }
        self.doc.read(|d| if d.arena.contains(self.owner) { f(d) } else { None })
    }

    fn handle(&self, id: Option<NodeId>) -> Option<NodeRef> {
        id.map(|id| NodeRef::new(self.doc.clone(), id))
    }

    pub fn length(&self) -> usize {
        self.read(|d| d.node(self.owner).as_element().map(|e| e.attrs.len()))
            .unwrap_or(0)
    }

    pub fn item(&self, index: usize) -> Option<NodeRef> {
        let id = self.read(|d| d.node(self.owner).as_element()?.attrs.get_index(index));
        self.handle(id)
    }

    pub fn get_named_item(&self, name: &str) -> Option<NodeRef> {
        let id = self.read(|d| d.find_attr(self.owner, name));
        self.handle(id)
    }

    pub fn get_named_item_ns(&self, namespace: Option<&str>, local: &str) -> Option<NodeRef> {
        let id = self.read(|d| d.find_attr_ns(self.owner, namespace, local));
        self.handle(id)
    }

    fn set(&self, node: &NodeRef, by_ns: bool) -> DomResult<Option<NodeRef>> {
        if self.kind != MapKind::Attributes {
            return Err(DomError::NoModificationAllowed);
        }
        if !Rc::ptr_eq(&self.doc, &node.doc) {
            return Err(DomError::WrongDocument);
        }
        let owner = self.owner;
        let old = self.doc.write(|d| {
            if !d.arena.contains(owner) {
                return Err(DomError::NotFound);
            }
            d.set_attribute_node(owner, node.id, by_ns)
        })?;
        Ok(old.map(|id| NodeRef::adopt(self.doc.clone(), id)))
    }

    /// Add an attribute, returning the one it displaced
    pub fn set_named_item(&self, node: &NodeRef) -> DomResult<Option<NodeRef>> {
        self.set(node, false)
    }

    pub fn set_named_item_ns(&self, node: &NodeRef) -> DomResult<Option<NodeRef>> {
        self.set(node, true)
    }

    fn remove(&self, find: impl FnOnce(&DocumentData) -> Option<NodeId>) -> DomResult<NodeRef> {
        if self.kind != MapKind::Attributes {
            return Err(DomError::NoModificationAllowed);
        }
        let owner = self.owner;
        let id = self.doc.write(|d| {
            if !d.arena.contains(owner) {
                return Err(DomError::NotFound);
            }
            let attr = find(d).ok_or(DomError::NotFound)?;
            d.retain(attr);
            match d.remove_attribute_node(owner, attr) {
                Ok(()) => Ok(attr),
                Err(err) => {
                    d.release(attr);
                    Err(err)
                }
            }
        })?;
        Ok(NodeRef::adopt(self.doc.clone(), id))
    }

    /// Remove by qualified name, returning the removed attribute
    pub fn remove_named_item(&self, name: &str) -> DomResult<NodeRef> {
        let owner = self.owner;
        self.remove(|d| d.find_attr(owner, name))
    }

    pub fn remove_named_item_ns(&self, namespace: Option<&str>, local: &str) -> DomResult<NodeRef> {
        let owner = self.owner;
        self.remove(|d| d.find_attr_ns(owner, namespace, local))
    }
}

impl fmt::Debug for NamedNodeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedNodeMap")
            .field("owner", &self.owner.index())
            .field("kind", &self.kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, DomError};

    #[test]
    fn test_attribute_map_view() {
        let doc = Document::new().unwrap();
        let el = doc.create_element("img").unwrap();
        el.set_attribute("src", "a.png").unwrap();
        el.set_attribute("alt", "A").unwrap();

        let map = el.attributes().unwrap();
        assert_eq!(map.length(), 2);
        assert_eq!(map.item(0).unwrap().node_name(), "src");
        assert_eq!(map.item(1).unwrap().node_name(), "alt");
        assert!(map.item(2).is_none());
        assert_eq!(map.get_named_item("alt").unwrap().node_value().unwrap(), "A");

        el.set_attribute("width", "10").unwrap();
        assert_eq!(map.length(), 3);
    }

    #[test]
    fn test_set_and_remove_named_item() {
        let doc = Document::new().unwrap();
        let el = doc.create_element("img").unwrap();
        let map = el.attributes().unwrap();

        let attr = doc.create_attribute("src").unwrap();
        attr.set_value("b.png").unwrap();
        assert!(map.set_named_item(&attr).unwrap().is_none());
        assert_eq!(el.get_attribute("src").unwrap(), "b.png");

        let removed = map.remove_named_item("src").unwrap();
        assert!(removed.is_same_node(&attr));
        assert!(attr.owner_element().is_none());
        assert!(attr.is_pending());
        assert_eq!(map.remove_named_item("src").unwrap_err(), DomError::NotFound);
    }

    #[test]
    fn test_doctype_maps_are_empty() {
        let doc = Document::new().unwrap();
        let decl = crate::DomImplementation.create_document_type("html", "", "").unwrap();
        let doctype = doc.create_document_type(&decl).unwrap();
        assert_eq!(doctype.entities().length(), 0);
        assert_eq!(doctype.notations().length(), 0);
        assert_eq!(
            doctype.notations().set_named_item(&doc.create_attribute("x").unwrap()).unwrap_err(),
            DomError::NoModificationAllowed
        );
    }
}
