//! Node handles
//!
//! A [`NodeRef`] is one counted reference to a node: cloning it adds a
//! reference and dropping it removes one. The last reference to a
//! parentless node frees it.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::handles::Document;
use crate::error::{DomError, DomResult};
use crate::implementation::DomImplementation;
use crate::named_node_map::{MapKind, NamedNodeMap};
use crate::namespace::validate_prefix;
use crate::node::{NodeData, NodeType};
use crate::node_list::{NodeList, NodeListFilter};
use crate::store::{DocumentCell, DocumentData};
use crate::string::DomString;
use crate::user_data::UserDataHandler;
use crate::NodeId;

/// Counted reference to a node
pub struct NodeRef {
    pub(crate) doc: Rc<DocumentCell>,
    pub(crate) id: NodeId,
}

impl NodeRef {
    /// New reference to `id`
    pub(crate) fn new(doc: Rc<DocumentCell>, id: NodeId) -> Self {
        doc.retain(id);
        Self { doc, id }
    }

    /// Wrap a reference already counted on the node
    pub(crate) fn adopt(doc: Rc<DocumentCell>, id: NodeId) -> Self {
        Self { doc, id }
    }

    /// Handle to another node of the same document
    pub(crate) fn sibling_handle(&self, id: NodeId) -> NodeRef {
        NodeRef::new(self.doc.clone(), id)
    }

    fn handle_opt(&self, id: Option<NodeId>) -> Option<NodeRef> {
        id.map(|id| self.sibling_handle(id))
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&DocumentData, NodeId) -> R) -> R {
        let id = self.id;
        self.doc.read(|d| f(d, id))
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut DocumentData, NodeId) -> R) -> R {
        let id = self.id;
        self.doc.write(|d| f(d, id))
    }

    pub(crate) fn same_document(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.doc, &other.doc)
    }

    pub(crate) fn check_document(&self, other: &NodeRef) -> DomResult<()> {
        if self.same_document(other) {
            Ok(())
        } else {
            Err(DomError::WrongDocument)
        }
    }

    /// Arena id of this node
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Number of handles currently referring to this node
    pub fn refcount(&self) -> u32 {
        self.read(|d, id| d.node(id).refcount)
    }

    /// Whether the node is parentless and waiting for its handles to drop
    pub fn is_pending(&self) -> bool {
        self.read(|d, id| d.is_pending(id))
    }

    pub fn node_type(&self) -> NodeType {
        self.read(|d, id| d.node_type(id))
    }

    pub fn node_name(&self) -> DomString {
        self.read(|d, id| d.node(id).node_name())
    }

    /// Value of Attr and character data nodes; `None` for the rest
    pub fn node_value(&self) -> Option<DomString> {
        self.read(|d, id| match d.node_type(id) {
            NodeType::Attribute => Some(d.attr_value(id)),
            NodeType::Text
            | NodeType::CdataSection
            | NodeType::Comment
            | NodeType::ProcessingInstruction => Some(d.char_data(id)),
            _ => None,
        })
    }

    /// Set the value; no effect on nodes without one
    pub fn set_node_value(&self, value: &str) -> DomResult<()> {
        let value = DomString::from(value);
        self.write(|d, id| match d.node_type(id) {
            NodeType::Attribute => d.set_attr_value(id, value),
            NodeType::Text
            | NodeType::CdataSection
            | NodeType::Comment
            | NodeType::ProcessingInstruction => d.set_char_data(id, value),
            _ => Ok(()),
        })
    }

    /// Parent in the child tree; attributes report none
    pub fn parent_node(&self) -> Option<NodeRef> {
        let parent = self.read(|d, id| match d.node_type(id) {
            NodeType::Attribute => None,
            _ => d.node(id).parent,
        });
        self.handle_opt(parent)
    }

    /// Live list of children
    pub fn child_nodes(&self) -> NodeList {
        NodeList::get_or_create(&self.doc, self.id, NodeListFilter::Children)
    }

    pub fn first_child(&self) -> Option<NodeRef> {
        let child = self.read(|d, id| d.node(id).first_child);
        self.handle_opt(child)
    }

    pub fn last_child(&self) -> Option<NodeRef> {
        let child = self.read(|d, id| d.node(id).last_child);
        self.handle_opt(child)
    }

    pub fn previous_sibling(&self) -> Option<NodeRef> {
        let sibling = self.read(|d, id| d.node(id).prev_sibling);
        self.handle_opt(sibling)
    }

    pub fn next_sibling(&self) -> Option<NodeRef> {
        let sibling = self.read(|d, id| d.node(id).next_sibling);
        self.handle_opt(sibling)
    }

    /// Attribute map of an element
    pub fn attributes(&self) -> Option<NamedNodeMap> {
        (self.node_type() == NodeType::Element)
            .then(|| NamedNodeMap::new(self.doc.clone(), self.id, MapKind::Attributes))
    }

    /// Owning document; `None` for a Document and once the owner is gone
    pub fn owner_document(&self) -> Option<Document> {
        let root = self.read(|d, id| (id != d.root && d.is_live()).then_some(d.root))?;
        Some(Document::from_node(self.sibling_handle(root)))
    }

    /// Insert `new_child` before `ref_child`, or append when `None`
    pub fn insert_before(&self, new_child: &NodeRef, ref_child: Option<&NodeRef>) -> DomResult<NodeRef> {
        self.check_document(new_child)?;
        if let Some(ref_child) = ref_child {
            if !self.same_document(ref_child) {
                return Err(DomError::NotFound);
            }
        }
        let ref_id = ref_child.map(|r| r.id);
        self.write(|d, id| d.insert_before(id, new_child.id, ref_id))?;
        Ok(new_child.clone())
    }

    pub fn append_child(&self, new_child: &NodeRef) -> DomResult<NodeRef> {
        self.insert_before(new_child, None)
    }

    /// Replace `old_child` with `new_child`, returning `old_child`
    pub fn replace_child(&self, new_child: &NodeRef, old_child: &NodeRef) -> DomResult<NodeRef> {
        self.check_document(new_child)?;
        if !self.same_document(old_child) {
            return Err(DomError::NotFound);
        }
        self.write(|d, id| d.replace_child(id, new_child.id, old_child.id))?;
        Ok(old_child.clone())
    }

    /// Detach `old_child`, returning it
    pub fn remove_child(&self, old_child: &NodeRef) -> DomResult<NodeRef> {
        if !self.same_document(old_child) {
            return Err(DomError::NotFound);
        }
        self.write(|d, id| d.remove_child(id, old_child.id))?;
        Ok(old_child.clone())
    }

    pub fn has_child_nodes(&self) -> bool {
        self.read(|d, id| d.node(id).first_child.is_some())
    }

    /// Merge adjacent text nodes and drop empty ones in this subtree
    pub fn normalize(&self) {
        self.write(|d, id| d.normalize(id));
    }

    pub fn is_supported(&self, feature: &str, version: &str) -> bool {
        DomImplementation.has_feature(feature, version)
    }

    pub fn namespace_uri(&self) -> Option<DomString> {
        self.read(|d, id| d.node(id).namespace.clone())
    }

    pub fn prefix(&self) -> Option<DomString> {
        self.read(|d, id| d.node(id).prefix.clone())
    }

    /// Change the prefix of an element or attribute; no effect on others
    pub fn set_prefix(&self, prefix: Option<&str>) -> DomResult<()> {
        self.write(|d, id| {
            let node_type = d.node_type(id);
            if !matches!(node_type, NodeType::Element | NodeType::Attribute) {
                return Ok(());
            }
            if d.is_readonly(id) {
                return Err(DomError::NoModificationAllowed);
            }
            let prefix = match prefix {
                Some(prefix) => {
                    let node = d.node(id);
                    validate_prefix(
                        d.validator.as_ref(),
                        prefix,
                        node.namespace.as_ref().map(|ns| ns.as_str()),
                        node_type == NodeType::Attribute,
                        node.qualified_name().as_str(),
                    )?;
                    Some(d.name(prefix))
                }
                None => None,
            };
            d.node_mut(id).prefix = prefix;
            d.touch();
            Ok(())
        })
    }

    /// Local part of an element or attribute name
    pub fn local_name(&self) -> Option<DomString> {
        self.read(|d, id| {
            let node = d.node(id);
            matches!(node.data, NodeData::Element(_) | NodeData::Attr(_)).then(|| node.name.clone())
        })
    }

    pub fn has_attributes(&self) -> bool {
        self.read(|d, id| d.node(id).as_element().is_some_and(|e| !e.attrs.is_empty()))
    }

    /// Base URI; the document URI, if any
    pub fn base_uri(&self) -> Option<DomString> {
        self.read(|d, _| d.config.document_uri.as_deref().map(DomString::from))
    }

    pub fn text_content(&self) -> Option<DomString> {
        self.read(|d, id| d.text_content(id))
    }

    /// Replace the content with a single text node (or the value, for
    /// nodes that hold one)
    pub fn set_text_content(&self, text: &str) -> DomResult<()> {
        let text = DomString::from(text);
        self.write(|d, id| d.set_text_content(id, &text))
    }

    /// Identity comparison
    pub fn is_same_node(&self, other: &NodeRef) -> bool {
        self.same_document(other) && self.id == other.id
    }

    pub fn lookup_prefix(&self, namespace: Option<&str>) -> Option<DomString> {
        let namespace = namespace.filter(|ns| !ns.is_empty())?;
        self.read(|d, id| d.lookup_prefix(id, namespace))
    }

    pub fn is_default_namespace(&self, namespace: Option<&str>) -> bool {
        self.read(|d, id| d.is_default_namespace(id, namespace))
    }

    pub fn lookup_namespace_uri(&self, prefix: Option<&str>) -> Option<DomString> {
        self.read(|d, id| d.lookup_namespace_uri(id, prefix))
    }

    /// Not provided
    pub fn get_feature(&self, _feature: &str, _version: &str) -> DomResult<Box<dyn Any>> {
        Err(DomError::NotSupported)
    }

    /// Attach a value under `key`, or remove it when `data` is `None`.
    /// Returns the previous value.
    pub fn set_user_data(
        &self,
        key: &str,
        data: Option<Rc<dyn Any>>,
        handler: Option<UserDataHandler>,
    ) -> Option<Rc<dyn Any>> {
        self.write(|d, id| d.node_mut(id).user_data.set(key, data, handler))
    }

    pub fn get_user_data(&self, key: &str) -> Option<Rc<dyn Any>> {
        self.read(|d, id| d.node(id).user_data.get(key))
    }
}

impl Clone for NodeRef {
    fn clone(&self) -> Self {
        NodeRef::new(self.doc.clone(), self.id)
    }
}

impl Drop for NodeRef {
    fn drop(&mut self) {
        self.doc.release(self.id);
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_node(other)
    }
}

impl Eq for NodeRef {}

impl Hash for NodeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.doc).hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("index", &self.id.index())
            .field("generation", &self.id.generation().value())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, NodeType};

    #[test]
    fn test_clone_and_drop_track_refcount() {
        let doc = Document::new().unwrap();
        let el = doc.create_element("div").unwrap();
        assert_eq!(el.refcount(), 1);

        let other = el.clone();
        assert_eq!(el.refcount(), 2);
        assert_eq!(other, el);

        drop(other);
        assert_eq!(el.refcount(), 1);
    }

    #[test]
    fn test_attr_has_no_parent_node() {
        let doc = Document::new().unwrap();
        let el = doc.create_element("div").unwrap();
        el.set_attribute("title", "x").unwrap();

        let attr = el.get_attribute_node("title").unwrap();
        assert_eq!(attr.node_type(), NodeType::Attribute);
        assert!(attr.parent_node().is_none());
        assert!(attr.owner_element().unwrap().is_same_node(&el));
    }

    #[test]
    fn test_set_prefix_rules() {
        let doc = Document::new().unwrap();
        let plain = doc.create_element("a").unwrap();
        assert!(plain.set_prefix(Some("p")).is_err());

        let el = doc.create_element_ns(Some("urn:x"), "p:a").unwrap();
        el.set_prefix(Some("q")).unwrap();
        assert_eq!(el.node_name(), "q:a");
        el.set_prefix(None).unwrap();
        assert_eq!(el.node_name(), "a");
    }

    #[test]
    fn test_owner_document() {
        let doc = Document::new().unwrap();
        let el = doc.create_element("a").unwrap();
        assert!(el.owner_document().unwrap().is_same_node(&doc));
        assert!(doc.owner_document().is_none());
    }
}
