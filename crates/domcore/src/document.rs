//! Document - node factories and document-wide queries
//!
//! A [`Document`] handle keeps the whole tree alive. Dropping the last one
//! tears the tree down; nodes still held elsewhere survive as pending nodes
//! until their own handles go.

use std::rc::Rc;

use crate::config::{DocumentConfig, QuirksMode};
use crate::doctype::DocumentTypeDecl;
use crate::element::normalize_ns;
use crate::error::{DomError, DomResult};
use crate::handles::{
    Attr, Comment, Document, DocumentFragment, DocumentType, Element, EntityReference,
    ProcessingInstruction, Text,
};
use crate::implementation::DomImplementation;
use crate::namespace::{split_qname, validate_qname, HTML_NAMESPACE};
use crate::node::{AttrData, DoctypeData, ElementData, Node, NodeData};
use crate::node_list::{NodeList, NodeListFilter};
use crate::node_ref::NodeRef;
use crate::store::{DocumentCell, DocumentData};
use crate::string::DomString;
use crate::validate::{NameValidator, XmlNameValidator};

impl Document {
    /// Empty XML document
    pub fn new() -> DomResult<Document> {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> DomResult<Document> {
        Self::with_validator(config, Rc::new(XmlNameValidator))
    }

    /// Document whose factories check names with `validator`
    pub fn with_validator(config: DocumentConfig, validator: Rc<dyn NameValidator>) -> DomResult<Document> {
        let kind = config.kind;
        let doc = DocumentCell::new(config, validator)?;
        let root = doc.read(|d| d.root);
        tracing::debug!("created {:?} document", kind);
        Ok(Document::from_node(NodeRef::new(doc, root)))
    }

    /// Allocate a node built by `build`; the caller gets its only reference
    fn create_node(&self, build: impl FnOnce(&DocumentData) -> DomResult<Node>) -> DomResult<NodeRef> {
        let id = self.write(|d, _| {
            let node = build(d)?;
            d.create(node)
        })?;
        Ok(NodeRef::adopt(self.doc.clone(), id))
    }

    fn check_name(d: &DocumentData, name: &str) -> DomResult<()> {
        if d.validator.is_valid_name(name) {
            Ok(())
        } else {
            Err(DomError::InvalidCharacter)
        }
    }

    fn check_xml_only(d: &DocumentData) -> DomResult<()> {
        if d.is_html() {
            Err(DomError::NotSupported)
        } else {
            Ok(())
        }
    }

    /// Element without a prefix; HTML documents put it in the XHTML
    /// namespace
    pub fn create_element(&self, tag_name: &str) -> DomResult<Element> {
        let node = self.create_node(|d| {
            Self::check_name(d, tag_name)?;
            let namespace = d.is_html().then(|| DomString::interned(HTML_NAMESPACE));
            Ok(Node::new(NodeData::Element(ElementData::default()), d.name(tag_name))
                .with_namespace(namespace, None))
        })?;
        Ok(Element::from_node(node))
    }

    pub fn create_element_ns(&self, namespace: Option<&str>, qualified_name: &str) -> DomResult<Element> {
        let node = self.create_node(|d| {
            let namespace = normalize_ns(namespace);
            validate_qname(d.validator.as_ref(), qualified_name, namespace)?;
            let (prefix, local) = split_qname(qualified_name)?;
            Ok(Node::new(NodeData::Element(ElementData::default()), d.name(local))
                .with_namespace(namespace.map(DomString::from), prefix.map(|p| d.name(p))))
        })?;
        Ok(Element::from_node(node))
    }

    pub fn create_document_fragment(&self) -> DomResult<DocumentFragment> {
        let node = self.create_node(|_| Ok(Node::new(NodeData::DocumentFragment, DomString::default())))?;
        Ok(DocumentFragment::from_node(node))
    }

    pub fn create_text_node(&self, data: &str) -> DomResult<Text> {
        self.create_char_data(NodeData::Text { element_content_whitespace: false }, data)
            .map(Text::from_node)
    }

    pub fn create_comment(&self, data: &str) -> DomResult<Comment> {
        self.create_char_data(NodeData::Comment, data).map(Comment::from_node)
    }

    pub fn create_cdata_section(&self, data: &str) -> DomResult<Text> {
        let node = self.create_node(|d| {
            Self::check_xml_only(d)?;
            Ok(Node::new(NodeData::CdataSection, DomString::default()).with_value(DomString::from(data)))
        })?;
        Ok(Text::from_node(node))
    }

    fn create_char_data(&self, data: NodeData, value: &str) -> DomResult<NodeRef> {
        self.create_node(|_| Ok(Node::new(data, DomString::default()).with_value(DomString::from(value))))
    }

    pub fn create_processing_instruction(&self, target: &str, data: &str) -> DomResult<ProcessingInstruction> {
        let node = self.create_node(|d| {
            Self::check_xml_only(d)?;
            Self::check_name(d, target)?;
            Ok(Node::new(NodeData::ProcessingInstruction, d.name(target)).with_value(DomString::from(data)))
        })?;
        Ok(ProcessingInstruction::from_node(node))
    }

    /// Unowned attribute with an empty value
    pub fn create_attribute(&self, name: &str) -> DomResult<Attr> {
        let node = self.create_node(|d| {
            Self::check_name(d, name)?;
            Ok(Node::new(NodeData::Attr(AttrData::default()), d.name(name)))
        })?;
        Ok(Attr::from_node(node))
    }

    pub fn create_attribute_ns(&self, namespace: Option<&str>, qualified_name: &str) -> DomResult<Attr> {
        let node = self.create_node(|d| {
            let namespace = normalize_ns(namespace);
            validate_qname(d.validator.as_ref(), qualified_name, namespace)?;
            let (prefix, local) = split_qname(qualified_name)?;
            Ok(Node::new(NodeData::Attr(AttrData::default()), d.name(local))
                .with_namespace(namespace.map(DomString::from), prefix.map(|p| d.name(p))))
        })?;
        Ok(Attr::from_node(node))
    }

    pub fn create_entity_reference(&self, name: &str) -> DomResult<EntityReference> {
        let node = self.create_node(|d| {
            Self::check_xml_only(d)?;
            Self::check_name(d, name)?;
            Ok(Node::new(NodeData::EntityReference, d.name(name)))
        })?;
        Ok(EntityReference::from_node(node))
    }

    /// Materialise a declaration as a node of this document
    pub fn create_document_type(&self, decl: &DocumentTypeDecl) -> DomResult<DocumentType> {
        let node = self.create_node(|_| {
            let data = DoctypeData {
                public_id: decl.public_id.clone(),
                system_id: decl.system_id.clone(),
                internal_subset: None,
            };
            Ok(Node::new(NodeData::DocumentType(data), decl.qualified_name.clone()))
        })?;
        Ok(DocumentType::from_node(node))
    }

    pub fn doctype(&self) -> Option<DocumentType> {
        let id = self.read(|d, _| d.doctype())?;
        Some(DocumentType::from_node(self.sibling_handle(id)))
    }

    pub fn document_element(&self) -> Option<Element> {
        let id = self.read(|d, _| d.document_element())?;
        Some(Element::from_node(self.sibling_handle(id)))
    }

    pub fn implementation(&self) -> DomImplementation {
        DomImplementation
    }

    /// Live list of all elements named `name` (`*` for all)
    pub fn get_elements_by_tag_name(&self, name: &str) -> NodeList {
        let filter = self.read(|d, _| NodeListFilter::by_name(d, name));
        NodeList::get_or_create(&self.doc, self.id, filter)
    }

    pub fn get_elements_by_tag_name_ns(&self, namespace: Option<&str>, local: &str) -> NodeList {
        NodeList::get_or_create(&self.doc, self.id, NodeListFilter::by_namespace(namespace, local))
    }

    /// First element in document order carrying `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        let found = self.read(|d, _| d.element_by_id(id))?;
        Some(Element::from_node(self.sibling_handle(found)))
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        self.read(|d, _| d.config.quirks_mode)
    }

    pub fn set_quirks_mode(&self, mode: QuirksMode) {
        self.write(|d, _| d.config.quirks_mode = mode);
    }

    pub fn input_encoding(&self) -> Option<DomString> {
        self.read(|d, _| d.config.input_encoding.as_deref().map(DomString::from))
    }

    /// Encoding from an XML declaration; documents are never parsed here
    pub fn xml_encoding(&self) -> Option<DomString> {
        None
    }

    pub fn document_uri(&self) -> Option<DomString> {
        self.read(|d, _| d.config.document_uri.as_deref().map(DomString::from))
    }

    pub fn set_document_uri(&self, uri: Option<&str>) {
        self.write(|d, _| d.config.document_uri = uri.map(str::to_string));
    }

    /// Copy of the settings this document was created with
    pub fn config(&self) -> DocumentConfig {
        self.read(|d, _| d.config.clone())
    }

    /// Nodes that are parentless but still referenced
    pub fn pending_len(&self) -> usize {
        self.read(|d, _| d.pending.len())
    }

    /// Node lists currently alive
    pub fn live_list_count(&self) -> usize {
        self.read(|d, _| d.lists.iter().filter(|l| l.strong_count() > 0).count())
    }

    /// Nodes allocated, the Document node included
    pub fn node_count(&self) -> usize {
        self.read(|d, _| d.arena.len())
    }

    pub fn xml_standalone(&self) -> DomResult<bool> {
        Err(DomError::NotSupported)
    }

    pub fn set_xml_standalone(&self, _standalone: bool) -> DomResult<()> {
        Err(DomError::NotSupported)
    }

    pub fn xml_version(&self) -> DomResult<DomString> {
        Err(DomError::NotSupported)
    }

    pub fn set_xml_version(&self, _version: &str) -> DomResult<()> {
        Err(DomError::NotSupported)
    }

    pub fn strict_error_checking(&self) -> DomResult<bool> {
        Err(DomError::NotSupported)
    }

    pub fn set_strict_error_checking(&self, _strict: bool) -> DomResult<()> {
        Err(DomError::NotSupported)
    }

    pub fn dom_config(&self) -> DomResult<()> {
        Err(DomError::NotSupported)
    }

    pub fn normalize_document(&self) -> DomResult<()> {
        Err(DomError::NotSupported)
    }

    pub fn rename_node(&self, _node: &NodeRef, _namespace: Option<&str>, _qualified_name: &str) -> DomResult<NodeRef> {
        Err(DomError::NotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeType;

    #[test]
    fn test_factories() {
        let doc = Document::new().unwrap();
        assert_eq!(doc.node_type(), NodeType::Document);
        assert_eq!(doc.node_name(), "#document");

        let el = doc.create_element("div").unwrap();
        assert_eq!(el.node_type(), NodeType::Element);
        assert!(el.namespace_uri().is_none());
        assert!(el.is_pending());

        let text = doc.create_text_node("hello").unwrap();
        assert_eq!(text.node_value().unwrap(), "hello");
        let comment = doc.create_comment("note").unwrap();
        assert_eq!(comment.node_name(), "#comment");
        let cdata = doc.create_cdata_section("<raw>").unwrap();
        assert_eq!(cdata.node_type(), NodeType::CdataSection);
        let fragment = doc.create_document_fragment().unwrap();
        assert_eq!(fragment.node_name(), "#document-fragment");
        let entity = doc.create_entity_reference("nbsp").unwrap();
        assert_eq!(entity.node_name(), "nbsp");

        assert_eq!(doc.pending_len(), 6);
        assert_eq!(doc.node_count(), 7);
    }

    #[test]
    fn test_invalid_names() {
        let doc = Document::new().unwrap();
        assert_eq!(doc.create_element("1div").unwrap_err(), DomError::InvalidCharacter);
        assert_eq!(doc.create_attribute("a b").unwrap_err(), DomError::InvalidCharacter);
        assert_eq!(doc.create_element_ns(None, "p:a").unwrap_err(), DomError::Namespace);
        assert_eq!(
            doc.create_attribute_ns(Some("urn:x"), "xml:lang").unwrap_err(),
            DomError::Namespace
        );
        assert_eq!(doc.pending_len(), 0);
    }

    #[test]
    fn test_html_document() {
        let doc = Document::with_config(DocumentConfig::html()).unwrap();
        let el = doc.create_element("p").unwrap();
        assert_eq!(el.namespace_uri().unwrap(), HTML_NAMESPACE);
        assert_eq!(doc.create_cdata_section("x").unwrap_err(), DomError::NotSupported);
        assert_eq!(doc.create_entity_reference("x").unwrap_err(), DomError::NotSupported);
    }

    #[test]
    fn test_element_by_id() {
        let doc = Document::new().unwrap();
        let root = doc.create_element("root").unwrap();
        doc.append_child(&root).unwrap();
        let item = doc.create_element("item").unwrap();
        item.set_attribute("id", "main").unwrap();
        root.append_child(&item).unwrap();

        assert!(doc.get_element_by_id("main").unwrap().is_same_node(&item));
        assert!(doc.get_element_by_id("other").is_none());
        assert!(doc.document_element().unwrap().is_same_node(&root));
    }

    #[test]
    fn test_settings() {
        let config = DocumentConfig {
            input_encoding: Some("UTF-8".to_string()),
            ..DocumentConfig::default()
        };
        let doc = Document::with_config(config).unwrap();
        assert_eq!(doc.input_encoding().unwrap(), "UTF-8");
        assert!(doc.xml_encoding().is_none());

        doc.set_document_uri(Some("file:///a.xml"));
        assert_eq!(doc.document_uri().unwrap(), "file:///a.xml");
        assert_eq!(doc.base_uri().unwrap(), "file:///a.xml");

        doc.set_quirks_mode(QuirksMode::FullQuirks);
        assert_eq!(doc.quirks_mode(), QuirksMode::FullQuirks);
        assert_eq!(doc.config().quirks_mode, QuirksMode::FullQuirks);
        assert_eq!(doc.xml_version().unwrap_err(), DomError::NotSupported);
        assert_eq!(doc.normalize_document().unwrap_err(), DomError::NotSupported);
        let el = doc.create_element("el").unwrap();
        assert_eq!(doc.rename_node(&el, None, "other").unwrap_err(), DomError::NotSupported);
    }

    #[test]
    fn test_dropping_document_keeps_held_nodes() {
        let doc = Document::new().unwrap();
        let root = doc.create_element("root").unwrap();
        doc.append_child(&root).unwrap();
        let kept = doc.create_element("kept").unwrap();
        root.append_child(&kept).unwrap();

        drop(root);
        drop(doc);
        assert!(kept.is_pending());
        assert!(kept.owner_document().is_none());
        assert!(kept.parent_node().is_none());
    }
}
