//! DOM implementation object

use crate::config::DocumentConfig;
use crate::doctype::DocumentTypeDecl;
use crate::element::normalize_ns;
use crate::error::{DomError, DomResult};
use crate::handles::Document;
use crate::namespace::validate_qname;
use crate::string::DomString;
use crate::validate::{NameValidator, XmlNameValidator};

/// Features reported by `has_feature`
const FEATURES: &[&str] = &["core", "xml"];
const VERSIONS: &[&str] = &["", "1.0", "2.0", "3.0"];

/// Entry point for creating documents and document types
#[derive(Debug, Clone, Copy, Default)]
pub struct DomImplementation;

impl DomImplementation {
    /// Whether `feature` at `version` is supported (ASCII case-insensitive;
    /// a leading `+` is ignored)
    pub fn has_feature(&self, feature: &str, version: &str) -> bool {
        let feature = feature.strip_prefix('+').unwrap_or(feature);
        FEATURES.iter().any(|f| f.eq_ignore_ascii_case(feature)) && VERSIONS.contains(&version)
    }

    /// Validate a document type declaration
    pub fn create_document_type(
        &self,
        qualified_name: &str,
        public_id: &str,
        system_id: &str,
    ) -> DomResult<DocumentTypeDecl> {
        self.create_document_type_with(&XmlNameValidator, qualified_name, public_id, system_id)
    }

    /// As [`create_document_type`](Self::create_document_type), with a
    /// caller-supplied name validator
    pub fn create_document_type_with(
        &self,
        validator: &dyn NameValidator,
        qualified_name: &str,
        public_id: &str,
        system_id: &str,
    ) -> DomResult<DocumentTypeDecl> {
        if !validator.is_valid_name(qualified_name) {
            return Err(DomError::InvalidCharacter);
        }
        crate::namespace::split_qname(qualified_name)?;
        Ok(DocumentTypeDecl {
            qualified_name: DomString::interned(qualified_name),
            public_id: DomString::from(public_id),
            system_id: DomString::from(system_id),
        })
    }

    /// Create a document, optionally with a document type and a root
    /// element named `qualified_name` in `namespace`
    pub fn create_document(
        &self,
        namespace: Option<&str>,
        qualified_name: Option<&str>,
        doctype: Option<&DocumentTypeDecl>,
        config: DocumentConfig,
    ) -> DomResult<Document> {
        let namespace = normalize_ns(namespace);
        match qualified_name.filter(|q| !q.is_empty()) {
            Some(qname) => validate_qname(&XmlNameValidator, qname, namespace)?,
            None if namespace.is_some() => return Err(DomError::Namespace),
            None => {}
        }

        let doc = Document::with_config(config)?;
        if let Some(decl) = doctype {
            let node = doc.create_document_type(decl)?;
            doc.append_child(&node)?;
        }
        if let Some(qname) = qualified_name.filter(|q| !q.is_empty()) {
            let root = doc.create_element_ns(namespace, qname)?;
            doc.append_child(&root)?;
        }
        Ok(doc)
    }
}
