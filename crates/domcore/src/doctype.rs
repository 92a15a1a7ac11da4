//! Document type declarations
//!
//! [`DocumentTypeDecl`] is a validated declaration not yet owned by any
//! document; `Document::create_document_type` turns it into a node.

use crate::handles::DocumentType;
use crate::named_node_map::{MapKind, NamedNodeMap};
use crate::node::NodeData;
use crate::string::DomString;

/// Unowned document type declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTypeDecl {
    pub(crate) qualified_name: DomString,
    pub(crate) public_id: DomString,
    pub(crate) system_id: DomString,
}

impl DocumentTypeDecl {
    pub fn name(&self) -> &DomString {
        &self.qualified_name
    }

    pub fn public_id(&self) -> &DomString {
        &self.public_id
    }

    pub fn system_id(&self) -> &DomString {
        &self.system_id
    }
}

impl DocumentType {
    pub fn name(&self) -> DomString {
        self.node_name()
    }

    fn field(&self, f: impl FnOnce(&crate::node::DoctypeData) -> Option<DomString>) -> Option<DomString> {
        self.read(|d, id| match &d.node(id).data {
            NodeData::DocumentType(data) => f(data),
            _ => None,
        })
    }

    pub fn public_id(&self) -> DomString {
        self.field(|data| Some(data.public_id.clone())).unwrap_or_default()
    }

    pub fn system_id(&self) -> DomString {
        self.field(|data| Some(data.system_id.clone())).unwrap_or_default()
    }

    pub fn internal_subset(&self) -> Option<DomString> {
        self.field(|data| data.internal_subset.clone())
    }

    /// Declared general entities (not modelled; always empty)
    pub fn entities(&self) -> NamedNodeMap {
        NamedNodeMap::new(self.doc.clone(), self.id, MapKind::Entities)
    }

    /// Declared notations (not modelled; always empty)
    pub fn notations(&self) -> NamedNodeMap {
        NamedNodeMap::new(self.doc.clone(), self.id, MapKind::Notations)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, DomImplementation, NodeType};

    #[test]
    fn test_materialised_doctype() {
        let decl = DomImplementation
            .create_document_type("svg", "-//W3C//DTD SVG 1.1//EN", "svg11.dtd")
            .unwrap();
        assert_eq!(decl.name(), "svg");

        let doc = Document::new().unwrap();
        let doctype = doc.create_document_type(&decl).unwrap();
        assert_eq!(doctype.node_type(), NodeType::DocumentType);
        assert_eq!(doctype.name(), "svg");
        assert_eq!(doctype.public_id(), "-//W3C//DTD SVG 1.1//EN");
        assert_eq!(doctype.system_id(), "svg11.dtd");
        assert!(doctype.internal_subset().is_none());

        doc.append_child(&doctype).unwrap();
        assert!(doc.doctype().unwrap().is_same_node(&doctype));
    }
}
