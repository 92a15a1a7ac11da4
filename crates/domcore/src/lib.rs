//! domcore - DOM Core document tree
//!
//! In-memory W3C DOM Core tree: reference-counted node handles over an
//! arena, live node lists and attribute maps, and interned strings.
//!
//! ```
//! use domcore::Document;
//!
//! let doc = Document::new().unwrap();
//! let root = doc.create_element("root").unwrap();
//! doc.append_child(&root).unwrap();
//! root.set_attribute("class", "a b").unwrap();
//! assert!(root.has_class("b"));
//! ```

mod arena;
mod attr;
mod attributes;
mod character_data;
mod clone;
mod config;
mod doctype;
mod document;
mod element;
mod error;
mod generation;
mod handles;
mod implementation;
mod interner;
mod lifecycle;
mod named_node_map;
mod namespace;
mod node;
mod node_list;
mod node_ref;
mod position;
mod processing_instruction;
mod store;
mod string;
mod tree;
mod user_data;
mod validate;

pub use arena::NodeId;
pub use config::{DocumentConfig, DocumentKind, QuirksMode};
pub use doctype::DocumentTypeDecl;
pub use error::{DomError, DomResult};
pub use generation::Generation;
pub use handles::{
    Attr, CharacterData, Comment, Document, DocumentFragment, DocumentType, Element,
    EntityReference, ProcessingInstruction, Text,
};
pub use implementation::DomImplementation;
pub use interner::InternPool;
pub use named_node_map::NamedNodeMap;
pub use namespace::{split_qname, validate_qname, HTML_NAMESPACE, XMLNS_NAMESPACE, XML_NAMESPACE};
pub use node::{AttrValue, NodeType};
pub use node_list::NodeList;
pub use node_ref::NodeRef;
pub use position::DocumentPosition;
pub use string::{CharsetCodec, DomString, Utf8Codec};
pub use user_data::{UserDataHandler, UserDataOperation};
pub use validate::{NameValidator, XmlNameValidator};
