//! Document configuration

use serde::{Deserialize, Serialize};

/// Markup flavour of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Xml,
    /// Tag names match ASCII case-insensitively; CDATA sections, processing
    /// instructions and entity references cannot be created
    Html,
}

/// Rendering quirks mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuirksMode {
    #[default]
    NoQuirks,
    LimitedQuirks,
    /// Class names compare ASCII case-insensitively
    FullQuirks,
}

/// Per-document settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub kind: DocumentKind,
    pub quirks_mode: QuirksMode,
    /// Route element and attribute names through the global intern pool
    pub intern_names: bool,
    /// Attribute consulted by `get_element_by_id` when an element has no
    /// explicitly marked ID attribute
    pub id_attribute_name: String,
    pub document_uri: Option<String>,
    pub input_encoding: Option<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            kind: DocumentKind::Xml,
            quirks_mode: QuirksMode::NoQuirks,
            intern_names: true,
            id_attribute_name: "id".to_string(),
            document_uri: None,
            input_encoding: None,
        }
    }
}

impl DocumentConfig {
    /// Defaults for an HTML document
    pub fn html() -> Self {
        Self {
            kind: DocumentKind::Html,
            ..Self::default()
        }
    }

    pub fn is_html(&self) -> bool {
        self.kind == DocumentKind::Html
    }
}
