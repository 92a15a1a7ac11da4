//! Qualified names and the fixed XML namespace rules

use crate::error::{DomError, DomResult};
use crate::node::NodeType;
use crate::store::DocumentData;
use crate::string::DomString;
use crate::validate::NameValidator;
use crate::NodeId;

/// Namespace bound to the `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace bound to the `xmlns` prefix
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// XHTML namespace
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Split `prefix:local` into its parts.
///
/// A name with no colon has no prefix. An empty prefix or local part, or a
/// second colon, is a namespace error.
pub fn split_qname(qname: &str) -> DomResult<(Option<&str>, &str)> {
    match qname.split_once(':') {
        None => Ok((None, qname)),
        Some((prefix, local)) => {
            if prefix.is_empty() || local.is_empty() || local.contains(':') {
                return Err(DomError::Namespace);
            }
            Ok((Some(prefix), local))
        }
    }
}

/// Check a qualified name against a namespace.
pub fn validate_qname(
    validator: &dyn NameValidator,
    qname: &str,
    namespace: Option<&str>,
) -> DomResult<()> {
    if !validator.is_valid_name(qname) {
        return Err(DomError::InvalidCharacter);
    }

    match split_qname(qname)? {
        (Some(prefix), local) => {
            if !validator.is_valid_ncname(prefix) || !validator.is_valid_ncname(local) {
                return Err(DomError::Namespace);
            }
            let Some(namespace) = namespace else {
                return Err(DomError::Namespace);
            };
            if prefix == "xml" && namespace != XML_NAMESPACE {
                return Err(DomError::Namespace);
            }
            if (prefix == "xmlns") != (namespace == XMLNS_NAMESPACE) {
                return Err(DomError::Namespace);
            }
        }
        (None, local) => {
            if (local == "xmlns") != (namespace == Some(XMLNS_NAMESPACE)) {
                return Err(DomError::Namespace);
            }
        }
    }

    Ok(())
}

/// Check a new prefix for an element or attribute with `namespace`.
pub(crate) fn validate_prefix(
    validator: &dyn NameValidator,
    prefix: &str,
    namespace: Option<&str>,
    is_attr: bool,
    qualified_name: &str,
) -> DomResult<()> {
    if !validator.is_valid_ncname(prefix) {
        return Err(DomError::InvalidCharacter);
    }
    let Some(namespace) = namespace else {
        return Err(DomError::Namespace);
    };
    if prefix == "xml" && namespace != XML_NAMESPACE {
        return Err(DomError::Namespace);
    }
    if is_attr && ((prefix == "xmlns" && namespace != XMLNS_NAMESPACE) || qualified_name == "xmlns") {
        return Err(DomError::Namespace);
    }
    Ok(())
}

impl DocumentData {
    /// Element that namespace lookups on `id` start from
    fn lookup_context(&self, id: NodeId) -> Option<NodeId> {
        match self.node_type(id) {
            NodeType::Element => Some(id),
            NodeType::Document => self.document_element(),
            NodeType::DocumentType | NodeType::DocumentFragment => None,
            NodeType::Attribute => self.node(id).parent,
            _ => self.parent_element(id),
        }
    }

    fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.node(id).parent;
        while let Some(ancestor) = current {
            if self.node_type(ancestor) == NodeType::Element {
                return Some(ancestor);
            }
            current = self.node(ancestor).parent;
        }
        None
    }

    /// Elements from the lookup context outwards
    fn scope_chain(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.lookup_context(id), |&el| self.parent_element(el))
    }

    /// Namespace declarations on `element`: declared prefix (`None` for the
    /// default namespace) and value
    fn declarations(&self, element: NodeId) -> Vec<(Option<DomString>, DomString)> {
        let Some(data) = self.node(element).as_element() else {
            return Vec::new();
        };
        data.attrs
            .ids()
            .filter_map(|attr| {
                let node = self.node(attr);
                let declared = if node.prefix.as_ref() == Some(&self.names.xmlns) {
                    Some(node.name.clone())
                } else if node.prefix.is_none() && node.name == self.names.xmlns {
                    None
                } else if node.prefix.is_none() {
                    Some(DomString::from(node.name.strip_prefix("xmlns:")?))
                } else {
                    return None;
                };
                Some((declared, self.attr_value(attr)))
            })
            .collect()
    }

    /// Namespace bound to `prefix` (`None` for the default namespace)
    pub(crate) fn lookup_namespace_uri(&self, id: NodeId, prefix: Option<&str>) -> Option<DomString> {
        let prefix = prefix.filter(|p| !p.is_empty());
        for element in self.scope_chain(id) {
            let node = self.node(element);
            if node.namespace.is_some() && node.prefix.as_deref() == prefix {
                return node.namespace.clone();
            }
            let declared = self
                .declarations(element)
                .into_iter()
                .find(|(declared, _)| declared.as_deref() == prefix);
            if let Some((_, value)) = declared {
                return (!value.is_empty()).then_some(value);
            }
        }
        None
    }

    /// A prefix bound to `namespace` that resolves back to it from `id`
    pub(crate) fn lookup_prefix(&self, id: NodeId, namespace: &str) -> Option<DomString> {
        for element in self.scope_chain(id) {
            let node = self.node(element);
            let mut candidates = Vec::new();
            if node.namespace.as_deref() == Some(namespace) {
                candidates.extend(node.prefix.clone());
            }
            candidates.extend(
                self.declarations(element)
                    .into_iter()
                    .filter(|(_, value)| value.as_str() == namespace)
                    .filter_map(|(declared, _)| declared),
            );
            let found = candidates.into_iter().find(|prefix| {
                self.lookup_namespace_uri(id, Some(prefix.as_str())).as_deref() == Some(namespace)
            });
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Whether `namespace` is the default namespace in scope at `id`
    pub(crate) fn is_default_namespace(&self, id: NodeId, namespace: Option<&str>) -> bool {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        for element in self.scope_chain(id) {
            let node = self.node(element);
            if node.prefix.is_none() {
                return node.namespace.as_deref() == namespace;
            }
            if let Some((_, value)) = self
                .declarations(element)
                .into_iter()
                .find(|(declared, _)| declared.is_none())
            {
                return Some(value.as_str()).filter(|v| !v.is_empty()) == namespace;
            }
        }
        false
    }
}
