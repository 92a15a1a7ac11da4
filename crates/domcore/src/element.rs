//! Element attributes and queries
//!
//! Attribute get/set/remove by name, by (namespace, local name) and by node,
//! ID marking, and the lazily split `class` token list.

use crate::attributes::{split_class_tokens, AttrKey};
use crate::config::QuirksMode;
use crate::error::{DomError, DomResult};
use crate::handles::{Attr, Element};
use crate::namespace::{split_qname, validate_qname};
use crate::node::{AttrData, AttrValue, Node, NodeData, NodeType};
use crate::node_list::{NodeList, NodeListFilter};
use crate::store::DocumentData;
use crate::string::DomString;
use crate::NodeId;

/// Empty namespace strings mean "no namespace"
pub(crate) fn normalize_ns(namespace: Option<&str>) -> Option<&str> {
    namespace.filter(|ns| !ns.is_empty())
}

impl DocumentData {
    /// Attribute by qualified name (linear scan)
    pub(crate) fn find_attr(&self, element: NodeId, qname: &str) -> Option<NodeId> {
        let data = self.node(element).as_element()?;
        data.attrs
            .find(|attr| self.node(attr).qualified_name().as_str() == qname)
    }

    /// Attribute by (namespace, local name)
    pub(crate) fn find_attr_ns(&self, element: NodeId, namespace: Option<&str>, local: &str) -> Option<NodeId> {
        let data = self.node(element).as_element()?;
        let key = AttrKey::new(normalize_ns(namespace).map(DomString::from), DomString::from(local));
        data.attrs.get(&key)
    }

    fn attr_key(&self, attr: NodeId) -> AttrKey {
        let node = self.node(attr);
        AttrKey::new(node.namespace.clone(), node.name.clone())
    }

    fn is_class_key(&self, key: &AttrKey) -> bool {
        key.namespace.is_none() && key.local_name == self.names.class
    }

    fn invalidate_classes(&mut self, element: NodeId) {
        if let Some(data) = self.node_mut(element).as_element_mut() {
            data.classes = None;
        }
    }

    fn check_element_writable(&self, element: NodeId) -> DomResult<()> {
        if self.node(element).as_element().is_none() {
            return Err(DomError::NotSupported);
        }
        if self.is_readonly(element) {
            return Err(DomError::NoModificationAllowed);
        }
        Ok(())
    }

    /// Attach a fresh attribute node to `element`
    fn add_attr(
        &mut self,
        element: NodeId,
        namespace: Option<DomString>,
        prefix: Option<DomString>,
        local: DomString,
        value: DomString,
    ) -> DomResult<NodeId> {
        let key = AttrKey::new(namespace.clone(), local.clone());
        let data = AttrData {
            value: AttrValue::String(value),
            ..AttrData::default()
        };
        let node = Node::new(NodeData::Attr(data), local).with_namespace(namespace, prefix);
        let attr = self.create_detached(node)?;
        self.node_mut(attr).parent = Some(element);
        if self.is_class_key(&key) {
            self.invalidate_classes(element);
        }
        if let Some(data) = self.node_mut(element).as_element_mut() {
            data.attrs.insert(key, attr);
        }
        self.touch();
        Ok(attr)
    }

    pub(crate) fn set_attribute(&mut self, element: NodeId, name: &str, value: DomString) -> DomResult<()> {
        if !self.validator.is_valid_name(name) {
            return Err(DomError::InvalidCharacter);
        }
        self.check_element_writable(element)?;
        match self.find_attr(element, name) {
            Some(attr) => self.set_attr_value(attr, value),
            None => {
                let local = self.name(name);
                self.add_attr(element, None, None, local, value).map(|_| ())
            }
        }
    }

    pub(crate) fn set_attribute_ns(
        &mut self,
        element: NodeId,
        namespace: Option<&str>,
        qname: &str,
        value: DomString,
    ) -> DomResult<()> {
        let namespace = normalize_ns(namespace);
        validate_qname(self.validator.as_ref(), qname, namespace)?;
        self.check_element_writable(element)?;
        let (prefix, local) = split_qname(qname)?;
        let prefix = prefix.map(|p| self.name(p));
        match self.find_attr_ns(element, namespace, local) {
            Some(attr) => {
                self.node_mut(attr).prefix = prefix;
                self.set_attr_value(attr, value)
            }
            None => {
                let namespace = namespace.map(DomString::from);
                let local = self.name(local);
                self.add_attr(element, namespace, prefix, local, value).map(|_| ())
            }
        }
    }

    /// Unlist `attr` from `element`; it is freed or becomes pending
    pub(crate) fn detach_attr(&mut self, element: NodeId, attr: NodeId) {
        let key = match self.node_mut(element).as_element_mut() {
            Some(data) => {
                if data.id_attr == Some(attr) {
                    data.id_attr = None;
                }
                data.attrs.remove_node(attr)
            }
            None => None,
        };
        if key.is_some_and(|key| self.is_class_key(&key)) {
            self.invalidate_classes(element);
        }
        let node = self.node_mut(attr);
        node.parent = None;
        if let Some(data) = node.as_attr_mut() {
            data.is_id = false;
        }
        self.touch();
        self.try_destroy(attr);
    }

    pub(crate) fn remove_attribute(&mut self, element: NodeId, name: &str) -> DomResult<()> {
        self.check_element_writable(element)?;
        if let Some(attr) = self.find_attr(element, name) {
            self.detach_attr(element, attr);
        }
        Ok(())
    }

    pub(crate) fn remove_attribute_ns(&mut self, element: NodeId, namespace: Option<&str>, local: &str) -> DomResult<()> {
        self.check_element_writable(element)?;
        if let Some(attr) = self.find_attr_ns(element, namespace, local) {
            self.detach_attr(element, attr);
        }
        Ok(())
    }

    /// List `attr` on `element`, displacing the attribute with the same name.
    /// The displaced node is returned with a reference taken for the caller.
    pub(crate) fn set_attribute_node(&mut self, element: NodeId, attr: NodeId, by_ns: bool) -> DomResult<Option<NodeId>> {
        self.check_element_writable(element)?;
        if self.node_type(attr) != NodeType::Attribute {
            return Err(DomError::HierarchyRequest);
        }
        match self.node(attr).parent {
            Some(owner) if owner == element => return Ok(None),
            Some(_) => return Err(DomError::InUseAttribute),
            None => {}
        }

        let key = self.attr_key(attr);
        let existing = if by_ns {
            self.node(element).as_element().and_then(|data| data.attrs.get(&key))
        } else {
            let qname = self.node(attr).qualified_name();
            self.find_attr(element, qname.as_str())
                .or_else(|| self.node(element).as_element().and_then(|data| data.attrs.get(&key)))
        };

        // Matched by qualified name, but another attribute still holds the
        // same namespace and local name
        let holder = self
            .node(element)
            .as_element()
            .and_then(|data| data.attrs.get(&key))
            .filter(|&holder| Some(holder) != existing);
        if let Some(holder) = holder {
            self.detach_attr(element, holder);
        }

        if let Some(old) = existing {
            let old_key = self.attr_key(old);
            if let Some(data) = self.node_mut(element).as_element_mut() {
                if old_key != key {
                    data.attrs.remove_node(old);
                }
                if data.id_attr == Some(old) {
                    data.id_attr = None;
                }
            }
            let node = self.node_mut(old);
            node.parent = None;
            if let Some(data) = node.as_attr_mut() {
                data.is_id = false;
            }
            if self.is_class_key(&old_key) {
                self.invalidate_classes(element);
            }
        }

        if self.is_class_key(&key) {
            self.invalidate_classes(element);
        }
        let is_id = self.node(attr).as_attr().is_some_and(|a| a.is_id);
        if let Some(data) = self.node_mut(element).as_element_mut() {
            data.attrs.insert(key, attr);
        }
        self.node_mut(attr).parent = Some(element);
        self.remove_pending(attr);
        if is_id {
            self.set_id_attr(element, attr, true);
        }
        self.touch();

        if let Some(old) = existing {
            self.retain(old);
            self.try_destroy(old);
        }
        Ok(existing)
    }

    pub(crate) fn remove_attribute_node(&mut self, element: NodeId, attr: NodeId) -> DomResult<()> {
        self.check_element_writable(element)?;
        let listed = self
            .node(element)
            .as_element()
            .is_some_and(|data| data.attrs.position(attr).is_some());
        if !listed {
            return Err(DomError::NotFound);
        }
        self.detach_attr(element, attr);
        Ok(())
    }

    /// Mark or unmark `attr` as the element's ID attribute
    pub(crate) fn set_id_attr(&mut self, element: NodeId, attr: NodeId, is_id: bool) {
        let previous = self.node(element).as_element().and_then(|data| data.id_attr);
        if is_id {
            if let Some(previous) = previous.filter(|&p| p != attr) {
                if let Some(data) = self.node_mut(previous).as_attr_mut() {
                    data.is_id = false;
                }
            }
            if let Some(data) = self.node_mut(attr).as_attr_mut() {
                data.is_id = true;
            }
            if let Some(data) = self.node_mut(element).as_element_mut() {
                data.id_attr = Some(attr);
            }
        } else {
            if let Some(data) = self.node_mut(attr).as_attr_mut() {
                data.is_id = false;
            }
            if previous == Some(attr) {
                if let Some(data) = self.node_mut(element).as_element_mut() {
                    data.id_attr = None;
                }
            }
        }
    }

    fn set_id_attribute_checked(&mut self, element: NodeId, attr: Option<NodeId>, is_id: bool) -> DomResult<()> {
        self.check_element_writable(element)?;
        let attr = attr.ok_or(DomError::NotFound)?;
        self.set_id_attr(element, attr, is_id);
        Ok(())
    }

    /// Class tokens, rebuilt when the `class` attribute changed
    pub(crate) fn classes(&mut self, element: NodeId) -> Vec<DomString> {
        if let Some(cached) = self.node(element).as_element().and_then(|d| d.classes.clone()) {
            return cached;
        }
        let key = AttrKey::new(None, self.names.class.clone());
        let value = self
            .node(element)
            .as_element()
            .and_then(|data| data.attrs.get(&key))
            .map(|attr| self.attr_value(attr));
        let tokens = value.map(|v| split_class_tokens(v.as_str())).unwrap_or_default();
        if let Some(data) = self.node_mut(element).as_element_mut() {
            data.classes = Some(tokens.clone());
        }
        tokens
    }

    pub(crate) fn has_class(&mut self, element: NodeId, name: &DomString) -> bool {
        let caseless = self.config.quirks_mode == QuirksMode::FullQuirks;
        self.classes(element)
            .iter()
            .any(|token| if caseless { token.caseless_eq(name) } else { token == name })
    }

    /// First element in document order whose ID equals `value`
    pub(crate) fn element_by_id(&self, value: &str) -> Option<NodeId> {
        let key = AttrKey::new(None, self.names.id.clone());
        self.descendants(self.root).find(|&id| {
            let Some(data) = self.node(id).as_element() else {
                return false;
            };
            data.id_attr
                .or_else(|| data.attrs.get(&key))
                .is_some_and(|attr| self.attr_value(attr) == value)
        })
    }
}

impl Element {
    /// Qualified tag name
    pub fn tag_name(&self) -> DomString {
        self.node_name()
    }

    pub fn get_attribute(&self, name: &str) -> Option<DomString> {
        self.read(|d, id| d.find_attr(id, name).map(|attr| d.attr_value(attr)))
    }

    /// Set an attribute's value, creating it if absent. An existing
    /// attribute keeps its identity and position.
    pub fn set_attribute(&self, name: &str, value: &str) -> DomResult<()> {
        let value = DomString::from(value);
        self.write(|d, id| d.set_attribute(id, name, value))
    }

    pub fn remove_attribute(&self, name: &str) -> DomResult<()> {
        self.write(|d, id| d.remove_attribute(id, name))
    }

    pub fn get_attribute_node(&self, name: &str) -> Option<Attr> {
        let attr = self.read(|d, id| d.find_attr(id, name))?;
        Some(Attr::from_node(self.sibling_handle(attr)))
    }

    /// List `attr` here, returning the attribute it displaced
    pub fn set_attribute_node(&self, attr: &Attr) -> DomResult<Option<Attr>> {
        self.check_document(attr)?;
        let old = self.write(|d, id| d.set_attribute_node(id, attr.id, false))?;
        Ok(old.map(|old| Attr::from_node(crate::NodeRef::adopt(self.doc.clone(), old))))
    }

    pub fn remove_attribute_node(&self, attr: &Attr) -> DomResult<Attr> {
        if !self.same_document(attr) {
            return Err(DomError::NotFound);
        }
        self.write(|d, id| d.remove_attribute_node(id, attr.id))?;
        Ok(attr.clone())
    }

    /// Live list of descendant elements named `name` (`*` for all)
    pub fn get_elements_by_tag_name(&self, name: &str) -> NodeList {
        let filter = self.read(|d, _| NodeListFilter::by_name(d, name));
        NodeList::get_or_create(&self.doc, self.id, filter)
    }

    pub fn get_attribute_ns(&self, namespace: Option<&str>, local: &str) -> Option<DomString> {
        self.read(|d, id| d.find_attr_ns(id, namespace, local).map(|attr| d.attr_value(attr)))
    }

    pub fn set_attribute_ns(&self, namespace: Option<&str>, qname: &str, value: &str) -> DomResult<()> {
        let value = DomString::from(value);
        self.write(|d, id| d.set_attribute_ns(id, namespace, qname, value))
    }

    pub fn remove_attribute_ns(&self, namespace: Option<&str>, local: &str) -> DomResult<()> {
        self.write(|d, id| d.remove_attribute_ns(id, namespace, local))
    }

    pub fn get_attribute_node_ns(&self, namespace: Option<&str>, local: &str) -> Option<Attr> {
        let attr = self.read(|d, id| d.find_attr_ns(id, namespace, local))?;
        Some(Attr::from_node(self.sibling_handle(attr)))
    }

    pub fn set_attribute_node_ns(&self, attr: &Attr) -> DomResult<Option<Attr>> {
        self.check_document(attr)?;
        let old = self.write(|d, id| d.set_attribute_node(id, attr.id, true))?;
        Ok(old.map(|old| Attr::from_node(crate::NodeRef::adopt(self.doc.clone(), old))))
    }

    /// Live list of descendant elements by namespace and local name; either
    /// may be `*`
    pub fn get_elements_by_tag_name_ns(&self, namespace: Option<&str>, local: &str) -> NodeList {
        NodeList::get_or_create(&self.doc, self.id, NodeListFilter::by_namespace(namespace, local))
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.read(|d, id| d.find_attr(id, name).is_some())
    }

    pub fn has_attribute_ns(&self, namespace: Option<&str>, local: &str) -> bool {
        self.read(|d, id| d.find_attr_ns(id, namespace, local).is_some())
    }

    /// Not provided
    pub fn schema_type_info(&self) -> DomResult<()> {
        Err(DomError::NotSupported)
    }

    pub fn set_id_attribute(&self, name: &str, is_id: bool) -> DomResult<()> {
        self.write(|d, id| {
            let attr = d.find_attr(id, name);
            d.set_id_attribute_checked(id, attr, is_id)
        })
    }

    pub fn set_id_attribute_ns(&self, namespace: Option<&str>, local: &str, is_id: bool) -> DomResult<()> {
        self.write(|d, id| {
            let attr = d.find_attr_ns(id, namespace, local);
            d.set_id_attribute_checked(id, attr, is_id)
        })
    }

    pub fn set_id_attribute_node(&self, attr: &Attr, is_id: bool) -> DomResult<()> {
        if !self.same_document(attr) {
            return Err(DomError::NotFound);
        }
        self.write(|d, id| {
            let listed = d.node(attr.id).parent == Some(id);
            d.set_id_attribute_checked(id, listed.then_some(attr.id), is_id)
        })
    }

    /// Tokens of the `class` attribute
    pub fn get_classes(&self) -> Vec<DomString> {
        self.write(|d, id| d.classes(id))
    }

    /// Whether `name` is one of the class tokens; ASCII case-insensitive in
    /// full quirks mode
    pub fn has_class(&self, name: &str) -> bool {
        let name = DomString::from(name);
        self.write(|d, id| d.has_class(id, &name))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, DomError};

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let doc = Document::new().unwrap();
        let el = doc.create_element("a").unwrap();
        el.set_attribute("href", "/one").unwrap();
        el.set_attribute("rel", "next").unwrap();
        let before = el.get_attribute_node("href").unwrap();

        el.set_attribute("href", "/two").unwrap();
        let after = el.get_attribute_node("href").unwrap();
        assert_eq!(before, after);
        assert_eq!(before.value(), "/two");
        assert_eq!(el.attributes().unwrap().item(0).unwrap().node_name(), "href");
    }

    #[test]
    fn test_invalid_attribute_name() {
        let doc = Document::new().unwrap();
        let el = doc.create_element("a").unwrap();
        assert_eq!(el.set_attribute("1x", "v"), Err(DomError::InvalidCharacter));
    }

    #[test]
    fn test_class_cache_follows_changes() {
        let doc = Document::new().unwrap();
        let el = doc.create_element("p").unwrap();
        assert!(el.get_classes().is_empty());

        el.set_attribute("class", "a b").unwrap();
        assert!(el.has_class("b"));

        el.get_attribute_node("class").unwrap().set_value("c").unwrap();
        assert!(!el.has_class("b"));
        assert!(el.has_class("c"));

        el.remove_attribute("class").unwrap();
        assert!(el.get_classes().is_empty());
    }

    #[test]
    fn test_single_id_attribute() {
        let doc = Document::new().unwrap();
        let el = doc.create_element("p").unwrap();
        el.set_attribute("key", "k1").unwrap();
        el.set_attribute("name", "n1").unwrap();

        el.set_id_attribute("key", true).unwrap();
        el.set_id_attribute("name", true).unwrap();
        assert!(!el.get_attribute_node("key").unwrap().is_id());
        assert!(el.get_attribute_node("name").unwrap().is_id());
        assert_eq!(el.set_id_attribute("missing", true), Err(DomError::NotFound));
    }
}
