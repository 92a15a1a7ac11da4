//! Attribute nodes

use crate::error::{DomError, DomResult};
use crate::handles::{Attr, Element};
use crate::node::AttrValue;
use crate::store::DocumentData;
use crate::string::DomString;
use crate::NodeId;

impl DocumentData {
    /// String value: the flattened children if there are any, else the
    /// stored value
    pub(crate) fn attr_value(&self, id: NodeId) -> DomString {
        let node = self.node(id);
        if node.first_child.is_some() {
            return self.text_content(id).unwrap_or_default();
        }
        node.as_attr()
            .map(|attr| attr.value.to_dom_string())
            .unwrap_or_default()
    }

    /// Store a typed value; the type of the first write sticks
    pub(crate) fn set_attr_typed(&mut self, id: NodeId, value: AttrValue) -> DomResult<()> {
        if self.is_readonly(id) {
            return Err(DomError::NoModificationAllowed);
        }
        let Some(attr) = self.node(id).as_attr() else {
            return Err(DomError::NotSupported);
        };
        if !attr.value.same_kind(&value) {
            return Err(DomError::AttrWrongType);
        }
        self.clear_children(id);
        if let Some(attr) = self.node_mut(id).as_attr_mut() {
            attr.value = value;
        }
        self.attr_content_changed(id);
        self.touch();
        Ok(())
    }

    pub(crate) fn set_attr_value(&mut self, id: NodeId, value: DomString) -> DomResult<()> {
        self.set_attr_typed(id, AttrValue::String(value))
    }

    pub(crate) fn attr_typed(&self, id: NodeId) -> AttrValue {
        self.node(id)
            .as_attr()
            .map(|attr| attr.value.clone())
            .unwrap_or_default()
    }
}

impl Attr {
    /// Qualified name
    pub fn name(&self) -> DomString {
        self.node_name()
    }

    /// Whether the value was given explicitly rather than defaulted
    pub fn specified(&self) -> bool {
        self.read(|d, id| d.node(id).as_attr().is_some_and(|a| a.specified))
    }

    pub fn value(&self) -> DomString {
        self.read(|d, id| d.attr_value(id))
    }

    pub fn set_value(&self, value: &str) -> DomResult<()> {
        let value = DomString::from(value);
        self.write(|d, id| d.set_attr_value(id, value))
    }

    /// Element this attribute is listed on
    pub fn owner_element(&self) -> Option<Element> {
        let owner = self.read(|d, id| d.node(id).parent)?;
        Some(Element::from_node(self.sibling_handle(owner)))
    }

    /// Not provided
    pub fn schema_type_info(&self) -> DomResult<()> {
        Err(DomError::NotSupported)
    }

    pub fn is_id(&self) -> bool {
        self.read(|d, id| d.node(id).as_attr().is_some_and(|a| a.is_id))
    }

    pub fn read_only(&self) -> bool {
        self.read(|d, id| d.node(id).as_attr().is_some_and(|a| a.read_only))
    }

    /// Lock or unlock the value
    pub fn set_read_only(&self, read_only: bool) {
        self.write(|d, id| {
            if let Some(attr) = d.node_mut(id).as_attr_mut() {
                attr.read_only = read_only;
            }
        });
    }

    /// Stored value with its type
    pub fn typed_value(&self) -> AttrValue {
        self.read(|d, id| d.attr_typed(id))
    }

    pub fn int_value(&self) -> DomResult<u32> {
        match self.typed_value() {
            AttrValue::Integer(n) => Ok(n),
            _ => Err(DomError::AttrWrongType),
        }
    }

    pub fn set_int_value(&self, value: u32) -> DomResult<()> {
        self.write(|d, id| d.set_attr_typed(id, AttrValue::Integer(value)))
    }

    pub fn short_value(&self) -> DomResult<u16> {
        match self.typed_value() {
            AttrValue::Short(n) => Ok(n),
            _ => Err(DomError::AttrWrongType),
        }
    }

    pub fn set_short_value(&self, value: u16) -> DomResult<()> {
        self.write(|d, id| d.set_attr_typed(id, AttrValue::Short(value)))
    }

    pub fn bool_value(&self) -> DomResult<bool> {
        match self.typed_value() {
            AttrValue::Bool(b) => Ok(b),
            _ => Err(DomError::AttrWrongType),
        }
    }

    pub fn set_bool_value(&self, value: bool) -> DomResult<()> {
        self.write(|d, id| d.set_attr_typed(id, AttrValue::Bool(value)))
    }
}

#[cfg(test)]
mod tests {
    use crate::{AttrValue, Document, DomError};

    #[test]
    fn test_typed_value_is_sticky() {
        let doc = Document::new().unwrap();
        let attr = doc.create_attribute("width").unwrap();
        assert_eq!(attr.typed_value(), AttrValue::Unset);

        attr.set_int_value(640).unwrap();
        assert_eq!(attr.int_value(), Ok(640));
        assert_eq!(attr.value(), "640");
        assert_eq!(attr.set_value("wide"), Err(DomError::AttrWrongType));
        assert_eq!(attr.set_bool_value(true), Err(DomError::AttrWrongType));
        assert_eq!(attr.short_value(), Err(DomError::AttrWrongType));
    }

    #[test]
    fn test_value_flattens_children() {
        let doc = Document::new().unwrap();
        let attr = doc.create_attribute("title").unwrap();
        attr.append_child(&doc.create_text_node("a").unwrap()).unwrap();
        attr.append_child(&doc.create_text_node("b").unwrap()).unwrap();
        assert_eq!(attr.value(), "ab");

        attr.set_value("c").unwrap();
        assert!(!attr.has_child_nodes());
        assert_eq!(attr.value(), "c");
    }

    #[test]
    fn test_read_only_attr() {
        let doc = Document::new().unwrap();
        let attr = doc.create_attribute("lang").unwrap();
        attr.set_read_only(true);
        assert_eq!(attr.set_value("en"), Err(DomError::NoModificationAllowed));
        attr.set_read_only(false);
        attr.set_value("en").unwrap();
        assert_eq!(attr.value(), "en");
    }
}
