//! Tree mutation
//!
//! Child-list surgery on [`DocumentData`]. Every public mutation validates
//! completely before it touches a link, so a failed call leaves the tree as
//! it was.

use crate::error::{DomError, DomResult};
use crate::node::{Node, NodeData, NodeType};
use crate::store::DocumentData;
use crate::string::DomString;
use crate::NodeId;

/// Whether a `child` type may appear under a `parent` type
pub(crate) fn permits(parent: NodeType, child: NodeType) -> bool {
    use NodeType::*;
    match parent {
        Document => matches!(child, Element | ProcessingInstruction | Comment | DocumentType),
        Element | DocumentFragment | EntityReference => matches!(
            child,
            Element | ProcessingInstruction | Comment | Text | CdataSection | EntityReference
        ),
        Attribute => matches!(child, Text | EntityReference),
        _ => false,
    }
}

impl DocumentData {
    #[inline]
    pub(crate) fn node_type(&self, id: NodeId) -> NodeType {
        self.node(id).node_type()
    }

    /// Whether `ancestor` is `id` or one of its ancestors (through attribute
    /// owners as well)
    pub(crate) fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.node(node).parent;
        }
        false
    }

    /// Read-only nodes: document types, locked attributes, and anything
    /// inside an entity reference
    pub(crate) fn is_readonly(&self, id: NodeId) -> bool {
        let node = self.node(id);
        match &node.data {
            NodeData::DocumentType(_) => return true,
            NodeData::Attr(attr) if attr.read_only => return true,
            _ => {}
        }
        let mut current = node.parent;
        while let Some(ancestor) = current {
            let n = self.node(ancestor);
            if matches!(n.data, NodeData::EntityReference) {
                return true;
            }
            current = n.parent;
        }
        false
    }

    /// Owner element of the attribute `id` is under, if any
    pub(crate) fn owning_element_of_attr(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            let n = self.node(node);
            if matches!(n.data, NodeData::Attr(_)) {
                return n.parent;
            }
            current = n.parent;
        }
        None
    }

    /// Changes under an attribute invalidate its element's class tokens
    pub(crate) fn attr_content_changed(&mut self, id: NodeId) {
        if let Some(element) = self.owning_element_of_attr(id) {
            if let Some(data) = self.node_mut(element).as_element_mut() {
                data.classes = None;
            }
        }
    }

    /// Remove `id` from its parent's child chain
    pub(crate) fn unlink(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = self.node(id);
            if matches!(node.data, NodeData::Attr(_)) {
                return;
            }
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        let Some(parent) = parent else {
            return;
        };
        match prev {
            Some(prev) => self.node_mut(prev).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }
        let node = self.node_mut(id);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;

        self.attr_content_changed(parent);
        self.touch();
    }

    /// Link a parentless `id` under `parent`, before `before` or at the end
    pub(crate) fn link(&mut self, parent: NodeId, id: NodeId, before: Option<NodeId>) {
        let prev = match before {
            Some(before) => self.node(before).prev_sibling,
            None => self.node(parent).last_child,
        };
        {
            let node = self.node_mut(id);
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = before;
        }
        match prev {
            Some(prev) => self.node_mut(prev).next_sibling = Some(id),
            None => self.node_mut(parent).first_child = Some(id),
        }
        match before {
            Some(before) => self.node_mut(before).prev_sibling = Some(id),
            None => self.node_mut(parent).last_child = Some(id),
        }
        self.remove_pending(id);
        self.attr_content_changed(parent);
        self.touch();
    }

    /// Check a single non-fragment child against `parent`
    fn check_child(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        let child_type = self.node_type(child);
        if !permits(self.node_type(parent), child_type) {
            return Err(DomError::HierarchyRequest);
        }
        if parent == self.root {
            self.check_document_child(child, child_type, 1)?;
        }
        Ok(())
    }

    /// A Document holds at most one Element and one DocumentType
    fn check_document_child(&self, child: NodeId, child_type: NodeType, adding: usize) -> DomResult<()> {
        if !matches!(child_type, NodeType::Element | NodeType::DocumentType) {
            return Ok(());
        }
        let existing = self
            .children(self.root)
            .filter(|&c| c != child && self.node_type(c) == child_type)
            .count();
        if existing + adding > 1 {
            return Err(DomError::HierarchyRequest);
        }
        Ok(())
    }

    /// Validate an insertion of `new_child` under `parent` before `ref_child`
    fn check_insert(&self, parent: NodeId, new_child: NodeId, ref_child: Option<NodeId>) -> DomResult<()> {
        if self.is_readonly(parent) {
            return Err(DomError::NoModificationAllowed);
        }
        if let Some(ref_child) = ref_child {
            if self.node(ref_child).parent != Some(parent) || self.node_type(ref_child) == NodeType::Attribute {
                return Err(DomError::NotFound);
            }
        }

        if self.node_type(new_child) == NodeType::DocumentFragment {
            if self.is_inclusive_ancestor(new_child, parent) {
                return Err(DomError::HierarchyRequest);
            }
            let parent_type = self.node_type(parent);
            let mut elements = 0;
            for child in self.children(new_child) {
                let child_type = self.node_type(child);
                if !permits(parent_type, child_type) {
                    return Err(DomError::HierarchyRequest);
                }
                if child_type == NodeType::DocumentType {
                    self.check_document_child(child, child_type, 1)?;
                }
                if child_type == NodeType::Element {
                    elements += 1;
                }
            }
            if parent == self.root && elements > 0 {
                self.check_document_child(new_child, NodeType::Element, elements)?;
            }
        } else {
            self.check_child(parent, new_child)?;
        }

        if let Some(old_parent) = self.node(new_child).parent {
            if self.node_type(new_child) != NodeType::Attribute && self.is_readonly(old_parent) {
                return Err(DomError::NoModificationAllowed);
            }
        }
        Ok(())
    }

    /// Insert `new_child` before `ref_child` (or append)
    pub(crate) fn insert_before(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        ref_child: Option<NodeId>,
    ) -> DomResult<()> {
        self.check_insert(parent, new_child, ref_child)?;
        if ref_child == Some(new_child) {
            return Ok(());
        }

        if self.node_type(new_child) == NodeType::DocumentFragment {
            for child in self.child_ids(new_child) {
                self.unlink(child);
                self.link(parent, child, ref_child);
            }
        } else {
            self.unlink(new_child);
            self.link(parent, new_child, ref_child);
        }
        Ok(())
    }

    /// Whether `child` is the Document's root element or doctype
    fn is_document_anchor(&self, parent: NodeId, child: NodeId) -> bool {
        parent == self.root
            && matches!(self.node_type(child), NodeType::Element | NodeType::DocumentType)
    }

    /// Detach `old_child` from `parent`; it becomes pending
    pub(crate) fn remove_child(&mut self, parent: NodeId, old_child: NodeId) -> DomResult<()> {
        if self.is_readonly(parent) {
            return Err(DomError::NoModificationAllowed);
        }
        if self.node(old_child).parent != Some(parent) || self.node_type(old_child) == NodeType::Attribute {
            return Err(DomError::NotFound);
        }
        if self.is_document_anchor(parent, old_child) {
            return Err(DomError::NotSupported);
        }
        self.unlink(old_child);
        self.try_destroy(old_child);
        Ok(())
    }

    /// Put `new_child` where `old_child` is; `old_child` becomes pending
    pub(crate) fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> DomResult<()> {
        if self.is_readonly(parent) {
            return Err(DomError::NoModificationAllowed);
        }
        if self.node(old_child).parent != Some(parent) || self.node_type(old_child) == NodeType::Attribute {
            return Err(DomError::NotFound);
        }
        if self.is_document_anchor(parent, old_child)
            || (parent == self.root
                && matches!(self.node_type(new_child), NodeType::Element | NodeType::DocumentType))
        {
            return Err(DomError::NotSupported);
        }
        if new_child == old_child {
            return Ok(());
        }
        self.insert_before(parent, new_child, Some(old_child))?;
        self.unlink(old_child);
        self.try_destroy(old_child);
        Ok(())
    }

    /// Remove every child of `id`
    pub(crate) fn clear_children(&mut self, id: NodeId) {
        for child in self.child_ids(id) {
            self.unlink(child);
            self.try_destroy(child);
        }
    }

    /// Merge adjacent Text nodes and drop empty ones, throughout the subtree
    /// and the attributes of its elements
    pub(crate) fn normalize(&mut self, id: NodeId) {
        if let Some(element) = self.node(id).as_element() {
            let attrs: Vec<NodeId> = element.attrs.ids().collect();
            for attr in attrs {
                self.normalize(attr);
            }
        }

        let mut child = self.node(id).first_child;
        while let Some(current) = child {
            if self.node_type(current) == NodeType::Text {
                let mut next = self.node(current).next_sibling;
                while let Some(sibling) = next.filter(|&s| self.node_type(s) == NodeType::Text) {
                    let tail = self.node(sibling).value.clone().unwrap_or_default();
                    let merged = self.char_data(current).concat(&tail);
                    self.node_mut(current).value = Some(merged);
                    next = self.node(sibling).next_sibling;
                    self.unlink(sibling);
                    self.try_destroy(sibling);
                }
                if self.char_data(current).is_empty() {
                    self.unlink(current);
                    self.try_destroy(current);
                }
                child = next;
            } else {
                child = self.node(current).next_sibling;
                self.normalize(current);
            }
        }
    }

    /// Character data of a Text, Comment, CDATA, or PI node
    pub(crate) fn char_data(&self, id: NodeId) -> DomString {
        self.node(id).value.clone().unwrap_or_default()
    }

    /// DOM `textContent`
    pub(crate) fn text_content(&self, id: NodeId) -> Option<DomString> {
        match self.node_type(id) {
            NodeType::Document | NodeType::DocumentType => None,
            NodeType::Text
            | NodeType::CdataSection
            | NodeType::Comment
            | NodeType::ProcessingInstruction => Some(self.char_data(id)),
            NodeType::Attribute if self.node(id).first_child.is_none() => Some(self.attr_value(id)),
            _ => {
                let mut out = String::new();
                self.collect_text(id, &mut out);
                Some(DomString::from(out))
            }
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for child in self.children(id) {
            match self.node_type(child) {
                NodeType::Comment | NodeType::ProcessingInstruction => {}
                NodeType::Text | NodeType::CdataSection => {
                    if let Some(value) = &self.node(child).value {
                        out.push_str(value.as_str());
                    }
                }
                _ => self.collect_text(child, out),
            }
        }
    }

    /// DOM `textContent` setter
    pub(crate) fn set_text_content(&mut self, id: NodeId, text: &DomString) -> DomResult<()> {
        match self.node_type(id) {
            NodeType::Document | NodeType::DocumentType => Ok(()),
            NodeType::Text
            | NodeType::CdataSection
            | NodeType::Comment
            | NodeType::ProcessingInstruction => self.set_char_data(id, text.clone()),
            NodeType::Attribute => self.set_attr_value(id, text.clone()),
            _ => {
                if self.is_readonly(id) {
                    return Err(DomError::NoModificationAllowed);
                }
                self.clear_children(id);
                if !text.is_empty() {
                    let node = Node::new(
                        NodeData::Text { element_content_whitespace: false },
                        DomString::default(),
                    )
                    .with_value(text.clone());
                    let child = self.create_detached(node)?;
                    self.link(id, child, None);
                }
                Ok(())
            }
        }
    }

    /// Replace the character data of `id`
    pub(crate) fn set_char_data(&mut self, id: NodeId, data: DomString) -> DomResult<()> {
        if self.is_readonly(id) {
            return Err(DomError::NoModificationAllowed);
        }
        self.node_mut(id).value = Some(data);
        self.attr_content_changed(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permitted_children() {
        assert!(permits(NodeType::Document, NodeType::Element));
        assert!(!permits(NodeType::Document, NodeType::Text));
        assert!(permits(NodeType::Element, NodeType::CdataSection));
        assert!(permits(NodeType::Attribute, NodeType::Text));
        assert!(!permits(NodeType::Attribute, NodeType::Element));
        assert!(!permits(NodeType::Text, NodeType::Text));
        assert!(!permits(NodeType::Element, NodeType::Attribute));
        assert!(!permits(NodeType::Element, NodeType::Document));
    }
}
