//! Character data: Text, CDATA sections, and comments
//!
//! Offsets and counts are in code points. An offset past the end is an
//! `IndexSize` error; a count running past the end is clipped.

use crate::error::{DomError, DomResult};
use crate::handles::{CharacterData, Text};
use crate::node::{Node, NodeData, NodeType};
use crate::node_ref::NodeRef;
use crate::store::DocumentData;
use crate::string::DomString;
use crate::NodeId;

impl DocumentData {
    /// Apply `edit` to the character data of `id`
    fn edit_char_data(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&DomString) -> DomResult<DomString>,
    ) -> DomResult<()> {
        if self.is_readonly(id) {
            return Err(DomError::NoModificationAllowed);
        }
        let data = edit(&self.char_data(id))?;
        self.set_char_data(id, data)
    }

    /// Split a text node at `offset`; the tail becomes a new following
    /// sibling, returned with one reference
    pub(crate) fn split_text(&mut self, id: NodeId, offset: usize) -> DomResult<NodeId> {
        if self.is_readonly(id) {
            return Err(DomError::NoModificationAllowed);
        }
        let data = self.char_data(id);
        if offset > data.char_len() {
            return Err(DomError::IndexSize);
        }
        let head = data.substr(0, offset)?;
        let tail = data.substr(offset, usize::MAX)?;

        let kind = match self.node_type(id) {
            NodeType::CdataSection => NodeData::CdataSection,
            _ => NodeData::Text { element_content_whitespace: false },
        };
        let new = self.create(Node::new(kind, DomString::default()).with_value(tail))?;
        self.set_char_data(id, head)?;

        let (parent, next) = {
            let node = self.node(id);
            (node.parent, node.next_sibling)
        };
        if let Some(parent) = parent {
            self.link(parent, new, next);
        }
        Ok(new)
    }

    /// Text and CDATA siblings contiguous with `id`, in order
    fn text_run(&self, id: NodeId) -> Vec<NodeId> {
        let is_text = |n: NodeId| self.node_type(n).is_text();
        let mut first = id;
        while let Some(prev) = self.node(first).prev_sibling.filter(|&p| is_text(p)) {
            first = prev;
        }
        let mut run = vec![first];
        let mut current = first;
        while let Some(next) = self.node(current).next_sibling.filter(|&n| is_text(n)) {
            run.push(next);
            current = next;
        }
        run
    }

    pub(crate) fn whole_text(&self, id: NodeId) -> DomString {
        let mut out = String::new();
        for node in self.text_run(id) {
            out.push_str(self.char_data(node).as_str());
        }
        DomString::from(out)
    }

    /// Replace the whole run of adjacent text with `content` held by `id`.
    /// Returns `None` when the content is empty and `id` was removed too.
    pub(crate) fn replace_whole_text(&mut self, id: NodeId, content: DomString) -> DomResult<Option<NodeId>> {
        let run = self.text_run(id);
        if run.iter().any(|&n| self.is_readonly(n)) {
            return Err(DomError::NoModificationAllowed);
        }
        for node in run.into_iter().filter(|&n| n != id) {
            self.unlink(node);
            self.try_destroy(node);
        }
        if content.is_empty() {
            self.unlink(id);
            self.try_destroy(id);
            return Ok(None);
        }
        self.set_char_data(id, content)?;
        Ok(Some(id))
    }
}

impl CharacterData {
    pub fn data(&self) -> DomString {
        self.read(|d, id| d.char_data(id))
    }

    pub fn set_data(&self, data: &str) -> DomResult<()> {
        let data = DomString::from(data);
        self.write(|d, id| d.set_char_data(id, data))
    }

    /// Length in code points
    pub fn length(&self) -> usize {
        self.data().char_len()
    }

    pub fn substring_data(&self, offset: usize, count: usize) -> DomResult<DomString> {
        self.data().substr(offset, count)
    }

    pub fn append_data(&self, arg: &str) -> DomResult<()> {
        let arg = DomString::from(arg);
        self.write(|d, id| d.edit_char_data(id, |data| Ok(data.concat(&arg))))
    }

    pub fn insert_data(&self, offset: usize, arg: &str) -> DomResult<()> {
        let arg = DomString::from(arg);
        self.write(|d, id| d.edit_char_data(id, |data| data.insert(&arg, offset)))
    }

    pub fn delete_data(&self, offset: usize, count: usize) -> DomResult<()> {
        self.write(|d, id| d.edit_char_data(id, |data| data.replace_range(offset, count, &DomString::default())))
    }

    pub fn replace_data(&self, offset: usize, count: usize, arg: &str) -> DomResult<()> {
        let arg = DomString::from(arg);
        self.write(|d, id| d.edit_char_data(id, |data| data.replace_range(offset, count, &arg)))
    }
}

impl Text {
    /// Break this node at `offset`, returning the new node holding the rest
    pub fn split_text(&self, offset: usize) -> DomResult<Text> {
        let new = self.write(|d, id| d.split_text(id, offset))?;
        Ok(Text::from_node(NodeRef::adopt(self.doc.clone(), new)))
    }

    /// Whitespace that only separates elements
    pub fn is_element_content_whitespace(&self) -> bool {
        self.read(|d, id| {
            matches!(
                d.node(id).data,
                NodeData::Text { element_content_whitespace: true }
            )
        })
    }

    /// Flag set by whoever builds the tree from markup with a content model
    pub fn set_element_content_whitespace(&self, flag: bool) {
        self.write(|d, id| {
            if let NodeData::Text { element_content_whitespace } = &mut d.node_mut(id).data {
                *element_content_whitespace = flag;
            }
        });
    }

    /// Text of this node and its adjacent text siblings
    pub fn whole_text(&self) -> DomString {
        self.read(|d, id| d.whole_text(id))
    }

    /// Replace this node and its adjacent text siblings with `content`
    pub fn replace_whole_text(&self, content: &str) -> DomResult<Option<Text>> {
        let content = DomString::from(content);
        let kept = self.write(|d, id| d.replace_whole_text(id, content))?;
        Ok(kept.map(|_| self.clone()))
    }
}
