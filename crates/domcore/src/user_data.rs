//! Per-node user data
//!
//! Arbitrary values keyed by string, each with an optional handler that is
//! told when the owning node is cloned, imported, adopted, or deleted.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::node_ref::NodeRef;

/// Event delivered to a user-data handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UserDataOperation {
    Cloned = 1,
    Imported = 2,
    Deleted = 3,
    /// Reserved: `rename_node` is unsupported, so this is never delivered
    Renamed = 4,
    Adopted = 5,
}

/// Handler callback: operation, key, data, source node, destination node
pub type UserDataHandler =
    Rc<dyn Fn(UserDataOperation, &str, &dyn Any, Option<&NodeRef>, Option<&NodeRef>)>;

/// One user-data slot
#[derive(Clone)]
pub(crate) struct UserDataEntry {
    pub(crate) data: Rc<dyn Any>,
    pub(crate) handler: Option<UserDataHandler>,
}

impl UserDataEntry {
    pub(crate) fn notify(
        &self,
        op: UserDataOperation,
        key: &str,
        src: Option<&NodeRef>,
        dst: Option<&NodeRef>,
    ) {
        if let Some(handler) = &self.handler {
            handler(op, key, self.data.as_ref(), src, dst);
        }
    }
}

/// Ordered user-data map of one node
#[derive(Clone, Default)]
pub(crate) struct UserData {
    entries: IndexMap<String, UserDataEntry>,
}

impl UserData {
    pub(crate) fn get(&self, key: &str) -> Option<Rc<dyn Any>> {
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    /// Store or remove (`data == None`) a value, returning the previous one
    pub(crate) fn set(
        &mut self,
        key: &str,
        data: Option<Rc<dyn Any>>,
        handler: Option<UserDataHandler>,
    ) -> Option<Rc<dyn Any>> {
        let previous = match data {
            Some(data) => self
                .entries
                .insert(key.to_string(), UserDataEntry { data, handler }),
            None => self.entries.shift_remove(key),
        };
        previous.map(|entry| entry.data)
    }

    /// Entries that have a handler to notify
    pub(crate) fn with_handlers(&self) -> Vec<(String, UserDataEntry)> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.handler.is_some())
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    pub(crate) fn into_entries(self) -> impl Iterator<Item = (String, UserDataEntry)> {
        self.entries.into_iter()
    }
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// Deleted-node notification waiting for the document borrow to end
pub(crate) struct DeletedNotice {
    pub(crate) key: String,
    pub(crate) entry: UserDataEntry,
}

impl DeletedNotice {
    pub(crate) fn dispatch(self) {
        self.entry
            .notify(UserDataOperation::Deleted, &self.key, None, None);
    }
}
