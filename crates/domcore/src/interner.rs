//! String Interner - Deduplicate strings across documents
//!
//! Names that recur (tag names, attribute names, namespace URIs) are stored
//! once and shared. Interned strings compare by pointer identity first.
//!
//! The process-wide pool is created lazily on first use. Tests and embedders
//! that need isolation create their own [`InternPool`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::string::DomString;

static GLOBAL_POOL: OnceLock<InternPool> = OnceLock::new();

/// Common names pre-interned into the global pool
const COMMON_NAMES: &[&str] = &[
    "html", "head", "body", "div", "span", "p", "a", "img",
    "ul", "ol", "li", "table", "tr", "td", "th",
    "form", "input", "button", "select", "option", "textarea",
    "script", "style", "link", "meta", "title",
    "id", "class", "name", "type", "value", "href", "src",
    "xml", "xmlns", "*",
];

/// Thread-safe string interner
#[derive(Debug, Default)]
pub struct InternPool {
    entries: Mutex<HashSet<Arc<str>>>,
}

impl InternPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide pool
    pub fn global() -> &'static InternPool {
        GLOBAL_POOL.get_or_init(|| {
            let pool = InternPool::new();
            for name in COMMON_NAMES {
                pool.intern(name);
            }
            pool
        })
    }

    /// Intern a string, returning the shared entry
    /// If the string is already interned, returns the existing entry
    pub fn intern(&self, s: &str) -> DomString {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.get(s) {
            return DomString::from_pool(Arc::clone(existing));
        }
        let entry: Arc<str> = Arc::from(s);
        entries.insert(Arc::clone(&entry));
        DomString::from_pool(entry)
    }

    /// Check whether `s` has an entry
    pub fn contains(&self, s: &str) -> bool {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).contains(s)
    }

    /// Number of interned strings
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry that only the pool still references.
    /// Returns the number of entries removed.
    pub fn purge(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|entry| Arc::strong_count(entry) > 1);
        let removed = before - entries.len();
        if removed > 0 {
            tracing::trace!("Purged {} intern pool entries", removed);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let pool = InternPool::new();
        let a = pool.intern("hello");
        let b = pool.intern("hello");
        assert!(a.is_interned());
        assert!(a.ptr_eq(&b));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_purge_keeps_live_entries() {
        let pool = InternPool::new();
        let kept = pool.intern("kept");
        drop(pool.intern("dropped"));

        assert_eq!(pool.purge(), 1);
        assert!(pool.contains("kept"));
        assert!(!pool.contains("dropped"));
        assert_eq!(kept.as_str(), "kept");
    }

    #[test]
    fn test_global_pool_is_shared() {
        let a = InternPool::global().intern("class");
        let b = DomString::interned("class");
        assert!(a.ptr_eq(&b));
    }
}
