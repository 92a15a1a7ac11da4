//! Lifecycle tests for domcore
//!
//! Reference counting, the pending set, deferred destruction, and document
//! teardown while nodes are still held.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use domcore::{Document, NodeRef, UserDataHandler, UserDataOperation};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("domcore=trace")
        .try_init();
}

// ============================================================================
// REFERENCE COUNTS
// ============================================================================

#[test]
fn test_new_nodes_are_pending() {
    let doc = Document::new().unwrap();
    let el = doc.create_element("div").unwrap();
    assert_eq!(el.refcount(), 1);
    assert!(el.is_pending());
    assert_eq!(doc.pending_len(), 1);

    doc.append_child(&el).unwrap();
    assert!(!el.is_pending());
    assert_eq!(doc.pending_len(), 0);
}

#[test]
fn test_unreferenced_parentless_node_is_freed() {
    init_tracing();
    let doc = Document::new().unwrap();
    let before = doc.node_count();

    let el = doc.create_element("gone").unwrap();
    assert_eq!(doc.node_count(), before + 1);
    drop(el);
    assert_eq!(doc.node_count(), before);
    assert_eq!(doc.pending_len(), 0);
}

#[test]
fn test_attached_node_outlives_its_handles() {
    let doc = Document::new().unwrap();
    let parent = doc.create_element("p").unwrap();
    parent.append_child(&doc.create_element("c").unwrap()).unwrap();
    let count = doc.node_count();

    let child = parent.first_child().unwrap();
    assert_eq!(child.refcount(), 1);
    drop(child);
    assert_eq!(doc.node_count(), count);
    assert!(parent.has_child_nodes());
}

// ============================================================================
// DEFERRED DESTRUCTION
// ============================================================================

#[test]
fn test_remove_while_referenced() {
    init_tracing();
    let doc = Document::new().unwrap();
    let root = doc.create_element("root").unwrap();
    doc.append_child(&root).unwrap();
    let child = doc.create_element("child").unwrap();
    root.append_child(&child).unwrap();
    let count = doc.node_count();

    let removed = root.remove_child(&child).unwrap();
    assert!(removed.is_same_node(&child));
    assert_eq!(child.refcount(), 2);
    assert!(child.is_pending());
    assert!(child.parent_node().is_none());

    // Still usable while held
    child.set_attribute("kept", "yes").unwrap();
    assert_eq!(child.get_attribute("kept").unwrap(), "yes");

    drop(removed);
    assert_eq!(doc.node_count(), count + 1);
    drop(child);
    assert_eq!(doc.node_count(), count - 1);
    assert_eq!(doc.pending_len(), 0);
}

#[test]
fn test_freeing_subtree_spares_held_descendants() {
    let doc = Document::new().unwrap();
    let outer = doc.create_element("outer").unwrap();
    let middle = doc.create_element("middle").unwrap();
    let inner = doc.create_element("inner").unwrap();
    outer.append_child(&middle).unwrap();
    middle.append_child(&inner).unwrap();
    drop(middle);

    drop(outer);
    assert!(inner.is_pending());
    assert!(inner.parent_node().is_none());
    assert_eq!(doc.node_count(), 2);
    assert_eq!(inner.node_name(), "inner");
}

#[test]
fn test_held_attribute_survives_its_element() {
    let doc = Document::new().unwrap();
    let el = doc.create_element("el").unwrap();
    el.set_attribute("title", "kept").unwrap();
    let attr = el.get_attribute_node("title").unwrap();

    drop(el);
    assert!(attr.owner_element().is_none());
    assert!(attr.is_pending());
    assert_eq!(attr.value(), "kept");
}

// ============================================================================
// DOCUMENT TEARDOWN
// ============================================================================

#[test]
fn test_document_drop_with_held_nodes() {
    init_tracing();
    let doc = Document::new().unwrap();
    let root = doc.create_element("root").unwrap();
    doc.append_child(&root).unwrap();
    let leaf = doc.create_element("leaf").unwrap();
    root.append_child(&leaf).unwrap();
    let loose = doc.create_text_node("loose").unwrap();

    drop(doc);
    assert!(root.owner_document().is_none());
    assert!(root.is_pending());
    assert!(leaf.parent_node().unwrap().is_same_node(&root));
    assert_eq!(loose.data(), "loose");

    // Mutations still work on the surviving fragment
    root.remove_child(&leaf).unwrap();
    assert!(leaf.is_pending());
}

#[test]
fn test_user_data_deleted_on_free() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let handler: UserDataHandler = Rc::new(
        move |op: UserDataOperation, key: &str, data: &dyn Any, src: Option<&NodeRef>, dst: Option<&NodeRef>| {
            assert!(src.is_none() && dst.is_none());
            let value = data.downcast_ref::<u32>().copied();
            log.borrow_mut().push((op, key.to_string(), value));
        },
    );

    let doc = Document::new().unwrap();
    let el = doc.create_element("el").unwrap();
    assert!(el.set_user_data("n", Some(Rc::new(42u32)), Some(handler)).is_none());
    assert_eq!(el.get_user_data("n").unwrap().downcast_ref::<u32>(), Some(&42));

    drop(el);
    assert_eq!(*seen.borrow(), vec![(UserDataOperation::Deleted, "n".to_string(), Some(42))]);
}

#[test]
fn test_handler_may_touch_document() {
    let doc = Document::new().unwrap();
    let probe = doc.clone();
    let handler: UserDataHandler = Rc::new(
        move |_op: UserDataOperation, _key: &str, _data: &dyn Any, _src: Option<&NodeRef>, _dst: Option<&NodeRef>| {
            // Runs after the freeing mutation has released the document
            let _ = probe.create_comment("from handler").unwrap();
        },
    );

    let el = doc.create_element("el").unwrap();
    el.set_user_data("k", Some(Rc::new(())), Some(handler));
    let count = doc.node_count();
    drop(el);
    assert_eq!(doc.node_count(), count - 1);
}
