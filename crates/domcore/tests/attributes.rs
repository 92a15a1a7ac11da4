//! Attribute tests for domcore
//!
//! Name and namespace access, node identity, typed values, IDs, and the
//! class token cache.

use domcore::{Document, DocumentConfig, DomError, QuirksMode, XMLNS_NAMESPACE};

// ============================================================================
// BY NAME
// ============================================================================

#[test]
fn test_set_attribute_replaces_in_place() {
    let doc = Document::new().unwrap();
    let el = doc.create_element("input").unwrap();
    el.set_attribute("type", "text").unwrap();
    el.set_attribute("name", "q").unwrap();
    let node = el.get_attribute_node("type").unwrap();

    el.set_attribute("type", "search").unwrap();
    assert!(el.get_attribute_node("type").unwrap().is_same_node(&node));
    assert_eq!(node.value(), "search");

    let map = el.attributes().unwrap();
    assert_eq!(map.length(), 2);
    assert_eq!(map.item(0).unwrap().node_name(), "type");
    assert_eq!(map.item(1).unwrap().node_name(), "name");
}

#[test]
fn test_get_has_remove() {
    let doc = Document::new().unwrap();
    let el = doc.create_element("a").unwrap();
    assert!(el.get_attribute("href").is_none());
    assert!(!el.has_attributes());

    el.set_attribute("href", "/").unwrap();
    assert!(el.has_attribute("href"));
    assert_eq!(el.get_attribute("href").unwrap(), "/");

    el.remove_attribute("href").unwrap();
    assert!(!el.has_attribute("href"));
    // Removing a missing attribute is not an error
    el.remove_attribute("href").unwrap();
    assert_eq!(el.set_attribute("bad name", "x").unwrap_err(), DomError::InvalidCharacter);
}

// ============================================================================
// BY NAMESPACE
// ============================================================================

#[test]
fn test_namespaced_attributes() {
    let doc = Document::new().unwrap();
    let el = doc.create_element("use").unwrap();
    el.set_attribute_ns(Some("http://www.w3.org/1999/xlink"), "xlink:href", "#a").unwrap();

    assert_eq!(el.get_attribute_ns(Some("http://www.w3.org/1999/xlink"), "href").unwrap(), "#a");
    assert_eq!(el.get_attribute("xlink:href").unwrap(), "#a");
    assert!(el.get_attribute_ns(None, "href").is_none());

    let attr = el.get_attribute_node_ns(Some("http://www.w3.org/1999/xlink"), "href").unwrap();
    assert_eq!(attr.prefix().unwrap(), "xlink");
    assert_eq!(attr.local_name().unwrap(), "href");

    el.set_attribute_ns(Some("http://www.w3.org/1999/xlink"), "xl:href", "#b").unwrap();
    assert!(attr.owner_element().is_some());
    assert_eq!(attr.node_name(), "xl:href");
    assert_eq!(attr.value(), "#b");

    assert_eq!(
        el.set_attribute_ns(Some("urn:x"), "xmlns:p", "v").unwrap_err(),
        DomError::Namespace
    );
    el.set_attribute_ns(Some(XMLNS_NAMESPACE), "xmlns:p", "urn:p").unwrap();

    el.remove_attribute_ns(Some("http://www.w3.org/1999/xlink"), "href").unwrap();
    assert!(!el.has_attribute_ns(Some("http://www.w3.org/1999/xlink"), "href"));
}

// ============================================================================
// BY NODE
// ============================================================================

#[test]
fn test_attribute_node_ownership() {
    let doc = Document::new().unwrap();
    let first = doc.create_element("first").unwrap();
    let second = doc.create_element("second").unwrap();
    let attr = doc.create_attribute("title").unwrap();
    attr.set_value("hello").unwrap();

    assert!(first.set_attribute_node(&attr).unwrap().is_none());
    assert!(!attr.is_pending());
    assert_eq!(second.set_attribute_node(&attr).unwrap_err(), DomError::InUseAttribute);
    assert_eq!(second.remove_attribute_node(&attr).unwrap_err(), DomError::NotFound);

    let other = Document::new().unwrap();
    let foreign = other.create_attribute("title").unwrap();
    assert_eq!(first.set_attribute_node(&foreign).unwrap_err(), DomError::WrongDocument);

    let removed = first.remove_attribute_node(&attr).unwrap();
    assert!(removed.is_same_node(&attr));
    assert!(attr.is_pending());
    second.set_attribute_node(&attr).unwrap();
    assert!(attr.owner_element().unwrap().is_same_node(&second));
}

#[test]
fn test_set_attribute_node_displaces() {
    let doc = Document::new().unwrap();
    let el = doc.create_element("el").unwrap();
    el.set_attribute("lang", "en").unwrap();
    let old = el.get_attribute_node("lang").unwrap();

    let replacement = doc.create_attribute("lang").unwrap();
    replacement.set_value("fr").unwrap();
    let displaced = el.set_attribute_node(&replacement).unwrap().unwrap();
    assert!(displaced.is_same_node(&old));
    assert!(old.owner_element().is_none());
    assert!(old.is_pending());
    assert_eq!(el.get_attribute("lang").unwrap(), "fr");
    assert_eq!(el.attributes().unwrap().length(), 1);
}

#[test]
fn test_set_attribute_node_displaces_other_prefix() {
    let doc = Document::new().unwrap();
    let el = doc.create_element("el").unwrap();
    el.set_attribute_ns(Some("urn:x"), "p:a", "1").unwrap();
    let old = el.get_attribute_node_ns(Some("urn:x"), "a").unwrap();
    let count = doc.node_count();

    let replacement = doc.create_attribute_ns(Some("urn:x"), "q:a").unwrap();
    replacement.set_value("2").unwrap();
    let displaced = el.set_attribute_node(&replacement).unwrap().unwrap();
    assert!(displaced.is_same_node(&old));
    assert!(old.owner_element().is_none());
    assert!(old.is_pending());
    assert_eq!(el.attributes().unwrap().length(), 1);
    assert_eq!(el.get_attribute_ns(Some("urn:x"), "a").unwrap(), "2");

    // Both handles gone: the displaced Attr is freed
    drop(displaced);
    drop(old);
    assert_eq!(doc.node_count(), count);
    assert_eq!(doc.pending_len(), 1);
}

#[test]
fn test_attribute_children_flatten_value() {
    let doc = Document::new().unwrap();
    let attr = doc.create_attribute("alt").unwrap();
    attr.append_child(&doc.create_text_node("one ").unwrap()).unwrap();
    attr.append_child(&doc.create_text_node("two").unwrap()).unwrap();
    assert_eq!(attr.value(), "one two");

    attr.set_value("flat").unwrap();
    assert!(!attr.has_child_nodes());
    assert_eq!(attr.node_value().unwrap(), "flat");
}

// ============================================================================
// TYPED VALUES
// ============================================================================

#[test]
fn test_typed_values() {
    let doc = Document::new().unwrap();
    let count = doc.create_attribute("count").unwrap();
    count.set_int_value(7).unwrap();
    assert_eq!(count.int_value().unwrap(), 7);
    assert_eq!(count.value(), "7");
    assert_eq!(count.set_bool_value(true).unwrap_err(), DomError::AttrWrongType);
    assert_eq!(count.set_value("eight").unwrap_err(), DomError::AttrWrongType);

    let flag = doc.create_attribute("flag").unwrap();
    flag.set_bool_value(false).unwrap();
    assert!(!flag.bool_value().unwrap());
    assert_eq!(flag.short_value().unwrap_err(), DomError::AttrWrongType);

    let locked = doc.create_attribute("locked").unwrap();
    locked.set_read_only(true);
    assert_eq!(locked.set_value("x").unwrap_err(), DomError::NoModificationAllowed);
}

// ============================================================================
// IDS
// ============================================================================

#[test]
fn test_id_attributes() {
    let doc = Document::new().unwrap();
    let root = doc.create_element("root").unwrap();
    doc.append_child(&root).unwrap();
    let item = doc.create_element("item").unwrap();
    item.set_attribute("key", "k1").unwrap();
    item.set_attribute("name", "n1").unwrap();
    root.append_child(&item).unwrap();

    assert!(doc.get_element_by_id("k1").is_none());
    item.set_id_attribute("key", true).unwrap();
    assert!(item.get_attribute_node("key").unwrap().is_id());
    assert!(doc.get_element_by_id("k1").unwrap().is_same_node(&item));

    // One ID attribute per element
    item.set_id_attribute("name", true).unwrap();
    assert!(!item.get_attribute_node("key").unwrap().is_id());
    assert!(doc.get_element_by_id("n1").is_some());
    assert!(doc.get_element_by_id("k1").is_none());

    assert_eq!(item.set_id_attribute("missing", true).unwrap_err(), DomError::NotFound);
}

#[test]
fn test_configured_id_attribute_name() {
    let config = DocumentConfig {
        id_attribute_name: "xml:id".to_string(),
        ..DocumentConfig::default()
    };
    let doc = Document::with_config(config).unwrap();
    let root = doc.create_element("root").unwrap();
    root.set_attribute("xml:id", "top").unwrap();
    root.set_attribute("id", "ignored").unwrap();
    doc.append_child(&root).unwrap();

    assert!(doc.get_element_by_id("top").is_some());
    assert!(doc.get_element_by_id("ignored").is_none());
}

// ============================================================================
// CLASSES
// ============================================================================

#[test]
fn test_class_tokens_follow_attribute() {
    let doc = Document::new().unwrap();
    let el = doc.create_element("div").unwrap();
    assert!(el.get_classes().is_empty());

    el.set_attribute("class", "  card   wide\tcard ").unwrap();
    let classes = el.get_classes();
    assert_eq!(classes.len(), 3);
    assert_eq!(classes[0], "card");
    assert_eq!(classes[1], "wide");
    assert!(el.has_class("wide"));

    el.set_attribute("class", "narrow").unwrap();
    assert!(!el.has_class("wide"));
    assert!(el.has_class("narrow"));

    el.get_attribute_node("class").unwrap().set_value("tall").unwrap();
    assert!(el.has_class("tall"));

    el.remove_attribute("class").unwrap();
    assert!(el.get_classes().is_empty());
}

#[test]
fn test_class_matching_in_quirks_mode() {
    let config = DocumentConfig {
        quirks_mode: QuirksMode::FullQuirks,
        ..DocumentConfig::html()
    };
    let doc = Document::with_config(config).unwrap();
    let el = doc.create_element("div").unwrap();
    el.set_attribute("class", "Foo bar").unwrap();
    assert!(el.has_class("foo"));
    assert!(el.has_class("BAR"));

    let strict = Document::new().unwrap();
    let el = strict.create_element("div").unwrap();
    el.set_attribute("class", "Foo bar").unwrap();
    assert!(!el.has_class("foo"));
    assert!(el.has_class("Foo"));
}
