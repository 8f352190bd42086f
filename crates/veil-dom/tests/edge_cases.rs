//! Boundary behaviour: error paths, suppression-window corners, mouse-only
//! platforms and subscription reference counting.

use std::cell::RefCell;
use std::rc::Rc;

use veil_dom::{
    Dom, DomError, ElementOptions, HeadlessBackend, NativeEvent, DEFAULT_LOCK_THRESHOLD_MS,
};

fn dom() -> Dom<HeadlessBackend> {
    Dom::new(HeadlessBackend::new())
}

fn named(name: &str) -> ElementOptions {
    ElementOptions {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

fn counter(dom: &mut Dom<HeadlessBackend>, node: veil_dom::NodeId, event: &str) -> Rc<RefCell<u32>> {
    let count = Rc::new(RefCell::new(0));
    let seen = Rc::clone(&count);
    dom.on(node, event, move |_| *seen.borrow_mut() += 1)
        .unwrap();
    count
}

// ---------------------------------------------------------------------------
// error paths
// ---------------------------------------------------------------------------

#[test]
fn test_every_op_fails_cleanly_on_destroyed_node() {
    let mut dom = dom();
    let node = dom.create("div", ElementOptions::default()).unwrap();
    dom.destroy(node).unwrap();

    assert_eq!(dom.text(node).unwrap_err(), DomError::NotFound);
    assert_eq!(dom.children(node).unwrap_err(), DomError::NotFound);
    assert_eq!(dom.set_text(node, "x").unwrap_err(), DomError::NotFound);
    assert_eq!(dom.show(node).unwrap_err(), DomError::NotFound);
    assert_eq!(dom.on(node, "ping", |_| {}).unwrap_err(), DomError::NotFound);
    assert_eq!(dom.destroy(node).unwrap_err(), DomError::NotFound);
}

#[test]
fn test_failed_append_leaves_both_trees_untouched() {
    let mut dom = dom();
    let old_home = dom.create("div", ElementOptions::default()).unwrap();
    let new_home = dom.create("div", ElementOptions::default()).unwrap();
    let mover = dom.create_child(old_home, "span", named("taken")).unwrap();
    let squatter = dom.create_child(new_home, "span", named("taken")).unwrap();

    let err = dom.append_child(new_home, mover).unwrap_err();

    assert_eq!(err, DomError::NameConflict("taken".to_string()));
    assert_eq!(dom.children(old_home).unwrap(), &[mover]);
    assert_eq!(dom.children(new_home).unwrap(), &[squatter]);
    assert_eq!(dom.parent(mover).unwrap(), Some(old_home));
}

#[test]
fn test_failed_create_child_leaks_no_node() {
    let mut dom = dom();
    let parent = dom.create("div", ElementOptions::default()).unwrap();
    dom.create_child(parent, "span", named("only")).unwrap();
    let before = dom.len();

    let err = dom.create_child(parent, "span", named("only")).unwrap_err();

    assert_eq!(err, DomError::NameConflict("only".to_string()));
    assert_eq!(dom.len(), before);
}

#[test]
fn test_insert_before_detached_sibling_reports_no_parent() {
    let mut dom = dom();
    let node = dom.create("span", ElementOptions::default()).unwrap();
    let detached = dom.create("span", ElementOptions::default()).unwrap();

    assert_eq!(
        dom.insert_before(node, detached).unwrap_err(),
        DomError::NoParent
    );
}

#[test]
fn test_dom_subscription_without_element_fails() {
    let mut dom = dom();
    let bare = dom.create_node();
    dom.allow_dom_events(bare).unwrap();

    assert_eq!(
        dom.on(bare, "dom.touchstart", |_| {}).unwrap_err(),
        DomError::NotAssigned
    );
    // the failed bind must not leave a dangling subscriber behind
    dom.assign_tag(bare, "div", ElementOptions::default()).unwrap();
    dom.on(bare, "dom.touchstart", |_| {}).unwrap();
    assert_eq!(dom.backend().active_listener_count(), 2);
}

// ---------------------------------------------------------------------------
// suppression-window corners
// ---------------------------------------------------------------------------

#[test]
fn test_mouse_move_stays_suppressed_after_window_expires() {
    let mut dom = dom();
    let node = dom.create("div", ElementOptions::default()).unwrap();
    dom.allow_dom_events(node).unwrap();
    let _starts = counter(&mut dom, node, "dom.touchstart");
    let moves = counter(&mut dom, node, "dom.touchmove");

    dom.handle_native(node, &NativeEvent::touch("touchstart", 0))
        .unwrap();
    let long_after = DEFAULT_LOCK_THRESHOLD_MS * 20;
    dom.handle_native(node, &NativeEvent::mouse("mousemove", true, long_after))
        .unwrap();

    assert_eq!(*moves.borrow(), 0);
}

#[test]
fn test_suppressed_mouse_up_releases_the_lock() {
    let mut dom = dom();
    let node = dom.create("div", ElementOptions::default()).unwrap();
    dom.allow_dom_events(node).unwrap();
    let _ends = counter(&mut dom, node, "dom.touchend");
    let moves = counter(&mut dom, node, "dom.touchmove");

    dom.handle_native(node, &NativeEvent::touch("touchend", 0))
        .unwrap();
    // synthetic mouseup inside the window eats the lock on its way out
    dom.handle_native(node, &NativeEvent::mouse("mouseup", true, 100))
        .unwrap();
    dom.handle_native(node, &NativeEvent::mouse("mousemove", true, 150))
        .unwrap();

    assert_eq!(*moves.borrow(), 1);
}

#[test]
fn test_touch_move_is_never_suppressed() {
    let mut dom = dom();
    let node = dom.create("div", ElementOptions::default()).unwrap();
    dom.allow_dom_events(node).unwrap();
    let moves = counter(&mut dom, node, "dom.touchmove");

    dom.handle_native(node, &NativeEvent::touch("touchstart", 0))
        .unwrap();
    dom.handle_native(node, &NativeEvent::touch("touchmove", 10))
        .unwrap();
    dom.handle_native(node, &NativeEvent::touch("touchmove", 20))
        .unwrap();

    assert_eq!(*moves.borrow(), 2);
}

#[test]
fn test_boundary_timestamp_is_outside_the_window() {
    let mut dom = dom();
    let node = dom.create("div", ElementOptions::default()).unwrap();
    dom.allow_dom_events(node).unwrap();
    let starts = counter(&mut dom, node, "dom.touchstart");

    dom.handle_native(node, &NativeEvent::touch("touchstart", 0))
        .unwrap();
    // exactly at the threshold: the window is half-open
    dom.handle_native(
        node,
        &NativeEvent::mouse("mousedown", true, DEFAULT_LOCK_THRESHOLD_MS),
    )
    .unwrap();

    assert_eq!(*starts.borrow(), 2);
}

// ---------------------------------------------------------------------------
// mouse-only platforms
// ---------------------------------------------------------------------------

#[test]
fn test_touch_subscription_binds_mouse_listener_when_touch_is_absent() {
    let mut dom = Dom::new(HeadlessBackend::mouse_only());
    let node = dom.create("div", ElementOptions::default()).unwrap();
    let element = dom.element(node).unwrap().unwrap();
    dom.allow_dom_events(node).unwrap();
    let starts = counter(&mut dom, node, "dom.touchstart");

    assert_eq!(dom.backend().listener_names(element), vec!["mousedown"]);

    dom.handle_native(node, &NativeEvent::mouse("mousedown", true, 0))
        .unwrap();
    assert_eq!(*starts.borrow(), 1);
}

#[test]
fn test_touchcancel_binds_nothing_without_touch() {
    let mut dom = Dom::new(HeadlessBackend::mouse_only());
    let node = dom.create("div", ElementOptions::default()).unwrap();
    dom.allow_dom_events(node).unwrap();

    dom.on(node, "dom.touchcancel", |_| {}).unwrap();

    assert_eq!(dom.backend().active_listener_count(), 0);
}

#[test]
fn test_translated_binding_still_filters_secondary_button() {
    let mut dom = Dom::new(HeadlessBackend::mouse_only());
    let node = dom.create("div", ElementOptions::default()).unwrap();
    dom.allow_dom_events(node).unwrap();
    let starts = counter(&mut dom, node, "dom.touchstart");

    dom.handle_native(node, &NativeEvent::mouse("mousedown", false, 0))
        .unwrap();
    dom.handle_native(node, &NativeEvent::mouse("mousedown", true, 10))
        .unwrap();

    assert_eq!(*starts.borrow(), 1);
}

// ---------------------------------------------------------------------------
// subscription reference counting
// ---------------------------------------------------------------------------

#[test]
fn test_listeners_survive_until_the_last_unsubscribe() {
    let mut dom = dom();
    let node = dom.create("div", ElementOptions::default()).unwrap();
    let element = dom.element(node).unwrap().unwrap();
    dom.allow_dom_events(node).unwrap();

    let first = dom.on(node, "dom.touchstart", |_| {}).unwrap();
    let second = dom.on(node, "dom.touchstart", |_| {}).unwrap();
    assert_eq!(
        dom.backend().listener_names(element),
        vec!["mousedown", "touchstart"]
    );

    dom.off(node, "dom.touchstart", first).unwrap();
    assert_eq!(
        dom.backend().listener_names(element),
        vec!["mousedown", "touchstart"]
    );

    dom.off(node, "dom.touchstart", second).unwrap();
    assert_eq!(dom.backend().active_listener_count(), 0);
}

#[test]
fn test_subscriptions_before_allow_stay_unbound() {
    let mut dom = dom();
    let node = dom.create("div", ElementOptions::default()).unwrap();
    let early = counter(&mut dom, node, "dom.touchstart");

    dom.allow_dom_events(node).unwrap();
    dom.handle_native(node, &NativeEvent::touch("touchstart", 0))
        .unwrap();

    // the capability is not retroactive; no native binding, no delivery
    assert_eq!(dom.backend().active_listener_count(), 0);
    assert_eq!(*early.borrow(), 0);
}

#[test]
fn test_plain_dom_event_round_trips() {
    let mut dom = dom();
    let node = dom.create("div", ElementOptions::default()).unwrap();
    let element = dom.element(node).unwrap().unwrap();
    dom.allow_dom_events(node).unwrap();
    let keys = counter(&mut dom, node, "dom.keydown");

    assert_eq!(dom.backend().listener_names(element), vec!["keydown"]);
    let key = NativeEvent {
        name: "keydown".to_string(),
        primary_button: true,
        timestamp_ms: 0,
    };
    dom.handle_native(node, &key).unwrap();
    assert_eq!(*keys.borrow(), 1);
}

// ---------------------------------------------------------------------------
// content and visibility corners
// ---------------------------------------------------------------------------

#[test]
fn test_set_text_none_never_clears() {
    let mut dom = dom();
    let node = dom.create("div", ElementOptions::default()).unwrap();
    dom.set_markup(node, "<i>kept</i>").unwrap();

    dom.set_text(node, None).unwrap();

    assert_eq!(dom.text(node).unwrap(), Some("<i>kept</i>"));
    assert_eq!(dom.backend().text_write_count(), 0);
}

#[test]
fn test_hidden_option_applies_before_first_show() {
    let mut dom = dom();
    let node = dom
        .create(
            "div",
            ElementOptions {
                hidden: true,
                ..Default::default()
            },
        )
        .unwrap();
    let element = dom.element(node).unwrap().unwrap();

    assert!(!dom.is_visible(node).unwrap());
    assert_eq!(dom.backend().style_of(element, "display"), Some("none"));

    dom.show(node).unwrap();
    assert_eq!(dom.backend().style_of(element, "display"), None);
}

#[test]
fn test_clearing_an_empty_node_is_harmless() {
    let mut dom = dom();
    let node = dom.create("div", ElementOptions::default()).unwrap();
    let cleared = counter(&mut dom, node, "cleared");

    dom.clear_content(node).unwrap();
    dom.clear_content(node).unwrap();

    assert_eq!(*cleared.borrow(), 2);
    assert!(dom.contains(node));
}
