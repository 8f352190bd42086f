//! Touch/mouse event unification.
//!
//! Touch-capable platforms deliver both a touch event and a delayed
//! synthetic mouse event for one physical gesture, with no ordering
//! guarantee between the two sources and no guarantee the mouse event lands
//! on the element the touch did. A shared lock timestamp marks "a touch
//! gesture was just handled"; native mouse events arriving inside the lock
//! window are presumed duplicates and dropped. Consumers only ever see the
//! logical `dom.*` stream.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::backend::{Backend, ListenerId, NativeEvent};
use crate::emitter::EventArg;
use crate::error::{DomError, DomResult};
use crate::{NodeId, SubId};

/// Logical event name prefix: a subscription to `dom.touchstart` receives
/// the unified gesture-start stream.
pub const DOM_EVENT_PREFIX: &str = "dom.";

/// Default duplicate-suppression window in milliseconds
pub const DEFAULT_LOCK_THRESHOLD_MS: u64 = 500;

/// Shared touch/mouse suppression window.
///
/// The lock is process-wide rather than per node: the physical ambiguity
/// between a finger and a pointer is global, so two nodes listening for
/// touches share one suppression window. That is an accepted trade-off, not
/// an oversight. Clones share state; inject one lock into every [`Dom`] that
/// receives input from the same device, and [`TouchLock::reset`] it between
/// test cases.
///
/// [`Dom`]: super::Dom
#[derive(Debug, Clone)]
pub struct TouchLock {
    engaged_at: Rc<Cell<Option<u64>>>,
    threshold_ms: u64,
}

impl Default for TouchLock {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_THRESHOLD_MS)
    }
}

impl TouchLock {
    pub fn new(threshold_ms: u64) -> Self {
        Self {
            engaged_at: Rc::new(Cell::new(None)),
            threshold_ms,
        }
    }

    pub fn threshold_ms(&self) -> u64 {
        self.threshold_ms
    }

    /// Any lock present, regardless of age
    pub fn is_engaged(&self) -> bool {
        self.engaged_at.get().is_some()
    }

    /// Lock present and still inside the suppression window at `now_ms`
    pub fn is_locked_at(&self, now_ms: u64) -> bool {
        match self.engaged_at.get() {
            Some(engaged) => now_ms.saturating_sub(engaged) < self.threshold_ms,
            None => false,
        }
    }

    /// Forget any held lock
    pub fn reset(&self) {
        self.engaged_at.set(None);
    }

    pub(crate) fn engage(&self, now_ms: u64) {
        self.engaged_at.set(Some(now_ms));
    }
}

/// Logical gesture slot a paired binding occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GestureKind {
    Start,
    Move,
    End,
}

/// One row of the closed gesture dispatch table
struct GesturePair {
    kind: GestureKind,
    touch: &'static str,
    mouse: &'static str,
}

const GESTURE_PAIRS: [GesturePair; 3] = [
    GesturePair {
        kind: GestureKind::Start,
        touch: "touchstart",
        mouse: "mousedown",
    },
    GesturePair {
        kind: GestureKind::Move,
        touch: "touchmove",
        mouse: "mousemove",
    },
    GesturePair {
        kind: GestureKind::End,
        touch: "touchend",
        mouse: "mouseup",
    },
];

fn gesture_pair(dom_name: &str) -> Option<&'static GesturePair> {
    GESTURE_PAIRS.iter().find(|pair| pair.touch == dom_name)
}

/// Static touch-to-mouse translation for platforms without touch input.
/// `touchcancel` has no mouse counterpart and is never bound.
fn translate_for_mouse_only(dom_name: &str) -> Option<&str> {
    match dom_name {
        "touchstart" => Some("mousedown"),
        "touchmove" => Some("mousemove"),
        "touchend" => Some("mouseup"),
        "touchcancel" => None,
        other => Some(other),
    }
}

/// How one logical event was wired to the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BindingKind {
    /// Touch event paired with its mouse twin through the lock machine
    Gesture(GestureKind),
    /// Touch name statically rewritten to a mouse name (no-touch platform)
    Translated,
    /// Bound and re-emitted verbatim
    Plain,
}

/// One bound logical event and its live platform listeners. Paired bindings
/// carry two entries that are installed and torn down as a unit.
#[derive(Debug)]
pub(crate) struct DomBinding {
    pub(crate) kind: BindingKind,
    /// (native event name, listener handle)
    pub(crate) entries: Vec<(String, ListenerId)>,
}

/// DOM-event capability attached to a node by `allow_dom_events`
#[derive(Debug, Default)]
pub(crate) struct DomEventState {
    /// Keyed by the requested dom event name (the part after `dom.`)
    pub(crate) bindings: HashMap<String, DomBinding>,
}

impl<B: Backend> super::Dom<B> {
    /// Attach the DOM-event capability to a node. Until this is called,
    /// `dom.*` subscriptions never reach the platform. Not retroactive:
    /// subscriptions made beforehand stay unbound.
    pub fn allow_dom_events(&mut self, node: NodeId) -> DomResult<()> {
        let state = self.state_mut(node)?;
        if state.dom_events.is_none() {
            state.dom_events = Some(DomEventState::default());
        }
        Ok(())
    }

    pub fn dom_events_allowed(&self, node: NodeId) -> DomResult<bool> {
        Ok(self.state(node)?.dom_events.is_some())
    }

    /// Subscribe to a logical event on a node.
    ///
    /// For `dom.*` events on a dom-events-enabled node, the first subscriber
    /// triggers the native bind; gesture events install their touch and
    /// mouse listeners as one unit.
    pub fn on(
        &mut self,
        node: NodeId,
        event: &str,
        handler: impl FnMut(&EventArg) + 'static,
    ) -> DomResult<SubId> {
        let (sub, first) = self.state_mut(node)?.emitter.add(event, Box::new(handler));
        if first {
            if let Some(dom_name) = event.strip_prefix(DOM_EVENT_PREFIX) {
                let dom_name = dom_name.to_string();
                if let Err(err) = self.bind_native(node, &dom_name) {
                    self.state_mut(node)?.emitter.remove(event, sub);
                    return Err(err);
                }
            }
        }
        Ok(sub)
    }

    /// Drop one subscription. When the last subscriber of a `dom.*` event
    /// goes away, the underlying platform listener(s) are removed.
    pub fn off(&mut self, node: NodeId, event: &str, sub: SubId) -> DomResult<()> {
        let last = self.state_mut(node)?.emitter.remove(event, sub);
        if last {
            if let Some(dom_name) = event.strip_prefix(DOM_EVENT_PREFIX) {
                let dom_name = dom_name.to_string();
                self.unbind_native(node, &dom_name)?;
            }
        }
        Ok(())
    }

    /// Feed one native platform event for a node through the compatibility
    /// machine. Emits zero or more logical `dom.*` events to subscribers.
    pub fn handle_native(&mut self, node: NodeId, event: &NativeEvent) -> DomResult<()> {
        let lock = self.touch_lock.clone();
        let emits: Vec<String> = {
            let state = self.state(node)?;
            let Some(dom_events) = &state.dom_events else {
                return Ok(());
            };
            dom_events
                .bindings
                .iter()
                .filter(|(_, binding)| {
                    binding.entries.iter().any(|(name, _)| name == &event.name)
                })
                .filter(|(_, binding)| decide(binding.kind, event, &lock))
                .map(|(dom_name, _)| format!("{DOM_EVENT_PREFIX}{dom_name}"))
                .collect()
        };
        for logical in emits {
            self.emit(node, &logical, &EventArg::Native(event.clone()));
        }
        Ok(())
    }

    /// Remove and immediately re-add every bound native listener whose name
    /// starts with `touch`. Some platforms silently drop touch subscriptions
    /// when an element moves in the display tree, so tree insertion calls
    /// this on the moved node. Mouse listeners are left alone.
    pub fn rebind_touch_listeners(&mut self, node: NodeId) -> DomResult<()> {
        let Some(element) = self.state(node)?.element else {
            return Ok(());
        };
        let mut stale: Vec<(String, usize, String, ListenerId)> = Vec::new();
        {
            let state = self.state(node)?;
            let Some(dom_events) = &state.dom_events else {
                return Ok(());
            };
            for (dom_name, binding) in &dom_events.bindings {
                for (index, (native, listener)) in binding.entries.iter().enumerate() {
                    if native.starts_with("touch") {
                        stale.push((dom_name.clone(), index, native.clone(), *listener));
                    }
                }
            }
        }
        for (dom_name, index, native, old) in stale {
            self.backend.remove_listener(element, &native, old);
            let fresh = self.backend.add_listener(element, &native);
            if let Some(dom_events) = &mut self.state_mut(node)?.dom_events {
                if let Some(binding) = dom_events.bindings.get_mut(&dom_name) {
                    binding.entries[index].1 = fresh;
                }
            }
            tracing::trace!(node = node.0, event = %native, "re-armed touch listener");
        }
        Ok(())
    }

    fn bind_native(&mut self, node: NodeId, dom_name: &str) -> DomResult<()> {
        let already_bound = match &self.state(node)?.dom_events {
            None => return Ok(()),
            Some(dom_events) => dom_events.bindings.contains_key(dom_name),
        };
        if already_bound {
            return Ok(());
        }
        let element = self.state(node)?.element.ok_or(DomError::NotAssigned)?;

        let (kind, natives): (BindingKind, Vec<String>) = if !self.backend.supports_touch() {
            match translate_for_mouse_only(dom_name) {
                None => return Ok(()),
                Some(native) if native != dom_name => {
                    (BindingKind::Translated, vec![native.to_string()])
                }
                Some(native) => (BindingKind::Plain, vec![native.to_string()]),
            }
        } else if let Some(pair) = gesture_pair(dom_name) {
            (
                BindingKind::Gesture(pair.kind),
                vec![pair.touch.to_string(), pair.mouse.to_string()],
            )
        } else {
            (BindingKind::Plain, vec![dom_name.to_string()])
        };

        let entries: Vec<(String, ListenerId)> = natives
            .into_iter()
            .map(|native| {
                let listener = self.backend.add_listener(element, &native);
                (native, listener)
            })
            .collect();
        tracing::debug!(node = node.0, event = dom_name, "bound native listeners");

        if let Some(dom_events) = &mut self.state_mut(node)?.dom_events {
            dom_events
                .bindings
                .insert(dom_name.to_string(), DomBinding { kind, entries });
        }
        Ok(())
    }

    fn unbind_native(&mut self, node: NodeId, dom_name: &str) -> DomResult<()> {
        let removed = self
            .state_mut(node)?
            .dom_events
            .as_mut()
            .and_then(|dom_events| dom_events.bindings.remove(dom_name));
        if let Some(binding) = removed {
            let element = self.require_element(node)?;
            for (native, listener) in binding.entries {
                self.backend.remove_listener(element, &native, listener);
            }
            tracing::debug!(node = node.0, event = dom_name, "unbound native listeners");
        }
        Ok(())
    }
}

/// Per-event suppression decision. Returns whether the logical event fires.
/// Lock mutations happen here so the decision and its side effect stay in
/// one place.
fn decide(kind: BindingKind, event: &NativeEvent, lock: &TouchLock) -> bool {
    match kind {
        BindingKind::Gesture(gesture) => {
            let is_touch = event.name.starts_with("touch");
            match (gesture, is_touch) {
                (GestureKind::Start | GestureKind::End, true) => {
                    lock.engage(event.timestamp_ms);
                    true
                }
                (GestureKind::Move, true) => true,
                (GestureKind::Start, false) => {
                    if lock.is_locked_at(event.timestamp_ms) || !event.primary_button {
                        tracing::trace!(event = %event.name, "suppressed duplicate gesture start");
                        false
                    } else {
                        true
                    }
                }
                (GestureKind::Move, false) => {
                    // Any held lock silences desktop mouse moves, with no
                    // threshold expiry. The asymmetry with the windowed
                    // down/up checks is intentional: a move arriving right
                    // after a held lock must not flush through as a desktop
                    // gesture.
                    !lock.is_engaged() && event.primary_button
                }
                (GestureKind::End, false) => {
                    if lock.is_locked_at(event.timestamp_ms) || !event.primary_button {
                        lock.reset();
                        tracing::trace!(event = %event.name, "suppressed duplicate gesture end");
                        false
                    } else {
                        true
                    }
                }
            }
        }
        BindingKind::Translated | BindingKind::Plain => {
            // on desktop, only the left button starts or drags
            !(matches!(event.name.as_str(), "mousedown" | "mousemove") && !event.primary_button)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_engages_and_expires() {
        let lock = TouchLock::new(500);
        assert!(!lock.is_engaged());

        lock.engage(1_000);
        assert!(lock.is_engaged());
        assert!(lock.is_locked_at(1_000));
        assert!(lock.is_locked_at(1_499));
        assert!(!lock.is_locked_at(1_500));

        // engaged even after the window has passed
        assert!(lock.is_engaged());

        lock.reset();
        assert!(!lock.is_engaged());
        assert!(!lock.is_locked_at(1_100));
    }

    #[test]
    fn test_lock_clones_share_state() {
        let lock = TouchLock::default();
        let twin = lock.clone();

        lock.engage(42);
        assert!(twin.is_engaged());

        twin.reset();
        assert!(!lock.is_engaged());
    }

    #[test]
    fn test_gesture_pair_table() {
        assert!(gesture_pair("touchstart").is_some());
        assert!(gesture_pair("touchmove").is_some());
        assert!(gesture_pair("touchend").is_some());
        assert!(gesture_pair("touchcancel").is_none());
        assert!(gesture_pair("keydown").is_none());
    }

    #[test]
    fn test_mouse_only_translation() {
        assert_eq!(translate_for_mouse_only("touchstart"), Some("mousedown"));
        assert_eq!(translate_for_mouse_only("touchend"), Some("mouseup"));
        assert_eq!(translate_for_mouse_only("touchcancel"), None);
        assert_eq!(translate_for_mouse_only("keydown"), Some("keydown"));
    }

    #[test]
    fn test_decide_touch_start_engages_lock() {
        let lock = TouchLock::new(500);
        let start = NativeEvent::touch("touchstart", 100);

        assert!(decide(BindingKind::Gesture(GestureKind::Start), &start, &lock));
        assert!(lock.is_engaged());
    }

    #[test]
    fn test_decide_mouse_move_ignores_threshold_expiry() {
        let lock = TouchLock::new(500);
        lock.engage(0);

        let late_move = NativeEvent::mouse("mousemove", true, 10_000);
        assert!(!decide(
            BindingKind::Gesture(GestureKind::Move),
            &late_move,
            &lock
        ));
    }

    #[test]
    fn test_decide_suppressed_mouse_up_clears_lock() {
        let lock = TouchLock::new(500);
        lock.engage(0);

        let up = NativeEvent::mouse("mouseup", true, 100);
        assert!(!decide(BindingKind::Gesture(GestureKind::End), &up, &lock));
        assert!(!lock.is_engaged());
    }
}
