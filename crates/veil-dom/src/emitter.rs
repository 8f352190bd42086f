//! Named-event subscriber registry.
//!
//! Standard observer plumbing with one extra duty: [`Emitter::add`] reports
//! whether the subscriber is the first for its event and [`Emitter::remove`]
//! whether it was the last. Those two signals drive native listener
//! bind/unbind in the event compatibility layer.

use std::collections::HashMap;

use crate::backend::NativeEvent;

/// Subscription handle returned by [`crate::Dom::on`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubId(pub u64);

/// Payload handed to logical-event subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventArg {
    /// Lifecycle notifications carry no payload
    Empty,
    /// Re-emitted native event
    Native(NativeEvent),
}

type Handler = Box<dyn FnMut(&EventArg)>;

#[derive(Default)]
pub(crate) struct Emitter {
    channels: HashMap<String, Vec<(SubId, Handler)>>,
    next: u64,
}

impl Emitter {
    /// Register a subscriber. Returns the handle and whether it is the first
    /// subscriber for this event.
    pub(crate) fn add(&mut self, event: &str, handler: Handler) -> (SubId, bool) {
        let id = SubId(self.next);
        self.next += 1;
        let subs = self.channels.entry(event.to_string()).or_default();
        let first = subs.is_empty();
        subs.push((id, handler));
        (id, first)
    }

    /// Drop a subscriber. Returns true when it was the last one registered
    /// for this event.
    pub(crate) fn remove(&mut self, event: &str, id: SubId) -> bool {
        let Some(subs) = self.channels.get_mut(event) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|(sid, _)| *sid != id);
        let removed = subs.len() < before;
        if subs.is_empty() {
            self.channels.remove(event);
            removed
        } else {
            false
        }
    }

    /// Invoke every subscriber of `event` in registration order.
    pub(crate) fn emit(&mut self, event: &str, arg: &EventArg) {
        if let Some(subs) = self.channels.get_mut(event) {
            for (_, handler) in subs.iter_mut() {
                handler(arg);
            }
        }
    }

    pub(crate) fn subscriber_count(&self, event: &str) -> usize {
        self.channels.get(event).map_or(0, Vec::len)
    }

    /// Drop every subscriber for every event.
    pub(crate) fn clear(&mut self) {
        self.channels.clear();
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (event, subs) in &self.channels {
            map.entry(event, &subs.len());
        }
        map.finish()
    }
}
