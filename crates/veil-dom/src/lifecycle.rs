//! Node teardown and owned timers.

use crate::backend::{Backend, ListenerId, TimerId};
use crate::error::DomResult;
use crate::{EventArg, NodeId};

impl<B: Backend> super::Dom<B> {
    /// Schedule (or reschedule) a named one-shot timer owned by `node`.
    /// Re-setting a key cancels the previous timer under that key.
    pub fn set_timer(&mut self, node: NodeId, key: &str, delay_ms: u64) -> DomResult<TimerId> {
        self.clear_timer(node, key)?;
        let timer = self.backend.set_timeout(delay_ms);
        self.state_mut(node)?.timers.insert(key.to_string(), timer);
        Ok(timer)
    }

    /// Cancel a pending named timer. Unknown keys are ignored.
    pub fn clear_timer(&mut self, node: NodeId, key: &str) -> DomResult<()> {
        let pending = self.state_mut(node)?.timers.remove(key);
        if let Some(timer) = pending {
            self.backend.clear_timeout(timer);
        }
        Ok(())
    }

    /// Backend completion callback for a named timer: forgets the handle and
    /// emits `key` on the node. Fires nothing for keys no longer pending.
    pub fn fire_timer(&mut self, node: NodeId, key: &str) -> DomResult<()> {
        let known = self.state_mut(node)?.timers.remove(key).is_some();
        if known {
            self.emit(node, key, &EventArg::Empty);
        }
        Ok(())
    }

    /// Destroy a node and its whole subtree. Terminal: the id no longer
    /// resolves afterwards and must not be reused.
    ///
    /// Teardown order: `"destroy"` notification (observers still see live
    /// state), cached lookups, parent detachment, children (from a snapshot,
    /// since destruction mutates the list), platform element, timers, native
    /// listeners, logical subscribers.
    pub fn destroy(&mut self, node: NodeId) -> DomResult<()> {
        self.emit(node, "destroy", &EventArg::Empty);

        let element = self.state(node)?.element;

        self.state_mut(node)?.query_cache.clear();

        if let Some(parent) = self.state(node)?.parent {
            self.remove_child(parent, node)?;
        }

        let children = self.state(node)?.children.clone();
        for child in children {
            self.destroy(child)?;
        }

        if let Some(element) = element {
            self.backend.detach(element);
            self.backend.release(element);
        }

        let timers: Vec<TimerId> = self
            .state_mut(node)?
            .timers
            .drain()
            .map(|(_, timer)| timer)
            .collect();
        for timer in timers {
            self.backend.clear_timeout(timer);
        }

        let listeners: Vec<(String, ListenerId)> = self
            .state_mut(node)?
            .dom_events
            .take()
            .map(|dom_events| {
                dom_events
                    .bindings
                    .into_values()
                    .flat_map(|binding| binding.entries)
                    .collect()
            })
            .unwrap_or_default();
        if let Some(element) = element {
            for (native, listener) in listeners {
                self.backend.remove_listener(element, &native, listener);
            }
        }

        self.state_mut(node)?.emitter.clear();

        tracing::debug!(node = node.0, "node destroyed");
        self.free_slot(node);
        Ok(())
    }

    /// Destroy every child, iterating over a snapshot of the child list.
    pub(crate) fn destroy_children(&mut self, node: NodeId) -> DomResult<()> {
        let children = self.state(node)?.children.clone();
        for child in children {
            self.destroy(child)?;
        }
        Ok(())
    }
}
