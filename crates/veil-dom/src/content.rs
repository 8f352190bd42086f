//! Content state machine.
//!
//! A node holds at most one kind of content at a time: nothing, a text
//! payload, a markup payload, or child nodes. The producers in this module
//! plus the child-insertion operations in `tree` are the only places the
//! state moves, and each one tears down whatever the previous kind left
//! behind before writing.

use crate::backend::Backend;
use crate::error::DomResult;
use crate::{EventArg, NodeId};

/// Which kind of content currently occupies a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentState {
    /// No content yet (or cleared)
    #[default]
    Empty,
    /// Plain text payload
    Text,
    /// Markup payload
    Markup,
    /// Child nodes
    Children,
}

impl<B: Backend> super::Dom<B> {
    pub fn content_state(&self, node: NodeId) -> DomResult<ContentState> {
        Ok(self.state(node)?.content)
    }

    /// Current linear payload (text or markup), if any
    pub fn text(&self, node: NodeId) -> DomResult<Option<&str>> {
        Ok(self.state(node)?.linear.as_deref())
    }

    /// Set the node's text content.
    ///
    /// A `None` value is a deliberate idempotent guard and does nothing — it
    /// must not clear existing content. Writing the text already held skips
    /// the platform write but still lands the state on `Text`.
    pub fn set_text<'a>(
        &mut self,
        node: NodeId,
        value: impl Into<Option<&'a str>>,
    ) -> DomResult<()> {
        let Some(value) = value.into() else {
            return Ok(());
        };
        let element = self.require_element(node)?;

        match self.state(node)?.content {
            ContentState::Children => self.clear_content(node)?,
            ContentState::Markup => {
                self.backend.clear_content(element);
                self.state_mut(node)?.linear = None;
            }
            _ => {}
        }

        let changed = {
            let state = self.state_mut(node)?;
            if state.linear.as_deref() == Some(value) {
                false
            } else {
                state.linear = Some(value.to_string());
                true
            }
        };
        if changed {
            self.backend.set_text(element, value);
        }
        self.state_mut(node)?.content = ContentState::Text;
        Ok(())
    }

    /// Set the node's markup content. Unlike [`Dom::set_text`] the payload is
    /// always written.
    ///
    /// [`Dom::set_text`]: super::Dom::set_text
    pub fn set_markup(&mut self, node: NodeId, value: &str) -> DomResult<()> {
        let element = self.require_element(node)?;

        match self.state(node)?.content {
            ContentState::Children => self.clear_content(node)?,
            ContentState::Text => {
                self.backend.clear_content(element);
                self.state_mut(node)?.linear = None;
            }
            _ => {}
        }

        self.state_mut(node)?.linear = Some(value.to_string());
        self.backend.set_markup(element, value);
        self.state_mut(node)?.content = ContentState::Markup;
        Ok(())
    }

    /// Clear whatever content the node holds, destroying children and
    /// dropping any linear payload, then emit `"cleared"` so extra cleanup
    /// can hook in. State resets to `Empty`.
    pub fn clear_content(&mut self, node: NodeId) -> DomResult<()> {
        let element = self.require_element(node)?;
        tracing::debug!(node = node.0, "clearing node content");

        self.destroy_children(node)?;
        self.backend.clear_content(element);
        let state = self.state_mut(node)?;
        state.linear = None;
        state.content = ContentState::Empty;
        self.emit(node, "cleared", &EventArg::Empty);
        Ok(())
    }

    /// Drop a linear payload before a child insertion. Leaves `Children`
    /// state untouched; the caller sets it.
    pub(crate) fn clear_linear_payload(&mut self, node: NodeId) -> DomResult<()> {
        if matches!(
            self.state(node)?.content,
            ContentState::Text | ContentState::Markup
        ) {
            let element = self.require_element(node)?;
            self.backend.clear_content(element);
            let state = self.state_mut(node)?;
            state.linear = None;
            state.content = ContentState::Empty;
        }
        Ok(())
    }
}
