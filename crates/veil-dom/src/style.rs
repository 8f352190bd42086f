//! Style, attribute and visibility accessors, plus the per-node query cache.
//!
//! Thin delegation to the backend; the only state kept here is the
//! visibility flag and the memoised selector lookups.

use crate::backend::{Backend, ElementId};
use crate::error::DomResult;
use crate::{EventArg, NodeId};

impl<B: Backend> super::Dom<B> {
    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> DomResult<()> {
        let element = self.require_element(node)?;
        self.backend.set_style(element, property, value);
        Ok(())
    }

    pub fn set_styles(&mut self, node: NodeId, styles: &[(&str, &str)]) -> DomResult<()> {
        let element = self.require_element(node)?;
        for (property, value) in styles {
            self.backend.set_style(element, property, value);
        }
        Ok(())
    }

    pub fn unset_style(&mut self, node: NodeId, property: &str) -> DomResult<()> {
        let element = self.require_element(node)?;
        self.backend.unset_style(element, property);
        Ok(())
    }

    pub fn style(&self, node: NodeId, property: &str) -> DomResult<Option<String>> {
        let element = self.require_element(node)?;
        Ok(self.backend.style(element, property))
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        let element = self.require_element(node)?;
        self.backend.set_attr(element, name, value);
        Ok(())
    }

    /// Make the node visible again and emit `"show"`.
    pub fn show(&mut self, node: NodeId) -> DomResult<()> {
        let element = self.require_element(node)?;
        self.emit(node, "show", &EventArg::Empty);
        self.state_mut(node)?.visible = true;
        self.backend.unset_style(element, "display");
        Ok(())
    }

    /// Hide the node and emit `"hide"`.
    pub fn hide(&mut self, node: NodeId) -> DomResult<()> {
        let element = self.require_element(node)?;
        self.emit(node, "hide", &EventArg::Empty);
        self.state_mut(node)?.visible = false;
        self.backend.set_style(element, "display", "none");
        Ok(())
    }

    pub fn is_visible(&self, node: NodeId) -> DomResult<bool> {
        Ok(self.state(node)?.visible)
    }

    /// Memoised selector lookup under this node's element. Hits are served
    /// from the per-node cache, which is dropped on destroy.
    pub fn query(&mut self, node: NodeId, selector: &str) -> DomResult<Option<ElementId>> {
        if let Some(&hit) = self.state(node)?.query_cache.get(selector) {
            return Ok(Some(hit));
        }
        let element = self.require_element(node)?;
        let found = self.backend.query_selector(element, selector);
        if let Some(found) = found {
            self.state_mut(node)?
                .query_cache
                .insert(selector.to_string(), found);
        }
        Ok(found)
    }
}
