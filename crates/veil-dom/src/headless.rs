//! In-memory backend.
//!
//! Stands in for a real platform: elements are plain records, listeners and
//! timers are counters, and every listener add/remove is journaled so tests
//! can assert on re-arming behaviour. Doubles as the reference
//! implementation of [`Backend`].

use std::collections::HashMap;

use crate::backend::{Backend, ElementId, ListenerId, TimerId};

/// One journaled listener operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerOp {
    Added(ElementId, String),
    Removed(ElementId, String),
}

#[derive(Debug, Default)]
struct HeadlessElement {
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    class_name: String,
    styles: HashMap<String, String>,
    attrs: HashMap<String, String>,
    text: String,
    markup: String,
    listeners: HashMap<ListenerId, String>,
    released: bool,
}

/// Recording in-memory [`Backend`]
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    touch: bool,
    elements: Vec<HeadlessElement>,
    next_listener: u64,
    next_timer: u64,
    pending_timers: Vec<TimerId>,
    text_writes: usize,
    listener_log: Vec<ListenerOp>,
}

impl HeadlessBackend {
    /// Touch-capable backend
    pub fn new() -> Self {
        Self {
            touch: true,
            ..Self::default()
        }
    }

    /// Mouse-only backend: touch event names get translated at bind time
    pub fn mouse_only() -> Self {
        Self::default()
    }

    pub fn tag(&self, element: ElementId) -> &str {
        &self.elem(element).tag
    }

    pub fn parent_of(&self, element: ElementId) -> Option<ElementId> {
        self.elem(element).parent
    }

    pub fn children_of(&self, element: ElementId) -> &[ElementId] {
        &self.elem(element).children
    }

    pub fn text_of(&self, element: ElementId) -> &str {
        &self.elem(element).text
    }

    pub fn markup_of(&self, element: ElementId) -> &str {
        &self.elem(element).markup
    }

    pub fn class_of(&self, element: ElementId) -> &str {
        &self.elem(element).class_name
    }

    pub fn style_of(&self, element: ElementId, property: &str) -> Option<&str> {
        self.elem(element).styles.get(property).map(String::as_str)
    }

    pub fn attr_of(&self, element: ElementId, name: &str) -> Option<&str> {
        self.elem(element).attrs.get(name).map(String::as_str)
    }

    pub fn is_released(&self, element: ElementId) -> bool {
        self.elem(element).released
    }

    /// Names of the element's active listeners, sorted for stable assertions
    pub fn listener_names(&self, element: ElementId) -> Vec<String> {
        let mut names: Vec<String> = self.elem(element).listeners.values().cloned().collect();
        names.sort();
        names
    }

    /// Total number of active native listeners across all elements
    pub fn active_listener_count(&self) -> usize {
        self.elements.iter().map(|e| e.listeners.len()).sum()
    }

    /// Number of text writes performed (redundant writes are skipped upstream)
    pub fn text_write_count(&self) -> usize {
        self.text_writes
    }

    pub fn pending_timer_count(&self) -> usize {
        self.pending_timers.len()
    }

    /// Journal of every listener add/remove since the last clear
    pub fn listener_log(&self) -> &[ListenerOp] {
        &self.listener_log
    }

    pub fn clear_listener_log(&mut self) {
        self.listener_log.clear();
    }

    fn elem(&self, element: ElementId) -> &HeadlessElement {
        &self.elements[element.0 as usize]
    }

    fn elem_mut(&mut self, element: ElementId) -> &mut HeadlessElement {
        &mut self.elements[element.0 as usize]
    }

    fn detach_internal(&mut self, element: ElementId) {
        if let Some(parent) = self.elem(element).parent {
            self.elem_mut(parent).children.retain(|&c| c != element);
            self.elem_mut(element).parent = None;
        }
    }

    fn matches(&self, element: ElementId, selector: &str) -> bool {
        let record = self.elem(element);
        if let Some(id) = selector.strip_prefix('#') {
            record.attrs.get("id").map(String::as_str) == Some(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            record.class_name.split_whitespace().any(|c| c == class)
        } else {
            record.tag == selector
        }
    }

    fn find_descendant(&self, element: ElementId, selector: &str) -> Option<ElementId> {
        for &child in &self.elem(element).children {
            if self.matches(child, selector) {
                return Some(child);
            }
            if let Some(found) = self.find_descendant(child, selector) {
                return Some(found);
            }
        }
        None
    }
}

impl Backend for HeadlessBackend {
    fn create_element(&mut self, tag: &str) -> ElementId {
        self.elements.push(HeadlessElement {
            tag: tag.to_string(),
            ..HeadlessElement::default()
        });
        ElementId((self.elements.len() - 1) as u32)
    }

    fn supports_touch(&self) -> bool {
        self.touch
    }

    fn append(&mut self, parent: ElementId, child: ElementId) {
        self.detach_internal(child);
        self.elem_mut(parent).children.push(child);
        self.elem_mut(child).parent = Some(parent);
    }

    fn insert_before(&mut self, parent: ElementId, child: ElementId, reference: ElementId) {
        self.detach_internal(child);
        let position = self
            .elem(parent)
            .children
            .iter()
            .position(|&c| c == reference)
            .unwrap_or(self.elem(parent).children.len());
        self.elem_mut(parent).children.insert(position, child);
        self.elem_mut(child).parent = Some(parent);
    }

    fn detach(&mut self, element: ElementId) {
        self.detach_internal(element);
    }

    fn release(&mut self, element: ElementId) {
        self.detach_internal(element);
        self.elem_mut(element).released = true;
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        self.text_writes += 1;
        let record = self.elem_mut(element);
        record.text = text.to_string();
        record.markup.clear();
    }

    fn set_markup(&mut self, element: ElementId, markup: &str) {
        let record = self.elem_mut(element);
        record.markup = markup.to_string();
        record.text.clear();
    }

    fn clear_content(&mut self, element: ElementId) {
        let record = self.elem_mut(element);
        record.text.clear();
        record.markup.clear();
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        self.elem_mut(element)
            .styles
            .insert(property.to_string(), value.to_string());
    }

    fn unset_style(&mut self, element: ElementId, property: &str) {
        self.elem_mut(element).styles.remove(property);
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.elem(element).styles.get(property).cloned()
    }

    fn set_attr(&mut self, element: ElementId, name: &str, value: &str) {
        self.elem_mut(element)
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    fn class_name(&self, element: ElementId) -> String {
        self.elem(element).class_name.clone()
    }

    fn set_class_name(&mut self, element: ElementId, value: &str) {
        self.elem_mut(element).class_name = value.to_string();
    }

    fn add_listener(&mut self, element: ElementId, event: &str) -> ListenerId {
        let listener = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.elem_mut(element)
            .listeners
            .insert(listener, event.to_string());
        self.listener_log
            .push(ListenerOp::Added(element, event.to_string()));
        listener
    }

    fn remove_listener(&mut self, element: ElementId, event: &str, listener: ListenerId) {
        self.elem_mut(element).listeners.remove(&listener);
        self.listener_log
            .push(ListenerOp::Removed(element, event.to_string()));
    }

    fn set_timeout(&mut self, _delay_ms: u64) -> TimerId {
        let timer = TimerId(self.next_timer);
        self.next_timer += 1;
        self.pending_timers.push(timer);
        timer
    }

    fn clear_timeout(&mut self, timer: TimerId) {
        self.pending_timers.retain(|&t| t != timer);
    }

    fn query_selector(&self, element: ElementId, selector: &str) -> Option<ElementId> {
        self.find_descendant(element, selector)
    }
}
