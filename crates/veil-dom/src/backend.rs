//! Platform backend boundary.
//!
//! The tree never talks to a real toolkit directly; everything it needs from
//! the platform goes through [`Backend`]: element construction and
//! (re)attachment, content and style writes, native event listeners, and
//! one-shot timers.

/// Platform element handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u32);

/// Handle for one active native event listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Handle for one pending one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Element construction options, recognized by [`crate::Dom::create`] and
/// [`crate::Dom::assign_tag`].
#[derive(Debug, Clone, Default)]
pub struct ElementOptions {
    /// Initial class attribute
    pub class_name: Option<String>,
    /// Initial style properties
    pub style: Vec<(String, String)>,
    /// Initial attributes
    pub attr: Vec<(String, String)>,
    /// Initial text content
    pub text: Option<String>,
    /// Sibling-unique node name
    pub name: Option<String>,
    /// Start hidden
    pub hidden: bool,
}

/// A native input event as delivered by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeEvent {
    /// Native event name (`touchstart`, `mousedown`, ...)
    pub name: String,
    /// Whether the primary (left) button produced the event
    pub primary_button: bool,
    /// Delivery time in milliseconds, monotonic within one event source
    pub timestamp_ms: u64,
}

impl NativeEvent {
    /// Touch-originated event. Touch input has no button, so the primary
    /// indicator is always set.
    pub fn touch(name: &str, timestamp_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            primary_button: true,
            timestamp_ms,
        }
    }

    /// Mouse-originated event
    pub fn mouse(name: &str, primary_button: bool, timestamp_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            primary_button,
            timestamp_ms,
        }
    }
}

/// Platform surface consumed by [`crate::Dom`].
///
/// Attachment follows display-tree semantics: appending or inserting an
/// element that is already attached somewhere moves it, it never duplicates.
pub trait Backend {
    /// Create a platform element for the given tag
    fn create_element(&mut self, tag: &str) -> ElementId;

    /// Whether this platform ever reports touch input
    fn supports_touch(&self) -> bool;

    /// Attach `child` at the end of `parent`
    fn append(&mut self, parent: ElementId, child: ElementId);

    /// Attach `child` immediately before `reference` under `parent`
    fn insert_before(&mut self, parent: ElementId, child: ElementId, reference: ElementId);

    /// Detach an element from its parent, keeping it alive
    fn detach(&mut self, element: ElementId);

    /// Release an element for good
    fn release(&mut self, element: ElementId);

    /// Write text content
    fn set_text(&mut self, element: ElementId, text: &str);

    /// Write markup content
    fn set_markup(&mut self, element: ElementId, markup: &str);

    /// Drop all text and markup content
    fn clear_content(&mut self, element: ElementId);

    /// Set one style property
    fn set_style(&mut self, element: ElementId, property: &str, value: &str);

    /// Remove one style property
    fn unset_style(&mut self, element: ElementId, property: &str);

    /// Read one style property
    fn style(&self, element: ElementId, property: &str) -> Option<String>;

    /// Set an attribute
    fn set_attr(&mut self, element: ElementId, name: &str, value: &str);

    /// Read the class attribute
    fn class_name(&self, element: ElementId) -> String;

    /// Overwrite the class attribute
    fn set_class_name(&mut self, element: ElementId, value: &str);

    /// Subscribe to a native event on an element
    fn add_listener(&mut self, element: ElementId, event: &str) -> ListenerId;

    /// Remove one native event subscription
    fn remove_listener(&mut self, element: ElementId, event: &str, listener: ListenerId);

    /// Schedule a one-shot timer
    fn set_timeout(&mut self, delay_ms: u64) -> TimerId;

    /// Cancel a pending timer
    fn clear_timeout(&mut self, timer: TimerId);

    /// Find the first descendant of `element` matching a selector
    fn query_selector(&self, element: ElementId, selector: &str) -> Option<ElementId>;
}
