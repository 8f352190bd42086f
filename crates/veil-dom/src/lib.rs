//! veil-dom - Retained UI node tree
//!
//! A thin object tree over native platform elements: name-indexed
//! parent/child structure, a per-node content state machine, and a
//! compatibility layer that folds touch and mouse input into one logical
//! event stream.
//!
//! Everything platform-specific sits behind the [`Backend`] trait; the crate
//! ships [`HeadlessBackend`] as the in-memory implementation used by the test
//! suites.

mod backend;
mod classes;
mod content;
mod emitter;
mod error;
mod events;
mod headless;
mod lifecycle;
mod style;
mod tree;

pub use backend::{Backend, ElementId, ElementOptions, ListenerId, NativeEvent, TimerId};
pub use classes::{join_class_names, parse_class_names, remove_class_names, unique_class_names};
pub use content::ContentState;
pub use emitter::{EventArg, SubId};
pub use error::{DomError, DomResult};
pub use events::{TouchLock, DEFAULT_LOCK_THRESHOLD_MS, DOM_EVENT_PREFIX};
pub use headless::{HeadlessBackend, ListenerOp};
pub use tree::Dom;

/// Node identifier (index into the arena held by [`Dom`])
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);
