//! DOM operation errors.

use thiserror::Error;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
///
/// All variants are programmer errors: they are reported synchronously to the
/// caller of the mutating operation and never caught or retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// Node id does not resolve to a live node (destroyed or stale)
    #[error("node not found")]
    NotFound,
    /// Node already has a backing element
    #[error("node already has an element assigned")]
    AlreadyAssigned,
    /// Assignment argument is not a usable element or tag name
    #[error("assignment requires an element or a non-empty tag name")]
    InvalidAssignment,
    /// Node has no backing element yet
    #[error("node has no element assigned")]
    NotAssigned,
    /// Sibling name collision
    #[error("parent already has a child named `{0}`")]
    NameConflict(String),
    /// Node is not a child of the given parent
    #[error("node is not a child")]
    NotAChild,
    /// Reference node is not a current child of the given parent
    #[error("reference node is not a child of this parent")]
    NotASibling,
    /// Relative insertion against a detached reference node
    #[error("reference node has no parent")]
    NoParent,
    /// Operation would make a node its own ancestor
    #[error("node cannot contain itself")]
    Hierarchy,
}
