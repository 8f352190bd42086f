//! Widget tree (arena-based allocation).
//!
//! [`Dom`] owns every node slot; [`NodeId`] handles index into it. Parent
//! links are plain back-references and never drive lifetimes — ownership
//! flows strictly downward through the ordered child lists. Child order is
//! insertion order; the name index is a secondary lookup-only index and
//! never affects ordering.

use std::collections::HashMap;

use crate::backend::{Backend, ElementId, ElementOptions, TimerId};
use crate::content::ContentState;
use crate::emitter::Emitter;
use crate::error::{DomError, DomResult};
use crate::events::{DomEventState, TouchLock};
use crate::{EventArg, NodeId};

/// Per-node state held in the arena
pub(crate) struct NodeState {
    pub(crate) element: Option<ElementId>,
    pub(crate) name: Option<String>,
    pub(crate) visible: bool,
    pub(crate) content: ContentState,
    /// Current linear (text or markup) payload
    pub(crate) linear: Option<String>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) by_name: HashMap<String, NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) emitter: Emitter,
    /// DOM-event capability; absent until `allow_dom_events`
    pub(crate) dom_events: Option<DomEventState>,
    pub(crate) timers: HashMap<String, TimerId>,
    pub(crate) query_cache: HashMap<String, ElementId>,
}

impl NodeState {
    fn new() -> Self {
        Self {
            element: None,
            name: None,
            visible: true,
            content: ContentState::Empty,
            linear: None,
            children: Vec::new(),
            by_name: HashMap::new(),
            parent: None,
            emitter: Emitter::default(),
            dom_events: None,
            timers: HashMap::new(),
            query_cache: HashMap::new(),
        }
    }
}

/// The node tree.
///
/// All operations run to completion on one thread; there is no internal
/// locking and no operation suspends.
pub struct Dom<B: Backend> {
    pub(crate) backend: B,
    nodes: Vec<Option<NodeState>>,
    free: Vec<u32>,
    pub(crate) touch_lock: TouchLock,
}

impl<B: Backend> Dom<B> {
    /// Create a tree with its own touch/mouse suppression lock.
    pub fn new(backend: B) -> Self {
        Self::with_touch_lock(backend, TouchLock::default())
    }

    /// Create a tree sharing an injected suppression lock. Trees that can
    /// receive input from the same physical device should share one lock.
    pub fn with_touch_lock(backend: B, touch_lock: TouchLock) -> Self {
        Self {
            backend,
            nodes: Vec::new(),
            free: Vec::new(),
            touch_lock,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn touch_lock(&self) -> &TouchLock {
        &self.touch_lock
    }

    /// Allocate an empty node with no backing element.
    pub fn create_node(&mut self) -> NodeId {
        if let Some(index) = self.free.pop() {
            self.nodes[index as usize] = Some(NodeState::new());
            NodeId(index)
        } else {
            self.nodes.push(Some(NodeState::new()));
            NodeId((self.nodes.len() - 1) as u32)
        }
    }

    /// Allocate a node and assign a freshly created element in one step.
    pub fn create(&mut self, tag: &str, options: ElementOptions) -> DomResult<NodeId> {
        let node = self.create_node();
        if let Err(err) = self.assign_tag(node, tag, options) {
            self.free_slot(node);
            return Err(err);
        }
        Ok(node)
    }

    /// Create an element for `tag` and make it this node's backing element.
    ///
    /// Fails with `AlreadyAssigned` when the node is already backed, and
    /// `InvalidAssignment` when the tag is blank.
    pub fn assign_tag(
        &mut self,
        node: NodeId,
        tag: &str,
        options: ElementOptions,
    ) -> DomResult<ElementId> {
        if self.state(node)?.element.is_some() {
            return Err(DomError::AlreadyAssigned);
        }
        if tag.trim().is_empty() {
            return Err(DomError::InvalidAssignment);
        }

        let element = self.backend.create_element(tag);
        if let Some(class) = &options.class_name {
            self.backend.set_class_name(element, class);
        }
        for (property, value) in &options.style {
            self.backend.set_style(element, property, value);
        }
        for (name, value) in &options.attr {
            self.backend.set_attr(element, name, value);
        }

        let state = self.state_mut(node)?;
        state.element = Some(element);
        state.name = options.name.clone();

        if let Some(text) = &options.text {
            self.set_text(node, text.as_str())?;
        }
        if options.hidden {
            self.hide(node)?;
        }
        Ok(element)
    }

    /// Adopt an existing platform element as this node's backing element.
    pub fn assign_element(&mut self, node: NodeId, element: ElementId) -> DomResult<()> {
        let state = self.state_mut(node)?;
        if state.element.is_some() {
            return Err(DomError::AlreadyAssigned);
        }
        state.element = Some(element);
        Ok(())
    }

    /// Whether `node` refers to a live (not destroyed) node.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes
            .get(node.0 as usize)
            .is_some_and(Option::is_some)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn parent(&self, node: NodeId) -> DomResult<Option<NodeId>> {
        Ok(self.state(node)?.parent)
    }

    pub fn name(&self, node: NodeId) -> DomResult<Option<&str>> {
        Ok(self.state(node)?.name.as_deref())
    }

    /// Children in display order
    pub fn children(&self, node: NodeId) -> DomResult<&[NodeId]> {
        Ok(self.state(node)?.children.as_slice())
    }

    /// Name-indexed child lookup
    pub fn child_by_name(&self, node: NodeId, name: &str) -> DomResult<Option<NodeId>> {
        Ok(self.state(node)?.by_name.get(name).copied())
    }

    /// The node's backing element, if assigned
    pub fn element(&self, node: NodeId) -> DomResult<Option<ElementId>> {
        Ok(self.state(node)?.element)
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// A child already belonging to `parent` is repositioned to the end,
    /// preserving identity; a child belonging elsewhere is detached first.
    /// Fails with `NameConflict` before any mutation when the child's name is
    /// taken by a different sibling.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if parent == child {
            return Err(DomError::Hierarchy);
        }
        let parent_element = self.require_element(parent)?;
        let child_element = self.require_element(child)?;
        let child_name = self.state(child)?.name.clone();
        let old_parent = self.state(child)?.parent;

        self.check_name_conflict(parent, child, child_name.as_deref())?;

        if old_parent == Some(parent) {
            // reposition to the end, identity preserved
            let state = self.state_mut(parent)?;
            state.children.retain(|&c| c != child);
            state.children.push(child);
            self.backend.append(parent_element, child_element);
            self.rebind_touch_listeners(child)?;
            return Ok(child);
        }

        if let Some(previous) = old_parent {
            self.unlink(previous, child)?;
        }
        self.clear_linear_payload(parent)?;

        let state = self.state_mut(parent)?;
        state.children.push(child);
        if let Some(name) = child_name {
            state.by_name.insert(name, child);
        }
        state.content = ContentState::Children;
        self.state_mut(child)?.parent = Some(parent);

        self.backend.append(parent_element, child_element);
        // touch listeners are known to get lost on reattachment
        self.rebind_touch_listeners(child)?;
        Ok(child)
    }

    /// Create a node for `tag` and append it to `parent`.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        tag: &str,
        options: ElementOptions,
    ) -> DomResult<NodeId> {
        let child = self.create(tag, options)?;
        match self.append_child(parent, child) {
            Ok(id) => Ok(id),
            Err(err) => {
                self.destroy(child)?;
                Err(err)
            }
        }
    }

    /// Append `child` to `parent` (argument order flipped for call sites that
    /// read child-first).
    pub fn append_to(&mut self, child: NodeId, parent: NodeId) -> DomResult<NodeId> {
        self.append_child(parent, child)
    }

    /// Insert `child` immediately before `reference` under `parent`.
    ///
    /// With `reference = None` this behaves as [`Dom::append_child`]. Fails
    /// with `NotASibling` when the reference is not a current child of
    /// `parent`.
    pub fn insert_child_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        let Some(reference) = reference else {
            return self.append_child(parent, child);
        };
        if parent == child {
            return Err(DomError::Hierarchy);
        }
        if !self.state(parent)?.children.contains(&reference) {
            return Err(DomError::NotASibling);
        }
        if reference == child {
            // already exactly in place
            return Ok(child);
        }

        let parent_element = self.require_element(parent)?;
        let child_element = self.require_element(child)?;
        let reference_element = self.require_element(reference)?;
        let child_name = self.state(child)?.name.clone();
        let old_parent = self.state(child)?.parent;

        self.check_name_conflict(parent, child, child_name.as_deref())?;

        let same_parent = old_parent == Some(parent);
        if same_parent {
            self.state_mut(parent)?.children.retain(|&c| c != child);
        } else if let Some(previous) = old_parent {
            self.unlink(previous, child)?;
        }
        self.clear_linear_payload(parent)?;

        let state = self.state_mut(parent)?;
        let index = state
            .children
            .iter()
            .position(|&c| c == reference)
            .ok_or(DomError::NotASibling)?;
        state.children.insert(index, child);
        if !same_parent {
            if let Some(name) = child_name {
                state.by_name.insert(name, child);
            }
        }
        state.content = ContentState::Children;
        self.state_mut(child)?.parent = Some(parent);

        self.backend
            .insert_before(parent_element, child_element, reference_element);
        self.rebind_touch_listeners(child)?;
        Ok(child)
    }

    /// Insert `child` as the first child of `parent`. No-op when it already
    /// is the first child.
    pub fn insert_as_first_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        match self.state(parent)?.children.first().copied() {
            Some(first) if first == child => Ok(child),
            Some(first) => self.insert_child_before(parent, child, Some(first)),
            None => self.append_child(parent, child),
        }
    }

    /// Insert `node` immediately before `sibling`, under the sibling's
    /// parent. Fails with `NoParent` when the sibling is detached.
    pub fn insert_before(&mut self, node: NodeId, sibling: NodeId) -> DomResult<NodeId> {
        let parent = self.state(sibling)?.parent.ok_or(DomError::NoParent)?;
        self.insert_child_before(parent, node, Some(sibling))
    }

    /// Remove `child` from `parent`, returning it detached.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        let position = self
            .state(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(DomError::NotAChild)?;

        let element = self.state(child)?.element;
        let name = self.state(child)?.name.clone();

        let state = self.state_mut(parent)?;
        state.children.remove(position);
        if let Some(name) = name {
            if state.by_name.get(&name) == Some(&child) {
                state.by_name.remove(&name);
            }
        }
        self.state_mut(child)?.parent = None;

        if let Some(element) = element {
            self.backend.detach(element);
        }
        Ok(child)
    }

    /// Remove the child registered under `name`.
    pub fn remove_child_by_name(&mut self, parent: NodeId, name: &str) -> DomResult<NodeId> {
        let child = self
            .state(parent)?
            .by_name
            .get(name)
            .copied()
            .ok_or(DomError::NotAChild)?;
        self.remove_child(parent, child)
    }

    /// Emit a logical event with no payload on a node. Unknown events have no
    /// subscribers and do nothing.
    pub fn emit_event(&mut self, node: NodeId, event: &str) {
        self.emit(node, event, &EventArg::Empty);
    }

    /// Emit a logical event carrying an explicit payload.
    pub fn emit_event_with(&mut self, node: NodeId, event: &str, arg: &EventArg) {
        self.emit(node, event, arg);
    }

    // -- crate internals ----------------------------------------------------

    pub(crate) fn state(&self, node: NodeId) -> DomResult<&NodeState> {
        self.nodes
            .get(node.0 as usize)
            .and_then(|slot| slot.as_ref())
            .ok_or(DomError::NotFound)
    }

    pub(crate) fn state_mut(&mut self, node: NodeId) -> DomResult<&mut NodeState> {
        self.nodes
            .get_mut(node.0 as usize)
            .and_then(|slot| slot.as_mut())
            .ok_or(DomError::NotFound)
    }

    pub(crate) fn require_element(&self, node: NodeId) -> DomResult<ElementId> {
        self.state(node)?.element.ok_or(DomError::NotAssigned)
    }

    /// Notify the node's logical-event subscribers. A missing node is
    /// silently skipped; emission is never an error.
    pub(crate) fn emit(&mut self, node: NodeId, event: &str, arg: &EventArg) {
        if let Ok(state) = self.state_mut(node) {
            state.emitter.emit(event, arg);
        }
    }

    pub(crate) fn free_slot(&mut self, node: NodeId) {
        if let Some(slot) = self.nodes.get_mut(node.0 as usize) {
            if slot.take().is_some() {
                self.free.push(node.0);
            }
        }
    }

    /// Bookkeeping-only detach: drops the parent/child link without touching
    /// the platform element (reattachment moves it anyway).
    fn unlink(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let name = self.state(child)?.name.clone();
        let state = self.state_mut(parent)?;
        state.children.retain(|&c| c != child);
        if let Some(name) = name {
            if state.by_name.get(&name) == Some(&child) {
                state.by_name.remove(&name);
            }
        }
        self.state_mut(child)?.parent = None;
        Ok(())
    }

    fn check_name_conflict(
        &self,
        parent: NodeId,
        child: NodeId,
        name: Option<&str>,
    ) -> DomResult<()> {
        if let Some(name) = name {
            if let Some(&existing) = self.state(parent)?.by_name.get(name) {
                if existing != child {
                    return Err(DomError::NameConflict(name.to_string()));
                }
            }
        }
        Ok(())
    }
}
