// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Live document model.
//!
//! An arena-backed tree carrying the slice of the DOM the navigation engine relies on: weak node
//! handles, selector queries, a stacked block layout, per-node scroll offsets, queued mutation
//! records and a scroll-listener registry. The page owns every node; callers only ever hold
//! [`NodeId`] handles, which go stale (never dangle) once the node is removed.

pub mod fixture;
mod selector;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

pub use fixture::{FixtureError, NodeSpec, PageFixture};
pub use selector::{Selector, SelectorError};

/// Height of one rendered text line, in CSS pixels.
pub const LINE_HEIGHT: f64 = 20.0;

/// Duration of a smooth scroll animation.
pub const SMOOTH_SCROLL_MS: u64 = 300;

/// Weak handle to a node in a [`Document`].
///
/// The generation guards against slot reuse: a handle to a removed node never resolves to the
/// node that later takes over its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Auto,
    Scroll,
    Overlay,
}

impl Overflow {
    /// Whether this computed value lets the box scroll its content.
    pub fn is_scrollable(self) -> bool {
        matches!(self, Self::Auto | Self::Scroll | Self::Overlay)
    }

    /// Whether the box clips descendants to its own bounds.
    pub fn clips(self) -> bool {
        !matches!(self, Self::Visible)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280.0, height: 800.0 }
    }
}

/// Where a scroll listener is registered.
///
/// Scrolls of the root scrolling element (or `body`) are delivered to [`ListenerTarget::Window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    Window,
    Element(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// A structural or text change below `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0:?} is no longer part of the document arena")]
    Gone(NodeId),
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
    #[error("node {0:?} is not a text node")]
    NotText(NodeId),
    #[error("cannot insert {child:?} under {parent:?}: it would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("the root element cannot be moved or removed")]
    Root,
}

/// Used height of an element box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BoxHeight {
    /// Sum of the children (stacked block layout).
    #[default]
    Auto,
    Px(f64),
    /// `100vh`: follows the viewport height.
    Viewport,
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: SmolStr,
    attrs: Vec<(SmolStr, String)>,
    overflow_y: Overflow,
    box_height: BoxHeight,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    offset_top: f64,
    height: f64,
    scroll_top: f64,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self { kind, parent: None, children: Vec::new(), offset_top: 0.0, height: 0.0, scroll_top: 0.0 }
    }

    fn element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug, Clone, Copy)]
struct ScrollAnimation {
    node: NodeId,
    from: f64,
    to: f64,
    elapsed_ms: u64,
}

#[derive(Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    body: Option<NodeId>,
    url: String,
    viewport: Viewport,
    mutations: Vec<MutationRecord>,
    scroll_events: Vec<NodeId>,
    listeners: Vec<ListenerTarget>,
    animations: Vec<ScrollAnimation>,
}

impl Document {
    /// Creates a document that is still "loading": it has a root `html` element but no body.
    pub fn new(url: impl Into<String>, viewport: Viewport) -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId { index: 0, generation: 0 },
            body: None,
            url: url.into(),
            viewport,
            mutations: Vec::new(),
            scroll_events: Vec::new(),
            listeners: Vec::new(),
            animations: Vec::new(),
        };
        let root = doc.allocate(Node::new(NodeKind::Element(ElementData {
            tag: SmolStr::new_inline("html"),
            attrs: Vec::new(),
            overflow_y: Overflow::Auto,
            box_height: BoxHeight::Auto,
        })));
        doc.root = root;
        doc
    }

    /// Creates a document with an empty `body`.
    pub fn with_body(url: impl Into<String>, viewport: Viewport) -> Self {
        let mut doc = Self::new(url, viewport);
        doc.ensure_body();
        doc.mutations.clear();
        doc
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Host part of the page URL (`https://claude.ai/chat/1` → `claude.ai`).
    pub fn host(&self) -> &str {
        let rest = self.url.split_once("://").map_or(self.url.as_str(), |(_, rest)| rest);
        let end = rest.find(['/', ':', '?', '#']).unwrap_or(rest.len());
        &rest[..end]
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.relayout();
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> Option<NodeId> {
        self.body.filter(|body| self.exists(*body))
    }

    /// Returns the body, creating it first if the document is still loading.
    pub fn ensure_body(&mut self) -> NodeId {
        if let Some(body) = self.body() {
            return body;
        }
        let body = self.create_element("body");
        let root = self.root;
        self.link_child(root, body, None);
        self.body = Some(body);
        self.relayout();
        body
    }

    /// The element whose scroll offset is the document's scroll offset.
    pub fn scrolling_element(&self) -> NodeId {
        self.root
    }

    /// `html`, `body` and the scrolling element all stand for the document scroller.
    pub fn is_document_scroller(&self, id: NodeId) -> bool {
        id == self.root || Some(id) == self.body()
    }

    // --- construction & mutation -------------------------------------------------------------

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.allocate(Node::new(NodeKind::Element(ElementData {
            tag: SmolStr::new(tag.to_ascii_lowercase()),
            attrs: Vec::new(),
            overflow_y: Overflow::Visible,
            box_height: BoxHeight::Auto,
        })))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.allocate(Node::new(NodeKind::Text(text.into())))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> Result<(), DomError> {
        let value = value.into();
        let data = self.element_mut(id)?;
        match data.attrs.iter_mut().find(|(key, _)| key.as_str() == name) {
            Some((_, existing)) => *existing = value,
            None => data.attrs.push((SmolStr::new(name), value)),
        }
        self.record_mutation_at_parent(id);
        Ok(())
    }

    pub fn set_overflow_y(&mut self, id: NodeId, overflow: Overflow) -> Result<(), DomError> {
        self.element_mut(id)?.overflow_y = overflow;
        Ok(())
    }

    pub fn set_box_height(&mut self, id: NodeId, height: BoxHeight) -> Result<(), DomError> {
        self.element_mut(id)?.box_height = height;
        self.relayout();
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Inserts `child` under `parent` before `reference` (or last), moving it if it is attached
    /// elsewhere.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        self.element(parent)?;
        self.node(child).ok_or(DomError::Gone(child))?;
        if child == self.root {
            return Err(DomError::Root);
        }
        if self.contains(child, parent) {
            return Err(DomError::Cycle { parent, child });
        }
        self.unlink(child);
        self.link_child(parent, child, reference);
        self.relayout();
        Ok(())
    }

    /// Detaches `id` and frees its whole subtree. Outstanding handles to any freed node go stale.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        if id == self.root {
            return Err(DomError::Root);
        }
        self.node(id).ok_or(DomError::Gone(id))?;
        self.unlink(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.take(current) {
                stack.extend(node.children);
            }
        }
        self.animations.retain(|anim| anim.node != id);
        self.relayout();
        Ok(())
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), DomError> {
        let node = self.node_mut(id).ok_or(DomError::Gone(id))?;
        match &mut node.kind {
            NodeKind::Text(existing) => *existing = text.into(),
            NodeKind::Element(_) => return Err(DomError::NotText(id)),
        }
        self.record_mutation_at_parent(id);
        self.relayout();
        Ok(())
    }

    /// Drains the queued mutation records.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    // --- tree queries --------------------------------------------------------------------------

    /// Whether the handle still resolves to a live node (attached or not).
    pub fn exists(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Whether the node is live and reachable from the root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == self.root {
                return self.exists(node_id);
            }
            current = self.node(node_id).and_then(|node| node.parent);
        }
        false
    }

    /// Inclusive containment: a node contains itself.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return self.exists(node_id);
            }
            current = self.parent(node_id);
        }
        false
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.children.as_slice())
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.node(id).and_then(Node::element).is_some()
    }

    /// Lower-case tag name, or `None` for text nodes and stale handles.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(Node::element).map(|data| data.tag.as_str())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)
            .and_then(Node::element)
            .and_then(|data| data.attrs.iter().find(|(key, _)| key.as_str() == name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn overflow_y(&self, id: NodeId) -> Overflow {
        self.node(id).and_then(Node::element).map_or(Overflow::Visible, |data| data.overflow_y)
    }

    /// Text as the user sees it: the text of every descendant text node, one per line.
    pub fn inner_text(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        if let NodeKind::Text(text) = &node.kind {
            return text.clone();
        }
        let mut parts = Vec::new();
        for descendant in self.descendants(id) {
            if let Some(NodeKind::Text(text)) = self.node(descendant).map(|node| &node.kind) {
                if !text.is_empty() {
                    parts.push(text.as_str());
                }
            }
        }
        parts.join("\n")
    }

    /// Descendants of `scope` in document (pre-)order, excluding `scope` itself.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Orders two nodes by document position, like `compareDocumentPosition`.
    ///
    /// Ancestors precede their descendants. Nodes outside the connected tree sort after every
    /// connected node.
    pub fn document_order(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let path_a = self.path_from_top(a);
        let path_b = self.path_from_top(b);
        let connected_a = path_a.first() == Some(&self.root);
        let connected_b = path_b.first() == Some(&self.root);
        match (connected_a, connected_b) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) if path_a.first() != path_b.first() => {
                return path_a.first().cmp(&path_b.first());
            }
            _ => {}
        }

        for depth in 1.. {
            match (path_a.get(depth), path_b.get(depth)) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(x), Some(y)) if x == y => continue,
                (Some(x), Some(y)) => {
                    let siblings = self.children(path_a[depth - 1]);
                    let pos_x = siblings.iter().position(|id| id == x);
                    let pos_y = siblings.iter().position(|id| id == y);
                    return pos_x.cmp(&pos_y);
                }
            }
        }
        Ordering::Equal
    }

    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        selector.matches(self, id)
    }

    /// Nearest inclusive ancestor element matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if self.is_element(node_id) && selector.matches(self, node_id) {
                return Some(node_id);
            }
            current = self.parent(node_id);
        }
        None
    }

    /// Matching descendant elements of `scope` in document order.
    pub fn query_selector_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.is_element(*id) && selector.matches(self, *id))
            .collect()
    }

    pub fn query_selector(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| self.is_element(*id) && selector.matches(self, *id))
    }

    // --- geometry ------------------------------------------------------------------------------

    /// Viewport-relative top edge of the node's border box, after every ancestor scroll offset.
    pub fn bounding_top(&self, id: NodeId) -> Option<f64> {
        let node = self.node(id)?;
        let mut top = node.offset_top;
        let mut current = node.parent;
        while let Some(parent_id) = current {
            let parent = self.node(parent_id)?;
            top += parent.offset_top - parent.scroll_top;
            current = parent.parent;
        }
        Some(top)
    }

    pub fn height(&self, id: NodeId) -> f64 {
        self.node(id).map_or(0.0, |node| node.height)
    }

    /// Visible height of the box; the root element reports the viewport height.
    pub fn client_height(&self, id: NodeId) -> f64 {
        if id == self.root {
            return self.viewport.height;
        }
        self.height(id)
    }

    /// Height of the content, never less than the client height.
    pub fn scroll_height(&self, id: NodeId) -> f64 {
        let content = self
            .children(id)
            .iter()
            .filter_map(|child| self.node(*child))
            .map(|child| child.offset_top + child.height)
            .fold(0.0, f64::max);
        content.max(self.client_height(id))
    }

    pub fn scroll_top(&self, id: NodeId) -> f64 {
        let id = self.scroll_owner(id);
        self.node(id).map_or(0.0, |node| node.scroll_top)
    }

    pub fn max_scroll_top(&self, id: NodeId) -> f64 {
        let id = self.scroll_owner(id);
        (self.scroll_height(id) - self.client_height(id)).max(0.0)
    }

    /// Visible vertical band `(top, bottom)` of the node after clipping by every clipping
    /// ancestor and the viewport. `None` when nothing of it is visible.
    pub fn visible_band(&self, id: NodeId) -> Option<(f64, f64)> {
        let top = self.bounding_top(id)?;
        let mut band = (top, top + self.height(id));
        let mut clip: (f64, f64) = (0.0, self.viewport.height);
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            if ancestor != self.root && self.overflow_y(ancestor).clips() {
                let a_top = self.bounding_top(ancestor)?;
                clip = (clip.0.max(a_top), clip.1.min(a_top + self.client_height(ancestor)));
            }
            current = self.parent(ancestor);
        }
        band = (band.0.max(clip.0), band.1.min(clip.1));
        (band.0 < band.1).then_some(band)
    }

    // --- scrolling -----------------------------------------------------------------------------

    /// Sets the scroll offset (clamped) and queues a scroll event when it changes.
    pub fn set_scroll_top(&mut self, id: NodeId, top: f64) {
        let id = self.scroll_owner(id);
        self.animations.retain(|anim| anim.node != id);
        self.apply_scroll_top(id, top);
    }

    pub fn scroll_by(&mut self, id: NodeId, delta: f64) {
        let current = self.scroll_top(id);
        self.set_scroll_top(id, current + delta);
    }

    pub fn scroll_to(&mut self, id: NodeId, top: f64, behavior: ScrollBehavior) {
        let id = self.scroll_owner(id);
        if !self.exists(id) {
            return;
        }
        match behavior {
            ScrollBehavior::Instant => self.set_scroll_top(id, top),
            ScrollBehavior::Smooth => {
                let to = top.clamp(0.0, self.max_scroll_top(id));
                let from = self.scroll_top(id);
                self.animations.retain(|anim| anim.node != id);
                if (to - from).abs() > f64::EPSILON {
                    self.animations.push(ScrollAnimation { node: id, from, to, elapsed_ms: 0 });
                }
            }
        }
    }

    /// Steps every running smooth scroll by `dt_ms`.
    pub fn advance_animations(&mut self, dt_ms: u64) {
        let mut running = std::mem::take(&mut self.animations);
        for anim in &mut running {
            anim.elapsed_ms = (anim.elapsed_ms + dt_ms).min(SMOOTH_SCROLL_MS);
            let t = anim.elapsed_ms as f64 / SMOOTH_SCROLL_MS as f64;
            let eased = 1.0 - (1.0 - t).powi(3);
            self.apply_scroll_top(anim.node, anim.from + (anim.to - anim.from) * eased);
        }
        running.retain(|anim| anim.elapsed_ms < SMOOTH_SCROLL_MS && self.exists(anim.node));
        self.animations = running;
    }

    pub fn is_animating(&self) -> bool {
        !self.animations.is_empty()
    }

    /// Drains the nodes that scrolled since the last call (consecutive duplicates collapsed).
    pub fn take_scroll_events(&mut self) -> Vec<NodeId> {
        let mut events = std::mem::take(&mut self.scroll_events);
        events.dedup();
        events
    }

    /// Listener target that receives scroll events fired by `scrolled`.
    pub fn scroll_event_target(&self, scrolled: NodeId) -> ListenerTarget {
        if self.is_document_scroller(scrolled) {
            ListenerTarget::Window
        } else {
            ListenerTarget::Element(scrolled)
        }
    }

    pub fn add_scroll_listener(&mut self, target: ListenerTarget) {
        self.listeners.push(target);
    }

    pub fn remove_scroll_listener(&mut self, target: ListenerTarget) -> bool {
        match self.listeners.iter().position(|existing| *existing == target) {
            Some(pos) => {
                self.listeners.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn scroll_listeners(&self) -> &[ListenerTarget] {
        &self.listeners
    }

    pub fn has_scroll_listener(&self, target: ListenerTarget) -> bool {
        self.listeners.contains(&target)
    }

    // --- internals -----------------------------------------------------------------------------

    fn allocate(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId { index, generation: slot.generation };
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot { generation: 0, node: Some(node) });
        NodeId { index, generation: 0 }
    }

    fn take(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(node)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        match self.node(id) {
            Some(Node { kind: NodeKind::Element(data), .. }) => Ok(data),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::Gone(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match self.node_mut(id) {
            Some(Node { kind: NodeKind::Element(data), .. }) => Ok(data),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::Gone(id)),
        }
    }

    fn link_child(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if let Some(parent_node) = self.node_mut(parent) {
            let pos = reference
                .and_then(|reference| parent_node.children.iter().position(|id| *id == reference))
                .unwrap_or(parent_node.children.len());
            parent_node.children.insert(pos, child);
        }
        if let Some(child_node) = self.node_mut(child) {
            child_node.parent = Some(parent);
        }
        self.mutations.push(MutationRecord { target: parent });
    }

    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|id| *id != child);
        }
        if let Some(child_node) = self.node_mut(child) {
            child_node.parent = None;
        }
        self.mutations.push(MutationRecord { target: parent });
    }

    fn record_mutation_at_parent(&mut self, id: NodeId) {
        let target = self.parent(id).unwrap_or(id);
        self.mutations.push(MutationRecord { target });
    }

    fn path_from_top(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            if !self.exists(node_id) {
                break;
            }
            path.push(node_id);
            current = self.parent(node_id);
        }
        path.reverse();
        path
    }

    /// `body` scrolling is routed to the scrolling element, as in standards-mode documents.
    fn scroll_owner(&self, id: NodeId) -> NodeId {
        if Some(id) == self.body() {
            self.root
        } else {
            id
        }
    }

    fn apply_scroll_top(&mut self, id: NodeId, top: f64) {
        let clamped = top.clamp(0.0, self.max_scroll_top(id));
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if (node.scroll_top - clamped).abs() > f64::EPSILON {
            node.scroll_top = clamped;
            self.scroll_events.push(id);
        }
    }

    /// Recomputes the stacked block layout and re-clamps every scroll offset.
    fn relayout(&mut self) {
        let root = self.root;
        self.layout_subtree(root);
        let scrolled: Vec<NodeId> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let node = slot.node.as_ref()?;
                (node.scroll_top > 0.0)
                    .then_some(NodeId { index: index as u32, generation: slot.generation })
            })
            .collect();
        for id in scrolled {
            let current = self.scroll_top(id);
            self.apply_scroll_top(id, current);
        }
    }

    fn layout_subtree(&mut self, id: NodeId) -> f64 {
        let Some(node) = self.node(id) else {
            return 0.0;
        };
        let (box_height, children) = match &node.kind {
            NodeKind::Text(text) => {
                let lines = if text.is_empty() { 0 } else { text.lines().count().max(1) };
                let height = lines as f64 * LINE_HEIGHT;
                if let Some(node) = self.node_mut(id) {
                    node.height = height;
                }
                return height;
            }
            NodeKind::Element(data) => (data.box_height, node.children.clone()),
        };

        let mut offset = 0.0;
        for child in children {
            let child_height = self.layout_subtree(child);
            if let Some(child_node) = self.node_mut(child) {
                child_node.offset_top = offset;
            }
            offset += child_height;
        }
        let height = match box_height {
            BoxHeight::Auto => offset,
            BoxHeight::Px(px) => px,
            BoxHeight::Viewport => self.viewport.height,
        };
        if let Some(node) = self.node_mut(id) {
            node.height = height;
        }
        height
    }
}
