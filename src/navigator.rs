// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The navigation session.
//!
//! [`Navigator`] is the one context object of a page session. The host feeds it page signals
//! (mutations, scroll events, frames, clock ticks) and user input; every handler runs to
//! completion before the next one starts.

use thiserror::Error;
use tracing::{debug, warn};

use crate::adapter::{find_conversation_container, SiteAdapter};
use crate::config::{ConfigError, NavigatorConfig};
use crate::dom::{Document, MutationRecord, NodeId, ScrollBehavior};
use crate::extract::extract;
use crate::filter::filter;
use crate::focus::{self, FocusMove};
use crate::index::{NavigationEntry, NavigationIndex, PanelView};
use crate::keymap::NavCommand;
use crate::model::{ConversationTurn, NavId, NavigationState, ViewLevel};
use crate::placement::{clamp_dropped, clamp_resized, DragState, PanelPosition, PanelSize, Placement};
use crate::schedule::{FrameGate, Millis, Scheduler, TaskKind};
use crate::scroll::{
    find_scrollable_ancestor, progress_percent, reference_line, scroll_target_top, ScrollBinding,
};
use crate::store::PositionStore;
use crate::tracker::nearest_entry;

/// Row text shown while the copy confirmation is up.
pub const COPY_CONFIRMATION: &str = "Copied to clipboard!";

/// Default panel footprint in pixels, until the host reports the real one.
const DEFAULT_PANEL_SIZE: PanelSize = PanelSize { width: 320.0, height: 480.0 };

#[derive(Debug, Error)]
pub enum StartError {
    #[error("no site adapter matches host {host:?}")]
    NoAdapterMatch { host: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub struct Navigator {
    adapter: SiteAdapter,
    config: NavigatorConfig,
    host: String,
    state: NavigationState,
    turns: Vec<ConversationTurn>,
    index: NavigationIndex,
    container: Option<NodeId>,
    binding: ScrollBinding,
    scheduler: Scheduler,
    frame: FrameGate,
    progress: u8,
    placement: Placement,
    panel_size: PanelSize,
    drag: Option<DragState>,
    drag_preview: Option<PanelPosition>,
    copy_flash: Option<NavId>,
    store: Box<dyn PositionStore>,
    refreshes: u64,
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("adapter", &self.adapter)
            .field("host", &self.host)
            .field("state", &self.state)
            .field("entries", &self.index.len())
            .field("container", &self.container)
            .field("placement", &self.placement)
            .finish_non_exhaustive()
    }
}

impl Navigator {
    /// Starts a session on `doc`.
    ///
    /// Fails with [`StartError::NoAdapterMatch`] when no site adapter claims the page; the host
    /// then stays inert. A page without a conversation container yet is not an error: the
    /// first mutation that makes one available starts navigation.
    pub fn start(
        doc: &mut Document,
        config: NavigatorConfig,
        store: Box<dyn PositionStore>,
        now: Millis,
    ) -> Result<Self, StartError> {
        config.validate()?;
        let host = doc.host().to_owned();
        let adapter =
            SiteAdapter::select(&host).ok_or_else(|| StartError::NoAdapterMatch { host: host.clone() })?;

        let mut navigator = Self {
            adapter,
            config,
            host,
            state: NavigationState::default(),
            turns: Vec::new(),
            index: NavigationIndex::default(),
            container: None,
            binding: ScrollBinding::default(),
            scheduler: Scheduler::default(),
            frame: FrameGate::default(),
            progress: 0,
            placement: Placement::Anchored,
            panel_size: DEFAULT_PANEL_SIZE,
            drag: None,
            drag_preview: None,
            copy_flash: None,
            store,
            refreshes: 0,
        };
        debug!(adapter = %adapter, host = %navigator.host, "starting navigator");

        if let Some(container) = find_conversation_container(doc, adapter) {
            navigator.set_container(doc, container);
        }
        navigator.restore_position();
        navigator.refresh(doc, now);
        Ok(navigator)
    }

    // --- accessors -----------------------------------------------------------------------------

    pub fn adapter(&self) -> SiteAdapter {
        self.adapter
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn index(&self) -> &NavigationIndex {
        &self.index
    }

    pub fn panel_view(&self) -> &PanelView {
        self.index.view()
    }

    /// Turns of the last extraction, unfiltered.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    pub fn binding(&self) -> &ScrollBinding {
        &self.binding
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Scroll progress of the resolved scroll node in percent.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Number of completed rebuilds.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes
    }

    pub fn focused_entry(&self) -> Option<&NavigationEntry> {
        self.state.focused_index().and_then(|index| self.index.entry_at(index))
    }

    /// Whether `id`'s row currently shows the copy confirmation.
    pub fn is_copy_flash(&self, id: &NavId) -> bool {
        self.copy_flash.as_ref() == Some(id)
    }

    /// Whether a scroll reaction waits for the next frame.
    pub fn wants_frame(&self) -> bool {
        self.frame.is_requested()
    }

    pub fn set_panel_size(&mut self, size: PanelSize) {
        self.panel_size = size;
    }

    /// Where the panel is drawn, including an in-progress drag.
    pub fn panel_position(&self, doc: &Document) -> PanelPosition {
        self.drag_preview.unwrap_or_else(|| self.placement.resolve(self.panel_size, doc.viewport()))
    }

    // --- page signals --------------------------------------------------------------------------

    /// Reacts to a batch of mutation records.
    ///
    /// A changed conversation container is picked up at once and rebuilt immediately. Changes
    /// inside the current container schedule a debounced rebuild.
    pub fn on_mutations(&mut self, doc: &mut Document, records: &[MutationRecord], now: Millis) {
        if records.is_empty() {
            return;
        }
        if let Some(candidate) = find_conversation_container(doc, self.adapter) {
            if Some(candidate) != self.container {
                debug!(?candidate, "conversation container changed");
                self.set_container(doc, candidate);
                self.refresh(doc, now);
                return;
            }
        }
        let Some(container) = self.container else {
            return;
        };
        if records.iter().any(|record| doc.contains(container, record.target)) {
            self.scheduler.schedule(TaskKind::Refresh, now, self.config.refresh_debounce_ms);
        }
    }

    /// Scroll event fired by `scrolled`. Returns `true` when it queued a frame callback.
    pub fn on_scroll(&mut self, doc: &Document, scrolled: NodeId) -> bool {
        self.binding.hears(doc, scrolled) && self.frame.request()
    }

    /// Frame callback: runs the queued scroll reaction, if any.
    pub fn on_frame(&mut self, doc: &Document) {
        if self.frame.take() {
            self.sync_position(doc);
        }
    }

    /// Runs every deferred task due at `now`.
    pub fn advance(&mut self, doc: &mut Document, now: Millis) {
        for task in self.scheduler.due(now) {
            match task {
                TaskKind::Refresh => {
                    self.refresh(doc, now);
                }
                TaskKind::ReleaseSuppression => {
                    self.state.set_tracking_suppressed(false);
                    debug!("scroll tracking resumed");
                }
                TaskKind::ProgressSync => self.sync_position(doc),
                TaskKind::CopyFlashRevert => self.copy_flash = None,
                TaskKind::ResizeClamp => self.clamp_after_resize(doc),
            }
        }
    }

    /// Viewport size changed; clamping is debounced.
    pub fn on_resize(&mut self, now: Millis) {
        self.scheduler.schedule(TaskKind::ResizeClamp, now, self.config.resize_debounce_ms);
    }

    // --- rebuild -------------------------------------------------------------------------------

    /// Re-extracts the turns and rebuilds the index.
    ///
    /// Returns `false` when no conversation container is available; the next mutation retries.
    pub fn refresh(&mut self, doc: &mut Document, now: Millis) -> bool {
        let container = match self.container {
            Some(container) if doc.is_connected(container) => container,
            _ => match find_conversation_container(doc, self.adapter) {
                Some(container) => {
                    self.set_container(doc, container);
                    container
                }
                None => {
                    debug!("no conversation container, refresh skipped");
                    return false;
                }
            },
        };

        let turns = extract(doc, self.adapter, container);
        let rebound = self.rebind_from_turns(doc, &turns);
        self.turns = turns;
        self.rebuild_index();
        self.refreshes += 1;
        debug!(turns = self.turns.len(), entries = self.index.len(), "navigation rebuilt");

        if rebound {
            self.sync_position(doc);
        }
        if !self.state.is_searching() {
            self.scheduler.schedule(TaskKind::ProgressSync, now, self.config.progress_delay_ms);
        }
        true
    }

    fn rebuild_index(&mut self) {
        let filtered = filter(&self.turns, self.state.view_level(), self.state.search_term(), &self.config.text);
        self.index.rebuild(&filtered, self.state.search_term());
        let active_alive = self.state.active_id().is_some_and(|id| self.index.contains(id));
        self.state.reconcile(self.index.len(), active_alive);
        if self.copy_flash.as_ref().is_some_and(|id| !self.index.contains(id)) {
            self.copy_flash = None;
            self.scheduler.cancel(TaskKind::CopyFlashRevert);
        }
    }

    fn set_container(&mut self, doc: &mut Document, container: NodeId) {
        self.container = Some(container);
        if self.binding.bind(doc, container) {
            debug!(?container, "scroll listener bound to conversation container");
        }
        self.sync_position(doc);
    }

    /// Resolves the scroll node from the first connected turn and moves the listener to it.
    fn rebind_from_turns(&mut self, doc: &mut Document, turns: &[ConversationTurn]) -> bool {
        let Some(anchor) = turns.iter().map(ConversationTurn::element).find(|el| doc.is_connected(*el)) else {
            return false;
        };
        let source = find_scrollable_ancestor(doc, anchor, self.config.scroll_threshold_px);
        let rebound = self.binding.bind(doc, source);
        if rebound {
            debug!(?source, listener = ?self.binding.listener(), "scroll source resolved");
        }
        self.state.set_resolved_scroll_node(Some(source));
        rebound
    }

    fn scroll_source(&self, doc: &Document) -> NodeId {
        self.binding.source().or(self.container).unwrap_or_else(|| doc.scrolling_element())
    }

    fn header_offset(&self, doc: &Document) -> f64 {
        self.config.header_offset(doc.viewport().height)
    }

    /// Updates the progress figure and, unless suppressed, the active entry.
    fn sync_position(&mut self, doc: &Document) {
        let source = self.scroll_source(doc);
        self.state.set_resolved_scroll_node(Some(source));
        self.progress = progress_percent(doc, source);
        if self.state.is_tracking_suppressed() {
            return;
        }
        let line = reference_line(doc, source, self.header_offset(doc));
        if let Some(id) = nearest_entry(doc, &self.index, line) {
            let id = id.clone();
            self.state.set_active_id(Some(id));
        }
    }

    // --- navigation ----------------------------------------------------------------------------

    /// Jumps to the entry `id`: marks it active, suppresses tracking for the suppression window
    /// and smooth-scrolls the scroll node so the target sits just below the header offset.
    ///
    /// Returns `false` (and changes nothing) for unknown ids and targets that left the page.
    pub fn activate(&mut self, doc: &mut Document, id: &NavId, now: Millis) -> bool {
        let Some(entry) = self.index.get(id) else {
            return false;
        };
        let target = entry.target();
        if !doc.is_connected(target) {
            debug!(%id, "activation target disconnected");
            return false;
        }

        self.state.set_tracking_suppressed(true);
        self.scheduler.schedule(TaskKind::ReleaseSuppression, now, self.config.suppression_ms);
        self.state.set_active_id(Some(id.clone()));

        let source = self.scroll_source(doc);
        let offset = self.header_offset(doc);
        if let Some(top) = scroll_target_top(doc, source, target, offset) {
            doc.scroll_to(source, top, ScrollBehavior::Smooth);
        }
        if let Some(position) = self.index.position(id) {
            self.state.set_focused_index(Some(position));
        }
        debug!(%id, "jump started, scroll tracking suppressed");
        true
    }

    pub fn move_focus(&mut self, direction: FocusMove) {
        let active = self.state.active_id().and_then(|id| self.index.position(id));
        let next = focus::move_focus(self.state.focused_index(), active, direction, self.index.len());
        self.state.set_focused_index(next);
    }

    /// Activates the focused entry; no-op without focus.
    pub fn activate_focused(&mut self, doc: &mut Document, now: Millis) -> bool {
        let Some(id) = self.focused_entry().map(|entry| entry.id().clone()) else {
            return false;
        };
        self.activate(doc, &id, now)
    }

    pub fn set_search_term(&mut self, doc: &mut Document, raw: &str, now: Millis) {
        if self.state.set_search_term(raw) {
            self.refresh(doc, now);
        }
    }

    pub fn clear_search(&mut self, doc: &mut Document, now: Millis) {
        self.set_search_term(doc, "", now);
    }

    pub fn set_view_level(&mut self, doc: &mut Document, level: ViewLevel, now: Millis) {
        if self.state.set_view_level(level) {
            self.refresh(doc, now);
        }
    }

    /// Opens or closes the panel (`None` flips it). Opening puts the focus on the active
    /// entry, or the first one; closing drops it.
    pub fn toggle_open(&mut self, force: Option<bool>) {
        let open = force.unwrap_or(!self.state.is_open());
        self.state.set_open(open);
        let focus = if open {
            self.state
                .active_id()
                .and_then(|id| self.index.position(id))
                .or((!self.index.is_empty()).then_some(0))
        } else {
            None
        };
        self.state.set_focused_index(focus);
    }

    /// Applies a keyboard command. Returns `true` when it was handled.
    pub fn handle_key(&mut self, doc: &mut Document, command: NavCommand, now: Millis) -> bool {
        match command {
            NavCommand::Toggle => self.toggle_open(None),
            NavCommand::Close => self.toggle_open(Some(false)),
            NavCommand::FocusNext => self.move_focus(FocusMove::Next),
            NavCommand::FocusPrevious => self.move_focus(FocusMove::Previous),
            NavCommand::ActivateFocused => return self.activate_focused(doc, now),
            NavCommand::ShowPrompts => self.set_view_level(doc, ViewLevel::PromptsOnly, now),
            NavCommand::ShowAll => self.set_view_level(doc, ViewLevel::All, now),
            NavCommand::LeaveSearch => self.clear_search(doc, now),
        }
        true
    }

    /// Secondary action on a turn row: returns the raw turn text for the clipboard and shows
    /// the confirmation on that row for the configured time. `None` for heading rows.
    pub fn copy_turn_text(&mut self, id: &NavId, now: Millis) -> Option<String> {
        let entry = self.index.get(id).filter(|entry| entry.is_turn())?;
        let text = entry.copy_text().to_owned();
        self.copy_flash = Some(id.clone());
        self.scheduler.schedule(TaskKind::CopyFlashRevert, now, self.config.copy_flash_ms);
        Some(text)
    }

    // --- placement -----------------------------------------------------------------------------

    pub fn begin_drag(&mut self, doc: &Document, x: f64, y: f64) {
        let origin = self.placement.resolve(self.panel_size, doc.viewport());
        self.drag = Some(DragState::new(x, y, origin));
        self.drag_preview = Some(origin);
    }

    /// Pointer moved during a drag; the panel follows unclamped.
    pub fn drag_to(&mut self, x: f64, y: f64) {
        if let Some(drag) = &self.drag {
            self.drag_preview = Some(drag.moved_to(x, y));
        }
    }

    /// Drops the panel: clamps into the viewport and persists the new position.
    pub fn end_drag(&mut self, doc: &Document, x: f64, y: f64) {
        self.drag_preview = None;
        let Some(drag) = self.drag.take() else {
            return;
        };
        let position = clamp_dropped(drag.moved_to(x, y), self.panel_size, doc.viewport(), self.config.panel_margin_px);
        self.placement = Placement::Custom(position);
        self.save_position(position);
    }

    /// Back to the anchored placement; forgets the stored position.
    pub fn reset_position(&mut self) {
        self.drag = None;
        self.drag_preview = None;
        self.placement = Placement::Anchored;
        if let Err(err) = self.store.remove(&self.host) {
            warn!(host = %self.host, error = %err, "failed to reset panel position");
        }
    }

    fn clamp_after_resize(&mut self, doc: &Document) {
        let Some(position) = self.placement.custom() else {
            return;
        };
        let clamped = clamp_resized(position, self.panel_size, doc.viewport(), self.config.panel_margin_px);
        if let Some(position) = clamped {
            self.placement = Placement::Custom(position);
            self.save_position(position);
        }
    }

    fn restore_position(&mut self) {
        match self.store.load(&self.host) {
            Ok(Some(position)) => self.placement = Placement::Custom(position),
            Ok(None) => {}
            Err(err) => warn!(host = %self.host, error = %err, "failed to load panel position"),
        }
    }

    fn save_position(&mut self, position: PanelPosition) {
        if let Err(err) = self.store.save(&self.host, position) {
            warn!(host = %self.host, error = %err, "failed to save panel position");
        }
    }

    // --- lifecycle -----------------------------------------------------------------------------

    /// Detaches the scroll listener and drops every pending task.
    pub fn teardown(mut self, doc: &mut Document) {
        self.binding.unbind(doc);
        self.scheduler.cancel_all();
        self.frame.clear();
        debug!(host = %self.host, "navigator torn down");
    }
}
