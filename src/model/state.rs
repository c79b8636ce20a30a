// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use crate::dom::NodeId;
use crate::focus::clamp_focus;

use super::ids::NavId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewLevel {
    /// Only the user's prompts.
    PromptsOnly,
    /// Prompts, answers and answer headings.
    #[default]
    All,
}

impl fmt::Display for ViewLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PromptsOnly => f.write_str("Prompts"),
            Self::All => f.write_str("All"),
        }
    }
}

/// Session-wide navigation state.
///
/// Invariants, re-established by every rebuild:
/// - `active_id` is `None` or an id of the current focus order;
/// - `focused_index` is `None` or a valid index into the current focus order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationState {
    is_open: bool,
    active_id: Option<NavId>,
    focused_index: Option<usize>,
    search_term: String,
    view_level: ViewLevel,
    suppress_active_tracking: bool,
    resolved_scroll_node: Option<NodeId>,
}

impl NavigationState {
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn active_id(&self) -> Option<&NavId> {
        self.active_id.as_ref()
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focused_index
    }

    /// The normalized (trimmed, lower-cased) filter term; empty when not filtering.
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn is_searching(&self) -> bool {
        !self.search_term.is_empty()
    }

    pub fn view_level(&self) -> ViewLevel {
        self.view_level
    }

    pub fn is_tracking_suppressed(&self) -> bool {
        self.suppress_active_tracking
    }

    pub fn resolved_scroll_node(&self) -> Option<NodeId> {
        self.resolved_scroll_node
    }

    pub(crate) fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }

    pub(crate) fn set_active_id(&mut self, id: Option<NavId>) {
        self.active_id = id;
    }

    pub(crate) fn set_focused_index(&mut self, index: Option<usize>) {
        self.focused_index = index;
    }

    pub(crate) fn set_search_term(&mut self, raw: &str) -> bool {
        let normalized = normalize_search_term(raw);
        if normalized == self.search_term {
            return false;
        }
        self.search_term = normalized;
        true
    }

    pub(crate) fn set_view_level(&mut self, level: ViewLevel) -> bool {
        if self.view_level == level {
            return false;
        }
        self.view_level = level;
        true
    }

    pub(crate) fn set_tracking_suppressed(&mut self, suppressed: bool) {
        self.suppress_active_tracking = suppressed;
    }

    pub(crate) fn set_resolved_scroll_node(&mut self, node: Option<NodeId>) {
        self.resolved_scroll_node = node;
    }

    /// Re-establishes the invariants against a freshly built focus order.
    pub(crate) fn reconcile(&mut self, focus_len: usize, contains_active: bool) {
        if !contains_active {
            self.active_id = None;
        }
        self.focused_index = clamp_focus(self.focused_index, focus_len);
    }
}

pub fn normalize_search_term(raw: &str) -> String {
    raw.trim().to_lowercase()
}
