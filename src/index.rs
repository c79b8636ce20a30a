// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Navigation index.
//!
//! Rebuilt in full from a filtered view on every refresh. Ids handed out by one rebuild are
//! only meaningful until the next one.

use std::collections::HashMap;

use crate::dom::NodeId;
use crate::filter::{heading_display, DisplayText, FilteredTurn};
use crate::model::{NavId, Role};

/// Placeholder shown instead of an empty list.
pub const EMPTY_STATE: &str = "No matches found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Turn { role: Role },
    Heading { level: u8 },
}

/// Where an entry is rendered in the panel: a turn row, or a heading sub-row below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSlot {
    pub row: usize,
    pub sub: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEntry {
    id: NavId,
    kind: EntryKind,
    target: NodeId,
    item: ItemSlot,
    display: DisplayText,
    copy_text: String,
}

impl NavigationEntry {
    pub fn id(&self) -> &NavId {
        &self.id
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Weak handle to the page element this entry scrolls to.
    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn item(&self) -> ItemSlot {
        self.item
    }

    pub fn display(&self) -> &DisplayText {
        &self.display
    }

    /// Raw text placed on the clipboard by the secondary action.
    pub fn copy_text(&self) -> &str {
        &self.copy_text
    }

    pub fn is_turn(&self) -> bool {
        matches!(self.kind, EntryKind::Turn { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSubRow {
    pub id: NavId,
    pub level: u8,
    pub display: DisplayText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRow {
    pub id: NavId,
    pub role: Role,
    pub display: DisplayText,
    pub headings: Vec<PanelSubRow>,
}

/// The rendered list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelView {
    List(Vec<PanelRow>),
    #[default]
    Empty,
}

impl PanelView {
    pub fn rows(&self) -> &[PanelRow] {
        match self {
            Self::List(rows) => rows,
            Self::Empty => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NavigationIndex {
    entries: Vec<NavigationEntry>,
    by_id: HashMap<NavId, usize>,
    view: PanelView,
}

impl NavigationIndex {
    /// Replaces every entry with the ones described by `filtered`.
    ///
    /// Turn ids use the turn's position in the unfiltered extraction, heading ids the heading's
    /// position inside its turn, so ids stay put while the filter changes.
    pub fn rebuild(&mut self, filtered: &[FilteredTurn<'_>], term: &str) {
        self.entries.clear();
        self.by_id.clear();
        let mut rows = Vec::with_capacity(filtered.len());

        for (row, entry) in filtered.iter().enumerate() {
            let turn = entry.turn();
            let id = NavId::turn(entry.index());
            self.push(NavigationEntry {
                id: id.clone(),
                kind: EntryKind::Turn { role: turn.role() },
                target: turn.element(),
                item: ItemSlot { row, sub: None },
                display: entry.display().clone(),
                copy_text: turn.text().to_owned(),
            });

            let mut sub_rows = Vec::with_capacity(entry.headings().len());
            for (sub, (heading_index, heading)) in entry.headings().iter().enumerate() {
                let heading_id = NavId::heading(&id, *heading_index);
                let display = heading_display(heading, term);
                self.push(NavigationEntry {
                    id: heading_id.clone(),
                    kind: EntryKind::Heading { level: heading.level() },
                    target: heading.element(),
                    item: ItemSlot { row, sub: Some(sub) },
                    display: display.clone(),
                    copy_text: heading.text().to_owned(),
                });
                sub_rows.push(PanelSubRow { id: heading_id, level: heading.level(), display });
            }

            rows.push(PanelRow {
                id,
                role: turn.role(),
                display: entry.display().clone(),
                headings: sub_rows,
            });
        }

        self.view = if rows.is_empty() { PanelView::Empty } else { PanelView::List(rows) };
    }

    fn push(&mut self, entry: NavigationEntry) {
        self.by_id.insert(entry.id.clone(), self.entries.len());
        self.entries.push(entry);
    }

    /// Entries in focus order.
    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    pub fn focus_order(&self) -> impl Iterator<Item = &NavId> + '_ {
        self.entries.iter().map(|entry| &entry.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, id: &NavId) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &NavId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get(&self, id: &NavId) -> Option<&NavigationEntry> {
        self.position(id).map(|index| &self.entries[index])
    }

    pub fn entry_at(&self, index: usize) -> Option<&NavigationEntry> {
        self.entries.get(index)
    }

    pub fn view(&self) -> &PanelView {
        &self.view
    }
}
