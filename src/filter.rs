// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! View filtering and search.
//!
//! Applies the view level and the search term to an extracted turn list, producing a new view
//! that borrows from the input.

use std::ops::Range;

use memchr::memmem;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::extract::clean_text;
use crate::model::{ConversationTurn, Heading, ViewLevel};

const ELLIPSIS: &str = "...";

/// Display-text sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLimits {
    /// Characters of context kept before a search match.
    pub excerpt_before: usize,
    /// Characters kept from the start of a search match onwards.
    pub excerpt_after: usize,
    /// Longest cleaned display text, ellipsis included.
    pub display_max_chars: usize,
}

impl Default for TextLimits {
    fn default() -> Self {
        Self { excerpt_before: 10, excerpt_after: 30, display_max_chars: 50 }
    }
}

/// Text for one list row, with an optional highlighted byte range.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayText {
    text: String,
    highlight: Option<Range<usize>>,
}

impl DisplayText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), highlight: None }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn highlight(&self) -> Option<Range<usize>> {
        self.highlight.clone()
    }

    /// Splits into `(before, highlighted, after)`.
    pub fn segments(&self) -> (&str, &str, &str) {
        match &self.highlight {
            Some(range) => (
                &self.text[..range.start],
                &self.text[range.clone()],
                &self.text[range.end..],
            ),
            None => (&self.text, "", ""),
        }
    }
}

/// A turn that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredTurn<'a> {
    index: usize,
    turn: &'a ConversationTurn,
    headings: SmallVec<[(usize, &'a Heading); 4]>,
    display: DisplayText,
}

impl<'a> FilteredTurn<'a> {
    /// Position of the turn in the unfiltered extraction.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn turn(&self) -> &'a ConversationTurn {
        self.turn
    }

    /// Headings to list under the turn, each with its index inside the turn.
    pub fn headings(&self) -> &[(usize, &'a Heading)] {
        &self.headings
    }

    pub fn display(&self) -> &DisplayText {
        &self.display
    }
}

/// Filters `turns` by view level and the normalized search `term`.
///
/// - `PromptsOnly` drops assistant turns whatever the term.
/// - With an empty term every remaining turn passes; headings are listed only for `All`.
/// - Otherwise a turn passes when its text or one of its headings contains the term, and only
///   the matching headings are listed.
pub fn filter<'a>(
    turns: &'a [ConversationTurn],
    view_level: ViewLevel,
    term: &str,
    limits: &TextLimits,
) -> Vec<FilteredTurn<'a>> {
    let finder = (!term.is_empty()).then(|| memmem::Finder::new(term.as_bytes()));
    let mut out = Vec::new();
    for (index, turn) in turns.iter().enumerate() {
        if view_level == ViewLevel::PromptsOnly && !turn.is_user() {
            continue;
        }
        let Some(finder) = &finder else {
            let headings = match view_level {
                ViewLevel::All => turn.headings().iter().enumerate().collect(),
                ViewLevel::PromptsOnly => SmallVec::new(),
            };
            let display = DisplayText::plain(clean_text(turn.text(), limits.display_max_chars));
            out.push(FilteredTurn { index, turn, headings, display });
            continue;
        };

        let lowered = turn.text().to_lowercase();
        let text_match = finder.find(lowered.as_bytes());
        let headings = turn
            .headings()
            .iter()
            .enumerate()
            .filter(|(_, heading)| finder.find(heading.text().to_lowercase().as_bytes()).is_some())
            .collect::<SmallVec<[(usize, &Heading); 4]>>();
        let display = match text_match {
            Some(at) => excerpt(&lowered, at, term.len(), limits),
            None if headings.is_empty() => continue,
            None => DisplayText::plain(clean_text(turn.text(), limits.display_max_chars)),
        };
        out.push(FilteredTurn { index, turn, headings, display });
    }
    out
}

/// Display text of a heading row, highlighting `term` when it occurs.
pub fn heading_display(heading: &Heading, term: &str) -> DisplayText {
    let text = heading.text().trim();
    if term.is_empty() {
        return DisplayText::plain(text);
    }
    let lowered = text.to_lowercase();
    let highlight = (lowered.len() == text.len())
        .then(|| memmem::find(lowered.as_bytes(), term.as_bytes()))
        .flatten()
        .filter(|at| text.is_char_boundary(*at) && text.is_char_boundary(at + term.len()))
        .map(|at| at..at + term.len());
    DisplayText { text: text.to_owned(), highlight }
}

/// Excerpt of `lowered` around the match at byte `at`: `excerpt_before` characters of leading
/// context, `excerpt_after` characters from the match start, bounded by ellipses. Whitespace
/// is flattened to single spaces so the excerpt stays on one line.
fn excerpt(lowered: &str, at: usize, match_len: usize, limits: &TextLimits) -> DisplayText {
    let match_char = lowered[..at].chars().count();
    let match_chars = lowered[at..at + match_len].chars().count();
    let start = match_char.saturating_sub(limits.excerpt_before);
    let end = match_char + limits.excerpt_after;

    let mut text = String::from(ELLIPSIS);
    let mut highlight_start = None;
    let mut highlight_end = None;
    for (position, ch) in lowered.chars().enumerate().skip(start).take(end - start) {
        if position == match_char {
            highlight_start = Some(text.len());
        }
        if position == match_char + match_chars {
            highlight_end = Some(text.len());
        }
        text.push(if ch.is_whitespace() { ' ' } else { ch });
    }
    let highlight_end = highlight_end.unwrap_or(text.len());
    text.push_str(ELLIPSIS);
    let highlight = highlight_start.map(|from| from..highlight_end);
    DisplayText { text, highlight }
}
