// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Site adapters.
//!
//! Each supported chat site gets one variant that knows how to find the conversation container
//! and read turns out of that site's markup. Supporting a new site means adding a variant; the
//! navigation core only ever calls [`SiteAdapter::collect_turns`].

mod chatgpt;
mod claude;
mod gemini;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::dom::{Document, NodeId, NodeSpec, PageFixture, Selector};
use crate::model::{ConversationTurn, Heading, Headings, Role};

const HEADING_SELECTOR: &str = "h1, h2, h3, h4";

/// Empty space under each demo turn so the demo pages scroll.
pub(crate) const DEMO_TURN_GAP: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteAdapter {
    Claude,
    ChatGpt,
    Gemini,
}

impl SiteAdapter {
    /// Adapters in match priority order.
    pub const ALL: [SiteAdapter; 3] = [Self::Claude, Self::ChatGpt, Self::Gemini];

    /// The first adapter claiming `host`, if any.
    pub fn select(host: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|adapter| adapter.matches(host))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::ChatGpt => "chatgpt",
            Self::Gemini => "gemini",
        }
    }

    pub fn matches(self, host: &str) -> bool {
        match self {
            Self::Claude => host.contains("claude"),
            Self::ChatGpt => host.contains("chatgpt") || host.contains("openai"),
            Self::Gemini => host.contains("gemini") || host.contains("google"),
        }
    }

    /// Best-effort hint for the element holding the conversation.
    pub fn scroll_container_selector(self) -> &'static Selector {
        match self {
            Self::Claude => claude::container_selector(),
            Self::ChatGpt => chatgpt::container_selector(),
            Self::Gemini => gemini::container_selector(),
        }
    }

    /// Reads the turns found under `container`, in whatever order the site markup yields them.
    pub fn collect_turns(self, doc: &Document, container: NodeId) -> Vec<ConversationTurn> {
        match self {
            Self::Claude => claude::collect_turns(doc, container),
            Self::ChatGpt => chatgpt::collect_turns(doc, container),
            Self::Gemini => gemini::collect_turns(doc, container),
        }
    }

    /// Markup for one turn in this site's structure.
    pub fn demo_turn(self, role: Role, blocks: &[DemoBlock]) -> NodeSpec {
        match self {
            Self::Claude => claude::demo_turn(role, blocks),
            Self::ChatGpt => chatgpt::demo_turn(role, blocks),
            Self::Gemini => gemini::demo_turn(role, blocks),
        }
    }

    /// A complete page with the built-in demo conversation.
    pub fn demo_page(self) -> PageFixture {
        let turns = demo_transcript()
            .iter()
            .map(|(role, blocks)| self.demo_turn(*role, blocks))
            .collect::<Vec<_>>();
        match self {
            Self::Claude => claude::demo_page(turns),
            Self::ChatGpt => chatgpt::demo_page(turns),
            Self::Gemini => gemini::demo_page(turns),
        }
    }

    /// Parent element that demo turns are appended to.
    pub fn demo_turn_parent(self, doc: &Document) -> Option<NodeId> {
        let selector = match self {
            Self::Claude => claude::container_selector(),
            Self::ChatGpt => chatgpt::thread_selector(),
            Self::Gemini => gemini::thread_selector(),
        };
        doc.query_selector(doc.root(), selector)
    }
}

impl fmt::Display for SiteAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SiteAdapter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|adapter| adapter.name() == s)
            .ok_or_else(|| format!("unknown site {s:?} (expected claude, chatgpt or gemini)"))
    }
}

/// The conversation container: adapter hint, then `main`, then `body`.
///
/// `None` only while the document has no body yet.
pub fn find_conversation_container(doc: &Document, adapter: SiteAdapter) -> Option<NodeId> {
    doc.query_selector(doc.root(), adapter.scroll_container_selector())
        .or_else(|| doc.query_selector(doc.root(), main_selector()))
        .or_else(|| doc.body())
}

/// A piece of demo answer content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoBlock {
    Paragraph(&'static str),
    Heading(u8, &'static str),
}

impl DemoBlock {
    pub(crate) fn to_spec(self) -> NodeSpec {
        match self {
            Self::Paragraph(text) => NodeSpec::new("p").text(text),
            Self::Heading(level, text) => {
                let level = level.clamp(1, 4);
                NodeSpec::new(format!("h{level}")).text(text)
            }
        }
    }
}

pub(crate) fn user_prompt_text(blocks: &[DemoBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            DemoBlock::Paragraph(text) | DemoBlock::Heading(_, text) => Some(*text),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn collect_headings(doc: &Document, scope: NodeId) -> Headings {
    doc.query_selector_all(scope, heading_selector())
        .into_iter()
        .filter_map(|element| {
            let level = Heading::level_for_tag(doc.tag(element)?)?;
            Some(Heading::new(doc.inner_text(element), element, level))
        })
        .collect()
}

pub(crate) fn cached_selector(cell: &'static OnceLock<Selector>, source: &'static str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(source).expect("built-in selector parses"))
}

fn heading_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    cached_selector(&CELL, HEADING_SELECTOR)
}

fn main_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    cached_selector(&CELL, "main")
}

fn demo_transcript() -> &'static [(Role, &'static [DemoBlock])] {
    transcript::DEMO
}

mod transcript {
    use super::DemoBlock::{self, Heading as H, Paragraph as P};
    use crate::model::Role;

    pub(super) const DEMO: &[(Role, &[DemoBlock])] = &[
        (Role::User, &[P("How should I structure a terminal UI that follows a live document?")]),
        (
            Role::Assistant,
            &[
                P("Split the problem into three loops that never block each other.\nThe document changes, the viewport scrolls and the user types."),
                H(2, "Reading the document"),
                P("Re-read the whole structure after a quiet period instead of patching it.\nIdentity is not stable enough to diff."),
                H(2, "Tracking the viewport"),
                P("Pick the entry closest to a reference line below the header.\nThrottle the work to one pass per frame."),
                H(3, "Avoiding feedback loops"),
                P("After jumping programmatically, stop tracking for a short window.\nOtherwise the animation frames fight the jump."),
            ],
        ),
        (Role::User, &[P("What about the keyboard cursor?")]),
        (
            Role::Assistant,
            &[
                P("Keep it separate from the scroll-derived position.\nIt only moves the page when the user confirms."),
                H(2, "Wrapping and clamping"),
                P("Relative moves wrap around the list.\nWhen the list shrinks the cursor is clamped, not wrapped."),
            ],
        ),
        (Role::User, &[P("And when the scroll container changes under me?")]),
        (
            Role::Assistant,
            &[
                P("Resolve it again on every refresh by walking up from a known target.\nSwap the listener atomically so only one is ever live."),
                H(2, "Which element scrolls"),
                P("An ancestor counts only if its overflow allows scrolling\nand its content is taller than its box by more than a few pixels."),
                H(2, "Window versus element"),
                P("If the document itself scrolls, listen on the window:\nroot elements do not fire scroll events reliably."),
            ],
        ),
    ];
}
