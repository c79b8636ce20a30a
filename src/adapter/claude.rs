// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! claude.ai markup.
//!
//! Messages are tagged with `data-testid`; the turn itself is the enclosing
//! `conversation-turn` block or, on older layouts, the hover `.group` wrapper.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::dom::{Document, NodeId, NodeSpec, Overflow, PageFixture, Selector};
use crate::model::{ConversationTurn, Headings, Role};

use super::{cached_selector, collect_headings, user_prompt_text, DemoBlock, DEMO_TURN_GAP};

const MESSAGE_SELECTOR: &str = "[data-testid=\"user-message\"], .font-claude-response, \
     [data-testid=\"assistant-response\"], [data-testid=\"assistant-message\"]";

pub(super) fn container_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    cached_selector(&CELL, "main div[class*=\"overflow-y-auto\"]")
}

fn message_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    cached_selector(&CELL, MESSAGE_SELECTOR)
}

fn turn_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    cached_selector(&CELL, "[data-testid=\"conversation-turn\"]")
}

fn group_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    cached_selector(&CELL, ".group")
}

pub(super) fn collect_turns(doc: &Document, container: NodeId) -> Vec<ConversationTurn> {
    let mut seen = HashSet::new();
    let mut turns = Vec::new();
    for message in doc.query_selector_all(container, message_selector()) {
        if !seen.insert(message) {
            continue;
        }
        let Some(turn_element) = doc
            .closest(message, turn_selector())
            .or_else(|| doc.closest(message, group_selector()))
        else {
            continue;
        };
        let text = doc.inner_text(message);
        if text.trim().is_empty() {
            continue;
        }
        let is_user = doc.attribute(message, "data-testid") == Some("user-message");
        let (role, headings) = if is_user {
            (Role::User, Headings::new())
        } else {
            (Role::Assistant, collect_headings(doc, message))
        };
        turns.push(ConversationTurn::new(role, turn_element, text, headings));
    }
    turns
}

pub(super) fn demo_turn(role: Role, blocks: &[DemoBlock]) -> NodeSpec {
    let message = match role {
        Role::User => NodeSpec::new("div")
            .attr("data-testid", "user-message")
            .text(user_prompt_text(blocks)),
        Role::Assistant => NodeSpec::new("div")
            .class("font-claude-response")
            .children(blocks.iter().map(|block| block.to_spec())),
    };
    NodeSpec::new("div")
        .attr("data-testid", "conversation-turn")
        .class("group")
        .child(message)
        .child(NodeSpec::new("div").class("gap").height(DEMO_TURN_GAP))
}

pub(super) fn demo_page(turns: Vec<NodeSpec>) -> PageFixture {
    PageFixture::new("https://claude.ai/chat/demo").with(
        NodeSpec::new("main").child(
            NodeSpec::new("div")
                .class("flex-1 overflow-y-auto")
                .overflow_y(Overflow::Auto)
                .fill_viewport()
                .children(turns),
        ),
    )
}
