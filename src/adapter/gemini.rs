// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! gemini.google.com markup: `user-query` and `model-response` custom elements inside the
//! Angular Material side-nav content pane.

use std::sync::OnceLock;

use crate::dom::{Document, NodeId, NodeSpec, Overflow, PageFixture, Selector};
use crate::model::{ConversationTurn, Headings, Role};

use super::{cached_selector, collect_headings, user_prompt_text, DemoBlock, DEMO_TURN_GAP};

pub(super) fn container_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    cached_selector(&CELL, ".mat-sidenav-content")
}

pub(super) fn thread_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    cached_selector(&CELL, ".mat-sidenav-content .chat-history")
}

fn item_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    cached_selector(&CELL, "user-query, model-response")
}

fn query_text_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    cached_selector(&CELL, ".query-text")
}

fn markdown_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    cached_selector(&CELL, ".markdown")
}

pub(super) fn collect_turns(doc: &Document, container: NodeId) -> Vec<ConversationTurn> {
    doc.query_selector_all(container, item_selector())
        .into_iter()
        .map(|item| {
            if doc.tag(item) == Some("user-query") {
                let text = doc
                    .query_selector(item, query_text_selector())
                    .map(|node| doc.inner_text(node))
                    .unwrap_or_default();
                ConversationTurn::new(Role::User, item, text, Headings::new())
            } else {
                match doc.query_selector(item, markdown_selector()) {
                    Some(markdown) => ConversationTurn::new(
                        Role::Assistant,
                        item,
                        doc.inner_text(markdown),
                        collect_headings(doc, markdown),
                    ),
                    None => ConversationTurn::new(Role::Assistant, item, String::new(), Headings::new()),
                }
            }
        })
        .collect()
}

pub(super) fn demo_turn(role: Role, blocks: &[DemoBlock]) -> NodeSpec {
    let item = match role {
        Role::User => NodeSpec::new("user-query")
            .child(NodeSpec::new("div").class("query-text").text(user_prompt_text(blocks))),
        Role::Assistant => NodeSpec::new("model-response").child(
            NodeSpec::new("div")
                .class("markdown markdown-main-panel")
                .children(blocks.iter().map(|block| block.to_spec())),
        ),
    };
    NodeSpec::new("div")
        .class("conversation-container")
        .child(item)
        .child(NodeSpec::new("div").class("gap").height(DEMO_TURN_GAP))
}

pub(super) fn demo_page(turns: Vec<NodeSpec>) -> PageFixture {
    PageFixture::new("https://gemini.google.com/app/demo").with(
        NodeSpec::new("div")
            .class("mat-sidenav-content")
            .overflow_y(Overflow::Auto)
            .fill_viewport()
            .child(NodeSpec::new("div").class("chat-history").children(turns)),
    )
}
