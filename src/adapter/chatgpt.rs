// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! chatgpt.com markup: one `article[data-turn]` per message.

use std::sync::OnceLock;

use crate::dom::{Document, NodeId, NodeSpec, Overflow, PageFixture, Selector};
use crate::model::{ConversationTurn, Headings, Role};

use super::{cached_selector, collect_headings, user_prompt_text, DemoBlock, DEMO_TURN_GAP};

pub(super) fn container_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    cached_selector(&CELL, "main div[class*=\"overflow-y-auto\"]")
}

pub(super) fn thread_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    cached_selector(&CELL, "main div[class*=\"overflow-y-auto\"] > div.thread")
}

fn article_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    cached_selector(&CELL, "article[data-turn]")
}

fn author_selector(role: Role) -> &'static Selector {
    static USER: OnceLock<Selector> = OnceLock::new();
    static ASSISTANT: OnceLock<Selector> = OnceLock::new();
    match role {
        Role::User => cached_selector(&USER, "[data-message-author-role=\"user\"]"),
        Role::Assistant => cached_selector(&ASSISTANT, "[data-message-author-role=\"assistant\"]"),
    }
}

pub(super) fn collect_turns(doc: &Document, container: NodeId) -> Vec<ConversationTurn> {
    doc.query_selector_all(container, article_selector())
        .into_iter()
        .filter_map(|article| {
            let role = Role::from_attr(doc.attribute(article, "data-turn")?)?;
            let content = doc.query_selector(article, author_selector(role));
            let text = content.map(|node| doc.inner_text(node)).unwrap_or_default();
            let headings = match (role, content) {
                (Role::Assistant, Some(node)) => collect_headings(doc, node),
                _ => Headings::new(),
            };
            Some(ConversationTurn::new(role, article, text, headings))
        })
        .collect()
}

pub(super) fn demo_turn(role: Role, blocks: &[DemoBlock]) -> NodeSpec {
    let author = NodeSpec::new("div").attr("data-message-author-role", role.as_str());
    let author = match role {
        Role::User => author.child(NodeSpec::new("div").class("whitespace-pre-wrap").text(user_prompt_text(blocks))),
        Role::Assistant => author.child(
            NodeSpec::new("div")
                .class("markdown prose")
                .children(blocks.iter().map(|block| block.to_spec())),
        ),
    };
    NodeSpec::new("article")
        .attr("data-turn", role.as_str())
        .child(author)
        .child(NodeSpec::new("div").class("gap").height(DEMO_TURN_GAP))
}

pub(super) fn demo_page(turns: Vec<NodeSpec>) -> PageFixture {
    PageFixture::new("https://chatgpt.com/c/demo").with(
        NodeSpec::new("main").child(
            NodeSpec::new("div")
                .class("h-full overflow-y-auto")
                .overflow_y(Overflow::Auto)
                .fill_viewport()
                .child(NodeSpec::new("div").class("thread").children(turns)),
        ),
    )
}
