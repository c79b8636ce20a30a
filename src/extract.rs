// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Turn extraction and normalisation.
//!
//! One pass reads the page through the active [`SiteAdapter`], then repairs what the adapter
//! cannot promise: duplicates, empty turns and markup order.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::adapter::SiteAdapter;
use crate::dom::{Document, NodeId};
use crate::model::ConversationTurn;

/// Text shown for a turn whose cleaned text is empty.
pub const EMPTY_DISPLAY: &str = "...";

const ELLIPSIS: &str = "...";

/// Reads the turns under `container`, ordered by document position.
///
/// When several turns resolve to the same element the first one in document order is kept.
/// Turns whose text is blank are dropped.
pub fn extract(doc: &Document, adapter: SiteAdapter, container: NodeId) -> Vec<ConversationTurn> {
    let mut turns = adapter.collect_turns(doc, container);
    turns.sort_by(|a, b| doc.document_order(a.element(), b.element()));

    let mut seen = HashSet::with_capacity(turns.len());
    turns.retain(|turn| !turn.text().trim().is_empty() && seen.insert(turn.element()));
    turns
}

/// Display form of raw turn text: markdown markers removed, whitespace collapsed and the result
/// cut to `max_chars` characters (including the trailing ellipsis).
pub fn clean_text(raw: &str, max_chars: usize) -> String {
    let stripped = markup_pattern().replace_all(raw.trim(), "");
    let collapsed = whitespace_pattern().replace_all(&stripped, " ");
    let collapsed = collapsed.trim();
    if collapsed.is_empty() {
        return EMPTY_DISPLAY.to_owned();
    }
    if collapsed.chars().count() <= max_chars {
        return collapsed.to_owned();
    }
    let keep = max_chars.saturating_sub(2);
    let mut out = collapsed.chars().take(keep).collect::<String>();
    out.push_str(ELLIPSIS);
    out
}

fn markup_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(r"[#*`]").expect("markup pattern is valid"))
}

fn whitespace_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{clean_text, extract};
    use crate::adapter::{find_conversation_container, DemoBlock, SiteAdapter};
    use crate::dom::fixture::append_spec;
    use crate::dom::{NodeSpec, PageFixture};
    use crate::model::Role;

    #[rstest]
    #[case("  ## Hello   **world**  ", "Hello world")]
    #[case("use `cargo`\n\tnow", "use cargo now")]
    #[case("", "...")]
    #[case(" #** ", "...")]
    fn clean_text_strips_markup(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(clean_text(raw, 50), expected);
    }

    #[test]
    fn clean_text_truncates_long_text() {
        let raw = "a".repeat(51);
        let cleaned = clean_text(&raw, 50);
        assert_eq!(cleaned, format!("{}...", "a".repeat(48)));

        let exact = "b".repeat(50);
        assert_eq!(clean_text(&exact, 50), exact);
    }

    #[test]
    fn extraction_sorts_by_document_position() {
        let adapter = SiteAdapter::ChatGpt;
        let mut doc = PageFixture::new("https://chatgpt.com/c/1")
            .with(NodeSpec::new("main").child(NodeSpec::new("div").class("overflow-y-auto")))
            .build()
            .unwrap();
        let container = find_conversation_container(&doc, adapter).unwrap();
        let second = append_spec(
            &mut doc,
            container,
            &adapter.demo_turn(Role::Assistant, &[DemoBlock::Paragraph("second")]),
        )
        .unwrap();
        let first = adapter.demo_turn(Role::User, &[DemoBlock::Paragraph("first")]);
        let first = {
            let node = append_spec(&mut doc, container, &first).unwrap();
            doc.insert_before(container, node, Some(second)).unwrap();
            node
        };

        let turns = extract(&doc, adapter, container);
        let elements = turns.iter().map(|turn| turn.element()).collect::<Vec<_>>();
        assert_eq!(elements, [first, second]);
    }

    #[test]
    fn extraction_drops_blank_and_duplicate_turns() {
        let adapter = SiteAdapter::Claude;
        let doc = PageFixture::new("https://claude.ai/chat/1")
            .with(
                NodeSpec::new("main").child(
                    NodeSpec::new("div").class("overflow-y-auto").children([
                        NodeSpec::new("div").attr("data-testid", "conversation-turn").child(
                            NodeSpec::new("div")
                                .attr("data-testid", "assistant-message")
                                .child(NodeSpec::new("div").class("font-claude-response").text("once")),
                        ),
                        adapter.demo_turn(Role::User, &[DemoBlock::Paragraph("next")]),
                    ]),
                ),
            )
            .build()
            .unwrap();
        let container = find_conversation_container(&doc, adapter).unwrap();

        let turns = extract(&doc, adapter, container);
        let texts = turns.iter().map(|turn| turn.text()).collect::<Vec<_>>();
        assert_eq!(texts, ["once", "next"]);
    }
}
