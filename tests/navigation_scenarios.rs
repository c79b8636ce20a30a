// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};
use scrollnav::adapter::{DemoBlock, SiteAdapter};
use scrollnav::config::NavigatorConfig;
use scrollnav::dom::{fixture::append_spec, Document, NodeSpec, Overflow, PageFixture, Viewport};
use scrollnav::extract::extract;
use scrollnav::filter::{filter, TextLimits};
use scrollnav::focus::FocusMove;
use scrollnav::index::EntryKind;
use scrollnav::model::{NavId, Role, ViewLevel};
use scrollnav::navigator::Navigator;
use scrollnav::placement::{PanelPosition, Placement};
use scrollnav::scroll::find_scrollable_ancestor;
use scrollnav::store::{MemoryPositionStore, PositionStore};

use DemoBlock::{Heading as H, Paragraph as P};

const HOST: &str = "claude.ai";

fn claude_page(turns: &[(Role, &[DemoBlock])]) -> Document {
    let turns = turns.iter().map(|(role, blocks)| SiteAdapter::Claude.demo_turn(*role, blocks));
    PageFixture::new("https://claude.ai/chat/scenario")
        .with(
            NodeSpec::new("main").child(
                NodeSpec::new("div")
                    .class("overflow-y-auto")
                    .overflow_y(Overflow::Auto)
                    .fill_viewport()
                    .children(turns),
            ),
        )
        .build()
        .expect("page builds")
}

/// Three prompts and two answers; only the second answer's second heading mentions food.
#[fixture]
fn interleaved() -> Document {
    claude_page(&[
        (Role::User, &[P("first question")]),
        (Role::Assistant, &[P("first answer"), H(2, "Alpha"), P("a"), H(2, "Beta"), P("b")]),
        (Role::User, &[P("second question")]),
        (Role::Assistant, &[P("second answer"), H(2, "Gamma"), P("c"), H(2, "Seafood options"), P("d")]),
        (Role::User, &[P("third question")]),
    ])
}

fn start(doc: &mut Document, store: &MemoryPositionStore) -> Navigator {
    Navigator::start(doc, NavigatorConfig::default(), Box::new(store.clone()), 0).expect("navigator starts")
}

fn focus_ids(navigator: &Navigator) -> Vec<String> {
    navigator.index().focus_order().map(|id| id.to_string()).collect()
}

#[rstest]
fn prompts_only_lists_exactly_the_user_turns(mut interleaved: Document) {
    let mut navigator = start(&mut interleaved, &MemoryPositionStore::default());
    navigator.set_view_level(&mut interleaved, ViewLevel::PromptsOnly, 0);

    let entries = navigator.index().entries();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|entry| entry.kind() == EntryKind::Turn { role: Role::User }));
}

#[rstest]
fn search_lists_only_the_matching_heading(mut interleaved: Document) {
    let mut navigator = start(&mut interleaved, &MemoryPositionStore::default());
    navigator.set_search_term(&mut interleaved, "foo", 0);

    assert_eq!(focus_ids(&navigator), ["nav-target-3", "nav-target-3-h-1"]);
    let rows = navigator.panel_view().rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].headings.len(), 1);
    assert_eq!(rows[0].headings[0].display.segments().1, "foo");
}

#[rstest]
#[case("question")]
#[case("ALPHA")]
#[case("answer")]
#[case("e")]
#[case("nothing like this")]
fn filtered_turns_always_contain_the_term(interleaved: Document, #[case] term: &str) {
    let container = scrollnav::adapter::find_conversation_container(&interleaved, SiteAdapter::Claude).unwrap();
    let turns = extract(&interleaved, SiteAdapter::Claude, container);
    let needle = term.to_lowercase();

    for level in [ViewLevel::All, ViewLevel::PromptsOnly] {
        for kept in filter(&turns, level, &needle, &TextLimits::default()) {
            let turn = kept.turn();
            let in_text = turn.text().to_lowercase().contains(&needle);
            let in_heading = turn.headings().iter().any(|h| h.text().to_lowercase().contains(&needle));
            assert!(in_text || in_heading, "turn {} kept for {term:?}", kept.index());
        }
    }
}

#[test]
fn resize_clamps_a_custom_position_into_the_margin() {
    let mut doc = claude_page(&[(Role::User, &[P("hello")])]);
    let mut store = MemoryPositionStore::default();
    store.save(HOST, PanelPosition { top: 400.0, left: 900.0 }).unwrap();
    let mut navigator = start(&mut doc, &store);

    doc.set_viewport(Viewport { width: 1_000.0, height: 700.0 });
    navigator.on_resize(10);
    navigator.advance(&mut doc, 209);
    assert_eq!(navigator.placement(), Placement::Custom(PanelPosition { top: 400.0, left: 900.0 }));
    navigator.advance(&mut doc, 210);

    let clamped = PanelPosition { top: 700.0 - 480.0 - 10.0, left: 1_000.0 - 320.0 - 10.0 };
    assert_eq!(navigator.placement(), Placement::Custom(clamped));
    assert_eq!(store.get(HOST), Some(clamped));
}

#[test]
fn resolver_walks_past_four_plain_ancestors() {
    let doc = PageFixture::new("https://claude.ai/chat/nested")
        .viewport(800.0, 600.0)
        .with(
            NodeSpec::new("div").overflow_y(Overflow::Auto).height(300.0).child(
                NodeSpec::new("section").height(500.0).child(
                    NodeSpec::new("div").child(NodeSpec::new("div").child(NodeSpec::new("p").text("deep"))),
                ),
            ),
        )
        .build()
        .unwrap();
    let scroller = doc.children(doc.body().unwrap())[0];
    let section = doc.children(scroller)[0];
    let inner = doc.children(section)[0];
    let innermost = doc.children(inner)[0];
    let paragraph = doc.children(innermost)[0];
    let text = doc.children(paragraph)[0];

    assert_eq!(doc.scroll_height(scroller) - doc.client_height(scroller), 200.0);
    assert_eq!(find_scrollable_ancestor(&doc, text, 4.0), scroller);
}

#[rstest]
fn focus_moves_are_circular_from_every_start(mut interleaved: Document) {
    let mut navigator = start(&mut interleaved, &MemoryPositionStore::default());
    navigator.toggle_open(Some(true));
    let len = navigator.index().len();
    assert_eq!(len, 9);

    for start_index in 0..len {
        while navigator.state().focused_index() != Some(start_index) {
            navigator.move_focus(FocusMove::Next);
        }
        for direction in [FocusMove::Next, FocusMove::Previous] {
            for _ in 0..len {
                navigator.move_focus(direction);
            }
            assert_eq!(navigator.state().focused_index(), Some(start_index));
        }
    }
}

#[test]
fn activation_holds_through_intermediate_scrolls() {
    let mut doc = SiteAdapter::Claude.demo_page().build().unwrap();
    let mut navigator = start(&mut doc, &MemoryPositionStore::default());
    let target = NavId::turn(4);

    assert!(navigator.activate(&mut doc, &target, 0));
    assert_eq!(navigator.state().active_id(), Some(&target));

    let source = navigator.binding().source().unwrap();
    let mut now = 0;
    while now < 780 {
        now += 20;
        doc.advance_animations(20);
        doc.scroll_by(source, if now % 40 == 0 { -7.0 } else { 7.0 });
        for scrolled in doc.take_scroll_events() {
            navigator.on_scroll(&doc, scrolled);
        }
        navigator.on_frame(&doc);
        navigator.advance(&mut doc, now);
        assert_eq!(navigator.state().active_id(), Some(&target), "at {now}ms");
    }

    navigator.advance(&mut doc, 800);
    assert!(!navigator.state().is_tracking_suppressed());
}

#[rstest]
fn rebuilding_unchanged_content_is_idempotent(mut interleaved: Document) {
    let mut navigator = start(&mut interleaved, &MemoryPositionStore::default());
    let snapshot = |navigator: &Navigator| {
        navigator
            .index()
            .entries()
            .iter()
            .map(|entry| (entry.id().clone(), entry.display().clone()))
            .collect::<Vec<_>>()
    };

    let first = snapshot(&navigator);
    assert!(navigator.refresh(&mut interleaved, 0));
    assert_eq!(snapshot(&navigator), first);
    assert!(navigator.refresh(&mut interleaved, 0));
    assert_eq!(snapshot(&navigator), first);
}

#[rstest]
fn focus_order_follows_document_position(mut interleaved: Document) {
    let mut navigator = start(&mut interleaved, &MemoryPositionStore::default());
    let container = navigator.container().unwrap();
    let first_turn = interleaved.children(container)[0];

    // A late-rendered turn inserted at the top.
    let late = SiteAdapter::Claude.demo_turn(Role::User, &[P("zeroth question")]);
    let late = append_spec(&mut interleaved, container, &late).unwrap();
    interleaved.insert_before(container, late, Some(first_turn)).unwrap();
    let records = interleaved.take_mutations();
    navigator.on_mutations(&mut interleaved, &records, 0);
    navigator.advance(&mut interleaved, 500);

    let targets = navigator.index().entries().iter().map(|entry| entry.target()).collect::<Vec<_>>();
    assert_eq!(targets.len(), 10);
    assert_eq!(targets[0], late);
    for pair in targets.windows(2) {
        assert_eq!(interleaved.document_order(pair[0], pair[1]), std::cmp::Ordering::Less);
    }
    for pair in targets.windows(2) {
        let (a, b) = (interleaved.bounding_top(pair[0]).unwrap(), interleaved.bounding_top(pair[1]).unwrap());
        assert!(a <= b);
    }
}
