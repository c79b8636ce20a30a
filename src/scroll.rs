// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scroll source resolution and scroll geometry.

use crate::dom::{Document, ListenerTarget, NodeId};

/// Whether `id` scrolls its own content: a scrollable `overflow-y` and more than `threshold`
/// pixels of hidden content.
pub fn element_can_scroll(doc: &Document, id: NodeId, threshold: f64) -> bool {
    doc.is_element(id)
        && doc.overflow_y(id).is_scrollable()
        && doc.scroll_height(id) - doc.client_height(id) > threshold
}

/// The node that scrolls `anchor`: the nearest inclusive ancestor that can scroll, stopping at
/// `body`; the document scroller otherwise.
pub fn find_scrollable_ancestor(doc: &Document, anchor: NodeId, threshold: f64) -> NodeId {
    let mut current = Some(anchor);
    while let Some(node) = current {
        if element_can_scroll(doc, node, threshold) {
            return node;
        }
        if Some(node) == doc.body() || node == doc.root() {
            break;
        }
        current = doc.parent(node);
    }
    doc.scrolling_element()
}

/// The single scroll listener of a session and the node whose metrics it reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollBinding {
    source: Option<NodeId>,
    listener: Option<ListenerTarget>,
}

impl ScrollBinding {
    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    pub fn listener(&self) -> Option<ListenerTarget> {
        self.listener
    }

    /// Points the binding at `node`, moving the listener when its target changes.
    ///
    /// The previous listener is removed before the new one is added. Returns `false` when the
    /// binding already pointed at `node`.
    pub fn bind(&mut self, doc: &mut Document, node: NodeId) -> bool {
        let listener = doc.scroll_event_target(node);
        if self.source == Some(node) && self.listener == Some(listener) {
            return false;
        }
        if let Some(old) = self.listener.take() {
            doc.remove_scroll_listener(old);
        }
        doc.add_scroll_listener(listener);
        self.source = Some(node);
        self.listener = Some(listener);
        true
    }

    pub fn unbind(&mut self, doc: &mut Document) {
        if let Some(old) = self.listener.take() {
            doc.remove_scroll_listener(old);
        }
        self.source = None;
    }

    /// Whether a scroll event fired by `scrolled` reaches this binding's listener.
    pub fn hears(&self, doc: &Document, scrolled: NodeId) -> bool {
        self.listener.is_some_and(|listener| listener == doc.scroll_event_target(scrolled))
    }
}

/// Viewport-relative y of the reference line used for proximity tracking.
pub fn reference_line(doc: &Document, source: NodeId, header_offset: f64) -> f64 {
    let top = if doc.is_document_scroller(source) {
        0.0
    } else {
        doc.bounding_top(source).unwrap_or(0.0)
    };
    top + header_offset
}

/// Scroll offset of `source` that puts `target` `header_offset` pixels below its top edge.
/// `None` when `target` is no longer in the document.
pub fn scroll_target_top(doc: &Document, source: NodeId, target: NodeId, header_offset: f64) -> Option<f64> {
    if !doc.is_connected(target) {
        return None;
    }
    let target_top = doc.bounding_top(target)?;
    let top = if doc.is_document_scroller(source) {
        target_top + doc.scroll_top(source) - header_offset
    } else {
        let source_top = doc.bounding_top(source)?;
        doc.scroll_top(source) + (target_top - source_top) - header_offset
    };
    Some(top)
}

/// Scroll progress of `source` in whole percent; 0 when it cannot scroll.
pub fn progress_percent(doc: &Document, source: NodeId) -> u8 {
    let max = doc.max_scroll_top(source);
    if max <= 0.0 {
        return 0;
    }
    let pct = (doc.scroll_top(source) / max * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{
        element_can_scroll, find_scrollable_ancestor, progress_percent, reference_line, scroll_target_top,
        ScrollBinding,
    };
    use crate::dom::{Document, ListenerTarget, NodeId, NodeSpec, Overflow, PageFixture};

    struct Nested {
        doc: Document,
        scroller: NodeId,
        text: NodeId,
    }

    /// A text node four non-scrolling elements below an `overflow-y: auto` box that hides 200px.
    #[fixture]
    fn nested() -> Nested {
        let leaf = NodeSpec::new("span").text("deep");
        let chain = (0..2).fold(NodeSpec::new("p").child(leaf), |inner, _| NodeSpec::new("div").child(inner));
        let fixture = PageFixture::new("https://claude.ai/chat/x").viewport(1000.0, 800.0).with(
            NodeSpec::new("div")
                .class("scroller")
                .overflow_y(Overflow::Auto)
                .height(300.0)
                .child(chain)
                .child(NodeSpec::new("div").height(480.0)),
        );
        let doc = fixture.build().unwrap();
        let scroller = doc.children(doc.body().unwrap())[0];
        let mut text = scroller;
        while let Some(first) = doc.children(text).first().copied() {
            text = first;
        }
        Nested { doc, scroller, text }
    }

    #[rstest]
    fn resolver_walks_to_the_fifth_ancestor(nested: Nested) {
        let Nested { doc, scroller, text } = nested;
        assert_eq!(doc.scroll_height(scroller) - doc.client_height(scroller), 200.0);

        let mut hops = 0;
        let mut node = doc.parent(text).unwrap();
        while node != scroller {
            assert!(!element_can_scroll(&doc, node, 4.0));
            node = doc.parent(node).unwrap();
            hops += 1;
        }
        assert_eq!(hops, 4);
        assert_eq!(find_scrollable_ancestor(&doc, text, 4.0), scroller);
    }

    #[test]
    fn small_overflow_does_not_count() {
        let doc = PageFixture::new("https://claude.ai/")
            .with(
                NodeSpec::new("div")
                    .overflow_y(Overflow::Scroll)
                    .height(100.0)
                    .child(NodeSpec::new("div").height(104.0)),
            )
            .build()
            .unwrap();
        let boxed = doc.children(doc.body().unwrap())[0];
        assert!(!element_can_scroll(&doc, boxed, 4.0));
        assert_eq!(find_scrollable_ancestor(&doc, boxed, 4.0), doc.scrolling_element());
    }

    #[test]
    fn hidden_overflow_is_not_scrollable() {
        let doc = PageFixture::new("https://claude.ai/")
            .with(
                NodeSpec::new("div")
                    .overflow_y(Overflow::Hidden)
                    .height(100.0)
                    .child(NodeSpec::new("div").height(900.0)),
            )
            .build()
            .unwrap();
        let boxed = doc.children(doc.body().unwrap())[0];
        assert!(!element_can_scroll(&doc, boxed, 4.0));
    }

    #[rstest]
    fn binding_moves_a_single_listener(nested: Nested) {
        let Nested { mut doc, scroller, .. } = nested;
        let mut binding = ScrollBinding::default();

        assert!(binding.bind(&mut doc, scroller));
        assert!(!binding.bind(&mut doc, scroller));
        assert_eq!(doc.scroll_listeners(), &[ListenerTarget::Element(scroller)]);

        let body = doc.body().unwrap();
        assert!(binding.bind(&mut doc, body));
        assert_eq!(doc.scroll_listeners(), &[ListenerTarget::Window]);
        assert!(binding.hears(&doc, doc.root()));
        assert!(!binding.hears(&doc, scroller));

        binding.unbind(&mut doc);
        assert!(doc.scroll_listeners().is_empty());
        assert_eq!(binding.source(), None);
    }

    #[rstest]
    fn target_top_aligns_below_the_offset(nested: Nested) {
        let Nested { mut doc, scroller, .. } = nested;
        let filler = doc.children(scroller)[1];
        doc.set_scroll_top(scroller, 50.0);

        let top = scroll_target_top(&doc, scroller, filler, 10.0).unwrap();
        let expected = doc.scroll_top(scroller) + doc.bounding_top(filler).unwrap()
            - doc.bounding_top(scroller).unwrap()
            - 10.0;
        assert_eq!(top, expected);
        assert_eq!(reference_line(&doc, scroller, 10.0), doc.bounding_top(scroller).unwrap() + 10.0);
        assert_eq!(reference_line(&doc, doc.scrolling_element(), 10.0), 10.0);
    }

    #[rstest]
    fn progress_tracks_the_scroll_range(nested: Nested) {
        let Nested { mut doc, scroller, .. } = nested;
        assert_eq!(progress_percent(&doc, scroller), 0);
        doc.set_scroll_top(scroller, 100.0);
        assert_eq!(progress_percent(&doc, scroller), 50);
        doc.set_scroll_top(scroller, 1_000.0);
        assert_eq!(progress_percent(&doc, scroller), 100);
        assert_eq!(progress_percent(&doc, doc.scrolling_element()), 0);
    }
}
