// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Proximity tracking: which entry sits closest to the reference line.

use crate::dom::Document;
use crate::index::NavigationIndex;
use crate::model::NavId;

/// The entry whose target's top edge is nearest to `line`.
///
/// Entries whose target left the document are skipped. Ties go to the earlier entry.
pub fn nearest_entry<'a>(doc: &Document, index: &'a NavigationIndex, line: f64) -> Option<&'a NavId> {
    let mut best: Option<(&NavId, f64)> = None;
    for entry in index.entries() {
        if !doc.is_connected(entry.target()) {
            continue;
        }
        let Some(top) = doc.bounding_top(entry.target()) else {
            continue;
        };
        let distance = (top - line).abs();
        if best.map_or(true, |(_, min)| distance < min) {
            best = Some((entry.id(), distance));
        }
    }
    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::nearest_entry;
    use crate::dom::{NodeSpec, Overflow, PageFixture};
    use crate::filter::{filter, TextLimits};
    use crate::index::NavigationIndex;
    use crate::model::{ConversationTurn, Headings, NavId, Role, ViewLevel};

    #[test]
    fn nearest_skips_disconnected_targets() {
        let mut doc = PageFixture::new("https://claude.ai/")
            .viewport(800.0, 600.0)
            .with(
                NodeSpec::new("div")
                    .overflow_y(Overflow::Auto)
                    .height(600.0)
                    .children((0..6).map(|i| NodeSpec::new("section").text(format!("turn {i}")).height(200.0))),
            )
            .build()
            .unwrap();
        let scroller = doc.children(doc.body().unwrap())[0];
        let sections = doc.children(scroller).to_vec();
        let turns = sections
            .iter()
            .map(|section| ConversationTurn::new(Role::User, *section, doc.inner_text(*section), Headings::new()))
            .collect::<Vec<_>>();
        let mut index = NavigationIndex::default();
        index.rebuild(&filter(&turns, ViewLevel::All, "", &TextLimits::default()), "");

        assert_eq!(nearest_entry(&doc, &index, 190.0), Some(&NavId::turn(1)));
        doc.set_scroll_top(scroller, 400.0);
        assert_eq!(doc.scroll_top(scroller), 400.0);
        assert_eq!(nearest_entry(&doc, &index, 0.0), Some(&NavId::turn(2)));

        doc.set_scroll_top(scroller, 0.0);
        doc.remove(sections[2]).unwrap();
        assert_eq!(nearest_entry(&doc, &index, 400.0), Some(&NavId::turn(3)));
    }

    #[test]
    fn ties_keep_the_earlier_entry() {
        let doc = PageFixture::new("https://claude.ai/")
            .with(NodeSpec::new("div").children((0..2).map(|_| NodeSpec::new("p").text("x").height(100.0))))
            .build()
            .unwrap();
        let wrapper = doc.children(doc.body().unwrap())[0];
        let turns = doc
            .children(wrapper)
            .iter()
            .map(|p| ConversationTurn::new(Role::User, *p, "x", Headings::new()))
            .collect::<Vec<_>>();
        let mut index = NavigationIndex::default();
        index.rebuild(&filter(&turns, ViewLevel::All, "", &TextLimits::default()), "");

        assert_eq!(nearest_entry(&doc, &index, 50.0), Some(&NavId::turn(0)));
    }
}
