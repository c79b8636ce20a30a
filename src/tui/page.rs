// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Text rows of the live document as they appear on screen.

use crate::dom::{Document, LINE_HEIGHT};
use crate::model::Heading;

/// Width of one terminal cell in document pixels.
pub(crate) const CELL_WIDTH: f64 = 8.0;
/// Height of one terminal cell; one text line per row.
pub(crate) const CELL_HEIGHT: f64 = LINE_HEIGHT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageLine {
    pub(crate) row: u16,
    pub(crate) text: String,
    pub(crate) heading: Option<u8>,
}

/// Every text line that is fully visible inside its clipping ancestors and the viewport,
/// sorted by screen row.
pub(crate) fn visible_lines(doc: &Document, rows: u16) -> Vec<PageLine> {
    let mut out = Vec::new();
    for node in doc.descendants(doc.root()) {
        if doc.is_element(node) {
            continue;
        }
        let (Some(top), Some(band)) = (doc.bounding_top(node), doc.visible_band(node)) else {
            continue;
        };
        let heading = doc.parent(node).and_then(|parent| doc.tag(parent)).and_then(Heading::level_for_tag);
        for (i, line) in doc.inner_text(node).lines().enumerate() {
            let line_top = top + i as f64 * CELL_HEIGHT;
            if line_top < band.0 - 0.5 || line_top + CELL_HEIGHT > band.1 + 0.5 {
                continue;
            }
            let row = (line_top / CELL_HEIGHT).round();
            if row < 0.0 || row >= f64::from(rows) {
                continue;
            }
            out.push(PageLine { row: row as u16, text: line.to_owned(), heading });
        }
    }
    out.sort_by_key(|line| line.row);
    out
}
