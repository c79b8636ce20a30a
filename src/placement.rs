// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Panel placement.
//!
//! The panel is either anchored to the top-right corner or sits at a custom position chosen by
//! dragging. Custom positions are kept inside the viewport with a fixed margin.

use serde::{Deserialize, Serialize};

use crate::dom::Viewport;

/// Distance of the anchored panel from the top edge.
pub const ANCHOR_TOP: f64 = 80.0;
/// Distance of the anchored panel from the right edge.
pub const ANCHOR_RIGHT: f64 = 20.0;

/// Top-left corner of the panel in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelPosition {
    pub top: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Placement {
    #[default]
    Anchored,
    Custom(PanelPosition),
}

impl Placement {
    pub fn custom(&self) -> Option<PanelPosition> {
        match self {
            Self::Anchored => None,
            Self::Custom(position) => Some(*position),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Where the panel is drawn for a given size and viewport.
    pub fn resolve(&self, size: PanelSize, viewport: Viewport) -> PanelPosition {
        match self {
            Self::Custom(position) => *position,
            Self::Anchored => PanelPosition {
                top: ANCHOR_TOP,
                left: (viewport.width - size.width - ANCHOR_RIGHT).max(0.0),
            },
        }
    }
}

/// A drag in progress: pointer origin and panel position at the start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    start_x: f64,
    start_y: f64,
    initial: PanelPosition,
}

impl DragState {
    pub fn new(x: f64, y: f64, initial: PanelPosition) -> Self {
        Self { start_x: x, start_y: y, initial }
    }

    /// Pointer travel since the drag started.
    pub fn delta(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.start_x, y - self.start_y)
    }

    /// Unclamped position if the pointer is released at `(x, y)`.
    pub fn moved_to(&self, x: f64, y: f64) -> PanelPosition {
        let (dx, dy) = self.delta(x, y);
        PanelPosition { top: self.initial.top + dy, left: self.initial.left + dx }
    }
}

/// Clamps a dropped panel: left and top edges first, then right and bottom.
pub fn clamp_dropped(position: PanelPosition, size: PanelSize, viewport: Viewport, margin: f64) -> PanelPosition {
    let mut left = position.left.max(margin);
    if left + size.width > viewport.width - margin {
        left = viewport.width - size.width - margin;
    }
    let mut top = position.top.max(margin);
    if top + size.height > viewport.height - margin {
        top = viewport.height - size.height - margin;
    }
    PanelPosition { top, left }
}

/// Clamps a custom position after a viewport resize: right and bottom edges first, then left
/// and top. `None` when the panel already fits.
pub fn clamp_resized(
    position: PanelPosition,
    size: PanelSize,
    viewport: Viewport,
    margin: f64,
) -> Option<PanelPosition> {
    let PanelPosition { mut top, mut left } = position;
    let mut clamped = false;
    if left + size.width > viewport.width - margin {
        left = viewport.width - size.width - margin;
        clamped = true;
    }
    if top + size.height > viewport.height - margin {
        top = viewport.height - size.height - margin;
        clamped = true;
    }
    if left < margin {
        left = margin;
        clamped = true;
    }
    if top < margin {
        top = margin;
        clamped = true;
    }
    clamped.then_some(PanelPosition { top, left })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{clamp_dropped, clamp_resized, DragState, PanelPosition, PanelSize, Placement};
    use crate::dom::Viewport;

    const SIZE: PanelSize = PanelSize { width: 300.0, height: 400.0 };

    #[test]
    fn anchored_panel_hugs_the_right_edge() {
        let viewport = Viewport { width: 1000.0, height: 800.0 };
        assert_eq!(Placement::Anchored.resolve(SIZE, viewport), PanelPosition { top: 80.0, left: 680.0 });
    }

    #[rstest]
    #[case(PanelPosition { top: -50.0, left: -5.0 }, PanelPosition { top: 10.0, left: 10.0 })]
    #[case(PanelPosition { top: 700.0, left: 900.0 }, PanelPosition { top: 390.0, left: 690.0 })]
    #[case(PanelPosition { top: 100.0, left: 100.0 }, PanelPosition { top: 100.0, left: 100.0 })]
    fn dropped_panels_keep_the_margin(#[case] dropped: PanelPosition, #[case] expected: PanelPosition) {
        let viewport = Viewport { width: 1000.0, height: 800.0 };
        assert_eq!(clamp_dropped(dropped, SIZE, viewport, 10.0), expected);
    }

    #[test]
    fn drag_applies_pointer_delta() {
        let drag = DragState::new(500.0, 20.0, PanelPosition { top: 80.0, left: 680.0 });
        assert_eq!(drag.delta(450.0, 60.0), (-50.0, 40.0));
        assert_eq!(drag.moved_to(450.0, 60.0), PanelPosition { top: 120.0, left: 630.0 });
    }

    #[test]
    fn shrinking_viewport_pulls_the_panel_back() {
        let position = PanelPosition { top: 350.0, left: 650.0 };
        let viewport = Viewport { width: 900.0, height: 700.0 };
        assert_eq!(
            clamp_resized(position, SIZE, viewport, 10.0),
            Some(PanelPosition { top: 290.0, left: 590.0 })
        );
        assert_eq!(clamp_resized(PanelPosition { top: 20.0, left: 20.0 }, SIZE, viewport, 10.0), None);
    }

    #[test]
    fn tiny_viewport_prefers_the_top_left_margin() {
        let viewport = Viewport { width: 200.0, height: 300.0 };
        assert_eq!(
            clamp_resized(PanelPosition { top: 0.0, left: 0.0 }, SIZE, viewport, 10.0),
            Some(PanelPosition { top: 10.0, left: 10.0 })
        );
    }
}
