// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Keyboard focus cursor arithmetic.

/// Direction of a relative focus move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMove {
    Next,
    Previous,
}

/// The focus index after one move over a list of `len` entries.
///
/// Without a current focus the cursor lands on `active` when given, otherwise on the first
/// (`Next`) or last (`Previous`) entry. With a focus it wraps around the ends.
pub fn move_focus(current: Option<usize>, active: Option<usize>, direction: FocusMove, len: usize) -> Option<usize> {
    if len == 0 {
        return current;
    }
    let next = match current {
        None => active.filter(|index| *index < len).unwrap_or(match direction {
            FocusMove::Next => 0,
            FocusMove::Previous => len - 1,
        }),
        Some(index) => match direction {
            FocusMove::Next => (index + 1) % len,
            FocusMove::Previous => (index + len - 1) % len,
        },
    };
    Some(next)
}

/// Clamps (never wraps) a focus index into a list of `len` entries.
pub fn clamp_focus(current: Option<usize>, len: usize) -> Option<usize> {
    match current {
        _ if len == 0 => None,
        Some(index) => Some(index.min(len - 1)),
        None => None,
    }
}
