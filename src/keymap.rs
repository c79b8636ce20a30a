// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Keyboard surface of the panel.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Toggle,
    Close,
    FocusNext,
    FocusPrevious,
    ActivateFocused,
    ShowPrompts,
    ShowAll,
    /// Escape inside the filter input: clear the term and leave the input.
    LeaveSearch,
}

/// Where keyboard focus currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyContext {
    pub panel_open: bool,
    /// The panel's own filter input has focus.
    pub in_search_input: bool,
    /// Some other text-entry element of the page has focus.
    pub typing: bool,
}

/// Maps a key press to a navigator command.
///
/// Inside the filter input only Escape is claimed. Elsewhere the global toggle always works;
/// everything else needs an open panel and no typing context.
pub fn map_key(key: &KeyEvent, context: KeyContext) -> Option<NavCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if context.in_search_input {
        return (key.code == KeyCode::Esc).then_some(NavCommand::LeaveSearch);
    }
    if is_toggle(key) {
        return Some(NavCommand::Toggle);
    }
    if !context.panel_open {
        return None;
    }
    if key.code == KeyCode::Esc {
        return Some(NavCommand::Close);
    }
    if context.typing {
        return None;
    }
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => Some(NavCommand::FocusNext),
        KeyCode::Up | KeyCode::Char('k') => Some(NavCommand::FocusPrevious),
        KeyCode::Enter => Some(NavCommand::ActivateFocused),
        KeyCode::Left => Some(NavCommand::ShowPrompts),
        KeyCode::Right => Some(NavCommand::ShowAll),
        _ => None,
    }
}

fn is_toggle(key: &KeyEvent) -> bool {
    let command = key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER);
    command && matches!(key.code, KeyCode::Char('.') | KeyCode::Char(';'))
}
