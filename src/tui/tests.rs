// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{backend::TestBackend, Terminal};
use rstest::rstest;

use super::{draw, osc52_sequence, theme::PanelTheme, App};
use crate::adapter::SiteAdapter;
use crate::config::NavigatorConfig;
use crate::index::EMPTY_STATE;
use crate::model::NavId;
use crate::navigator::{Navigator, COPY_CONFIRMATION};
use crate::placement::{PanelPosition, Placement};
use crate::schedule::{Millis, TaskKind};
use crate::store::MemoryPositionStore;

const COLS: u16 = 160;
const ROWS: u16 = 41;

/// Drives an [`App`] against an in-memory terminal with a manual clock.
struct Harness {
    app: App,
    terminal: Terminal<TestBackend>,
    now: Millis,
}

impl Harness {
    fn new(adapter: SiteAdapter) -> Self {
        let mut doc = adapter.demo_page().build().expect("demo page");
        let navigator = Navigator::start(
            &mut doc,
            NavigatorConfig::default(),
            Box::new(MemoryPositionStore::default()),
            0,
        )
        .expect("navigator");
        let mut app = App::new(doc, navigator, PanelTheme::for_site(adapter));
        app.sync_viewport(COLS, ROWS - 1, 0);
        let terminal = Terminal::new(TestBackend::new(COLS, ROWS)).expect("terminal");
        let mut harness = Self { app, terminal, now: 0 };
        harness.frame();
        harness
    }

    fn frame(&mut self) {
        self.app.pump(self.now);
        let app = &mut self.app;
        self.terminal.draw(|frame| draw(frame, app)).expect("draw");
        self.app.after_frame();
    }

    fn tick(&mut self, ms: Millis) {
        self.now += ms;
        self.frame();
    }

    fn key(&mut self, code: KeyCode) {
        self.key_with(code, KeyModifiers::NONE);
    }

    fn key_with(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        self.app.handle_key(KeyEvent::new(code, modifiers), self.now);
        self.frame();
    }

    fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.key(KeyCode::Char(ch));
        }
    }

    fn mouse(&mut self, kind: MouseEventKind, column: u16, row: u16) {
        let event = MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE };
        self.app.handle_mouse(event, self.now);
        self.frame();
    }

    fn screen(&self) -> Vec<String> {
        let buffer = self.terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    fn screen_contains(&self, needle: &str) -> bool {
        self.screen().iter().any(|row| row.contains(needle))
    }
}

#[rstest]
#[case(SiteAdapter::Claude)]
#[case(SiteAdapter::ChatGpt)]
#[case(SiteAdapter::Gemini)]
fn page_text_is_rendered_from_the_top(#[case] adapter: SiteAdapter) {
    let harness = Harness::new(adapter);
    assert!(harness.screen()[0].starts_with("How should I structure a terminal UI"));
    assert!(!harness.screen_contains("Scroll Nav"));
}

#[test]
fn toggling_shows_the_outline_panel() {
    let mut harness = Harness::new(SiteAdapter::Claude);
    harness.key(KeyCode::Char('t'));

    assert!(harness.app.navigator().state().is_open());
    let panel = harness.app.panel_area;
    assert_eq!((panel.x, panel.y, panel.width, panel.height), (118, 4, 40, 24));
    assert!(harness.screen()[4].contains("Scroll Nav"));
    assert!(harness.screen_contains("> How should I structure"));
    assert!(harness.screen_contains("- Avoiding feedback loops"));

    harness.key(KeyCode::Esc);
    assert!(!harness.app.navigator().state().is_open());
    assert!(!harness.screen_contains("Scroll Nav"));
}

#[test]
fn global_toggle_chord_opens_the_panel() {
    let mut harness = Harness::new(SiteAdapter::Claude);
    harness.key_with(KeyCode::Char('.'), KeyModifiers::CONTROL);
    assert!(harness.app.navigator().state().is_open());
}

#[test]
fn filter_input_narrows_the_list_and_escape_clears_it() {
    let mut harness = Harness::new(SiteAdapter::Claude);
    harness.key(KeyCode::Char('/'));
    assert!(harness.app.is_editing_filter());
    assert!(harness.app.navigator().state().is_open());

    harness.type_text("feedback");
    assert_eq!(harness.app.navigator().index().len(), 2);
    assert!(harness.screen_contains("/ feedback_"));

    harness.key(KeyCode::Backspace);
    assert_eq!(harness.app.navigator().state().search_term(), "feedbac");

    harness.key(KeyCode::Esc);
    assert!(!harness.app.is_editing_filter());
    assert!(harness.app.navigator().state().is_open());
    assert_eq!(harness.app.navigator().state().search_term(), "");
    assert_eq!(harness.app.navigator().index().len(), 12);
}

#[test]
fn unmatched_filter_shows_the_empty_state() {
    let mut harness = Harness::new(SiteAdapter::Claude);
    harness.key(KeyCode::Char('/'));
    harness.type_text("zzz");
    harness.key(KeyCode::Enter);

    assert!(!harness.app.is_editing_filter());
    assert!(harness.screen_contains(EMPTY_STATE));
    assert_eq!(harness.app.navigator().state().search_term(), "zzz");
}

#[test]
fn appended_turns_show_up_after_the_debounce() {
    let mut harness = Harness::new(SiteAdapter::Claude);
    harness.key(KeyCode::Char('n'));
    assert_eq!(harness.app.navigator().index().len(), 12);
    assert!(harness.app.navigator().scheduler().is_pending(TaskKind::Refresh));

    harness.tick(500);
    assert_eq!(harness.app.navigator().index().len(), 13);

    harness.key(KeyCode::Char('n'));
    harness.tick(500);
    assert_eq!(harness.app.navigator().index().len(), 15);
}

#[test]
fn copy_puts_the_turn_on_the_clipboard_and_flashes() {
    let mut harness = Harness::new(SiteAdapter::Claude);
    harness.key(KeyCode::Char('t'));
    harness.key(KeyCode::Char('j'));
    harness.key(KeyCode::Char('j'));
    assert_eq!(harness.app.navigator().state().focused_index(), Some(2));

    harness.key(KeyCode::Char('y'));
    let copied = harness.app.take_clipboard().expect("clipboard text");
    assert!(copied.contains("Reading the document"));
    assert!(harness.app.navigator().is_copy_flash(&NavId::turn(1)));
    assert!(harness.screen_contains(COPY_CONFIRMATION));

    harness.tick(1_200);
    assert!(!harness.screen_contains(COPY_CONFIRMATION));
}

#[test]
fn wheel_scroll_updates_tracking_and_progress() {
    let mut harness = Harness::new(SiteAdapter::Claude);
    harness.key(KeyCode::Char('t'));
    harness.mouse(MouseEventKind::ScrollDown, 10, 10);

    let source = harness.app.navigator().binding().source().unwrap();
    assert_eq!(harness.app.doc().scroll_top(source), 60.0);
    assert_eq!(
        harness.app.navigator().state().active_id(),
        Some(&NavId::heading(&NavId::turn(1), 1))
    );
    // Progress computed in the frame callback shows on the next draw.
    harness.frame();
    assert!(harness.screen()[4].contains("27%"));
}

#[test]
fn clicking_a_row_jumps_to_its_target() {
    let mut harness = Harness::new(SiteAdapter::Claude);
    harness.key(KeyCode::Char('t'));
    let list = harness.app.list_area;
    assert_eq!(list.y, 7);

    harness.mouse(MouseEventKind::Down(MouseButton::Left), list.x + 2, list.y + 5);
    assert_eq!(harness.app.navigator().state().active_id(), Some(&NavId::turn(2)));
    assert!(harness.app.navigator().state().is_tracking_suppressed());
    assert!(harness.app.doc().is_animating());

    for _ in 0..20 {
        harness.tick(16);
    }
    let source = harness.app.navigator().binding().source().unwrap();
    assert_eq!(harness.app.doc().scroll_top(source), 220.0);
    assert_eq!(harness.app.navigator().state().active_id(), Some(&NavId::turn(2)));
}

#[test]
fn view_switch_is_clickable() {
    let mut harness = Harness::new(SiteAdapter::Claude);
    harness.key(KeyCode::Char('t'));
    let switch = harness.app.switch_area;

    harness.mouse(MouseEventKind::Down(MouseButton::Left), switch.x + 1, switch.y);
    assert_eq!(harness.app.navigator().index().len(), 3);
    harness.key(KeyCode::Right);
    assert_eq!(harness.app.navigator().index().len(), 12);
}

#[test]
fn header_drag_moves_the_panel_and_double_click_resets_it() {
    let mut harness = Harness::new(SiteAdapter::Claude);
    harness.key(KeyCode::Char('t'));
    let panel = harness.app.panel_area;

    harness.mouse(MouseEventKind::Down(MouseButton::Left), panel.x + 5, panel.y);
    assert!(harness.app.navigator().is_dragging());
    harness.mouse(MouseEventKind::Drag(MouseButton::Left), panel.x, panel.y + 1);
    harness.mouse(MouseEventKind::Up(MouseButton::Left), panel.x - 5, panel.y + 2);

    let moved = PanelPosition { top: 120.0, left: 860.0 };
    assert_eq!(harness.app.navigator().placement(), Placement::Custom(moved));
    assert_eq!(harness.app.panel_area.y, 6);

    harness.tick(1_000);
    let panel = harness.app.panel_area;
    harness.mouse(MouseEventKind::Down(MouseButton::Left), panel.x + 5, panel.y);
    harness.mouse(MouseEventKind::Up(MouseButton::Left), panel.x + 5, panel.y);
    harness.tick(100);
    harness.mouse(MouseEventKind::Down(MouseButton::Left), panel.x + 5, panel.y);

    assert_eq!(harness.app.navigator().placement(), Placement::Anchored);
    assert!(!harness.app.navigator().is_dragging());
    assert_eq!(harness.app.toast(), Some("Panel position reset"));
}

#[test]
fn shrinking_the_terminal_schedules_a_clamp() {
    let mut harness = Harness::new(SiteAdapter::Claude);
    assert!(!harness.app.navigator().scheduler().is_pending(TaskKind::ResizeClamp));
    harness.app.sync_viewport(80, 20, harness.now);
    assert!(harness.app.navigator().scheduler().is_pending(TaskKind::ResizeClamp));
}

#[test]
fn poll_timeout_follows_pending_work() {
    let mut harness = Harness::new(SiteAdapter::Claude);
    assert_eq!(harness.app.poll_timeout(0), 100);
    harness.tick(100);
    assert_eq!(harness.app.poll_timeout(100), 250);

    harness.key(KeyCode::PageDown);
    assert_eq!(harness.app.poll_timeout(100), 16);
}

#[rstest]
#[case(KeyCode::Char('q'), KeyModifiers::NONE)]
#[case(KeyCode::Char('c'), KeyModifiers::CONTROL)]
fn quit_keys_stop_the_loop(#[case] code: KeyCode, #[case] modifiers: KeyModifiers) {
    let mut harness = Harness::new(SiteAdapter::Claude);
    harness.key_with(code, modifiers);
    assert!(harness.app.should_quit());
}

#[test]
fn finishing_detaches_the_scroll_listener() {
    let harness = Harness::new(SiteAdapter::Claude);
    let doc = harness.app.finish();
    assert!(doc.scroll_listeners().is_empty());
}

#[test]
fn osc52_sequence_encodes_clipboard_text() {
    assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x1b\\");
}
