// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal host.
//!
//! Renders a live document as text rows with the outline panel on top and feeds the navigator
//! the same signals a browser would: mutations, scroll events, animation frames and a clock.

use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use tracing::debug;

use crate::adapter::DemoBlock;
use crate::dom::{fixture::append_spec, Document, NodeId, ScrollBehavior, Viewport};
use crate::index::{EntryKind, NavigationEntry, EMPTY_STATE};
use crate::keymap::{map_key, KeyContext, NavCommand};
use crate::model::{NavId, Role, ViewLevel};
use crate::navigator::{Navigator, COPY_CONFIRMATION};
use crate::placement::PanelSize;
use crate::schedule::Millis;

mod page;
mod theme;

use page::{visible_lines, CELL_HEIGHT, CELL_WIDTH};
use theme::PanelTheme;

const PANEL_COLS: u16 = 40;
const PANEL_ROWS: u16 = 24;
const IDLE_POLL_MS: Millis = 250;
const FRAME_MS: Millis = 16;
const DOUBLE_CLICK_MS: Millis = 400;
const WHEEL_STEP_PX: f64 = 3.0 * CELL_HEIGHT;
const PAGE_FRACTION: f64 = 0.8;

/// Turns appended by `n`, cycled.
const FOLLOW_UPS: &[(Role, &[DemoBlock])] = &[
    (Role::User, &[DemoBlock::Paragraph("Can you summarize that in two lines?")]),
    (
        Role::Assistant,
        &[
            DemoBlock::Heading(2, "Summary"),
            DemoBlock::Paragraph("Rebuild on quiet periods and track the nearest entry.\nPause tracking while a jump animates."),
        ],
    ),
];

/// Runs the interactive host until the user quits.
pub fn run(doc: Document, navigator: Navigator) -> Result<(), Box<dyn Error>> {
    let theme = PanelTheme::for_site(navigator.adapter()).with_env_override()?;
    let mut terminal = TerminalSession::new()?;
    let clock = Instant::now();
    let mut app = App::new(doc, navigator, theme);

    while !app.should_quit() {
        let now = elapsed_ms(clock);
        let size = terminal.size()?;
        app.sync_viewport(size.width, size.height.saturating_sub(1), now);
        app.pump(now);
        terminal.draw(|frame| draw(frame, &mut app))?;
        app.after_frame();

        if let Some(text) = app.take_clipboard() {
            if let Err(err) = copy_to_clipboard(&text) {
                app.set_toast(format!("Copy failed: {err}"));
            }
        }

        if event::poll(Duration::from_millis(app.poll_timeout(elapsed_ms(clock))))? {
            let now = elapsed_ms(clock);
            match event::read()? {
                Event::Key(key) => app.handle_key(key, now),
                Event::Mouse(mouse) => app.handle_mouse(mouse, now),
                _ => {}
            }
        }
    }

    app.finish();
    Ok(())
}

fn elapsed_ms(clock: Instant) -> Millis {
    Millis::try_from(clock.elapsed().as_millis()).unwrap_or(Millis::MAX)
}

/// Interactive state around one navigator session.
pub(crate) struct App {
    doc: Document,
    navigator: Navigator,
    theme: PanelTheme,
    filter_input: Option<String>,
    last_pump: Option<Millis>,
    follow_ups: usize,
    panel_area: Rect,
    list_area: Rect,
    list_offset: usize,
    switch_area: Rect,
    last_header_click: Option<Millis>,
    clipboard: Option<String>,
    toast: Option<String>,
    should_quit: bool,
}

impl App {
    pub(crate) fn new(doc: Document, mut navigator: Navigator, theme: PanelTheme) -> Self {
        navigator.set_panel_size(PanelSize {
            width: f64::from(PANEL_COLS) * CELL_WIDTH,
            height: f64::from(PANEL_ROWS) * CELL_HEIGHT,
        });
        Self {
            doc,
            navigator,
            theme,
            filter_input: None,
            last_pump: None,
            follow_ups: 0,
            panel_area: Rect::default(),
            list_area: Rect::default(),
            list_offset: 0,
            switch_area: Rect::default(),
            last_header_click: None,
            clipboard: None,
            toast: None,
            should_quit: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn doc(&self) -> &Document {
        &self.doc
    }

    #[cfg(test)]
    pub(crate) fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[cfg(test)]
    pub(crate) fn is_editing_filter(&self) -> bool {
        self.filter_input.is_some()
    }

    pub(crate) fn toast(&self) -> Option<&str> {
        self.toast.as_deref()
    }

    pub(crate) fn set_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(message.into());
    }

    pub(crate) fn take_clipboard(&mut self) -> Option<String> {
        self.clipboard.take()
    }

    /// Resizes the document viewport to the page area (`cols` × `rows` cells).
    pub(crate) fn sync_viewport(&mut self, cols: u16, rows: u16, now: Millis) {
        let viewport = Viewport {
            width: f64::from(cols) * CELL_WIDTH,
            height: f64::from(rows) * CELL_HEIGHT,
        };
        if self.doc.viewport() != viewport {
            self.doc.set_viewport(viewport);
            self.navigator.on_resize(now);
        }
    }

    /// Steps animations to `now` and delivers everything the page produced since the last call.
    pub(crate) fn pump(&mut self, now: Millis) {
        let dt = self.last_pump.map_or(0, |last| now.saturating_sub(last));
        self.last_pump = Some(now);
        if dt > 0 {
            self.doc.advance_animations(dt);
        }

        let records = self.doc.take_mutations();
        if !records.is_empty() {
            self.navigator.on_mutations(&mut self.doc, &records, now);
        }
        for scrolled in self.doc.take_scroll_events() {
            self.navigator.on_scroll(&self.doc, scrolled);
        }
        self.navigator.advance(&mut self.doc, now);
    }

    /// Frame callback, once per rendered frame.
    pub(crate) fn after_frame(&mut self) {
        self.navigator.on_frame(&self.doc);
    }

    /// How long the event loop may sleep.
    pub(crate) fn poll_timeout(&self, now: Millis) -> Millis {
        if self.doc.is_animating() || self.navigator.wants_frame() {
            return FRAME_MS;
        }
        match self.navigator.scheduler().next_deadline() {
            Some(deadline) => deadline.saturating_sub(now).clamp(1, IDLE_POLL_MS),
            None => IDLE_POLL_MS,
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent, now: Millis) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        self.toast = None;

        if let Some(buffer) = self.filter_input.as_mut() {
            let context = KeyContext { panel_open: true, in_search_input: true, typing: true };
            if let Some(command) = map_key(&key, context) {
                self.filter_input = None;
                self.navigator.handle_key(&mut self.doc, command, now);
                return;
            }
            match key.code {
                KeyCode::Enter => self.filter_input = None,
                KeyCode::Backspace => {
                    buffer.pop();
                    let term = buffer.clone();
                    self.navigator.set_search_term(&mut self.doc, &term, now);
                }
                KeyCode::Char(ch) if !has_command_modifier(key.modifiers) => {
                    buffer.push(ch);
                    let term = buffer.clone();
                    self.navigator.set_search_term(&mut self.doc, &term, now);
                }
                _ => {}
            }
            return;
        }

        let context = KeyContext { panel_open: self.navigator.state().is_open(), ..KeyContext::default() };
        if let Some(command) = map_key(&key, context) {
            self.navigator.handle_key(&mut self.doc, command, now);
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('t') => {
                self.navigator.handle_key(&mut self.doc, NavCommand::Toggle, now);
            }
            KeyCode::Char('/') => {
                if !self.navigator.state().is_open() {
                    self.navigator.toggle_open(Some(true));
                }
                self.filter_input = Some(self.navigator.state().search_term().to_owned());
            }
            KeyCode::Char('n') => self.append_follow_up(),
            KeyCode::Char('y') => self.copy_focused(now),
            KeyCode::Char('r') => self.reset_position(),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_page(PAGE_FRACTION),
            KeyCode::PageUp => self.scroll_page(-PAGE_FRACTION),
            KeyCode::Down => self.scroll_by(CELL_HEIGHT),
            KeyCode::Up => self.scroll_by(-CELL_HEIGHT),
            KeyCode::Home => self.scroll_to_edge(false),
            KeyCode::End => self.scroll_to_edge(true),
            _ => {}
        }
    }

    pub(crate) fn handle_mouse(&mut self, mouse: MouseEvent, now: Millis) {
        let x = f64::from(mouse.column) * CELL_WIDTH;
        let y = f64::from(mouse.row) * CELL_HEIGHT;
        match mouse.kind {
            MouseEventKind::ScrollDown => self.scroll_by(WHEEL_STEP_PX),
            MouseEventKind::ScrollUp => self.scroll_by(-WHEEL_STEP_PX),
            MouseEventKind::Down(MouseButton::Left) => {
                if !self.navigator.state().is_open() {
                    return;
                }
                if mouse.row == self.panel_area.y && contains(self.panel_area, mouse.column, mouse.row) {
                    let double = self
                        .last_header_click
                        .is_some_and(|last| now.saturating_sub(last) <= DOUBLE_CLICK_MS);
                    if double {
                        self.last_header_click = None;
                        self.reset_position();
                    } else {
                        self.last_header_click = Some(now);
                        self.navigator.begin_drag(&self.doc, x, y);
                    }
                } else if contains(self.switch_area, mouse.column, mouse.row) {
                    let half = self.switch_area.x + self.switch_area.width / 2;
                    let level = if mouse.column < half { ViewLevel::PromptsOnly } else { ViewLevel::All };
                    self.navigator.set_view_level(&mut self.doc, level, now);
                } else if contains(self.list_area, mouse.column, mouse.row) {
                    let index = self.list_offset + usize::from(mouse.row - self.list_area.y);
                    if let Some(id) = self.navigator.index().entry_at(index).map(|entry| entry.id().clone()) {
                        self.navigator.activate(&mut self.doc, &id, now);
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) if self.navigator.is_dragging() => {
                self.navigator.drag_to(x, y);
            }
            MouseEventKind::Up(MouseButton::Left) if self.navigator.is_dragging() => {
                self.navigator.end_drag(&self.doc, x, y);
            }
            _ => {}
        }
    }

    /// Detaches the session from the document.
    pub(crate) fn finish(self) -> Document {
        let Self { mut doc, navigator, .. } = self;
        navigator.teardown(&mut doc);
        doc
    }

    fn scroll_source(&self) -> NodeId {
        self.navigator.binding().source().unwrap_or_else(|| self.doc.scrolling_element())
    }

    fn scroll_by(&mut self, delta: f64) {
        let source = self.scroll_source();
        self.doc.scroll_by(source, delta);
    }

    fn scroll_page(&mut self, fraction: f64) {
        let source = self.scroll_source();
        let target = self.doc.scroll_top(source) + self.doc.viewport().height * fraction;
        self.doc.scroll_to(source, target, ScrollBehavior::Smooth);
    }

    fn scroll_to_edge(&mut self, bottom: bool) {
        let source = self.scroll_source();
        let target = if bottom { self.doc.max_scroll_top(source) } else { 0.0 };
        self.doc.scroll_to(source, target, ScrollBehavior::Smooth);
    }

    fn append_follow_up(&mut self) {
        let adapter = self.navigator.adapter();
        let Some(parent) = adapter.demo_turn_parent(&self.doc) else {
            self.set_toast("No place to add a turn on this page");
            return;
        };
        let (role, blocks) = FOLLOW_UPS[self.follow_ups % FOLLOW_UPS.len()];
        match append_spec(&mut self.doc, parent, &adapter.demo_turn(role, blocks)) {
            Ok(_) => {
                self.follow_ups += 1;
                debug!(role = role.as_str(), "appended follow-up turn");
            }
            Err(err) => self.set_toast(format!("Cannot add turn: {err}")),
        }
    }

    /// Secondary action on the focused row's turn.
    fn copy_focused(&mut self, now: Millis) {
        let Some(id) = self.navigator.focused_entry().and_then(|entry| self.owning_turn(entry)) else {
            return;
        };
        self.clipboard = self.navigator.copy_turn_text(&id, now);
    }

    fn owning_turn(&self, entry: &NavigationEntry) -> Option<NavId> {
        let row = entry.item().row;
        self.navigator
            .index()
            .entries()
            .iter()
            .find(|candidate| candidate.is_turn() && candidate.item().row == row)
            .map(|turn| turn.id().clone())
    }

    fn reset_position(&mut self) {
        self.navigator.reset_position();
        self.set_toast("Panel position reset");
    }
}

fn has_command_modifier(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

pub(crate) fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.size();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let page_area = layout[0];
    let status_area = layout[1];

    draw_page(frame, app, page_area);
    frame.render_widget(Paragraph::new(status_line(app)), status_area);

    if app.navigator.state().is_open() {
        draw_panel(frame, app, page_area);
    } else {
        app.panel_area = Rect::default();
        app.list_area = Rect::default();
        app.switch_area = Rect::default();
    }
}

fn draw_page(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let mut rows = vec![Line::default(); usize::from(area.height)];
    for line in visible_lines(&app.doc, area.height) {
        let style = match line.heading {
            Some(_) => app.theme.page_heading_style(),
            None => app.theme.page_style(),
        };
        if let Some(slot) = rows.get_mut(usize::from(line.row)) {
            *slot = Line::styled(line.text, style);
        }
    }
    frame.render_widget(Paragraph::new(rows), area);
}

fn draw_panel(frame: &mut Frame<'_>, app: &mut App, page_area: Rect) {
    let position = app.navigator.panel_position(&app.doc);
    let x = (position.left / CELL_WIDTH).round().max(0.0) as u16;
    let y = (position.top / CELL_HEIGHT).round().max(0.0) as u16;
    let panel = Rect::new(
        page_area.x + x.min(page_area.width.saturating_sub(1)),
        page_area.y + y.min(page_area.height.saturating_sub(1)),
        PANEL_COLS,
        PANEL_ROWS,
    )
    .intersection(page_area);
    app.panel_area = panel;

    let title = format!(" Scroll Nav {:>3}% ", app.navigator.progress());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(app.theme.border_style(app.navigator.is_dragging()))
        .style(app.theme.panel_style());
    let inner = block.inner(panel);
    frame.render_widget(Clear, panel);
    frame.render_widget(block, panel);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    app.switch_area = sections[0];

    let level = app.navigator.state().view_level();
    let switch = Line::from(vec![
        Span::styled(" Prompts ", app.theme.switch_style(level == ViewLevel::PromptsOnly)),
        Span::raw(" "),
        Span::styled(" All ", app.theme.switch_style(level == ViewLevel::All)),
    ]);
    frame.render_widget(Paragraph::new(switch), sections[0]);
    frame.render_widget(Paragraph::new(filter_line(app)), sections[1]);

    app.list_area = sections[2];
    if app.navigator.index().is_empty() {
        app.list_offset = 0;
        frame.render_widget(Paragraph::new(Span::styled(EMPTY_STATE, app.theme.muted_style())), sections[2]);
        return;
    }

    let items = app
        .navigator
        .index()
        .entries()
        .iter()
        .enumerate()
        .map(|(position, entry)| ListItem::new(entry_line(app, position, entry)))
        .collect::<Vec<_>>();
    let mut state = ListState::default().with_offset(app.list_offset);
    state.select(app.navigator.state().focused_index());
    frame.render_stateful_widget(List::new(items), sections[2], &mut state);
    app.list_offset = state.offset();
}

fn filter_line(app: &App) -> Line<'static> {
    match &app.filter_input {
        Some(buffer) => Line::from(vec![
            Span::styled("/ ", app.theme.active_style()),
            Span::raw(buffer.clone()),
            Span::styled("_", app.theme.active_style()),
        ]),
        None if app.navigator.state().is_searching() => Line::from(vec![
            Span::styled("/ ", app.theme.muted_style()),
            Span::raw(app.navigator.state().search_term().to_owned()),
        ]),
        None => Line::styled("/ Filter", app.theme.muted_style()),
    }
}

fn entry_line(app: &App, position: usize, entry: &NavigationEntry) -> Line<'static> {
    let theme = &app.theme;
    let active = app.navigator.state().active_id() == Some(entry.id());
    let focused = app.navigator.state().focused_index() == Some(position);
    let base = if focused {
        theme.focus_style()
    } else if active {
        theme.active_style()
    } else if entry.is_turn() {
        theme.panel_style()
    } else {
        theme.heading_style()
    };

    let prefix = match entry.kind() {
        EntryKind::Turn { role: Role::User } => "> ".to_owned(),
        EntryKind::Turn { role: Role::Assistant } => "< ".to_owned(),
        EntryKind::Heading { level } => format!("{}- ", "  ".repeat(usize::from(level.max(1)))),
    };
    if app.navigator.is_copy_flash(entry.id()) {
        return Line::from(vec![Span::styled(prefix, base), Span::styled(COPY_CONFIRMATION, theme.active_style())]);
    }

    let (before, hit, after) = entry.display().segments();
    let mut spans = vec![Span::styled(prefix, base), Span::styled(before.to_owned(), base)];
    if !hit.is_empty() {
        spans.push(Span::styled(hit.to_owned(), theme.match_style()));
        spans.push(Span::styled(after.to_owned(), base));
    }
    Line::from(spans)
}

fn status_line(app: &App) -> Line<'static> {
    if let Some(toast) = app.toast() {
        return Line::styled(toast.to_owned(), Style::default().fg(app.theme.accent()));
    }
    let hints = [
        ("t", "toggle"),
        ("/", "filter"),
        ("n", "add turn"),
        ("y", "copy"),
        ("r", "reset"),
        ("q", "quit"),
    ];
    let mut spans = Vec::with_capacity(hints.len() * 2 + 1);
    spans.push(Span::styled(
        format!(" {} ", app.navigator.adapter()),
        Style::default().fg(Color::Black).bg(app.theme.accent()),
    ));
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {key}"), Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(format!(" {label}"), Style::default().fg(Color::Gray)));
    }
    Line::from(spans)
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn size(&self) -> io::Result<Rect> {
        self.terminal.size()
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
}

fn copy_to_clipboard(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, Print(osc52_sequence(text)))
}

fn osc52_sequence(text: &str) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    let encoded = STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x1b\\")
}

#[cfg(test)]
mod tests;
