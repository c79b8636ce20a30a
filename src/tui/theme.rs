// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::{env, error::Error, fmt};

use ratatui::style::{Color, Modifier, Style};

use crate::adapter::SiteAdapter;

const ACCENT_ENV: &str = "SCROLLNAV_ACCENT";

/// Panel colors. The accent follows the host site so the overlay blends in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PanelTheme {
    accent: Color,
    panel_bg: Color,
    text: Color,
    muted: Color,
}

impl PanelTheme {
    pub(crate) fn for_site(adapter: SiteAdapter) -> Self {
        let (accent, panel_bg) = match adapter {
            SiteAdapter::Claude => (Color::Rgb(0xd9, 0x77, 0x57), Color::Rgb(0x26, 0x24, 0x20)),
            SiteAdapter::ChatGpt => (Color::Rgb(0x10, 0xa3, 0x7f), Color::Rgb(0x21, 0x21, 0x21)),
            SiteAdapter::Gemini => (Color::Rgb(0x1a, 0x73, 0xe8), Color::Rgb(0x1e, 0x1f, 0x20)),
        };
        Self { accent, panel_bg, text: Color::Gray, muted: Color::DarkGray }
    }

    /// Applies `SCROLLNAV_ACCENT` (`#RRGGBB`) when set.
    pub(crate) fn with_env_override(self) -> Result<Self, ThemeError> {
        match env::var(ACCENT_ENV) {
            Ok(value) if value.trim().is_empty() => Ok(self),
            Ok(value) => {
                let accent = parse_hex_color(&value).map_err(|error| ThemeError::InvalidEnv {
                    name: ACCENT_ENV.to_owned(),
                    value: format!("{} ({error})", value.trim()),
                })?;
                Ok(Self { accent, ..self })
            }
            Err(env::VarError::NotPresent) => Ok(self),
            Err(env::VarError::NotUnicode(_)) => Err(ThemeError::InvalidEnv {
                name: ACCENT_ENV.to_owned(),
                value: "<non-unicode>".to_owned(),
            }),
        }
    }

    pub(crate) fn accent(&self) -> Color {
        self.accent
    }

    pub(crate) fn panel_style(&self) -> Style {
        Style::default().fg(self.text).bg(self.panel_bg)
    }

    pub(crate) fn border_style(&self, dragging: bool) -> Style {
        let style = self.panel_style().fg(self.accent);
        if dragging {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    pub(crate) fn muted_style(&self) -> Style {
        self.panel_style().fg(self.muted)
    }

    pub(crate) fn heading_style(&self) -> Style {
        self.panel_style().fg(self.muted).add_modifier(Modifier::ITALIC)
    }

    pub(crate) fn active_style(&self) -> Style {
        self.panel_style().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn focus_style(&self) -> Style {
        self.panel_style().add_modifier(Modifier::REVERSED)
    }

    pub(crate) fn match_style(&self) -> Style {
        Style::default().fg(Color::Black).bg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn switch_style(&self, selected: bool) -> Style {
        if selected {
            self.match_style()
        } else {
            self.muted_style()
        }
    }

    pub(crate) fn page_style(&self) -> Style {
        Style::default()
    }

    pub(crate) fn page_heading_style(&self) -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }
}

fn parse_hex_color(value: &str) -> Result<Color, String> {
    let trimmed = value.trim();
    let hex = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .unwrap_or(trimmed);
    if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(format!("invalid hex color: {trimmed} (expected #RRGGBB)"));
    }
    let rgb = u32::from_str_radix(hex, 16).map_err(|_| format!("invalid hex color: {trimmed}"))?;
    Ok(Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
}

#[derive(Debug, Clone)]
pub(crate) enum ThemeError {
    InvalidEnv { name: String, value: String },
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnv { name, value } => write!(f, "invalid env {name}={value}"),
        }
    }
}

impl Error for ThemeError {}
