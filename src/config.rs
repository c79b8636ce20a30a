// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Navigator tuning.
//!
//! Every delay and geometry constant the navigator uses lives here. A JSON file may override
//! any subset of them; missing keys keep their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::TextLimits;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigatorConfig {
    /// Quiet period after the last page mutation before the list is rebuilt.
    pub refresh_debounce_ms: u64,
    /// How long scroll tracking stays off after a jump.
    pub suppression_ms: u64,
    /// Delay of the position sync that follows a rebuild.
    pub progress_delay_ms: u64,
    /// How long the copy confirmation replaces the row text.
    pub copy_flash_ms: u64,
    pub resize_debounce_ms: u64,
    /// Header offset as a share of the viewport height.
    pub header_offset_ratio: f64,
    pub header_offset_min: f64,
    pub header_offset_max: f64,
    /// Header offset base used when the viewport reports no height.
    pub header_offset_fallback: f64,
    /// Overflow (px) a box must exceed before it counts as scrollable.
    pub scroll_threshold_px: f64,
    /// Minimum distance between the panel and the viewport edges.
    pub panel_margin_px: f64,
    pub text: TextLimits,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            refresh_debounce_ms: 500,
            suppression_ms: 800,
            progress_delay_ms: 100,
            copy_flash_ms: 1200,
            resize_debounce_ms: 200,
            header_offset_ratio: 0.15,
            header_offset_min: 80.0,
            header_offset_max: 170.0,
            header_offset_fallback: 110.0,
            scroll_threshold_px: 4.0,
            panel_margin_px: 10.0,
            text: TextLimits::default(),
        }
    }
}

impl NavigatorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let geometry = [
            ("header_offset_ratio", self.header_offset_ratio),
            ("header_offset_min", self.header_offset_min),
            ("header_offset_max", self.header_offset_max),
            ("header_offset_fallback", self.header_offset_fallback),
            ("scroll_threshold_px", self.scroll_threshold_px),
            ("panel_margin_px", self.panel_margin_px),
        ];
        for (name, value) in geometry {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be a finite, non-negative number")));
            }
        }
        if self.header_offset_min > self.header_offset_max {
            return Err(ConfigError::Invalid(format!(
                "header_offset_min ({}) exceeds header_offset_max ({})",
                self.header_offset_min, self.header_offset_max
            )));
        }
        if self.text.display_max_chars < 3 {
            return Err(ConfigError::Invalid("text.display_max_chars must leave room for an ellipsis".into()));
        }
        if self.refresh_debounce_ms == 0 {
            return Err(ConfigError::Invalid("refresh_debounce_ms must be positive".into()));
        }
        Ok(())
    }

    /// Offset of the reference line below the top of the scroll area.
    pub fn header_offset(&self, viewport_height: f64) -> f64 {
        let dynamic = viewport_height * self.header_offset_ratio;
        let base = if dynamic > 0.0 { dynamic } else { self.header_offset_fallback };
        base.clamp(self.header_offset_min, self.header_offset_max)
    }
}
