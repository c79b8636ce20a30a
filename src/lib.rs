// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scrollnav: a live outline of long chat transcripts.
//!
//! The engine reads conversation turns and their headings out of a live document, keeps a
//! filtered navigation index in sync with page mutations, tracks which entry is in view and
//! jumps to entries on request. [`navigator::Navigator`] ties the pieces together; [`tui`] is
//! a terminal host that drives it.

pub mod adapter;
pub mod config;
pub mod dom;
pub mod extract;
pub mod filter;
pub mod focus;
pub mod index;
pub mod keymap;
pub mod model;
pub mod navigator;
pub mod placement;
pub mod schedule;
pub mod scroll;
pub mod store;
pub mod tracker;
pub mod tui;
