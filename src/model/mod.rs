// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Turns and headings are read fresh from the page on every refresh; navigation ids and the
//! session state refer to them only until the next rebuild.

pub mod ids;
pub mod state;
pub mod turn;

pub use ids::NavId;
pub use state::{normalize_search_term, NavigationState, ViewLevel};
pub use turn::{ConversationTurn, Heading, Headings, Role};
