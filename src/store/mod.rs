// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for the panel position.
//!
//! Positions are keyed by page host. Failures never stop navigation: callers log them and fall
//! back to the anchored placement.

pub mod position_store;

pub use position_store::{
    position_key, FilePositionStore, MemoryPositionStore, PositionStore, StoreError,
};
