// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;

use smol_str::SmolStr;

const TURN_PREFIX: &str = "nav-target-";
const HEADING_INFIX: &str = "-h-";

/// Identifier of one navigation entry.
///
/// Ids are scoped to a single refresh cycle: they are derived from positions in the freshly
/// extracted turn list, so the same id may point at a different node after the next rebuild.
/// Turn ids look like `nav-target-<turn>`, heading ids like `nav-target-<turn>-h-<heading>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NavId(SmolStr);

impl NavId {
    pub fn turn(turn_index: usize) -> Self {
        let mut buf = itoa::Buffer::new();
        let digits = buf.format(turn_index);
        let mut value = String::with_capacity(TURN_PREFIX.len() + digits.len());
        value.push_str(TURN_PREFIX);
        value.push_str(digits);
        Self(SmolStr::new(value))
    }

    pub fn heading(parent: &NavId, heading_index: usize) -> Self {
        let mut buf = itoa::Buffer::new();
        let digits = buf.format(heading_index);
        let mut value = String::with_capacity(parent.0.len() + HEADING_INFIX.len() + digits.len());
        value.push_str(&parent.0);
        value.push_str(HEADING_INFIX);
        value.push_str(digits);
        Self(SmolStr::new(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_heading(&self) -> bool {
        self.0.contains(HEADING_INFIX)
    }
}

impl fmt::Display for NavId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NavId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for NavId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}
