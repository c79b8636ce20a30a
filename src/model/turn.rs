// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use smallvec::SmallVec;

use crate::dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Parses a role attribute value (`data-turn`, `data-message-author-role`).
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A heading (`h1`–`h4`) inside an assistant answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    text: String,
    element: NodeId,
    level: u8,
}

impl Heading {
    pub fn new(text: impl Into<String>, element: NodeId, level: u8) -> Self {
        Self { text: text.into(), element, level: level.clamp(1, 4) }
    }

    /// Level for a heading tag name (`h1` → 1); `None` for anything outside `h1`–`h4`.
    pub fn level_for_tag(tag: &str) -> Option<u8> {
        match tag {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            _ => None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn element(&self) -> NodeId {
        self.element
    }

    pub fn level(&self) -> u8 {
        self.level
    }
}

pub type Headings = SmallVec<[Heading; 4]>;

/// One message of the conversation, as read from the page in a single extraction pass.
///
/// `element` is a weak handle into the page; the turn never keeps the node alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    role: Role,
    element: NodeId,
    text: String,
    headings: Headings,
}

impl ConversationTurn {
    pub fn new(role: Role, element: NodeId, text: impl Into<String>, headings: Headings) -> Self {
        Self { role, element, text: text.into(), headings }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn element(&self) -> NodeId {
        self.element
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }
}
