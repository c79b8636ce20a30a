// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Serializable page descriptions.
//!
//! A fixture is a JSON tree of element specs that builds into a live [`Document`]. The CLI loads
//! fixtures from disk, the site adapters build their demo pages with the same builder API.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{BoxHeight, Document, DomError, NodeId, Overflow, Viewport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFixture {
    pub url: String,
    #[serde(default)]
    pub viewport: Viewport,
    /// Children of `body`.
    #[serde(default)]
    pub body: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub overflow_y: Overflow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// `height: 100vh`; takes precedence over `height`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub fill_viewport: bool,
    /// Text content, placed before any child elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("cannot read page fixture {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid page fixture {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot build page fixture: {0}")]
    Dom(#[from] DomError),
}

impl PageFixture {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), viewport: Viewport::default(), body: Vec::new() }
    }

    pub fn viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = Viewport { width, height };
        self
    }

    pub fn with(mut self, node: NodeSpec) -> Self {
        self.body.push(node);
        self
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|source| FixtureError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_str(&raw)
            .map_err(|source| FixtureError::Json { path: path.to_path_buf(), source })
    }

    pub fn build(&self) -> Result<Document, FixtureError> {
        let mut doc = Document::with_body(self.url.clone(), self.viewport);
        let body = doc.ensure_body();
        for spec in &self.body {
            append_spec(&mut doc, body, spec)?;
        }
        doc.take_mutations();
        Ok(doc)
    }
}

impl NodeSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), ..Self::default() }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn class(self, classes: impl Into<String>) -> Self {
        self.attr("class", classes)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn fill_viewport(mut self) -> Self {
        self.fill_viewport = true;
        self
    }

    pub fn overflow_y(mut self, overflow: Overflow) -> Self {
        self.overflow_y = overflow;
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

/// Builds `spec` into `doc` as the last child of `parent`; returns the new element.
pub fn append_spec(doc: &mut Document, parent: NodeId, spec: &NodeSpec) -> Result<NodeId, DomError> {
    let element = build_detached(doc, spec)?;
    doc.append_child(parent, element)?;
    Ok(element)
}

fn build_detached(doc: &mut Document, spec: &NodeSpec) -> Result<NodeId, DomError> {
    let element = doc.create_element(&spec.tag);
    for (name, value) in &spec.attrs {
        doc.set_attribute(element, name, value.clone())?;
    }
    doc.set_overflow_y(element, spec.overflow_y)?;
    if let Some(text) = &spec.text {
        let text_node = doc.create_text(text.clone());
        doc.append_child(element, text_node)?;
    }
    for child in &spec.children {
        let child_element = build_detached(doc, child)?;
        doc.append_child(element, child_element)?;
    }
    let box_height = match (spec.fill_viewport, spec.height) {
        (true, _) => BoxHeight::Viewport,
        (false, Some(px)) => BoxHeight::Px(px),
        (false, None) => BoxHeight::Auto,
    };
    if box_height != BoxHeight::Auto {
        doc.set_box_height(element, box_height)?;
    }
    Ok(element)
}

fn is_false(value: &bool) -> bool {
    !*value
}
