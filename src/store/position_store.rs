// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scrollnav-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scrollnav and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use crate::placement::PanelPosition;

const KEY_PREFIX: &str = "scroll_nav_pos_";

/// Storage key of the panel position for `host`.
pub fn position_key(host: &str) -> String {
    format!("{KEY_PREFIX}{host}")
}

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    Unavailable { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "position store io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "position store json error at {path:?}: {source}"),
            Self::Unavailable { reason } => write!(f, "position store unavailable: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Key-value storage for panel positions.
pub trait PositionStore {
    fn load(&self, host: &str) -> Result<Option<PanelPosition>, StoreError>;
    fn save(&mut self, host: &str, position: PanelPosition) -> Result<(), StoreError>;
    fn remove(&mut self, host: &str) -> Result<(), StoreError>;
}

/// All positions in one JSON object file, rewritten atomically on every change.
#[derive(Debug, Clone)]
pub struct FilePositionStore {
    path: PathBuf,
}

impl FilePositionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, PanelPosition>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(StoreError::Io { path: self.path.clone(), source }),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Json { path: self.path.clone(), source })
    }

    /// Entries to rewrite. A file that no longer parses is replaced rather than left blocking
    /// every later write; the flag reports that it was discarded.
    fn read_for_write(&self) -> Result<(BTreeMap<String, PanelPosition>, bool), StoreError> {
        match self.read_all() {
            Ok(entries) => Ok((entries, false)),
            Err(StoreError::Json { path, source }) => {
                warn!(path = %path.display(), error = %source, "discarding unreadable position store");
                Ok((BTreeMap::new(), true))
            }
            Err(err) => Err(err),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, PanelPosition>) -> Result<(), StoreError> {
        let mut contents = serde_json::to_vec_pretty(entries)
            .map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        contents.push(b'\n');
        write_atomic(&self.path, &contents)
    }
}

impl PositionStore for FilePositionStore {
    fn load(&self, host: &str) -> Result<Option<PanelPosition>, StoreError> {
        Ok(self.read_all()?.get(&position_key(host)).copied())
    }

    fn save(&mut self, host: &str, position: PanelPosition) -> Result<(), StoreError> {
        let (mut entries, _) = self.read_for_write()?;
        entries.insert(position_key(host), position);
        self.write_all(&entries)
    }

    fn remove(&mut self, host: &str) -> Result<(), StoreError> {
        let (mut entries, discarded) = self.read_for_write()?;
        if entries.remove(&position_key(host)).is_none() && !discarded {
            return Ok(());
        }
        self.write_all(&entries)
    }
}

/// In-memory store. Clones share the same map, so a test can keep a handle and inspect what
/// the navigator saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryPositionStore {
    entries: Rc<RefCell<BTreeMap<String, PanelPosition>>>,
}

impl MemoryPositionStore {
    pub fn get(&self, host: &str) -> Option<PanelPosition> {
        self.entries.borrow().get(&position_key(host)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl PositionStore for MemoryPositionStore {
    fn load(&self, host: &str) -> Result<Option<PanelPosition>, StoreError> {
        Ok(self.get(host))
    }

    fn save(&mut self, host: &str, position: PanelPosition) -> Result<(), StoreError> {
        self.entries.borrow_mut().insert(position_key(host), position);
        Ok(())
    }

    fn remove(&mut self, host: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(&position_key(host));
        Ok(())
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let Some(parent) = path.parent() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"),
        });
    };
    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        });
    };
    let parent = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };
    fs::create_dir_all(parent).map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;

    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
    let tmp_path = parent.join(format!(".scrollnav.tmp.{}.{nanos}", file_name.to_string_lossy()));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
    file.write_all(contents).map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io { path: path.to_path_buf(), source });
    }
    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err) if matches!(err.kind(), io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied) => {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}
