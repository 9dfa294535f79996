// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Atomically swappable credential store with durable persistence.
//!
//! Readers call [`CredentialStore::current`] and get an `Arc` snapshot that
//! stays internally consistent even if a replace lands mid-request. Writers go
//! through [`CredentialStore::replace`], which validates, persists, and only
//! then publishes the new value.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use kaonashi_core::KaonashiError;
use tracing::{debug, info};

use crate::credentials::Credentials;

/// Holds the active [`Credentials`] and the file they are persisted to.
pub struct CredentialStore {
    current: ArcSwap<Credentials>,
    path: PathBuf,
    /// Serializes persist-then-swap so the file and the active value agree.
    write_lock: Mutex<()>,
}

impl CredentialStore {
    /// Parse and validate a payload without touching any store.
    pub fn load(bytes: &[u8]) -> Result<Credentials, KaonashiError> {
        Credentials::parse(bytes)
    }

    /// Read the persisted payload at `path` and build a store from it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, KaonashiError> {
        let path = path.into();
        let bytes = std::fs::read(&path).map_err(|e| {
            KaonashiError::Config(format!(
                "cannot read credential payload {}: {e}",
                path.display()
            ))
        })?;
        let credentials = Self::load(&bytes)?;
        info!(
            path = %path.display(),
            recipient = %credentials.recipient_id,
            "credential payload loaded"
        );
        Ok(Self::with_credentials(credentials, path))
    }

    /// Build a store around already-validated credentials.
    pub fn with_credentials(credentials: Credentials, path: impl Into<PathBuf>) -> Self {
        Self {
            current: ArcSwap::from_pointee(credentials),
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The last successfully loaded credentials.
    pub fn current(&self) -> Arc<Credentials> {
        self.current.load_full()
    }

    /// Where replacements are persisted.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate `bytes`, persist them verbatim, then publish the new credentials.
    ///
    /// On any failure the active value and the persisted file are left as they
    /// were. Returns the credentials that were active before the swap.
    pub fn replace(&self, bytes: &[u8]) -> Result<Arc<Credentials>, KaonashiError> {
        let next = Arc::new(Self::load(bytes)?);

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| KaonashiError::Internal("credential writer lock poisoned".into()))?;

        persist_atomically(&self.path, bytes)?;
        let previous = self.current.swap(next);

        info!(path = %self.path.display(), "credential payload replaced");
        Ok(previous)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("path", &self.path)
            .field("recipient_id", &self.current.load().recipient_id)
            .finish_non_exhaustive()
    }
}

/// Write to a sibling temp file, fsync, then rename over `path`.
fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<(), KaonashiError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let storage = |e: std::io::Error| KaonashiError::Storage {
        source: Box::new(e),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(storage)?;
    tmp.write_all(bytes).map_err(storage)?;
    tmp.as_file().sync_all().map_err(storage)?;
    tmp.persist(path).map_err(|e| storage(e.error))?;

    debug!(path = %path.display(), size = bytes.len(), "credential payload persisted");
    Ok(())
}
