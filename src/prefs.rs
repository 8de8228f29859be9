//! Persisted user preferences.
//!
//! A single JSON file stands in for client-local storage. Only one flag is
//! stored today: whether infinite scrolling is enabled, under the key
//! `infiniteScroll`. A missing or unreadable file falls back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("failed to write preferences to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct StoredPrefs {
    #[serde(rename = "infiniteScroll", default)]
    infinite_scroll: bool,
}

/// Preference store backed by a JSON file.
#[derive(Debug)]
pub struct Preferences {
    path: PathBuf,
    values: StoredPrefs,
}

impl Preferences {
    /// Read preferences from `path`. Missing or corrupt files yield the
    /// defaults; corruption is logged, not surfaced.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(values) => values,
                Err(e) => {
                    warn!(path = %path.display(), "Ignoring corrupt preferences file: {e}");
                    StoredPrefs::default()
                }
            },
            Err(_) => StoredPrefs::default(),
        };
        Self { path, values }
    }

    #[must_use]
    pub fn infinite_scroll(&self) -> bool {
        self.values.infinite_scroll
    }

    /// Update the infinite-scroll flag and write it through to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn set_infinite_scroll(&mut self, enabled: bool) -> Result<(), PrefsError> {
        self.values.infinite_scroll = enabled;
        self.persist().await
    }

    async fn persist(&self) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| PrefsError::Write {
                        path: self.path.clone(),
                        source,
                    })?;
            }
        }
        let raw = serde_json::to_string_pretty(&self.values)?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|source| PrefsError::Write {
                path: self.path.clone(),
                source,
            })
    }
}
