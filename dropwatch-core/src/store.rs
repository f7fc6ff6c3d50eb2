//! Persisted status between runs.
//!
//! A missing file means this is the first run. A file that is not valid JSON
//! (or does not match the snapshot shape) is logged and treated the same way,
//! so a corrupted state never blocks the next check. Other read errors are
//! fatal.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::error::{DropwatchError, Result};
use crate::status::{PreviousStatus, StatusSnapshot};

#[derive(Debug, Clone)]
pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<PreviousStatus> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No previous status file, treating as first run");
                return Ok(PreviousStatus::default());
            }
            Err(source) => {
                return Err(DropwatchError::StateRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_str::<PreviousStatus>(&content) {
            Ok(previous) => {
                debug!(
                    dropcatch = ?previous.dropcatch,
                    whois = ?previous.whois_status(),
                    "Loaded previous status"
                );
                Ok(previous)
            }
            Err(e) => {
                warn!(error = %e, "Status file is malformed, treating as first run");
                Ok(PreviousStatus::default())
            }
        }
    }

    /// Overwrite the file with `snapshot`, pretty-printed with two-space indents.
    #[instrument(skip(self, snapshot), fields(path = %self.path.display()))]
    pub async fn save(&self, snapshot: &StatusSnapshot) -> Result<()> {
        let mut json = serde_json::to_string_pretty(snapshot)?;
        json.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| DropwatchError::StateWrite {
                    path: self.path.clone(),
                    source,
                })?;
        }

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| DropwatchError::StateWrite {
                path: self.path.clone(),
                source,
            })?;

        debug!("Saved status");
        Ok(())
    }
}
