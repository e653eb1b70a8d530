//! Practice configuration
//!
//! Stored as a JSON file. Missing fields fall back to defaults so older
//! config files keep loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::PlaybackRate;
use crate::error::{PracticeError, Result};

/// Default position report interval, matching the platform media default.
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 500;

/// Subdirectory of the documents dir holding takes when no override is set.
const RECORDINGS_SUBDIR: &str = "recordings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeConfig {
    /// App documents directory; section metadata lives under `audio/`.
    pub documents_dir: PathBuf,
    /// Bundled track used when the user has not picked a file.
    pub default_track: PathBuf,
    /// Where finished takes are written.
    pub recordings_dir: Option<PathBuf>,
    /// Rate applied to the first load of a session.
    pub initial_rate: PlaybackRate,
    /// Minimum wall time between two position samples.
    pub progress_interval_ms: u64,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("documents"),
            default_track: PathBuf::from("assets").join("sample.wav"),
            recordings_dir: None,
            initial_rate: PlaybackRate::default(),
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
        }
    }
}

impl PracticeConfig {
    /// Load a config file. An absent file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| PracticeError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| PracticeError::Parse {
            reason: format!("{}: {}", path.display(), e),
        })
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| PracticeError::DirectoryCreateError {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| PracticeError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Effective recordings directory.
    pub fn recordings_dir(&self) -> PathBuf {
        self.recordings_dir
            .clone()
            .unwrap_or_else(|| self.documents_dir.join(RECORDINGS_SUBDIR))
    }

    pub fn with_documents_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.documents_dir = dir.into();
        self
    }
}
