//! Section metadata files
//!
//! Each track's sections live in `<documents>/audio/<name>.section.json`,
//! where `<name>` is the sanitized display name of the track. Files are always
//! read and written whole.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{PracticeError, Result};
use crate::state::store::SectionStore;

/// Directory under the documents dir holding metadata files
pub const AUDIO_DIR: &str = "audio";

/// Suffix of every metadata file
pub const SECTION_FILE_SUFFIX: &str = ".section.json";

const MP3_EXTENSION: &str = ".mp3";

/// Turn a track display name into a file-safe key.
///
/// Strips a trailing `.mp3` (any case), then replaces every character outside
/// `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_track_name(display_name: &str) -> String {
    let split = display_name.len().saturating_sub(MP3_EXTENSION.len());
    let base = match display_name.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(MP3_EXTENSION) => &display_name[..split],
        _ => display_name,
    };

    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Metadata file for one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFile {
    path: PathBuf,
}

impl SectionFile {
    pub fn for_track(documents_dir: &Path, display_name: &str) -> Self {
        let file_name = format!("{}{}", sanitize_track_name(display_name), SECTION_FILE_SUFFIX);
        Self {
            path: documents_dir.join(AUDIO_DIR).join(file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the sections. A missing file is an empty collection; a corrupt
    /// one is logged and also treated as empty.
    pub fn load(&self) -> Result<SectionStore> {
        match self.read()? {
            None => Ok(SectionStore::new()),
            Some(raw) => match SectionStore::deserialize(&raw) {
                Ok(store) => Ok(store),
                Err(e) => {
                    warn!(
                        "Section file {} is unreadable, starting empty: {}",
                        self.path.display(),
                        e
                    );
                    Ok(SectionStore::new())
                }
            },
        }
    }

    /// Load the sections, surfacing a corrupt file as `Parse`
    pub fn load_strict(&self) -> Result<SectionStore> {
        match self.read()? {
            None => Ok(SectionStore::new()),
            Some(raw) => SectionStore::deserialize(&raw),
        }
    }

    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            debug!("No section file at {}", self.path.display());
            return Ok(None);
        }

        fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|e| PracticeError::FileReadError {
                path: self.path.clone(),
                source: e,
            })
    }

    /// Write the whole collection, creating the audio directory if needed
    pub fn save(&self, store: &SectionStore) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| PracticeError::DirectoryCreateError {
                    path: dir.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let content = store.serialize()?;
        fs::write(&self.path, content).map_err(|e| PracticeError::FileWriteError {
            path: self.path.clone(),
            source: e,
        })?;

        info!(
            "Saved {} sections to {}",
            store.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Sanitized names of all tracks with saved sections, sorted
pub fn list_saved_tracks(documents_dir: &Path) -> Result<Vec<String>> {
    let audio_dir = documents_dir.join(AUDIO_DIR);
    if !audio_dir.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(&audio_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| PracticeError::FileReadError {
            path: audio_dir.clone(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if let Some(name) = file_name.strip_suffix(SECTION_FILE_SUFFIX) {
            names.push(name.to_string());
        }
    }

    names.sort();
    Ok(names)
}
