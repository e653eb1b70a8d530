//! Workspace: the state that outlives a single screen
//!
//! Holds the selected track and its sections. Screens borrow it; nothing
//! else keeps section state. Every successful edit is written through to the
//! track's metadata file.

use log::{info, warn};

use crate::config::PracticeConfig;
use crate::engine::MediaSource;
use crate::error::Result;
use crate::state::{SectionFile, SectionStore};

pub struct Workspace {
    config: PracticeConfig,
    track: MediaSource,
    store: SectionStore,
    /// `None` for the bundled track, which has no metadata file
    file: Option<SectionFile>,
}

impl Workspace {
    /// Start on the bundled default track with no sections
    pub fn new(config: PracticeConfig) -> Self {
        let track = MediaSource::Bundled(config.default_track.clone());
        Self {
            config,
            track,
            store: SectionStore::new(),
            file: None,
        }
    }

    /// Switch to another track, replacing the section collection with the one
    /// saved for it. Returns the number of sections loaded.
    pub fn select_track(&mut self, source: MediaSource) -> Result<usize> {
        let (store, file) = match &source {
            MediaSource::Bundled(_) => (SectionStore::new(), None),
            MediaSource::Picked { .. } => {
                let file = SectionFile::for_track(&self.config.documents_dir, &source.display_name());
                (file.load()?, Some(file))
            }
        };

        info!("Selected track {} ({} saved sections)", source, store.len());
        self.track = source;
        self.store = store;
        self.file = file;
        Ok(self.store.len())
    }

    // ========================================================================
    // Section Edits
    // ========================================================================

    pub fn append_section(&mut self, a: Option<u64>, b: Option<u64>) -> Result<usize> {
        let index = self.store.append(a, b)?;
        self.persist()?;
        Ok(index)
    }

    pub fn update_memo(&mut self, index: usize, memo: impl Into<String>) -> Result<()> {
        self.store.update_memo(index, memo)?;
        self.persist()
    }

    pub fn attach_recording(&mut self, index: usize, uri: impl Into<String>) -> Result<()> {
        self.store.attach_recording(index, uri)?;
        self.persist()
    }

    // The in-memory edit is kept even when the write fails.
    fn persist(&self) -> Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        file.save(&self.store).map_err(|e| {
            warn!("Section edit kept in memory but not saved: {}", e);
            e
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &PracticeConfig {
        &self.config
    }

    pub fn track(&self) -> &MediaSource {
        &self.track
    }

    pub fn sections(&self) -> &SectionStore {
        &self.store
    }

    pub fn section_file(&self) -> Option<&SectionFile> {
        self.file.as_ref()
    }
}
