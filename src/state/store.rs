//! Section store
//!
//! Ordered collection of sections. Indices are append order and are never
//! reused; there is no delete.

use log::warn;

use crate::error::{PracticeError, Result};
use crate::state::section::Section;

/// The saved sections of one track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionStore {
    sections: Vec<Section>,
}

impl SectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section from the caller's A/B markers.
    ///
    /// Both markers must be present and `a <= b`; otherwise nothing changes.
    /// Returns the index of the new section.
    pub fn append(&mut self, a: Option<u64>, b: Option<u64>) -> Result<usize> {
        let (a, b) = a.zip(b).ok_or(PracticeError::MissingMarker)?;
        if a > b {
            return Err(PracticeError::InvalidRegion { a, b });
        }

        self.sections.push(Section::new(a, b));
        Ok(self.sections.len() - 1)
    }

    pub fn update_memo(&mut self, index: usize, memo: impl Into<String>) -> Result<()> {
        self.get_mut(index)?.memo = memo.into();
        Ok(())
    }

    pub fn attach_recording(&mut self, index: usize, uri: impl Into<String>) -> Result<()> {
        self.get_mut(index)?.recording_uri = Some(uri.into());
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<&Section> {
        let len = self.sections.len();
        self.sections
            .get(index)
            .ok_or(PracticeError::Range { index, len })
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut Section> {
        let len = self.sections.len();
        self.sections
            .get_mut(index)
            .ok_or(PracticeError::Range { index, len })
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Flat JSON array of section records
    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.sections)?)
    }

    /// Parse a JSON array of section records.
    ///
    /// Fails with `Parse` on malformed JSON or on a record with `a > b`.
    pub fn deserialize(raw: &str) -> Result<Self> {
        let sections: Vec<Section> =
            serde_json::from_str(raw).map_err(|e| PracticeError::Parse {
                reason: e.to_string(),
            })?;

        if let Some((index, bad)) = sections.iter().enumerate().find(|(_, s)| s.a > s.b) {
            return Err(PracticeError::Parse {
                reason: format!("section {} has a ({}) after b ({})", index, bad.a, bad.b),
            });
        }

        Ok(Self { sections })
    }

    /// Like [`SectionStore::deserialize`], but a corrupt input yields an empty
    /// store. The failure is logged, not swallowed silently.
    pub fn deserialize_or_empty(raw: &str) -> Self {
        Self::deserialize(raw).unwrap_or_else(|e| {
            warn!("Discarding unreadable section data: {}", e);
            Self::default()
        })
    }
}

impl From<Vec<Section>> for SectionStore {
    fn from(sections: Vec<Section>) -> Self {
        Self { sections }
    }
}
