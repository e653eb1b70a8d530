//! Practice Module
//!
//! Screen-level flows built on the engine, the section store and the
//! recorder:
//! - [`Workspace`]: selected track and its sections
//! - [`TrackSession`]: whole-track playback with an A/B loop
//! - [`SectionSession`]: one saved section, its memo and take

pub mod display;
pub mod section;
pub mod track;
pub mod workspace;

use crate::engine::PlaybackRange;

pub use display::{format_range, format_timestamp, marker_fraction};
pub use section::SectionSession;
pub use track::TrackSession;
pub use workspace::Workspace;

/// Navigation payload from the track screen to a section screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRoute {
    pub index: usize,
    pub range: PlaybackRange,
}

/// What one drain of position samples did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub samples: usize,
    /// Corrective seeks back to A
    pub loop_jumps: usize,
    /// End of media, or end of section, was reached
    pub finished: bool,
}
