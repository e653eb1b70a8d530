//! State Management Module
//!
//! Saved sections, their in-memory store, and per-track persistence.

pub mod section;
pub mod storage;
pub mod store;

pub use section::Section;
pub use storage::{list_saved_tracks, sanitize_track_name, SectionFile};
pub use store::SectionStore;
