//! Playback Engine Module
//!
//! - Platform media boundary and its WAV/mock backends
//! - Playback controller with clamped seeks and discrete rates
//! - A/B loop engine

pub mod clock;
pub mod controller;
pub mod looping;
pub mod media;
pub mod mock;
pub mod rate;
pub mod wav;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{
    PlaybackController, PlaybackEvent, PlaybackRange, PlaybackState, PositionSamples,
    UNKNOWN_DURATION_MS,
};
pub use looping::{LoopEngine, LoopRegion};
pub use media::{HandleId, LoadOptions, MediaBackend, MediaInfo, MediaSource, MediaStatus};
pub use mock::{MediaCall, MockMediaBackend};
pub use rate::PlaybackRate;
pub use wav::{probe_duration_ms, WavMediaBackend};
