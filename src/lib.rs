//! Riffloop - A/B Loop Practice Core
//!
//! The non-UI core of a music practice app: play a track, mark points A and
//! B, loop between them, and save marked regions as sections with a memo and
//! a personal recording.
//!
//! # Architecture
//!
//! - `engine`: playback controller over a platform media backend, A/B loop engine
//! - `state`: sections, the in-memory store, per-track JSON persistence
//! - `recording`: one take at a time through a platform microphone
//! - `practice`: the track and section screens wired together

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod practice;
pub mod recording;
pub mod state;

pub use error::{PracticeError, Result};
