//! Platform media service boundary
//!
//! Decoding and audio output belong to the host platform. The engine only
//! talks to it through [`MediaBackend`], which reports position samples
//! asynchronously via [`MediaBackend::poll_status`].

use std::fmt;
use std::path::{Path, PathBuf};

use crate::engine::rate::PlaybackRate;
use crate::error::Result;

/// Display name used when the picker returns none
pub const UNKNOWN_TRACK_NAME: &str = "unknown";

/// Where a track comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Asset shipped with the app
    Bundled(PathBuf),
    /// File chosen through the platform picker
    Picked {
        uri: String,
        display_name: Option<String>,
    },
}

impl MediaSource {
    pub fn picked(uri: impl Into<String>, display_name: Option<&str>) -> Self {
        MediaSource::Picked {
            uri: uri.into(),
            display_name: display_name.map(str::to_string),
        }
    }

    /// Locator handed to the backend
    pub fn locator(&self) -> String {
        match self {
            MediaSource::Bundled(path) => path.display().to_string(),
            MediaSource::Picked { uri, .. } => uri.clone(),
        }
    }

    /// Human readable name, also the key for persisted sections
    pub fn display_name(&self) -> String {
        match self {
            MediaSource::Bundled(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| UNKNOWN_TRACK_NAME.to_string()),
            MediaSource::Picked { display_name, .. } => display_name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN_TRACK_NAME.to_string()),
        }
    }

    /// Local filesystem path, stripping a `file://` scheme if present
    pub fn local_path(&self) -> PathBuf {
        match self {
            MediaSource::Bundled(path) => path.clone(),
            MediaSource::Picked { uri, .. } => {
                Path::new(uri.strip_prefix("file://").unwrap_or(uri)).to_path_buf()
            }
        }
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Opaque identifier of one opened media handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(pub u64);

/// Settings applied when a handle is opened
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    pub rate: PlaybackRate,
    pub correct_pitch: bool,
    pub autoplay: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            rate: PlaybackRate::default(),
            correct_pitch: true,
            autoplay: false,
        }
    }
}

/// Result of opening a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaInfo {
    pub handle: HandleId,
    /// `None` when the platform cannot tell ahead of time
    pub duration_ms: Option<u64>,
}

/// One status callback from the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaStatus {
    pub handle: HandleId,
    pub position_ms: u64,
    pub is_playing: bool,
    pub did_just_finish: bool,
}

/// Platform audio playback service.
///
/// All operations take the handle they act on so a caller holding a released
/// handle cannot touch its successor.
pub trait MediaBackend {
    fn open(&mut self, source: &MediaSource, options: &LoadOptions) -> Result<MediaInfo>;

    /// Release a handle. Releasing an unknown handle is a no-op.
    fn release(&mut self, handle: HandleId);

    fn play(&mut self, handle: HandleId) -> Result<()>;

    fn pause(&mut self, handle: HandleId) -> Result<()>;

    /// Pause and rewind to the start of the media
    fn stop(&mut self, handle: HandleId) -> Result<()>;

    fn set_position(&mut self, handle: HandleId, position_ms: u64) -> Result<()>;

    fn set_rate(&mut self, handle: HandleId, rate: PlaybackRate, correct_pitch: bool)
        -> Result<()>;

    /// Next pending status callback, if any
    fn poll_status(&mut self) -> Option<MediaStatus>;

    /// Drop status callbacks queued so far. Backends that compute status on
    /// demand have nothing to drop.
    fn discard_pending(&mut self) {}
}

impl<B: MediaBackend + ?Sized> MediaBackend for &mut B {
    fn open(&mut self, source: &MediaSource, options: &LoadOptions) -> Result<MediaInfo> {
        (**self).open(source, options)
    }

    fn release(&mut self, handle: HandleId) {
        (**self).release(handle)
    }

    fn play(&mut self, handle: HandleId) -> Result<()> {
        (**self).play(handle)
    }

    fn pause(&mut self, handle: HandleId) -> Result<()> {
        (**self).pause(handle)
    }

    fn stop(&mut self, handle: HandleId) -> Result<()> {
        (**self).stop(handle)
    }

    fn set_position(&mut self, handle: HandleId, position_ms: u64) -> Result<()> {
        (**self).set_position(handle, position_ms)
    }

    fn set_rate(
        &mut self,
        handle: HandleId,
        rate: PlaybackRate,
        correct_pitch: bool,
    ) -> Result<()> {
        (**self).set_rate(handle, rate, correct_pitch)
    }

    fn poll_status(&mut self) -> Option<MediaStatus> {
        (**self).poll_status()
    }

    fn discard_pending(&mut self) {
        (**self).discard_pending()
    }
}
