//! Mock media backend for testing
//!
//! Records every call it receives and only produces position samples when
//! driven with [`MockMediaBackend::tick`], so tests control exactly which
//! samples the engine sees.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::engine::media::{HandleId, LoadOptions, MediaBackend, MediaInfo, MediaSource, MediaStatus};
use crate::engine::rate::PlaybackRate;
use crate::error::{PracticeError, Result};

/// A call received by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    Open {
        locator: String,
        rate: PlaybackRate,
        correct_pitch: bool,
    },
    Release(HandleId),
    Play(HandleId),
    Pause(HandleId),
    Stop(HandleId),
    SetPosition(HandleId, u64),
    SetRate(HandleId, PlaybackRate, bool),
}

#[derive(Debug, Clone)]
struct MockTrack {
    handle: HandleId,
    duration_ms: u64,
    position_ms: u64,
    playing: bool,
    rate: PlaybackRate,
}

/// Scriptable in-memory media backend
#[derive(Debug, Clone, Default)]
pub struct MockMediaBackend {
    default_duration_ms: Option<u64>,
    durations: HashMap<String, Option<u64>>,
    missing: HashSet<String>,
    fail_play: bool,
    calls: Vec<MediaCall>,
    pending: VecDeque<MediaStatus>,
    track: Option<MockTrack>,
    next_handle: u64,
}

impl MockMediaBackend {
    /// Backend where every source opens with the given duration
    pub fn with_duration(duration_ms: u64) -> Self {
        Self {
            default_duration_ms: Some(duration_ms),
            ..Self::default()
        }
    }

    /// Override the duration reported for one locator
    pub fn set_duration(&mut self, locator: &str, duration_ms: Option<u64>) {
        self.durations.insert(locator.to_string(), duration_ms);
    }

    /// Make opening `locator` fail
    pub fn set_missing(&mut self, locator: &str) {
        self.missing.insert(locator.to_string());
    }

    /// Simulate an unavailable audio session
    pub fn set_fail_play(&mut self, fail: bool) {
        self.fail_play = fail;
    }

    pub fn calls(&self) -> &[MediaCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// All positions passed to `set_position`, in order
    pub fn seeks(&self) -> Vec<u64> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                MediaCall::SetPosition(_, ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }

    pub fn current_handle(&self) -> Option<HandleId> {
        self.track.as_ref().map(|t| t.handle)
    }

    pub fn is_playing(&self) -> bool {
        self.track.as_ref().is_some_and(|t| t.playing)
    }

    pub fn position_ms(&self) -> Option<u64> {
        self.track.as_ref().map(|t| t.position_ms)
    }

    /// Queue an arbitrary status, e.g. a late callback from a released handle
    pub fn push_status(&mut self, status: MediaStatus) {
        self.pending.push_back(status);
    }

    /// Advance playback by `wall_ms` and queue the resulting status
    pub fn tick(&mut self, wall_ms: u64) {
        let Some(track) = self.track.as_mut() else {
            return;
        };
        if !track.playing {
            return;
        }

        track.position_ms += track.rate.scale(wall_ms);
        let finished = track.position_ms >= track.duration_ms;
        if finished {
            track.position_ms = track.duration_ms;
            track.playing = false;
        }
        self.pending.push_back(MediaStatus {
            handle: track.handle,
            position_ms: track.position_ms,
            is_playing: track.playing,
            did_just_finish: finished,
        });
    }

    fn track_mut(&mut self, handle: HandleId) -> Result<&mut MockTrack> {
        match self.track.as_mut() {
            Some(track) if track.handle == handle => Ok(track),
            _ => Err(PracticeError::NoMediaLoaded),
        }
    }
}

impl MediaBackend for MockMediaBackend {
    fn open(&mut self, source: &MediaSource, options: &LoadOptions) -> Result<MediaInfo> {
        let locator = source.locator();
        self.calls.push(MediaCall::Open {
            locator: locator.clone(),
            rate: options.rate,
            correct_pitch: options.correct_pitch,
        });

        if self.missing.contains(&locator) {
            return Err(PracticeError::MediaLoad {
                source_ref: locator,
                reason: "no such file".to_string(),
            });
        }

        let duration_ms = self
            .durations
            .get(&locator)
            .copied()
            .unwrap_or(self.default_duration_ms);

        self.next_handle += 1;
        let handle = HandleId(self.next_handle);
        self.track = Some(MockTrack {
            handle,
            duration_ms: duration_ms.unwrap_or(u64::MAX),
            position_ms: 0,
            playing: options.autoplay,
            rate: options.rate,
        });

        Ok(MediaInfo {
            handle,
            duration_ms,
        })
    }

    fn release(&mut self, handle: HandleId) {
        self.calls.push(MediaCall::Release(handle));
        if self.current_handle() == Some(handle) {
            self.track = None;
        }
    }

    fn play(&mut self, handle: HandleId) -> Result<()> {
        self.calls.push(MediaCall::Play(handle));
        if self.fail_play {
            return Err(PracticeError::AudioSession {
                reason: "audio session inactive".to_string(),
            });
        }
        self.track_mut(handle)?.playing = true;
        Ok(())
    }

    fn pause(&mut self, handle: HandleId) -> Result<()> {
        self.calls.push(MediaCall::Pause(handle));
        self.track_mut(handle)?.playing = false;
        Ok(())
    }

    fn stop(&mut self, handle: HandleId) -> Result<()> {
        self.calls.push(MediaCall::Stop(handle));
        let track = self.track_mut(handle)?;
        track.playing = false;
        track.position_ms = 0;
        Ok(())
    }

    fn set_position(&mut self, handle: HandleId, position_ms: u64) -> Result<()> {
        self.calls.push(MediaCall::SetPosition(handle, position_ms));
        let track = self.track_mut(handle)?;
        track.position_ms = position_ms.min(track.duration_ms);
        Ok(())
    }

    fn set_rate(
        &mut self,
        handle: HandleId,
        rate: PlaybackRate,
        correct_pitch: bool,
    ) -> Result<()> {
        self.calls.push(MediaCall::SetRate(handle, rate, correct_pitch));
        self.track_mut(handle)?.rate = rate;
        Ok(())
    }

    fn poll_status(&mut self) -> Option<MediaStatus> {
        self.pending.pop_front()
    }

    fn discard_pending(&mut self) {
        self.pending.clear();
    }
}
