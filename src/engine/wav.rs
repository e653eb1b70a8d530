//! WAV file media backend
//!
//! Probes files with `hound` and runs a clock-driven transport: while playing,
//! the position advances by elapsed wall time scaled by the playback rate.
//! Sound output is left to the host.

use log::debug;

use hound::WavReader;

use crate::config::DEFAULT_PROGRESS_INTERVAL_MS;
use crate::engine::clock::Clock;
use crate::engine::media::{HandleId, LoadOptions, MediaBackend, MediaInfo, MediaSource, MediaStatus};
use crate::engine::rate::PlaybackRate;
use crate::error::{PracticeError, Result};

#[derive(Debug, Clone)]
struct OpenTrack {
    handle: HandleId,
    duration_ms: u64,
    rate: PlaybackRate,
    playing: bool,
    /// Media position at `anchor_clock_ms`
    anchor_position_ms: u64,
    anchor_clock_ms: u64,
    last_report_ms: u64,
    finish_reported: bool,
}

impl OpenTrack {
    fn position_at(&self, now_ms: u64) -> u64 {
        if !self.playing {
            return self.anchor_position_ms;
        }
        let elapsed = now_ms.saturating_sub(self.anchor_clock_ms);
        (self.anchor_position_ms + self.rate.scale(elapsed)).min(self.duration_ms)
    }

    fn reanchor(&mut self, now_ms: u64) {
        self.anchor_position_ms = self.position_at(now_ms);
        self.anchor_clock_ms = now_ms;
    }
}

/// Media backend for local WAV files
pub struct WavMediaBackend<C: Clock> {
    clock: C,
    progress_interval_ms: u64,
    track: Option<OpenTrack>,
    next_handle: u64,
}

impl<C: Clock> WavMediaBackend<C> {
    pub fn new(clock: C) -> Self {
        Self::with_progress_interval(clock, DEFAULT_PROGRESS_INTERVAL_MS)
    }

    pub fn with_progress_interval(clock: C, progress_interval_ms: u64) -> Self {
        Self {
            clock,
            progress_interval_ms,
            track: None,
            next_handle: 1,
        }
    }

    fn track_mut(&mut self, handle: HandleId) -> Result<&mut OpenTrack> {
        match self.track.as_mut() {
            Some(track) if track.handle == handle => Ok(track),
            _ => Err(PracticeError::NoMediaLoaded),
        }
    }
}

/// Read the duration of a WAV file in milliseconds
pub fn probe_duration_ms(source: &MediaSource) -> Result<Option<u64>> {
    let path = source.local_path();
    let reader = WavReader::open(&path).map_err(|e| PracticeError::MediaLoad {
        source_ref: source.locator(),
        reason: e.to_string(),
    })?;

    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Ok(None);
    }
    let frames = reader.duration() as u64;
    Ok(Some(frames * 1000 / spec.sample_rate as u64))
}

impl<C: Clock> MediaBackend for WavMediaBackend<C> {
    fn open(&mut self, source: &MediaSource, options: &LoadOptions) -> Result<MediaInfo> {
        let duration_ms = probe_duration_ms(source)?;

        let handle = HandleId(self.next_handle);
        self.next_handle += 1;

        let now = self.clock.now_ms();
        self.track = Some(OpenTrack {
            handle,
            duration_ms: duration_ms.unwrap_or(0),
            rate: options.rate,
            playing: options.autoplay,
            anchor_position_ms: 0,
            anchor_clock_ms: now,
            last_report_ms: now,
            finish_reported: false,
        });
        debug!("[WAV] Opened {} as {:?}", source.locator(), handle);

        Ok(MediaInfo {
            handle,
            duration_ms,
        })
    }

    fn release(&mut self, handle: HandleId) {
        if self.track.as_ref().is_some_and(|t| t.handle == handle) {
            self.track = None;
            debug!("[WAV] Released {:?}", handle);
        }
    }

    fn play(&mut self, handle: HandleId) -> Result<()> {
        let now = self.clock.now_ms();
        let track = self.track_mut(handle)?;
        if track.playing {
            return Ok(());
        }
        if track.anchor_position_ms >= track.duration_ms {
            track.anchor_position_ms = 0;
        }
        track.anchor_clock_ms = now;
        track.last_report_ms = now;
        track.playing = true;
        track.finish_reported = false;
        Ok(())
    }

    fn pause(&mut self, handle: HandleId) -> Result<()> {
        let now = self.clock.now_ms();
        let track = self.track_mut(handle)?;
        track.reanchor(now);
        track.playing = false;
        Ok(())
    }

    fn stop(&mut self, handle: HandleId) -> Result<()> {
        let now = self.clock.now_ms();
        let track = self.track_mut(handle)?;
        track.playing = false;
        track.anchor_position_ms = 0;
        track.anchor_clock_ms = now;
        Ok(())
    }

    fn set_position(&mut self, handle: HandleId, position_ms: u64) -> Result<()> {
        let now = self.clock.now_ms();
        let track = self.track_mut(handle)?;
        track.anchor_position_ms = position_ms.min(track.duration_ms);
        track.anchor_clock_ms = now;
        track.finish_reported = false;
        Ok(())
    }

    fn set_rate(
        &mut self,
        handle: HandleId,
        rate: PlaybackRate,
        _correct_pitch: bool,
    ) -> Result<()> {
        let now = self.clock.now_ms();
        let track = self.track_mut(handle)?;
        track.reanchor(now);
        track.rate = rate;
        Ok(())
    }

    fn poll_status(&mut self) -> Option<MediaStatus> {
        let now = self.clock.now_ms();
        let interval = self.progress_interval_ms;
        let track = self.track.as_mut()?;
        if !track.playing {
            return None;
        }

        let position_ms = track.position_at(now);
        if position_ms >= track.duration_ms && !track.finish_reported {
            track.reanchor(now);
            track.playing = false;
            track.finish_reported = true;
            return Some(MediaStatus {
                handle: track.handle,
                position_ms,
                is_playing: false,
                did_just_finish: true,
            });
        }

        if now.saturating_sub(track.last_report_ms) < interval {
            return None;
        }
        track.last_report_ms = now;
        Some(MediaStatus {
            handle: track.handle,
            position_ms,
            is_playing: true,
            did_just_finish: false,
        })
    }
}
