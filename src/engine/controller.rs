//! Playback controller
//!
//! Owns at most one media handle at a time. Loading a new source always
//! releases the previous handle first, and dropping the controller releases
//! whatever it still holds, so callbacks from an old handle can never be
//! mistaken for the current one.

use log::{debug, info, warn};

use crate::engine::media::{HandleId, LoadOptions, MediaBackend, MediaSource};
use crate::engine::rate::PlaybackRate;
use crate::error::Result;

/// Duration reported when the platform cannot tell, keeps range widgets usable
pub const UNKNOWN_DURATION_MS: u64 = 1;

/// Inclusive window playback and seeks are confined to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackRange {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl PlaybackRange {
    /// Build a range; bounds are reordered if given backwards
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        Self {
            start_ms: start_ms.min(end_ms),
            end_ms: start_ms.max(end_ms),
        }
    }

    pub fn whole(duration_ms: u64) -> Self {
        Self::new(0, duration_ms)
    }

    /// Clamp a possibly negative target into the range
    pub fn clamp(&self, target_ms: i64) -> u64 {
        if target_ms <= 0 {
            return self.start_ms;
        }
        (target_ms as u64).clamp(self.start_ms, self.end_ms)
    }

    pub fn contains(&self, position_ms: u64) -> bool {
        (self.start_ms..=self.end_ms).contains(&position_ms)
    }

    pub fn len_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

/// Snapshot of the active handle's transport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub position_ms: u64,
    pub duration_ms: u64,
    pub is_playing: bool,
    pub rate: PlaybackRate,
}

impl PlaybackState {
    fn unloaded(rate: PlaybackRate) -> Self {
        Self {
            position_ms: 0,
            duration_ms: UNKNOWN_DURATION_MS,
            is_playing: false,
            rate,
        }
    }
}

/// What a position sample turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Current position while playing
    Position(u64),
    /// End of media was reached; emitted once
    Finished,
}

/// Play/pause/seek/rate control over a single media handle
pub struct PlaybackController<B: MediaBackend> {
    backend: B,
    handle: Option<HandleId>,
    source: Option<MediaSource>,
    state: PlaybackState,
    range: PlaybackRange,
}

impl<B: MediaBackend> PlaybackController<B> {
    pub fn new(backend: B) -> Self {
        Self::with_rate(backend, PlaybackRate::default())
    }

    /// Controller whose first load uses `rate`
    pub fn with_rate(backend: B, rate: PlaybackRate) -> Self {
        Self {
            backend,
            handle: None,
            source: None,
            state: PlaybackState::unloaded(rate),
            range: PlaybackRange::whole(UNKNOWN_DURATION_MS),
        }
    }

    // ========================================================================
    // Handle Lifecycle
    // ========================================================================

    /// Load a source for whole-track playback. Returns the duration in ms.
    pub fn load(&mut self, source: &MediaSource) -> Result<u64> {
        let duration = self.open(source)?;
        self.range = PlaybackRange::whole(duration);
        Ok(duration)
    }

    /// Load a source with playback confined to `range`
    pub fn load_range(&mut self, source: &MediaSource, range: PlaybackRange) -> Result<u64> {
        let duration = self.open(source)?;
        self.range = range;
        self.state.position_ms = range.start_ms;
        if range.start_ms > 0 {
            if let Some(handle) = self.handle {
                self.backend.set_position(handle, range.start_ms)?;
            }
        }
        Ok(duration)
    }

    fn open(&mut self, source: &MediaSource) -> Result<u64> {
        self.unload();

        let options = LoadOptions {
            rate: self.state.rate,
            correct_pitch: true,
            autoplay: false,
        };
        let media = match self.backend.open(source, &options) {
            Ok(media) => media,
            Err(e) => {
                warn!("[PLAYBACK] Failed to load {}: {}", source.locator(), e);
                return Err(e);
            }
        };

        let duration = media
            .duration_ms
            .filter(|d| *d > 0)
            .unwrap_or(UNKNOWN_DURATION_MS);
        self.handle = Some(media.handle);
        self.source = Some(source.clone());
        self.state = PlaybackState {
            position_ms: 0,
            duration_ms: duration,
            is_playing: false,
            rate: self.state.rate,
        };
        info!(
            "[PLAYBACK] Loaded {} ({} ms at {})",
            source, duration, self.state.rate
        );
        Ok(duration)
    }

    /// Release the current handle, if any. Safe to call repeatedly.
    pub fn unload(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.backend.release(handle);
            debug!("[PLAYBACK] Released {:?}", handle);
        }
        self.source = None;
        self.state = PlaybackState::unloaded(self.state.rate);
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Start playback. Does nothing when no media is loaded.
    pub fn play(&mut self) -> Result<()> {
        let Some(handle) = self.handle else {
            return Ok(());
        };
        if let Err(e) = self.backend.play(handle) {
            warn!("[PLAYBACK] Play failed: {}", e);
            return Err(e);
        }
        self.state.is_playing = true;
        debug!("[PLAYBACK] Play from {} ms", self.state.position_ms);
        Ok(())
    }

    /// Pause playback. Does nothing when no media is loaded.
    pub fn pause(&mut self) -> Result<()> {
        let Some(handle) = self.handle else {
            return Ok(());
        };
        if let Err(e) = self.backend.pause(handle) {
            warn!("[PLAYBACK] Pause failed: {}", e);
            return Err(e);
        }
        self.state.is_playing = false;
        debug!("[PLAYBACK] Paused at {} ms", self.state.position_ms);
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<()> {
        if self.state.is_playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Pause and rewind to the start of the active range
    pub fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.handle else {
            return Ok(());
        };
        self.backend.stop(handle)?;
        if self.range.start_ms > 0 {
            self.backend.set_position(handle, self.range.start_ms)?;
        }
        self.backend.discard_pending();
        self.state.is_playing = false;
        self.state.position_ms = self.range.start_ms;
        debug!("[PLAYBACK] Stopped, rewound to {} ms", self.range.start_ms);
        Ok(())
    }

    /// Seek to `target_ms`, clamped into the active range.
    ///
    /// Returns the effective position. Without loaded media nothing is
    /// dispatched and the last known position is returned. Samples queued
    /// before the seek describe the old position and are discarded.
    pub fn seek(&mut self, target_ms: i64) -> Result<u64> {
        let Some(handle) = self.handle else {
            return Ok(self.state.position_ms);
        };
        let effective = self.range.clamp(target_ms);
        self.backend.set_position(handle, effective)?;
        self.backend.discard_pending();
        self.state.position_ms = effective;
        debug!("[PLAYBACK] Seek to {} ms (requested {})", effective, target_ms);
        Ok(effective)
    }

    /// Seek relative to the last known position
    pub fn seek_by(&mut self, offset_ms: i64) -> Result<u64> {
        let target = (self.state.position_ms as i64).saturating_add(offset_ms);
        self.seek(target)
    }

    /// Change the playback rate. Values outside the allowed set are rejected
    /// without touching the current rate.
    pub fn set_rate(&mut self, multiplier: f32) -> Result<PlaybackRate> {
        let rate = PlaybackRate::try_from(multiplier)?;
        if let Some(handle) = self.handle {
            self.backend.set_rate(handle, rate, true)?;
        }
        self.state.rate = rate;
        debug!("[PLAYBACK] Rate set to {}", rate);
        Ok(rate)
    }

    // ========================================================================
    // Position Samples
    // ========================================================================

    /// Take the next pending sample from the platform.
    ///
    /// Samples belonging to a released handle are discarded.
    pub fn poll(&mut self) -> Option<PlaybackEvent> {
        loop {
            let status = self.backend.poll_status()?;
            if Some(status.handle) != self.handle {
                debug!("[PLAYBACK] Dropping stale sample from {:?}", status.handle);
                continue;
            }

            self.state.position_ms = status.position_ms;
            if status.did_just_finish {
                self.state.is_playing = false;
                info!("[PLAYBACK] Reached end of media");
                return Some(PlaybackEvent::Finished);
            }
            return Some(PlaybackEvent::Position(status.position_ms));
        }
    }

    /// Lazily iterate the samples pending right now.
    ///
    /// The iterator ends when the platform has nothing queued; calling this
    /// again later picks up where the stream left off.
    pub fn samples(&mut self) -> PositionSamples<'_, B> {
        PositionSamples { controller: self }
    }

    // ========================================================================
    // State Queries
    // ========================================================================

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn position_ms(&self) -> u64 {
        self.state.position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.state.duration_ms
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn rate(&self) -> PlaybackRate {
        self.state.rate
    }

    pub fn range(&self) -> PlaybackRange {
        self.range
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.source.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: MediaBackend> Drop for PlaybackController<B> {
    fn drop(&mut self) {
        self.unload();
    }
}

/// Iterator over pending position samples
pub struct PositionSamples<'a, B: MediaBackend> {
    controller: &'a mut PlaybackController<B>,
}

impl<B: MediaBackend> Iterator for PositionSamples<'_, B> {
    type Item = PlaybackEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.controller.poll()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::media::MediaStatus;
    use crate::engine::mock::{MediaCall, MockMediaBackend};
    use crate::error::PracticeError;

    fn sample_source() -> MediaSource {
        MediaSource::Bundled("assets/sample.wav".into())
    }

    fn loaded(duration_ms: u64) -> PlaybackController<MockMediaBackend> {
        let mut controller = PlaybackController::new(MockMediaBackend::with_duration(duration_ms));
        controller.load(&sample_source()).unwrap();
        controller
    }

    // ------------------------------------------------------------------------
    // Load Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_load_reports_duration() {
        let controller = loaded(120_000);
        assert_eq!(controller.duration_ms(), 120_000);
        assert_eq!(controller.range(), PlaybackRange::whole(120_000));
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_unknown_duration_falls_back_to_one() {
        let mut backend = MockMediaBackend::default();
        backend.set_duration("assets/sample.wav", None);
        let mut controller = PlaybackController::new(backend);

        assert_eq!(controller.load(&sample_source()).unwrap(), 1);
    }

    #[test]
    fn test_load_releases_previous_handle() {
        let mut controller = loaded(10_000);
        let first = controller.backend().current_handle().unwrap();

        controller.load(&sample_source()).unwrap();

        let calls = controller.backend().calls();
        let release_at = calls
            .iter()
            .position(|c| *c == MediaCall::Release(first))
            .unwrap();
        let second_open = calls
            .iter()
            .rposition(|c| matches!(c, MediaCall::Open { .. }))
            .unwrap();
        assert!(release_at < second_open);
    }

    #[test]
    fn test_load_uses_current_rate_with_pitch_correction() {
        let mut controller = PlaybackController::new(MockMediaBackend::with_duration(1000));
        controller.set_rate(0.6).unwrap();
        controller.load(&sample_source()).unwrap();

        assert!(controller.backend().calls().contains(&MediaCall::Open {
            locator: "assets/sample.wav".to_string(),
            rate: PlaybackRate::X0_6,
            correct_pitch: true,
        }));
    }

    #[test]
    fn test_failed_load_leaves_controller_unloaded() {
        let mut backend = MockMediaBackend::with_duration(1000);
        backend.set_missing("assets/sample.wav");
        let mut controller = PlaybackController::new(backend);

        let err = controller.load(&sample_source()).unwrap_err();
        assert!(matches!(err, PracticeError::MediaLoad { .. }));
        assert!(!controller.is_loaded());
    }

    #[test]
    fn test_drop_releases_handle() {
        let mut backend = MockMediaBackend::with_duration(1000);
        {
            let mut controller = PlaybackController::new(&mut backend);
            controller.load(&sample_source()).unwrap();
        }
        assert!(backend.current_handle().is_none());
        assert!(matches!(backend.calls().last(), Some(MediaCall::Release(_))));
    }

    // ------------------------------------------------------------------------
    // Transport Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_play_without_media_is_noop() {
        let mut controller = PlaybackController::new(MockMediaBackend::with_duration(1000));
        controller.play().unwrap();
        assert!(!controller.is_playing());
        assert!(controller.backend().calls().is_empty());
    }

    #[test]
    fn test_play_pause_toggle() {
        let mut controller = loaded(1000);
        controller.toggle().unwrap();
        assert!(controller.is_playing());
        controller.toggle().unwrap();
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_play_failure_is_reported_and_state_kept() {
        let mut controller = loaded(1000);
        controller.backend_mut().set_fail_play(true);

        let err = controller.play().unwrap_err();
        assert!(matches!(err, PracticeError::AudioSession { .. }));
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_stop_rewinds_to_range_start() {
        let mut controller = PlaybackController::new(MockMediaBackend::with_duration(60_000));
        controller
            .load_range(&sample_source(), PlaybackRange::new(30_000, 45_000))
            .unwrap();
        controller.play().unwrap();
        controller.seek(40_000).unwrap();

        controller.stop().unwrap();
        assert!(!controller.is_playing());
        assert_eq!(controller.position_ms(), 30_000);
        assert_eq!(controller.backend().position_ms(), Some(30_000));
    }

    // ------------------------------------------------------------------------
    // Seek Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_seek_clamps_to_whole_track() {
        let mut controller = loaded(10_000);
        assert_eq!(controller.seek(-500).unwrap(), 0);
        assert_eq!(controller.seek(10_500).unwrap(), 10_000);
        assert_eq!(controller.seek(4_000).unwrap(), 4_000);
    }

    #[test]
    fn test_seek_clamps_to_section_range() {
        let mut controller = PlaybackController::new(MockMediaBackend::with_duration(120_000));
        controller
            .load_range(&sample_source(), PlaybackRange::new(30_000, 45_000))
            .unwrap();

        assert_eq!(controller.seek(30_000 - 500).unwrap(), 30_000);
        assert_eq!(controller.seek(45_000 + 500).unwrap(), 45_000);
        assert_eq!(controller.backend().seeks().last(), Some(&45_000));
    }

    #[test]
    fn test_seek_by_relative_offsets() {
        let mut controller = loaded(20_000);
        controller.seek(5_000).unwrap();
        assert_eq!(controller.seek_by(10_000).unwrap(), 15_000);
        assert_eq!(controller.seek_by(10_000).unwrap(), 20_000);
        assert_eq!(controller.seek_by(-1_000).unwrap(), 19_000);
    }

    #[test]
    fn test_seek_without_media_dispatches_nothing() {
        let mut controller = PlaybackController::new(MockMediaBackend::with_duration(1000));
        assert_eq!(controller.seek(500).unwrap(), 0);
        assert!(controller.backend().seeks().is_empty());
    }

    // ------------------------------------------------------------------------
    // Rate Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_set_rate_accepts_allowed_values() {
        let mut controller = loaded(1000);
        assert_eq!(controller.set_rate(0.8).unwrap(), PlaybackRate::X0_8);
        assert_eq!(controller.rate(), PlaybackRate::X0_8);
        let handle = controller.backend().current_handle().unwrap();
        assert!(controller
            .backend()
            .calls()
            .contains(&MediaCall::SetRate(handle, PlaybackRate::X0_8, true)));
    }

    #[test]
    fn test_set_rate_rejects_without_mutation() {
        let mut controller = loaded(1000);
        controller.set_rate(0.4).unwrap();
        controller.backend_mut().clear_calls();

        assert!(controller.set_rate(0.5).is_err());
        assert!(controller.set_rate(1.5).is_err());
        assert_eq!(controller.rate(), PlaybackRate::X0_4);
        assert!(controller.backend().calls().is_empty());
    }

    #[test]
    fn test_rate_survives_reload() {
        let mut controller = loaded(1000);
        controller.set_rate(0.6).unwrap();
        controller.load(&sample_source()).unwrap();
        assert_eq!(controller.rate(), PlaybackRate::X0_6);
    }

    // ------------------------------------------------------------------------
    // Sample Stream Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_samples_track_position() {
        let mut controller = loaded(10_000);
        controller.play().unwrap();
        controller.backend_mut().tick(250);
        controller.backend_mut().tick(250);

        let events: Vec<_> = controller.samples().collect();
        assert_eq!(
            events,
            vec![PlaybackEvent::Position(250), PlaybackEvent::Position(500)]
        );
        assert_eq!(controller.position_ms(), 500);

        // Restartable: a later tick shows up on a fresh iterator
        controller.backend_mut().tick(250);
        assert_eq!(controller.samples().next(), Some(PlaybackEvent::Position(750)));
    }

    #[test]
    fn test_finish_emitted_once() {
        let mut controller = loaded(1000);
        controller.play().unwrap();
        controller.backend_mut().tick(2000);

        assert_eq!(controller.poll(), Some(PlaybackEvent::Finished));
        assert!(!controller.is_playing());
        assert_eq!(controller.poll(), None);
    }

    #[test]
    fn test_stale_samples_are_dropped() {
        let mut controller = loaded(10_000);
        let old = controller.backend().current_handle().unwrap();
        controller.load(&sample_source()).unwrap();

        controller.backend_mut().push_status(MediaStatus {
            handle: old,
            position_ms: 9_999,
            is_playing: true,
            did_just_finish: false,
        });
        assert_eq!(controller.poll(), None);
        assert_eq!(controller.position_ms(), 0);
    }

    #[test]
    fn test_seek_discards_queued_samples() {
        let mut controller = loaded(10_000);
        controller.play().unwrap();
        controller.backend_mut().tick(250);
        controller.backend_mut().tick(250);

        controller.seek(5_000).unwrap();
        assert_eq!(controller.poll(), None);
        assert_eq!(controller.position_ms(), 5_000);

        controller.backend_mut().tick(250);
        assert_eq!(controller.poll(), Some(PlaybackEvent::Position(5_250)));
    }

    #[test]
    fn test_range_helpers() {
        let range = PlaybackRange::new(45_000, 30_000);
        assert_eq!(range.start_ms, 30_000);
        assert_eq!(range.len_ms(), 15_000);
        assert!(range.contains(30_000));
        assert!(!range.contains(45_001));
        assert_eq!(range.clamp(i64::MIN), 30_000);
    }
}
