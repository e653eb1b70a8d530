//! Whole-track practice screen
//!
//! Free playback over the full track with A/B markers and an optional loop
//! between them. Saving the markers appends a section and hands back a
//! route to the section screen.

use log::{debug, info, warn};

use crate::engine::{
    LoopEngine, LoopRegion, MediaBackend, MediaSource, PlaybackController, PlaybackEvent,
    PlaybackRate,
};
use crate::error::{PracticeError, Result};
use crate::practice::{PumpReport, SectionRoute, Workspace};
use crate::state::SectionStore;

pub struct TrackSession<'w, B: MediaBackend> {
    workspace: &'w mut Workspace,
    player: PlaybackController<B>,
    looper: LoopEngine,
}

impl<'w, B: MediaBackend> TrackSession<'w, B> {
    pub fn new(workspace: &'w mut Workspace, backend: B) -> Self {
        let rate = workspace.config().initial_rate;
        Self {
            workspace,
            player: PlaybackController::with_rate(backend, rate),
            looper: LoopEngine::new(),
        }
    }

    /// Switch tracks. Playback is released and the markers are cleared.
    pub fn select_track(&mut self, source: MediaSource) -> Result<usize> {
        self.player.unload();
        self.looper.region_mut().clear();
        self.workspace.select_track(source)
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// (Re)load the selected track from the top and start playing it.
    /// Returns the duration in ms.
    pub fn load_and_play(&mut self) -> Result<u64> {
        let source = self.workspace.track().clone();
        let duration = self.player.load(&source)?;
        self.player.play()?;
        Ok(duration)
    }

    pub fn pause(&mut self) -> Result<()> {
        self.player.pause()
    }

    pub fn stop(&mut self) -> Result<()> {
        self.player.stop()
    }

    pub fn seek_to(&mut self, position_ms: i64) -> Result<u64> {
        self.player.seek(position_ms)
    }

    /// Relative seek, e.g. the -10s/-1s/+1s/+10s buttons
    pub fn seek_by(&mut self, offset_ms: i64) -> Result<u64> {
        self.player.seek_by(offset_ms)
    }

    pub fn change_rate(&mut self, multiplier: f32) -> Result<PlaybackRate> {
        self.player.set_rate(multiplier)
    }

    // ========================================================================
    // Markers and Loop
    // ========================================================================

    /// Mark A at the current position, or clear it if already set
    pub fn toggle_a(&mut self) -> Option<u64> {
        let position = self.player.position_ms();
        let region = self.looper.region_mut();
        region.toggle_a(position);
        region.a()
    }

    /// Mark B at the current position, or clear it if already set
    pub fn toggle_b(&mut self) -> Option<u64> {
        let position = self.player.position_ms();
        let region = self.looper.region_mut();
        region.toggle_b(position);
        region.b()
    }

    /// Turn the A/B loop on or off. Turning it on jumps to A and plays.
    /// Returns whether the loop is now enabled.
    pub fn toggle_loop(&mut self) -> Result<bool> {
        if self.looper.region().is_enabled() {
            self.looper.region_mut().disable();
            info!("A/B loop off");
            return Ok(false);
        }

        let a = self.looper.region_mut().enable()?;
        self.player.seek(a as i64)?;
        if !self.player.is_playing() {
            self.player.play()?;
        }
        info!("A/B loop on");
        Ok(true)
    }

    /// Drain pending position samples, jumping back to A where the loop
    /// requires it.
    pub fn pump(&mut self) -> Result<PumpReport> {
        let mut report = PumpReport::default();
        while let Some(event) = self.player.poll() {
            report.samples += 1;
            match event {
                PlaybackEvent::Position(position) => {
                    if let Some(target) = self.looper.evaluate(position) {
                        self.player.seek(target as i64)?;
                        report.loop_jumps += 1;
                    }
                }
                PlaybackEvent::Finished => report.finished = true,
            }
        }
        Ok(report)
    }

    // ========================================================================
    // Sections
    // ========================================================================

    /// Save the marked region as a new section and return the route to it.
    ///
    /// Playback stops before the section screen takes over. When only the
    /// write to disk fails, the section is still listed in memory and the
    /// write error is returned.
    /// Rejected markers leave playback untouched.
    pub fn save_section(&mut self) -> Result<SectionRoute> {
        let region = self.looper.region();
        let (a, b) = match (region.a(), region.b()) {
            (Some(a), Some(b)) if a <= b => (a, b),
            (Some(a), Some(b)) => return Err(PracticeError::InvalidRegion { a, b }),
            _ => return Err(PracticeError::MissingMarker),
        };

        self.player.stop()?;
        let index = self.workspace.append_section(Some(a), Some(b))?;
        debug!("Saved section {} from markers", index);
        self.route_to(index)
    }

    /// Route to an existing section, e.g. from the section list
    pub fn route_to(&self, index: usize) -> Result<SectionRoute> {
        let section = self.workspace.sections().get(index).map_err(|e| {
            warn!("No section to open: {}", e);
            e
        })?;
        Ok(SectionRoute {
            index,
            range: section.range(),
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn sections(&self) -> &SectionStore {
        self.workspace.sections()
    }

    pub fn loop_region(&self) -> &LoopRegion {
        self.looper.region()
    }

    pub fn player(&self) -> &PlaybackController<B> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlaybackController<B> {
        &mut self.player
    }

    pub fn workspace(&self) -> &Workspace {
        &*self.workspace
    }

    /// Release playback and give the workspace back
    pub fn leave(mut self) -> &'w mut Workspace {
        self.player.unload();
        self.workspace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PracticeConfig;
    use crate::engine::{MediaCall, MockMediaBackend};

    fn workspace() -> Workspace {
        Workspace::new(PracticeConfig::default())
    }

    fn playing_session<'w>(
        workspace: &'w mut Workspace,
        backend: &'w mut MockMediaBackend,
    ) -> TrackSession<'w, &'w mut MockMediaBackend> {
        let mut session = TrackSession::new(workspace, backend);
        session.load_and_play().unwrap();
        session
    }

    // ------------------------------------------------------------------------
    // Transport Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_load_and_play_uses_selected_track() {
        let mut workspace = workspace();
        let mut backend = MockMediaBackend::with_duration(120_000);
        let session = playing_session(&mut workspace, &mut backend);

        assert_eq!(session.player().duration_ms(), 120_000);
        assert!(session.player().is_playing());
        drop(session);

        assert!(matches!(
            &backend.calls()[0],
            MediaCall::Open { locator, .. } if locator.ends_with("sample.wav")
        ));
    }

    #[test]
    fn test_load_failure_leaves_session_usable() {
        let mut workspace = workspace();
        let mut backend = MockMediaBackend::with_duration(1000);
        let locator = workspace.track().locator();
        backend.set_missing(&locator);

        let mut session = TrackSession::new(&mut workspace, &mut backend);
        assert!(matches!(
            session.load_and_play(),
            Err(PracticeError::MediaLoad { .. })
        ));
        assert!(!session.player().is_loaded());
        assert_eq!(session.seek_by(1000).unwrap(), 0);
    }

    #[test]
    fn test_relative_seek_clamps() {
        let mut workspace = workspace();
        let mut backend = MockMediaBackend::with_duration(20_000);
        let mut session = playing_session(&mut workspace, &mut backend);

        assert_eq!(session.seek_by(-10_000).unwrap(), 0);
        assert_eq!(session.seek_by(10_000).unwrap(), 10_000);
        assert_eq!(session.seek_by(10_000).unwrap(), 20_000);
        assert_eq!(session.seek_by(-1_000).unwrap(), 19_000);
    }

    #[test]
    fn test_invalid_rate_keeps_current() {
        let mut workspace = workspace();
        let mut backend = MockMediaBackend::with_duration(20_000);
        let mut session = playing_session(&mut workspace, &mut backend);

        session.change_rate(0.6).unwrap();
        assert!(session.change_rate(2.0).is_err());
        assert_eq!(session.player().rate(), PlaybackRate::X0_6);
    }

    // ------------------------------------------------------------------------
    // Loop Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_toggle_loop_requires_markers() {
        let mut workspace = workspace();
        let mut backend = MockMediaBackend::with_duration(60_000);
        let mut session = playing_session(&mut workspace, &mut backend);

        assert!(matches!(
            session.toggle_loop(),
            Err(PracticeError::MissingMarker)
        ));
        assert!(!session.loop_region().is_enabled());
    }

    #[test]
    fn test_loop_jumps_back_to_a_once() {
        let mut workspace = workspace();
        let mut backend = MockMediaBackend::with_duration(60_000);
        let mut session = playing_session(&mut workspace, &mut backend);

        session.seek_to(10_000).unwrap();
        session.toggle_a();
        session.seek_to(12_000).unwrap();
        session.toggle_b();
        assert!(session.toggle_loop().unwrap());
        assert_eq!(session.player().position_ms(), 10_000);

        session.player_mut().backend_mut().tick(1_500);
        session.player_mut().backend_mut().tick(600);
        let report = session.pump().unwrap();
        assert_eq!(report.samples, 2);
        assert_eq!(report.loop_jumps, 1);
        assert_eq!(session.player().position_ms(), 10_000);

        session.player_mut().backend_mut().tick(500);
        let report = session.pump().unwrap();
        assert_eq!(report.loop_jumps, 0);
        assert_eq!(session.player().position_ms(), 10_500);
    }

    #[test]
    fn test_late_samples_after_crossing_ignored() {
        let mut workspace = workspace();
        let mut backend = MockMediaBackend::with_duration(60_000);
        let mut session = playing_session(&mut workspace, &mut backend);

        session.toggle_a();
        session.seek_to(2_000).unwrap();
        session.toggle_b();
        session.toggle_loop().unwrap();

        // Both queued before the pump sees the first one
        session.player_mut().backend_mut().tick(2_500);
        session.player_mut().backend_mut().tick(100);
        let report = session.pump().unwrap();
        assert_eq!(report.samples, 1);
        assert_eq!(report.loop_jumps, 1);
        assert_eq!(session.player().position_ms(), 0);
    }

    #[test]
    fn test_short_loop_keeps_looping() {
        let mut workspace = workspace();
        let mut backend = MockMediaBackend::with_duration(60_000);
        let mut session = playing_session(&mut workspace, &mut backend);

        session.seek_to(10_000).unwrap();
        session.toggle_a();
        session.seek_to(10_200).unwrap();
        session.toggle_b();
        session.toggle_loop().unwrap();

        let mut jumps = 0;
        for _ in 0..4 {
            session.player_mut().backend_mut().tick(500);
            jumps += session.pump().unwrap().loop_jumps;
            assert_eq!(session.player().position_ms(), 10_000);
        }
        assert_eq!(jumps, 4);
    }

    #[test]
    fn test_loop_off_plays_through_b() {
        let mut workspace = workspace();
        let mut backend = MockMediaBackend::with_duration(60_000);
        let mut session = playing_session(&mut workspace, &mut backend);

        session.toggle_a();
        session.seek_to(1_000).unwrap();
        session.toggle_b();
        session.toggle_loop().unwrap();
        assert!(!session.toggle_loop().unwrap());

        session.player_mut().backend_mut().tick(2_000);
        assert_eq!(session.pump().unwrap().loop_jumps, 0);
    }

    #[test]
    fn test_toggle_markers_clear() {
        let mut workspace = workspace();
        let mut backend = MockMediaBackend::with_duration(60_000);
        let mut session = playing_session(&mut workspace, &mut backend);

        session.seek_to(5_000).unwrap();
        assert_eq!(session.toggle_a(), Some(5_000));
        assert_eq!(session.toggle_a(), None);
    }

    // ------------------------------------------------------------------------
    // Section Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_save_section_stops_and_routes() {
        let mut workspace = workspace();
        let mut backend = MockMediaBackend::with_duration(120_000);
        let mut session = playing_session(&mut workspace, &mut backend);

        session.seek_to(30_000).unwrap();
        session.toggle_a();
        session.seek_to(45_000).unwrap();
        session.toggle_b();

        let route = session.save_section().unwrap();
        assert_eq!(route.index, 0);
        assert_eq!((route.range.start_ms, route.range.end_ms), (30_000, 45_000));
        assert!(!session.player().is_playing());
        assert_eq!(session.sections().len(), 1);
    }

    #[test]
    fn test_save_section_without_b_keeps_playing() {
        let mut workspace = workspace();
        let mut backend = MockMediaBackend::with_duration(120_000);
        let mut session = playing_session(&mut workspace, &mut backend);

        session.toggle_a();
        assert!(matches!(
            session.save_section(),
            Err(PracticeError::MissingMarker)
        ));
        assert!(session.player().is_playing());
        assert!(session.sections().is_empty());
    }

    #[test]
    fn test_save_inverted_markers_keeps_playing() {
        let mut workspace = workspace();
        let mut backend = MockMediaBackend::with_duration(120_000);
        let mut session = playing_session(&mut workspace, &mut backend);

        session.seek_to(20_000).unwrap();
        session.toggle_a();
        session.seek_to(10_000).unwrap();
        session.toggle_b();

        assert!(matches!(
            session.save_section(),
            Err(PracticeError::InvalidRegion { a: 20_000, b: 10_000 })
        ));
        assert!(session.player().is_playing());
        assert_eq!(session.player().position_ms(), 10_000);
        assert!(session.sections().is_empty());
    }

    #[test]
    fn test_route_to_out_of_range() {
        let mut workspace = workspace();
        let mut backend = MockMediaBackend::with_duration(1000);
        let session = TrackSession::new(&mut workspace, &mut backend);
        assert!(matches!(
            session.route_to(0),
            Err(PracticeError::Range { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_leave_releases_handle() {
        let mut workspace = workspace();
        let mut backend = MockMediaBackend::with_duration(1000);
        let session = playing_session(&mut workspace, &mut backend);
        session.leave();
        assert!(backend.current_handle().is_none());
    }
}
