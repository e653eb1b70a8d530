//! Section practice screen
//!
//! Playback confined to one saved section, plus a memo and a personal take.
//! Playback halts at B instead of looping.

use log::{debug, info, warn};

use crate::engine::{
    MediaBackend, MediaSource, PlaybackController, PlaybackEvent, PlaybackRange, PlaybackRate,
};
use crate::error::Result;
use crate::practice::{PumpReport, SectionRoute, Workspace};
use crate::recording::{Microphone, RecordingController, RecordingState};
use crate::state::Section;

pub struct SectionSession<'w, B: MediaBackend, M: Microphone> {
    workspace: &'w mut Workspace,
    index: usize,
    player: PlaybackController<B>,
    recorder: RecordingController<M>,
    memo_draft: String,
}

impl<'w, B: MediaBackend, M: Microphone> SectionSession<'w, B, M> {
    /// Open the section a route points at.
    ///
    /// A track that fails to load leaves the session open with transport
    /// disabled; memo and recording still work.
    pub fn open(
        workspace: &'w mut Workspace,
        route: SectionRoute,
        backend: B,
        microphone: M,
    ) -> Result<Self> {
        let section = workspace.sections().get(route.index)?.clone();
        let mut player = PlaybackController::with_rate(backend, workspace.config().initial_rate);

        let source = workspace.track().clone();
        if let Err(e) = player.load_range(&source, section.range()) {
            warn!("Section {} opened without playback: {}", route.index, e);
        }

        info!(
            "Opened section {} ({} - {} ms)",
            route.index, section.a, section.b
        );
        Ok(Self {
            workspace,
            index: route.index,
            player,
            recorder: RecordingController::new(microphone),
            memo_draft: section.memo,
        })
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Play the section from A
    pub fn play_section(&mut self) -> Result<()> {
        let start = self.player.range().start_ms;
        self.player.seek(start as i64)?;
        self.player.play()
    }

    pub fn pause(&mut self) -> Result<()> {
        self.player.pause()
    }

    /// Stop and rewind to A
    pub fn stop(&mut self) -> Result<()> {
        self.player.stop()
    }

    /// Absolute seek, e.g. from the section slider; clamped to the section
    pub fn seek_to(&mut self, position_ms: i64) -> Result<u64> {
        self.player.seek(position_ms)
    }

    /// Relative seek, clamped to the section
    pub fn seek_by(&mut self, offset_ms: i64) -> Result<u64> {
        self.player.seek_by(offset_ms)
    }

    pub fn change_rate(&mut self, multiplier: f32) -> Result<PlaybackRate> {
        self.player.set_rate(multiplier)
    }

    /// Drain pending position samples, stopping once B is reached
    pub fn pump(&mut self) -> Result<PumpReport> {
        let end = self.player.range().end_ms;
        let mut report = PumpReport::default();

        while let Some(event) = self.player.poll() {
            report.samples += 1;
            match event {
                PlaybackEvent::Position(position) if position >= end => {
                    if self.player.is_playing() {
                        debug!("Section end reached at {} ms", position);
                        self.player.stop()?;
                        report.finished = true;
                    }
                }
                PlaybackEvent::Position(_) => {}
                PlaybackEvent::Finished => {
                    self.player.stop()?;
                    report.finished = true;
                }
            }
        }
        Ok(report)
    }

    // ========================================================================
    // Recording
    // ========================================================================

    pub fn start_recording(&mut self) -> Result<()> {
        self.recorder.start()
    }

    /// Stop the take. It stays pending until saved.
    pub fn stop_recording(&mut self) -> Result<String> {
        self.recorder.stop()
    }

    /// Attach the pending take to the section
    pub fn save_recording(&mut self) -> Result<()> {
        let uri = self.recorder.take_pending()?;
        self.workspace.attach_recording(self.index, uri)
    }

    /// Take to play back: the pending one, else the one already saved
    pub fn recording_source(&self) -> Option<MediaSource> {
        let uri = match self.recorder.pending_uri() {
            Some(uri) => uri.to_string(),
            None => self.section().recording_uri.clone()?,
        };
        Some(MediaSource::picked(uri, None))
    }

    pub fn recording_state(&self) -> RecordingState {
        self.recorder.state()
    }

    pub fn recorder(&self) -> &RecordingController<M> {
        &self.recorder
    }

    pub fn recorder_mut(&mut self) -> &mut RecordingController<M> {
        &mut self.recorder
    }

    // ========================================================================
    // Memo
    // ========================================================================

    pub fn memo_draft(&self) -> &str {
        &self.memo_draft
    }

    pub fn set_memo_draft(&mut self, text: impl Into<String>) {
        self.memo_draft = text.into();
    }

    /// Whether the draft differs from the saved memo, ignoring edge whitespace
    pub fn memo_changed(&self) -> bool {
        self.memo_draft.trim() != self.section().memo.trim()
    }

    /// Save the draft. Returns false when there was nothing to save.
    pub fn save_memo(&mut self) -> Result<bool> {
        if !self.memo_changed() {
            return Ok(false);
        }
        self.workspace.update_memo(self.index, self.memo_draft.clone())?;
        Ok(true)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn section(&self) -> &Section {
        &self.workspace.sections().sections()[self.index]
    }

    pub fn range(&self) -> PlaybackRange {
        self.player.range()
    }

    pub fn player(&self) -> &PlaybackController<B> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlaybackController<B> {
        &mut self.player
    }

    /// Leave the screen. An uncommitted take is thrown away and playback
    /// released.
    pub fn leave(mut self) -> &'w mut Workspace {
        self.recorder.discard();
        self.player.unload();
        self.workspace
    }
}
