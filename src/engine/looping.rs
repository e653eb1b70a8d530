//! A/B loop region and the rule that keeps playback inside it
//!
//! The loop engine is a pure reactive rule: it looks at each position sample
//! and answers with at most one corrective seek. It never pauses playback.

use log::debug;

use crate::error::{PracticeError, Result};

/// User-marked A/B points plus the loop switch.
///
/// `enabled` can only be true while both points are set and `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopRegion {
    a: Option<u64>,
    b: Option<u64>,
    enabled: bool,
}

impl LoopRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn a(&self) -> Option<u64> {
        self.a
    }

    pub fn b(&self) -> Option<u64> {
        self.b
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Both points, if set
    pub fn points(&self) -> Option<(u64, u64)> {
        self.a.zip(self.b)
    }

    pub fn set_a(&mut self, position_ms: u64) {
        self.a = Some(position_ms);
        self.revalidate();
    }

    pub fn set_b(&mut self, position_ms: u64) {
        self.b = Some(position_ms);
        self.revalidate();
    }

    /// Mark A at `position_ms`, or clear it if already marked
    pub fn toggle_a(&mut self, position_ms: u64) {
        match self.a {
            Some(_) => self.clear_a(),
            None => self.set_a(position_ms),
        }
    }

    /// Mark B at `position_ms`, or clear it if already marked
    pub fn toggle_b(&mut self, position_ms: u64) {
        match self.b {
            Some(_) => self.clear_b(),
            None => self.set_b(position_ms),
        }
    }

    pub fn clear_a(&mut self) {
        self.a = None;
        self.enabled = false;
    }

    pub fn clear_b(&mut self) {
        self.b = None;
        self.enabled = false;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Check the points form a loopable region
    pub fn validate(&self) -> Result<(u64, u64)> {
        let (a, b) = self.points().ok_or(PracticeError::MissingMarker)?;
        if a >= b {
            return Err(PracticeError::InvalidRegion { a, b });
        }
        Ok((a, b))
    }

    /// Switch looping on. Returns the A point to start from.
    pub fn enable(&mut self) -> Result<u64> {
        let (a, _) = self.validate()?;
        self.enabled = true;
        Ok(a)
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    // Moving a point can make the region degenerate; never loop on it.
    fn revalidate(&mut self) {
        if self.enabled && self.validate().is_err() {
            debug!("[LOOP] Region no longer valid, loop disabled");
            self.enabled = false;
        }
    }
}

/// Evaluates position samples against a [`LoopRegion`]
#[derive(Debug, Clone, Default)]
pub struct LoopEngine {
    region: LoopRegion,
}

impl LoopEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self) -> &LoopRegion {
        &self.region
    }

    pub fn region_mut(&mut self) -> &mut LoopRegion {
        &mut self.region
    }

    /// Decide whether `position_ms` requires a jump back to A.
    ///
    /// Each sample at or past B yields exactly one seek, however short the
    /// region. Samples queued before that seek never get here: the playback
    /// controller discards them when it seeks.
    pub fn evaluate(&self, position_ms: u64) -> Option<u64> {
        if !self.region.enabled {
            return None;
        }
        let (a, b) = self.region.points()?;
        if position_ms < b {
            return None;
        }

        debug!("[LOOP] {} ms reached B ({} ms), back to A ({} ms)", position_ms, b, a);
        Some(a)
    }
}
