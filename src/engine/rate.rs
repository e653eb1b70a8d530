//! Playback rate multipliers
//!
//! Only a fixed set of tempo factors is offered. Rates are always applied with
//! pitch correction, so the tempo changes without shifting the key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PracticeError;

const RATE_TOLERANCE: f32 = 1e-6;

/// One of the allowed playback speed multipliers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub enum PlaybackRate {
    X0_4,
    X0_6,
    X0_8,
    #[default]
    X1_0,
}

impl PlaybackRate {
    /// All rates, slowest first
    pub const ALL: [PlaybackRate; 4] = [
        PlaybackRate::X0_4,
        PlaybackRate::X0_6,
        PlaybackRate::X0_8,
        PlaybackRate::X1_0,
    ];

    pub fn as_f32(self) -> f32 {
        match self {
            PlaybackRate::X0_4 => 0.4,
            PlaybackRate::X0_6 => 0.6,
            PlaybackRate::X0_8 => 0.8,
            PlaybackRate::X1_0 => 1.0,
        }
    }

    /// Media time covered by `wall_ms` of wall time at this rate
    pub fn scale(self, wall_ms: u64) -> u64 {
        (wall_ms as f64 * self.as_f32() as f64).round() as u64
    }
}

impl TryFrom<f32> for PlaybackRate {
    type Error = PracticeError;

    fn try_from(rate: f32) -> Result<Self, Self::Error> {
        PlaybackRate::ALL
            .into_iter()
            .find(|r| (r.as_f32() - rate).abs() < RATE_TOLERANCE)
            .ok_or(PracticeError::InvalidRate { rate })
    }
}

impl From<PlaybackRate> for f32 {
    fn from(rate: PlaybackRate) -> Self {
        rate.as_f32()
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.as_f32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_allowed_rates() {
        for value in [0.4_f32, 0.6, 0.8, 1.0] {
            let rate = PlaybackRate::try_from(value).unwrap();
            assert_eq!(rate.as_f32(), value);
        }
    }

    #[test]
    fn test_rejects_other_rates() {
        for value in [0.0_f32, 0.5, 1.25, 2.0, -1.0, f32::NAN] {
            assert!(matches!(
                PlaybackRate::try_from(value),
                Err(PracticeError::InvalidRate { .. })
            ));
        }
    }

    #[test]
    fn test_default_is_normal_speed() {
        assert_eq!(PlaybackRate::default(), PlaybackRate::X1_0);
    }

    #[test]
    fn test_scale() {
        assert_eq!(PlaybackRate::X0_4.scale(1000), 400);
        assert_eq!(PlaybackRate::X1_0.scale(1000), 1000);
    }

    #[test]
    fn test_display() {
        assert_eq!(PlaybackRate::X0_8.to_string(), "0.8x");
        assert_eq!(PlaybackRate::X1_0.to_string(), "1x");
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&PlaybackRate::X0_6).unwrap();
        assert_eq!(json, "0.6");
        let back: PlaybackRate = serde_json::from_str("0.6").unwrap();
        assert_eq!(back, PlaybackRate::X0_6);
        assert!(serde_json::from_str::<PlaybackRate>("0.7").is_err());
    }
}
