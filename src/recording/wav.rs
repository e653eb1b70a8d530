//! WAV take writer
//!
//! Captured samples are pushed in by the host's input stream and written as
//! 16-bit PCM. Each take gets its own file in the recordings directory.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Local;
use hound::{SampleFormat, WavSpec, WavWriter};
use uuid::Uuid;

use crate::config::PracticeConfig;
use crate::error::{PracticeError, Result};
use crate::recording::{Microphone, PermissionStatus};

/// Sample rate used when none is given
pub const DEFAULT_TAKE_SAMPLE_RATE: u32 = 44_100;

struct ActiveTake {
    writer: WavWriter<BufWriter<File>>,
    path: PathBuf,
}

/// Microphone that writes takes as WAV files
pub struct WavMicrophone {
    recordings_dir: PathBuf,
    sample_rate: u32,
    channels: u16,
    permission: PermissionStatus,
    active: Option<ActiveTake>,
}

impl WavMicrophone {
    pub fn new(recordings_dir: impl Into<PathBuf>) -> Self {
        Self {
            recordings_dir: recordings_dir.into(),
            sample_rate: DEFAULT_TAKE_SAMPLE_RATE,
            channels: 1,
            permission: PermissionStatus::Granted,
            active: None,
        }
    }

    /// Microphone writing into the configured recordings directory
    pub fn from_config(config: &PracticeConfig) -> Self {
        Self::new(config.recordings_dir())
    }

    pub fn with_format(mut self, sample_rate: u32, channels: u16) -> Self {
        self.sample_rate = sample_rate;
        self.channels = channels;
        self
    }

    /// Answer given to permission requests
    pub fn with_permission(mut self, permission: PermissionStatus) -> Self {
        self.permission = permission;
        self
    }

    pub fn recordings_dir(&self) -> &Path {
        &self.recordings_dir
    }

    /// Append interleaved samples in [-1.0, 1.0] to the active take
    pub fn push_samples(&mut self, samples: &[f32]) -> Result<()> {
        let take = self.active.as_mut().ok_or(PracticeError::NotRecording)?;
        for &sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            take.writer
                .write_sample(value)
                .map_err(|e| PracticeError::Recording {
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }

    fn next_take_path(&self) -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let id = Uuid::new_v4().simple().to_string();
        self.recordings_dir
            .join(format!("take-{}-{}.wav", timestamp, &id[..8]))
    }
}

impl Microphone for WavMicrophone {
    fn request_permission(&mut self) -> PermissionStatus {
        self.permission
    }

    fn begin(&mut self) -> Result<()> {
        if self.active.is_some() {
            return Err(PracticeError::RecordingInProgress);
        }

        if !self.recordings_dir.exists() {
            fs::create_dir_all(&self.recordings_dir).map_err(|e| {
                PracticeError::DirectoryCreateError {
                    path: self.recordings_dir.clone(),
                    source: e,
                }
            })?;
        }

        let spec = WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let path = self.next_take_path();
        let writer = WavWriter::create(&path, spec).map_err(|e| PracticeError::Recording {
            reason: format!("{}: {}", path.display(), e),
        })?;

        tracing::debug!("Recording take to {}", path.display());
        self.active = Some(ActiveTake { writer, path });
        Ok(())
    }

    fn finish(&mut self) -> Result<String> {
        let take = self.active.take().ok_or(PracticeError::NotRecording)?;
        take.writer
            .finalize()
            .map_err(|e| PracticeError::Recording {
                reason: e.to_string(),
            })?;
        Ok(format!("file://{}", take.path.display()))
    }

    fn abort(&mut self) {
        if let Some(take) = self.active.take() {
            drop(take.writer);
            if let Err(e) = fs::remove_file(&take.path) {
                tracing::warn!("Could not remove aborted take {}: {}", take.path.display(), e);
            }
        }
    }
}
