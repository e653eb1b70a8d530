//! Error handling for Riffloop
//!
//! Every failure degrades a single screen's functionality; nothing here is
//! fatal to the process.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Riffloop operations
pub type Result<T> = std::result::Result<T, PracticeError>;

/// Main error type for Riffloop operations
#[derive(Error, Debug)]
pub enum PracticeError {
    // Media Errors
    #[error("Failed to load media '{source_ref}': {reason}")]
    MediaLoad { source_ref: String, reason: String },

    #[error("No media loaded")]
    NoMediaLoaded,

    #[error("Audio session unavailable: {reason}")]
    AudioSession { reason: String },

    #[error("Unsupported playback rate: {rate} (allowed: 0.4, 0.6, 0.8, 1.0)")]
    InvalidRate { rate: f32 },

    // Region Errors
    #[error("Both A and B markers must be set")]
    MissingMarker,

    #[error("Invalid region: A ({a} ms) must come before B ({b} ms)")]
    InvalidRegion { a: u64, b: u64 },

    #[error("Index {index} out of range (collection has {len} sections)")]
    Range { index: usize, len: usize },

    // Recording Errors
    #[error("Microphone permission denied")]
    Permission,

    #[error("A recording is already in progress")]
    RecordingInProgress,

    #[error("No recording in progress")]
    NotRecording,

    #[error("No finished recording to commit")]
    NoPendingRecording,

    #[error("Recording failed: {reason}")]
    Recording { reason: String },

    // Metadata Errors
    #[error("Corrupt section metadata: {reason}")]
    Parse { reason: String },

    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PracticeError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            PracticeError::MediaLoad { .. } => "MEDIA_LOAD",
            PracticeError::NoMediaLoaded => "NO_MEDIA_LOADED",
            PracticeError::AudioSession { .. } => "AUDIO_SESSION",
            PracticeError::InvalidRate { .. } => "INVALID_RATE",
            PracticeError::MissingMarker => "MISSING_MARKER",
            PracticeError::InvalidRegion { .. } => "INVALID_REGION",
            PracticeError::Range { .. } => "RANGE",
            PracticeError::Permission => "PERMISSION",
            PracticeError::RecordingInProgress => "RECORDING_IN_PROGRESS",
            PracticeError::NotRecording => "NOT_RECORDING",
            PracticeError::NoPendingRecording => "NO_PENDING_RECORDING",
            PracticeError::Recording { .. } => "RECORDING",
            PracticeError::Parse { .. } => "PARSE",
            PracticeError::FileReadError { .. } => "FILE_READ",
            PracticeError::FileWriteError { .. } => "FILE_WRITE",
            PracticeError::DirectoryCreateError { .. } => "DIRECTORY_CREATE",
            PracticeError::Io(_) => "IO_ERROR",
            PracticeError::Json(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the user can fix this without restarting the screen
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PracticeError::InvalidRate { .. }
                | PracticeError::MissingMarker
                | PracticeError::InvalidRegion { .. }
                | PracticeError::RecordingInProgress
                | PracticeError::NotRecording
                | PracticeError::NoPendingRecording
                | PracticeError::AudioSession { .. }
        )
    }

    /// Get a user-facing recovery suggestion
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            PracticeError::MediaLoad { .. } => Some("Pick a different audio file."),
            PracticeError::AudioSession { .. } => {
                Some("Another app may be holding the audio device. Try again.")
            }
            PracticeError::MissingMarker => Some("Mark both A and B before saving."),
            PracticeError::InvalidRegion { .. } => Some("Move B after A."),
            PracticeError::Permission => {
                Some("Grant microphone access in the system settings to record takes.")
            }
            PracticeError::RecordingInProgress => Some("Stop the current take first."),
            PracticeError::Parse { .. } => {
                Some("The saved sections file is damaged; new sections will replace it.")
            }
            _ => None,
        }
    }
}
