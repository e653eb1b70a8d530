//! Recording Module
//!
//! One personal take at a time, per section screen. The controller enforces
//! the `Idle -> Recording -> Idle` cycle itself rather than trusting the UI
//! to disable the start action.

pub mod mock;
pub mod wav;

use std::fmt;

use log::{debug, warn};

use crate::error::{PracticeError, Result};

pub use mock::MockMicrophone;
pub use wav::WavMicrophone;

/// Host answer to a microphone permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Platform microphone capture service
pub trait Microphone {
    fn request_permission(&mut self) -> PermissionStatus;

    /// Start capturing a new take
    fn begin(&mut self) -> Result<()>;

    /// Stop capturing and return the URI of the finished take
    fn finish(&mut self) -> Result<String>;

    /// Stop capturing and throw the take away
    fn abort(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingState::Idle => write!(f, "Idle"),
            RecordingState::Recording => write!(f, "Recording"),
        }
    }
}

/// Owns the microphone for one section-edit session
pub struct RecordingController<M: Microphone> {
    microphone: M,
    state: RecordingState,
    permission: Option<PermissionStatus>,
    /// Finished take not yet committed to a section
    pending_uri: Option<String>,
}

impl<M: Microphone> RecordingController<M> {
    pub fn new(microphone: M) -> Self {
        Self {
            microphone,
            state: RecordingState::Idle,
            permission: None,
            pending_uri: None,
        }
    }

    /// Start a take. Asks for permission the first time.
    pub fn start(&mut self) -> Result<()> {
        if self.state == RecordingState::Recording {
            return Err(PracticeError::RecordingInProgress);
        }
        self.ensure_permission()?;

        self.microphone.begin()?;
        self.state = RecordingState::Recording;
        debug!("[RECORDING] Take started");
        Ok(())
    }

    /// Stop the take and hold its URI until committed or discarded
    pub fn stop(&mut self) -> Result<String> {
        if self.state != RecordingState::Recording {
            return Err(PracticeError::NotRecording);
        }

        self.state = RecordingState::Idle;
        let uri = self.microphone.finish()?;
        debug!("[RECORDING] Take finished: {}", uri);
        self.pending_uri = Some(uri.clone());
        Ok(uri)
    }

    /// Hand over the finished take for committing
    pub fn take_pending(&mut self) -> Result<String> {
        self.pending_uri
            .take()
            .ok_or(PracticeError::NoPendingRecording)
    }

    pub fn pending_uri(&self) -> Option<&str> {
        self.pending_uri.as_deref()
    }

    /// Abort an active take and drop any uncommitted one
    pub fn discard(&mut self) {
        if self.state == RecordingState::Recording {
            self.microphone.abort();
            self.state = RecordingState::Idle;
        }
        if let Some(uri) = self.pending_uri.take() {
            debug!("[RECORDING] Discarded uncommitted take {}", uri);
        }
    }

    /// Ask the host again after a denial
    pub fn retry_permission(&mut self) -> PermissionStatus {
        self.permission = None;
        match self.ensure_permission() {
            Ok(()) => PermissionStatus::Granted,
            Err(_) => PermissionStatus::Denied,
        }
    }

    fn ensure_permission(&mut self) -> Result<()> {
        let status = match self.permission {
            Some(status) => status,
            None => {
                let status = self.microphone.request_permission();
                self.permission = Some(status);
                if status == PermissionStatus::Denied {
                    warn!("[RECORDING] Microphone permission denied; recording disabled");
                }
                status
            }
        };

        match status {
            PermissionStatus::Granted => Ok(()),
            PermissionStatus::Denied => Err(PracticeError::Permission),
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    /// False once the host has denied access
    pub fn is_available(&self) -> bool {
        self.permission != Some(PermissionStatus::Denied)
    }

    pub fn microphone(&self) -> &M {
        &self.microphone
    }

    pub fn microphone_mut(&mut self) -> &mut M {
        &mut self.microphone
    }
}

impl<M: Microphone> Drop for RecordingController<M> {
    fn drop(&mut self) {
        if self.state == RecordingState::Recording {
            self.microphone.abort();
        }
    }
}
