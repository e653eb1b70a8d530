//! Mock microphone for testing

use crate::error::{PracticeError, Result};
use crate::recording::{Microphone, PermissionStatus};

/// Microphone that produces numbered fake take URIs
#[derive(Debug, Clone)]
pub struct MockMicrophone {
    permission: PermissionStatus,
    capturing: bool,
    fail_begin: bool,
    permission_requests: usize,
    begin_count: usize,
    abort_count: usize,
    takes: usize,
}

impl MockMicrophone {
    pub fn granted() -> Self {
        Self::with_permission(PermissionStatus::Granted)
    }

    pub fn denied() -> Self {
        Self::with_permission(PermissionStatus::Denied)
    }

    pub fn with_permission(permission: PermissionStatus) -> Self {
        Self {
            permission,
            capturing: false,
            fail_begin: false,
            permission_requests: 0,
            begin_count: 0,
            abort_count: 0,
            takes: 0,
        }
    }

    /// Change what the next permission request answers
    pub fn set_permission(&mut self, permission: PermissionStatus) {
        self.permission = permission;
    }

    /// Simulate a capture device that refuses to start
    pub fn set_fail_begin(&mut self, fail: bool) {
        self.fail_begin = fail;
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests
    }

    pub fn begin_count(&self) -> usize {
        self.begin_count
    }

    pub fn abort_count(&self) -> usize {
        self.abort_count
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }
}

impl Microphone for MockMicrophone {
    fn request_permission(&mut self) -> PermissionStatus {
        self.permission_requests += 1;
        self.permission
    }

    fn begin(&mut self) -> Result<()> {
        if self.fail_begin {
            return Err(PracticeError::Recording {
                reason: "capture device busy".to_string(),
            });
        }
        self.begin_count += 1;
        self.capturing = true;
        Ok(())
    }

    fn finish(&mut self) -> Result<String> {
        if !self.capturing {
            return Err(PracticeError::NotRecording);
        }
        self.capturing = false;
        self.takes += 1;
        Ok(format!("file:///mock/take-{}.m4a", self.takes))
    }

    fn abort(&mut self) {
        self.capturing = false;
        self.abort_count += 1;
    }
}
