use std::fmt;

use serde::Serialize;

use crate::domain::errors::{DomainError, Result};

/// Prefix of the signaling MIME type used to route realtime offers to a camera
const SIGNALING_MIME_PREFIX: &str = "x-rtc-signaling-doorbell/x-";

/// Opaque vendor identity of a camera, stable for the camera's lifetime
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CameraId(String);

impl CameraId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let trimmed = id.trim();

        if trimmed.is_empty() || trimmed.len() != id.len() {
            return Err(DomainError::InvalidCameraId(id));
        }
        if trimmed.chars().any(|c| c.is_control() || c == '/') {
            return Err(DomainError::InvalidCameraId(id));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn signaling_mime(&self) -> String {
        format!("{}{}", SIGNALING_MIME_PREFIX, self.0.to_lowercase())
    }

    /// Resolve the camera a signaling MIME type points at
    pub fn matches_signaling_mime(&self, mime: &str) -> bool {
        mime.strip_prefix(SIGNALING_MIME_PREFIX)
            .map(|id| id == self.0.to_lowercase())
            .unwrap_or(false)
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
