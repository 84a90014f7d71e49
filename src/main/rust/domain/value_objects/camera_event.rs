use std::fmt;

use serde::Serialize;

use super::CameraId;

/// Which signaling path owns a camera's session slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    LiveView,
    Realtime,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LiveView => "live_view",
            Self::Realtime => "realtime",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a session left the slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Explicit stop request
    Stopped,
    /// A newer session request took the slot
    Replaced,
    /// No refresh arrived within the idle window
    IdleExpired,
    /// The vendor reported the call as over
    CallEnded,
    /// The camera is being torn down
    Shutdown,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Replaced => "replaced",
            Self::IdleExpired => "idle_expired",
            Self::CallEnded => "call_ended",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorFlag {
    Motion,
    /// Doorbell press, exposed as the camera's binary state
    Doorbell,
}

impl SensorFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Motion => "motion",
            Self::Doorbell => "doorbell",
        }
    }
}

/// Informational notification published to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CameraEvent {
    SensorChanged {
        camera_id: CameraId,
        flag: SensorFlag,
        active: bool,
    },
    BatteryLevel {
        camera_id: CameraId,
        level: u8,
    },
    SessionStarted {
        camera_id: CameraId,
        kind: SessionKind,
    },
    SessionEnded {
        camera_id: CameraId,
        kind: SessionKind,
        reason: EndReason,
    },
}

impl CameraEvent {
    pub fn camera_id(&self) -> &CameraId {
        match self {
            Self::SensorChanged { camera_id, .. }
            | Self::BatteryLevel { camera_id, .. }
            | Self::SessionStarted { camera_id, .. }
            | Self::SessionEnded { camera_id, .. } => camera_id,
        }
    }
}
