use std::time::{Duration, SystemTime};

use tokio::time::Instant;

use crate::domain::value_objects::{CameraId, RefreshToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Starting,
    Active,
    Expiring,
}

/// Bookkeeping for one live-view session: identity, timestamps and state.
///
/// Deadlines use tokio's clock so they agree with the timers that enforce them.
#[derive(Debug, Clone)]
pub struct StreamSession {
    refresh_token: RefreshToken,
    camera_id: CameraId,
    vendor_session_id: String,
    created_at: Instant,
    expires_at: Instant,
    expires_at_wall: SystemTime,
    state: SessionState,
}

impl StreamSession {
    pub fn new(camera_id: CameraId, vendor_session_id: String, idle_window: Duration) -> Self {
        Self {
            refresh_token: RefreshToken::generate(),
            camera_id,
            vendor_session_id,
            created_at: Instant::now(),
            expires_at: Instant::now() + idle_window,
            expires_at_wall: SystemTime::now() + idle_window,
            state: SessionState::Starting,
        }
    }

    pub fn refresh_token(&self) -> &RefreshToken {
        &self.refresh_token
    }

    pub fn camera_id(&self) -> &CameraId {
        &self.camera_id
    }

    pub fn vendor_session_id(&self) -> &str {
        &self.vendor_session_id
    }

    pub fn uptime(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn expires_at_wall(&self) -> SystemTime {
        self.expires_at_wall
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn matches(&self, token: &RefreshToken) -> bool {
        &self.refresh_token == token
    }

    pub fn activate(&mut self) {
        self.state = SessionState::Active;
    }

    /// Push the idle deadline out by a full window from now
    pub fn refresh(&mut self, idle_window: Duration) {
        self.expires_at = Instant::now() + idle_window;
        self.expires_at_wall = SystemTime::now() + idle_window;
        self.state = SessionState::Active;
    }

    pub fn expire(&mut self) {
        self.state = SessionState::Expiring;
    }

    pub fn mark_stopped(&mut self) {
        self.state = SessionState::Idle;
    }
}
