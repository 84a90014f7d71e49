use std::time::Duration;

use crate::domain::errors::{DomainError, Result};

/// Timer settings shared by every orchestrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionTimeouts {
    idle_expiry: Duration,
    handoff: Duration,
    event_reset: Option<Duration>,
}

impl SessionTimeouts {
    /// A zero `event_reset` disables the sensor auto-reset
    pub fn new(idle_expiry: Duration, handoff: Duration, event_reset: Duration) -> Result<Self> {
        if idle_expiry.is_zero() {
            return Err(DomainError::InvalidTimeout("idle expiry"));
        }
        if handoff.is_zero() {
            return Err(DomainError::InvalidTimeout("handoff"));
        }

        Ok(Self {
            idle_expiry,
            handoff,
            event_reset: (!event_reset.is_zero()).then_some(event_reset),
        })
    }

    pub fn idle_expiry(&self) -> Duration {
        self.idle_expiry
    }

    pub fn handoff(&self) -> Duration {
        self.handoff
    }

    pub fn event_reset(&self) -> Option<Duration> {
        self.event_reset
    }
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            idle_expiry: Duration::from_secs(120),
            handoff: Duration::from_secs(30),
            event_reset: Some(Duration::from_secs(10)),
        }
    }
}
