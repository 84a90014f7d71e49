use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid camera id: {0:?}")]
    InvalidCameraId(String),

    #[error("Invalid timeout: {0} cannot be zero")]
    InvalidTimeout(&'static str),

    #[error("Unknown camera: {0}")]
    UnknownCamera(String),

    #[error("Session setup failed: {0}")]
    SessionSetupFailed(String),

    #[error("Transcoder did not connect to the handoff listener within {0:?}")]
    HandoffTimeout(Duration),

    #[error("Refresh token does not match an active session")]
    StaleRefresh,

    #[error("Not in call")]
    NoActiveCall,

    #[error("Port reservation failed: {0}")]
    PortReservationFailed(#[source] std::io::Error),

    #[error("Transcoder spawn failed: {0}")]
    TranscoderSpawnFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Vendor request failed: {0}")]
    VendorRequestFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DomainError>;
