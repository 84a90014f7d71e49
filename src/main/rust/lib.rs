pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-exports for convenience
pub use application::services::{
    CameraOrchestrator, CameraRegistry, EventDebouncer, IntercomController, LiveViewManager,
    RealtimeSignalingBridge,
};
pub use config::Config;
pub use domain::entities::{SessionState, StreamSession};
pub use domain::errors::{DomainError, Result};
pub use domain::ports::{
    CallEnded, CallEndedNotifier, MetricsReporter, ProcessExit, SessionOptions, TranscoderLauncher,
    TranscoderProcess, VendorCamera, VendorSession,
};
pub use domain::value_objects::{
    CameraEvent, CameraId, EndReason, MediaEndpoint, MediaStreamOptions, RefreshToken, RtcAvMessage,
    RtcSessionDescription, RtpDescription, SdpType, SensorFlag, SessionKind, SessionTimeouts, SrtpOptions,
    StreamHandle, TranscoderArgs, TranscoderInput, TranscoderSpec,
};
pub use infrastructure::http::{api_routes, serve};
pub use infrastructure::metrics::{metrics_routes, PrometheusReporter};
pub use infrastructure::network::PortAllocator;
pub use infrastructure::process::FfmpegLauncher;
pub use infrastructure::simulated::{SimulatedCamera, SimulatedSession};
