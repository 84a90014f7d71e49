mod camera_orchestrator;
mod camera_registry;
mod event_debouncer;
mod intercom;
mod live_view;
mod realtime_bridge;
mod session_state;

pub use camera_orchestrator::CameraOrchestrator;
pub use camera_registry::CameraRegistry;
pub use event_debouncer::EventDebouncer;
pub use intercom::IntercomController;
pub use live_view::LiveViewManager;
pub use realtime_bridge::RealtimeSignalingBridge;
