mod metrics_reporter;
mod transcoder;
mod vendor_camera;

pub use metrics_reporter::MetricsReporter;
pub use transcoder::{ProcessExit, TranscoderLauncher, TranscoderProcess};
pub use vendor_camera::{CallEnded, CallEndedNotifier, SessionOptions, VendorCamera, VendorSession};
