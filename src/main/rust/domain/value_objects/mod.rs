mod camera_event;
mod camera_id;
mod media_description;
mod rtc_message;
mod rtp_description;
mod session_timeouts;
mod stream_handle;
mod transcoder_args;
mod transcoder_spec;

pub use camera_event::{CameraEvent, EndReason, SensorFlag, SessionKind};
pub use camera_id::CameraId;
pub use media_description::{MediaStreamOptions, TranscoderInput};
pub use rtc_message::{RtcAvMessage, RtcSessionDescription, SdpType};
pub use rtp_description::{MediaEndpoint, RtpDescription, SrtpOptions};
pub use session_timeouts::SessionTimeouts;
pub use stream_handle::{RefreshToken, StreamHandle};
pub use transcoder_args::TranscoderArgs;
pub use transcoder_spec::TranscoderSpec;
