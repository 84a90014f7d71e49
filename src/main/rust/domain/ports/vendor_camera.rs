use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::errors::Result;
use crate::domain::value_objects::{CameraId, RtpDescription, SrtpOptions, TranscoderSpec};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Skip the vendor client's own transcoder availability probe
    pub skip_transcoder_check: bool,
}

/// Port for a vendor cloud camera
#[async_trait]
pub trait VendorCamera: Send + Sync {
    fn id(&self) -> &CameraId;

    /// Create a SIP-style session; nothing is negotiated until `VendorSession::start`
    async fn create_session(&self, options: SessionOptions) -> Result<Arc<dyn VendorSession>>;

    /// Forward a peer-connection offer and return the vendor's answer SDP
    async fn start_realtime_session(&self, session_id: &str, offer_sdp: &str) -> Result<String>;

    async fn end_realtime_session(&self, session_id: &str) -> Result<()>;

    async fn snapshot(&self) -> Result<Vec<u8>>;

    fn has_light(&self) -> bool {
        false
    }

    async fn set_light(&self, on: bool) -> Result<()>;
}

/// Port for one vendor call
#[async_trait]
pub trait VendorSession: Send + Sync {
    fn id(&self) -> &str;

    /// Establish the call and return the remote media description
    async fn start(&self) -> Result<RtpDescription>;

    async fn reserve_port(&self, count: u16) -> Result<u16>;

    /// Build transcoder input for this call; pure
    fn prepare_transcoder(
        &self,
        include_video: bool,
        extra_args: &[String],
        description: &RtpDescription,
        audio_port: u16,
        video_port: u16,
        handoff_url: &str,
    ) -> TranscoderSpec;

    /// Request vendor-side teardown; must be a no-op after the first call
    async fn stop(&self);

    async fn activate_speaker(&self) -> Result<()>;

    /// Send one already-encrypted RTP datagram into the call
    async fn send_audio(&self, datagram: &[u8], destination: SocketAddr) -> Result<()>;

    /// Local SRTP parameters for audio sent towards the camera
    fn audio_srtp(&self) -> SrtpOptions;

    /// Completes when the vendor reports the call over, including after `stop`
    fn call_ended(&self) -> CallEnded;
}

/// Sending half of a call's end-of-call signal, held by the vendor session
#[derive(Debug)]
pub struct CallEndedNotifier(watch::Sender<bool>);

impl CallEndedNotifier {
    pub fn notify(&self) {
        self.0.send_replace(true);
    }

    pub fn subscribe(&self) -> CallEnded {
        CallEnded(self.0.subscribe())
    }
}

/// Receiving half of a call's end-of-call signal; cloneable, late subscribers see a past end
#[derive(Debug, Clone)]
pub struct CallEnded(watch::Receiver<bool>);

impl CallEnded {
    pub fn channel() -> (CallEndedNotifier, CallEnded) {
        let (tx, rx) = watch::channel(false);
        (CallEndedNotifier(tx), CallEnded(rx))
    }

    pub fn has_ended(&self) -> bool {
        *self.0.borrow()
    }

    /// A dropped notifier counts as the call ending
    pub async fn wait(mut self) {
        let _ = self.0.wait_for(|ended| *ended).await;
    }
}
