use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::{Mutex, OnceCell};

use crate::domain::errors::{DomainError, Result};
use crate::domain::ports::{CallEnded, CallEndedNotifier, SessionOptions, VendorCamera, VendorSession};
use crate::domain::value_objects::{CameraId, MediaEndpoint, RtpDescription, SrtpOptions, TranscoderSpec};
use crate::infrastructure::network::{PortAllocator, ReservedUdpPort};

/// Base64 of a fixed 30 byte master key and salt
const SIMULATED_KEY_PARAMS: &str = "QUJDREVGR0hJSktMTU5PUFFSU1RVVldYWVphYmNk";

/// Smallest well-formed JPEG frame: start and end of image markers
const PLACEHOLDER_JPEG: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xD9];

/// In-process stand-in for a vendor doorbell; calls terminate on loopback sockets
pub struct SimulatedCamera {
    id: CameraId,
    has_light: bool,
    light_on: AtomicBool,
    sessions_created: AtomicU64,
}

impl SimulatedCamera {
    pub fn new(id: CameraId) -> Self {
        Self {
            id,
            has_light: false,
            light_on: AtomicBool::new(false),
            sessions_created: AtomicU64::new(0),
        }
    }

    pub fn with_light(mut self) -> Self {
        self.has_light = true;
        self
    }

    pub fn is_light_on(&self) -> bool {
        self.light_on.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl VendorCamera for SimulatedCamera {
    fn id(&self) -> &CameraId {
        &self.id
    }

    async fn create_session(&self, options: SessionOptions) -> Result<Arc<dyn VendorSession>> {
        let sequence = self.sessions_created.fetch_add(1, Ordering::Relaxed) + 1;
        let session_id = format!("{}-sip-{}", self.id, sequence);

        tracing::debug!(
            camera_id = %self.id,
            session_id = %session_id,
            skip_transcoder_check = options.skip_transcoder_check,
            "Simulated session created"
        );
        Ok(Arc::new(SimulatedSession::new(session_id)))
    }

    async fn start_realtime_session(&self, session_id: &str, offer_sdp: &str) -> Result<String> {
        if offer_sdp.trim().is_empty() {
            return Err(DomainError::VendorRequestFailed("empty offer".to_string()));
        }
        tracing::debug!(camera_id = %self.id, session_id, "Simulated realtime session accepted");
        Ok(format!(
            "v=0\r\no=- {} 0 IN IP4 127.0.0.1\r\ns={}\r\nt=0 0\r\n",
            session_id, self.id
        ))
    }

    async fn end_realtime_session(&self, session_id: &str) -> Result<()> {
        tracing::debug!(camera_id = %self.id, session_id, "Simulated realtime session ended");
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<u8>> {
        Ok(PLACEHOLDER_JPEG.to_vec())
    }

    fn has_light(&self) -> bool {
        self.has_light
    }

    async fn set_light(&self, on: bool) -> Result<()> {
        self.light_on.store(on, Ordering::Relaxed);
        tracing::info!(camera_id = %self.id, on, "Simulated light switched");
        Ok(())
    }
}

/// One simulated call. The "remote" audio and video endpoints are local UDP
/// sockets that swallow whatever they receive.
pub struct SimulatedSession {
    id: String,
    stopped: AtomicBool,
    notifier: CallEndedNotifier,
    srtp: SrtpOptions,
    reserved: Mutex<Vec<ReservedUdpPort>>,
    sender: OnceCell<UdpSocket>,
}

impl SimulatedSession {
    pub fn new(id: String) -> Self {
        let (notifier, _) = CallEnded::channel();
        Self {
            id,
            stopped: AtomicBool::new(false),
            notifier,
            srtp: SrtpOptions::new(SrtpOptions::DEFAULT_SUITE, SIMULATED_KEY_PARAMS),
            reserved: Mutex::new(Vec::new()),
            sender: OnceCell::new(),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    async fn hold_port(&self) -> Result<u16> {
        let reserved = PortAllocator::reserve_udp_port().await?;
        let port = reserved.port();
        self.reserved.lock().await.push(reserved);
        Ok(port)
    }
}

#[async_trait]
impl VendorSession for SimulatedSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn start(&self) -> Result<RtpDescription> {
        if self.is_stopped() {
            return Err(DomainError::SessionSetupFailed(format!("{} already ended", self.id)));
        }

        let audio = MediaEndpoint {
            port: self.hold_port().await?,
            srtp: self.srtp.clone(),
        };
        let video = MediaEndpoint {
            port: self.hold_port().await?,
            srtp: self.srtp.clone(),
        };

        tracing::info!(session_id = %self.id, audio_port = audio.port, video_port = video.port, "Simulated call answered");
        Ok(RtpDescription {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            audio,
            video,
        })
    }

    async fn reserve_port(&self, count: u16) -> Result<u16> {
        let first = self.hold_port().await?;
        for _ in 1..count {
            self.hold_port().await?;
        }
        Ok(first)
    }

    fn prepare_transcoder(
        &self,
        include_video: bool,
        extra_args: &[String],
        description: &RtpDescription,
        audio_port: u16,
        video_port: u16,
        handoff_url: &str,
    ) -> TranscoderSpec {
        let mut input_arguments: Vec<String> = [
            "-hide_banner",
            "-protocol_whitelist",
            "pipe,udp,rtp,file,crypto,tcp",
            "-acodec",
            "pcm_mulaw",
            "-f",
            "sdp",
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect();
        input_arguments.extend(extra_args.iter().cloned());
        input_arguments.push("-i".to_string());
        input_arguments.push(handoff_url.to_string());

        let crypto_line = |srtp: &SrtpOptions| {
            format!("a=crypto:1 {} inline:{}", srtp.crypto_suite(), srtp.key_params())
        };

        let mut lines = vec![
            "v=0".to_string(),
            format!("o=- 0 0 IN IP4 {}", Ipv4Addr::LOCALHOST),
            format!("s={}", self.id),
            format!("c=IN IP4 {}", Ipv4Addr::LOCALHOST),
            "t=0 0".to_string(),
            format!("m=audio {} RTP/SAVP 0", audio_port),
            "a=rtpmap:0 PCMU/8000".to_string(),
            crypto_line(&description.audio.srtp),
        ];
        if include_video {
            lines.extend([
                format!("m=video {} RTP/SAVP 99", video_port),
                "a=rtpmap:99 H264/90000".to_string(),
                crypto_line(&description.video.srtp),
            ]);
        }

        TranscoderSpec::new(input_arguments, lines)
    }

    async fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.reserved.lock().await.clear();
        self.notifier.notify();
        tracing::info!(session_id = %self.id, "Simulated call hung up");
    }

    async fn activate_speaker(&self) -> Result<()> {
        tracing::debug!(session_id = %self.id, "Simulated speaker activated");
        Ok(())
    }

    async fn send_audio(&self, datagram: &[u8], destination: SocketAddr) -> Result<()> {
        let sender = self
            .sender
            .get_or_try_init(|| UdpSocket::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))))
            .await?;
        sender.send_to(datagram, destination).await?;
        Ok(())
    }

    fn audio_srtp(&self) -> SrtpOptions {
        self.srtp.clone()
    }

    fn call_ended(&self) -> CallEnded {
        self.notifier.subscribe()
    }
}
