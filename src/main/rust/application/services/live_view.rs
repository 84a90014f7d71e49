use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::session_state::{CameraSessionState, LiveViewSession, SessionSlot};
use crate::domain::entities::StreamSession;
use crate::domain::errors::{DomainError, Result};
use crate::domain::ports::{SessionOptions, TranscoderProcess, VendorSession};
use crate::domain::value_objects::{
    EndReason, MediaStreamOptions, RefreshToken, RtpDescription, SessionKind, StreamHandle, TranscoderArgs,
    TranscoderInput, TranscoderSpec,
};
use crate::infrastructure::network::PortAllocator;

/// Vendor call negotiated and transcoder running, waiting on the handoff
struct LaunchedTranscoder {
    description: RtpDescription,
    spec: TranscoderSpec,
    output_url: String,
    transcoder: Box<dyn TranscoderProcess>,
}

/// Owns the camera's live-view call and the transcoder feeding it to consumers
pub struct LiveViewManager {
    state: Arc<CameraSessionState>,
}

impl LiveViewManager {
    pub(crate) fn new(state: Arc<CameraSessionState>) -> Self {
        Self { state }
    }

    /// Start a fresh session, or extend the active one when `refresh` carries its token.
    ///
    /// A fresh request always replaces whatever holds the slot, realtime sessions included.
    pub async fn request_stream(&self, refresh: Option<&RefreshToken>) -> Result<StreamHandle> {
        let mut slot = self.state.slot.lock().await;

        if let Some(token) = refresh {
            return self.refresh(&mut slot, token).await;
        }

        self.state.release(&mut slot, EndReason::Replaced).await;

        let session = self.start_session().await?;
        let handle = session.handle();

        tracing::info!(
            camera_id = %self.state.camera_id(),
            session_id = %session.record.vendor_session_id(),
            refresh_token = %handle.refresh_token,
            "Live view session started"
        );

        *slot = SessionSlot::LiveView(session);
        self.state.started(SessionKind::LiveView);
        Ok(handle)
    }

    /// Stop the live view session if one is active
    pub async fn stop(&self) {
        let mut slot = self.state.slot.lock().await;
        if matches!(&*slot, SessionSlot::LiveView(_)) {
            self.state.release(&mut slot, EndReason::Stopped).await;
        }
    }

    async fn refresh(&self, slot: &mut SessionSlot, token: &RefreshToken) -> Result<StreamHandle> {
        let expired = match &*slot {
            SessionSlot::LiveView(session) if session.record.matches(token) => session.record.is_expired(),
            _ => {
                tracing::debug!(camera_id = %self.state.camera_id(), %token, "Refresh for unknown session");
                return Err(DomainError::StaleRefresh);
            }
        };

        // Past its deadline but not reaped yet
        if expired {
            self.state.release(slot, EndReason::IdleExpired).await;
            return Err(DomainError::StaleRefresh);
        }

        let SessionSlot::LiveView(session) = slot else {
            return Err(DomainError::StaleRefresh);
        };

        session.record.refresh(self.state.timeouts.idle_expiry());
        session.expiry_timer.abort();
        session.expiry_timer = self.arm_expiry(session.record.refresh_token().clone(), session.record.expires_at());
        self.state.metrics.report_session_refreshed();

        tracing::debug!(
            camera_id = %self.state.camera_id(),
            session_id = %session.record.vendor_session_id(),
            "Live view session refreshed"
        );

        Ok(session.handle())
    }

    async fn start_session(&self) -> Result<LiveViewSession> {
        let vendor = self
            .state
            .camera
            .create_session(SessionOptions {
                skip_transcoder_check: true,
            })
            .await
            .map_err(|e| DomainError::SessionSetupFailed(e.to_string()))?;

        match self.negotiate(vendor.clone()).await {
            Ok(session) => Ok(session),
            Err(e) => {
                tracing::warn!(
                    camera_id = %self.state.camera_id(),
                    session_id = %vendor.id(),
                    error = %e,
                    "Live view setup failed"
                );
                vendor.stop().await;
                Err(e)
            }
        }
    }

    /// Everything acquired here is released on the error paths before returning.
    ///
    /// The handoff window starts when the listener opens, so a slow vendor eats into it.
    async fn negotiate(&self, vendor: Arc<dyn VendorSession>) -> Result<LiveViewSession> {
        let listener = PortAllocator::open_single_client_listener(self.state.timeouts.handoff()).await?;

        let setup = tokio::time::timeout_at(listener.deadline(), self.launch(&vendor, &listener.url())).await;
        let LaunchedTranscoder {
            description,
            spec,
            output_url,
            mut transcoder,
        } = match setup {
            Ok(launched) => launched?,
            Err(_) => {
                tracing::warn!(
                    camera_id = %self.state.camera_id(),
                    timeout = ?listener.timeout(),
                    "Session setup outlived the handoff window"
                );
                self.state.metrics.report_handoff_timeout();
                return Err(DomainError::HandoffTimeout(listener.timeout()));
            }
        };

        if let Err(e) = listener.hand_off(&spec.sdp_payload()).await {
            if matches!(e, DomainError::HandoffTimeout(_)) {
                self.state.metrics.report_handoff_timeout();
            }
            if let Err(kill_err) = transcoder.kill().await {
                tracing::warn!(error = %kill_err, "Failed to kill live view transcoder");
            }
            return Err(e);
        }

        let mut record = StreamSession::new(
            self.state.camera_id().clone(),
            vendor.id().to_string(),
            self.state.timeouts.idle_expiry(),
        );
        record.activate();

        let media = TranscoderInput {
            url: Some(output_url.clone()),
            input_arguments: vec!["-f".to_string(), "mpegts".to_string(), "-i".to_string(), output_url],
            media_stream_options: Some(MediaStreamOptions::sip()),
        };

        let token = record.refresh_token().clone();
        let expiry_timer = self.arm_expiry(token.clone(), record.expires_at());
        let end_watcher = self.watch_call_end(&vendor, token);

        Ok(LiveViewSession {
            record,
            vendor,
            description,
            media,
            transcoder,
            expiry_timer,
            end_watcher,
            intercom: None,
        })
    }

    async fn launch(&self, vendor: &Arc<dyn VendorSession>, handoff_url: &str) -> Result<LaunchedTranscoder> {
        let description = vendor
            .start()
            .await
            .map_err(|e| DomainError::SessionSetupFailed(e.to_string()))?;
        let video_port = vendor.reserve_port(1).await?;
        let audio_port = vendor.reserve_port(1).await?;

        let spec = vendor
            .prepare_transcoder(true, &[], &description, audio_port, video_port, handoff_url)
            .without_protocol_whitelist();

        let output_port = PortAllocator::reserve_tcp_port().await?;
        let output_url = format!("tcp://127.0.0.1:{}", output_port);
        let transcoder = self
            .state
            .launcher
            .spawn(TranscoderArgs::live_view(&spec, &output_url))
            .await?;

        Ok(LaunchedTranscoder {
            description,
            spec,
            output_url,
            transcoder,
        })
    }

    /// Teardown runs on its own task so aborting this timer can never cancel it midway
    fn arm_expiry(&self, token: RefreshToken, deadline: Instant) -> JoinHandle<()> {
        let state = Arc::downgrade(&self.state);
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(state) = state.upgrade() {
                tokio::spawn(async move { state.expire_live_view(&token, deadline).await });
            }
        })
    }

    fn watch_call_end(&self, vendor: &Arc<dyn VendorSession>, token: RefreshToken) -> JoinHandle<()> {
        let ended = vendor.call_ended();
        let state = Arc::downgrade(&self.state);
        tokio::spawn(async move {
            ended.wait().await;
            if let Some(state) = state.upgrade() {
                tokio::spawn(async move { state.end_live_view(&token, EndReason::CallEnded).await });
            }
        })
    }
}
