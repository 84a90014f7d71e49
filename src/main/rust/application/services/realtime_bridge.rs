use std::sync::Arc;

use uuid::Uuid;

use super::session_state::{CameraSessionState, RealtimeSession, SessionSlot};
use crate::domain::errors::{DomainError, Result};
use crate::domain::value_objects::{EndReason, RtcAvMessage, SessionKind};

/// Relays peer-connection offers to the vendor's realtime session API
pub struct RealtimeSignalingBridge {
    state: Arc<CameraSessionState>,
}

impl RealtimeSignalingBridge {
    pub(crate) fn new(state: Arc<CameraSessionState>) -> Self {
        Self { state }
    }

    /// Replace any active session with a new realtime one and return the vendor's answer SDP
    pub async fn offer(&self, offer_sdp: &str) -> Result<String> {
        let mut slot = self.state.slot.lock().await;
        self.state.release(&mut slot, EndReason::Replaced).await;

        let session_id = Uuid::new_v4().to_string();
        let answer = self
            .state
            .camera
            .start_realtime_session(&session_id, offer_sdp)
            .await
            .map_err(|e| DomainError::SessionSetupFailed(e.to_string()))?;

        tracing::info!(
            camera_id = %self.state.camera_id(),
            session_id = %session_id,
            "Realtime session started"
        );

        *slot = SessionSlot::Realtime(RealtimeSession::new(session_id));
        self.state.started(SessionKind::Realtime);
        Ok(answer)
    }

    /// Answer a complete realtime signaling message
    pub async fn answer(&self, message: RtcAvMessage) -> Result<RtcAvMessage> {
        if !message.is_offer() {
            return Err(DomainError::InvalidRequest(
                "realtime message must carry an offer".to_string(),
            ));
        }
        let answer = self.offer(&message.description.sdp).await?;
        Ok(RtcAvMessage::answer(answer))
    }

    /// Same as `answer`, over serialized JSON
    pub async fn convert(&self, data: &[u8]) -> Result<Vec<u8>> {
        let message: RtcAvMessage =
            serde_json::from_slice(data).map_err(|e| DomainError::InvalidRequest(e.to_string()))?;
        let answer = self.answer(message).await?;
        serde_json::to_vec(&answer).map_err(|e| DomainError::InvalidRequest(e.to_string()))
    }

    pub async fn stop(&self) {
        let mut slot = self.state.slot.lock().await;
        if matches!(&*slot, SessionSlot::Realtime(_)) {
            self.state.release(&mut slot, EndReason::Stopped).await;
        }
    }

    pub async fn active_session_id(&self) -> Option<String> {
        match &*self.state.slot.lock().await {
            SessionSlot::Realtime(session) => Some(session.id.clone()),
            _ => None,
        }
    }
}
