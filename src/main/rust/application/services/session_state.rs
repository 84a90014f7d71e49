use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::intercom::IntercomForwarder;
use crate::domain::entities::StreamSession;
use crate::domain::ports::{MetricsReporter, TranscoderLauncher, TranscoderProcess, VendorCamera, VendorSession};
use crate::domain::value_objects::{
    CameraEvent, CameraId, EndReason, RefreshToken, RtpDescription, SessionKind, SessionTimeouts, StreamHandle,
    TranscoderInput,
};

/// Whatever currently owns the camera's single session slot
pub(crate) enum SessionSlot {
    Idle,
    LiveView(LiveViewSession),
    Realtime(RealtimeSession),
}

impl SessionSlot {
    pub(crate) fn kind(&self) -> Option<SessionKind> {
        match self {
            Self::Idle => None,
            Self::LiveView(_) => Some(SessionKind::LiveView),
            Self::Realtime(_) => Some(SessionKind::Realtime),
        }
    }
}

/// A negotiated live-view call and every resource acquired for it
pub(crate) struct LiveViewSession {
    pub(crate) record: StreamSession,
    pub(crate) vendor: Arc<dyn VendorSession>,
    pub(crate) description: RtpDescription,
    pub(crate) media: TranscoderInput,
    pub(crate) transcoder: Box<dyn TranscoderProcess>,
    pub(crate) expiry_timer: JoinHandle<()>,
    pub(crate) end_watcher: JoinHandle<()>,
    pub(crate) intercom: Option<IntercomForwarder>,
}

impl LiveViewSession {
    pub(crate) fn handle(&self) -> StreamHandle {
        StreamHandle::new(
            self.media.clone(),
            self.record.refresh_token().clone(),
            self.record.expires_at_wall(),
        )
    }

    /// Release in reverse order of acquisition
    async fn shut_down(mut self) {
        self.expiry_timer.abort();
        self.end_watcher.abort();

        if let Some(mut intercom) = self.intercom.take() {
            intercom.stop().await;
        }

        if let Err(e) = self.transcoder.kill().await {
            tracing::warn!(
                session_id = %self.vendor.id(),
                error = %e,
                "Failed to kill live view transcoder"
            );
        }

        self.vendor.stop().await;
        self.record.mark_stopped();
    }
}

pub(crate) struct RealtimeSession {
    pub(crate) id: String,
    pub(crate) started_at: Instant,
}

impl RealtimeSession {
    pub(crate) fn new(id: String) -> Self {
        Self {
            id,
            started_at: Instant::now(),
        }
    }
}

/// Per-camera state shared by the live view, realtime and intercom managers.
///
/// The slot mutex is FIFO, so operations on one camera are applied in the
/// order they were issued and never interleave.
pub(crate) struct CameraSessionState {
    pub(crate) camera: Arc<dyn VendorCamera>,
    pub(crate) slot: Mutex<SessionSlot>,
    pub(crate) timeouts: SessionTimeouts,
    pub(crate) launcher: Arc<dyn TranscoderLauncher>,
    pub(crate) metrics: Arc<dyn MetricsReporter>,
    events: broadcast::Sender<CameraEvent>,
}

impl CameraSessionState {
    pub(crate) fn new(
        camera: Arc<dyn VendorCamera>,
        timeouts: SessionTimeouts,
        launcher: Arc<dyn TranscoderLauncher>,
        metrics: Arc<dyn MetricsReporter>,
        events: broadcast::Sender<CameraEvent>,
    ) -> Self {
        Self {
            camera,
            slot: Mutex::new(SessionSlot::Idle),
            timeouts,
            launcher,
            metrics,
            events,
        }
    }

    pub(crate) fn camera_id(&self) -> &CameraId {
        self.camera.id()
    }

    /// Observers are optional; an event with no subscriber is dropped
    pub(crate) fn publish(&self, event: CameraEvent) {
        let _ = self.events.send(event);
    }

    pub(crate) fn started(&self, kind: SessionKind) {
        self.metrics.report_session_started(kind);
        self.publish(CameraEvent::SessionStarted {
            camera_id: self.camera_id().clone(),
            kind,
        });
    }

    /// Empty the slot, tearing down whatever occupied it
    pub(crate) async fn release(&self, slot: &mut SessionSlot, reason: EndReason) {
        match std::mem::replace(slot, SessionSlot::Idle) {
            SessionSlot::Idle => {}
            SessionSlot::LiveView(session) => {
                tracing::info!(
                    camera_id = %self.camera_id(),
                    session_id = %session.record.vendor_session_id(),
                    uptime_secs = session.record.uptime().as_secs(),
                    %reason,
                    "Ending live view session"
                );
                session.shut_down().await;
                self.ended(SessionKind::LiveView, reason);
            }
            SessionSlot::Realtime(session) => {
                tracing::info!(
                    camera_id = %self.camera_id(),
                    session_id = %session.id,
                    uptime_secs = session.started_at.elapsed().as_secs(),
                    %reason,
                    "Ending realtime session"
                );
                if let Err(e) = self.camera.end_realtime_session(&session.id).await {
                    tracing::warn!(
                        camera_id = %self.camera_id(),
                        session_id = %session.id,
                        error = %e,
                        "Vendor rejected realtime session end"
                    );
                }
                self.ended(SessionKind::Realtime, reason);
            }
        }
    }

    /// Idle-expiry teardown; skipped if the session was refreshed or replaced since `deadline` was armed
    pub(crate) async fn expire_live_view(&self, token: &RefreshToken, deadline: Instant) {
        let mut slot = self.slot.lock().await;
        match &mut *slot {
            SessionSlot::LiveView(session) if session.record.matches(token) => {
                if session.record.expires_at() != deadline {
                    return;
                }
                session.record.expire();
            }
            _ => return,
        }
        self.release(&mut slot, EndReason::IdleExpired).await;
    }

    /// Teardown for a specific live view session; a no-op once it has left the slot
    pub(crate) async fn end_live_view(&self, token: &RefreshToken, reason: EndReason) {
        let mut slot = self.slot.lock().await;
        let current = matches!(&*slot, SessionSlot::LiveView(session) if session.record.matches(token));
        if current {
            self.release(&mut slot, reason).await;
        }
    }

    fn ended(&self, kind: SessionKind, reason: EndReason) {
        self.metrics.report_session_ended(kind, reason);
        self.publish(CameraEvent::SessionEnded {
            camera_id: self.camera_id().clone(),
            kind,
            reason,
        });
    }
}
