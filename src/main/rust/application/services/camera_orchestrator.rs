use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

use super::event_debouncer::EventDebouncer;
use super::intercom::IntercomController;
use super::live_view::LiveViewManager;
use super::realtime_bridge::RealtimeSignalingBridge;
use super::session_state::CameraSessionState;
use crate::domain::errors::{DomainError, Result};
use crate::domain::ports::{MetricsReporter, TranscoderLauncher, VendorCamera};
use crate::domain::value_objects::{
    CameraEvent, CameraId, EndReason, MediaStreamOptions, RefreshToken, RtcAvMessage, SensorFlag, SessionKind,
    SessionTimeouts, StreamHandle, TranscoderInput,
};

const NO_BATTERY_LEVEL: u8 = u8::MAX;

/// Everything the platform can ask of one doorbell camera
pub struct CameraOrchestrator {
    state: Arc<CameraSessionState>,
    live_view: LiveViewManager,
    realtime: RealtimeSignalingBridge,
    intercom: IntercomController,
    debouncer: EventDebouncer,
    battery_level: AtomicU8,
}

impl CameraOrchestrator {
    pub fn new(
        camera: Arc<dyn VendorCamera>,
        timeouts: SessionTimeouts,
        launcher: Arc<dyn TranscoderLauncher>,
        metrics: Arc<dyn MetricsReporter>,
        events: broadcast::Sender<CameraEvent>,
    ) -> Self {
        let debouncer = EventDebouncer::new(
            camera.id().clone(),
            timeouts.event_reset(),
            events.clone(),
            metrics.clone(),
        );
        let state = Arc::new(CameraSessionState::new(camera, timeouts, launcher, metrics, events));

        Self {
            live_view: LiveViewManager::new(state.clone()),
            realtime: RealtimeSignalingBridge::new(state.clone()),
            intercom: IntercomController::new(state.clone()),
            state,
            debouncer,
            battery_level: AtomicU8::new(NO_BATTERY_LEVEL),
        }
    }

    pub fn camera_id(&self) -> &CameraId {
        self.state.camera_id()
    }

    pub fn signaling_mime(&self) -> String {
        self.camera_id().signaling_mime()
    }

    pub fn stream_options(&self) -> Vec<MediaStreamOptions> {
        vec![MediaStreamOptions::sip(), MediaStreamOptions::realtime(self.camera_id())]
    }

    pub async fn request_stream(&self, refresh: Option<&RefreshToken>) -> Result<StreamHandle> {
        self.live_view.request_stream(refresh).await
    }

    /// Stop whichever session holds the slot
    pub async fn stop_stream(&self) {
        let mut slot = self.state.slot.lock().await;
        self.state.release(&mut slot, EndReason::Stopped).await;
    }

    pub async fn stop_live_view(&self) {
        self.live_view.stop().await;
    }

    pub async fn offer(&self, offer_sdp: &str) -> Result<String> {
        self.realtime.offer(offer_sdp).await
    }

    pub async fn answer(&self, message: RtcAvMessage) -> Result<RtcAvMessage> {
        self.realtime.answer(message).await
    }

    pub async fn convert_signaling(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.realtime.convert(data).await
    }

    pub async fn stop_realtime(&self) {
        self.realtime.stop().await;
    }

    pub async fn realtime_session_id(&self) -> Option<String> {
        self.realtime.active_session_id().await
    }

    pub async fn start_intercom(&self, source: TranscoderInput) -> Result<()> {
        self.intercom.start(source).await
    }

    pub async fn stop_intercom(&self) {
        self.intercom.stop().await;
    }

    pub async fn is_intercom_active(&self) -> bool {
        self.intercom.is_active().await
    }

    pub async fn active_session(&self) -> Option<SessionKind> {
        self.state.slot.lock().await.kind()
    }

    pub fn trigger_motion(&self) {
        self.debouncer.trigger(SensorFlag::Motion);
    }

    pub fn trigger_doorbell(&self) {
        self.debouncer.trigger(SensorFlag::Doorbell);
    }

    pub fn motion_detected(&self) -> bool {
        self.debouncer.is_active(SensorFlag::Motion)
    }

    pub fn doorbell_pressed(&self) -> bool {
        self.debouncer.is_active(SensorFlag::Doorbell)
    }

    pub fn set_battery_level(&self, level: u8) {
        let level = level.min(100);
        self.battery_level.store(level, Ordering::Relaxed);
        tracing::debug!(camera_id = %self.camera_id(), level, "Battery level updated");
        self.state.publish(CameraEvent::BatteryLevel {
            camera_id: self.camera_id().clone(),
            level,
        });
    }

    pub fn battery_level(&self) -> Option<u8> {
        match self.battery_level.load(Ordering::Relaxed) {
            NO_BATTERY_LEVEL => None,
            level => Some(level),
        }
    }

    pub fn has_light(&self) -> bool {
        self.state.camera.has_light()
    }

    pub async fn set_light(&self, on: bool) -> Result<()> {
        if !self.state.camera.has_light() {
            return Err(DomainError::VendorRequestFailed(format!(
                "camera {} has no light",
                self.camera_id()
            )));
        }
        self.state.camera.set_light(on).await
    }

    pub async fn take_picture(&self) -> Result<Vec<u8>> {
        self.state.camera.snapshot().await
    }

    /// Release every session and cancel pending flag resets
    pub async fn shutdown(&self) {
        self.debouncer.shutdown();
        let mut slot = self.state.slot.lock().await;
        self.state.release(&mut slot, EndReason::Shutdown).await;
        tracing::info!(camera_id = %self.camera_id(), "Camera shut down");
    }
}
