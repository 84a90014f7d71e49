use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use super::camera_orchestrator::CameraOrchestrator;
use crate::domain::errors::{DomainError, Result};
use crate::domain::ports::{MetricsReporter, TranscoderLauncher, VendorCamera};
use crate::domain::value_objects::{CameraEvent, CameraId, SessionTimeouts};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Cameras by identity, plus routing of vendor notifications to them
pub struct CameraRegistry {
    cameras: RwLock<HashMap<CameraId, Arc<CameraOrchestrator>>>,
    timeouts: SessionTimeouts,
    launcher: Arc<dyn TranscoderLauncher>,
    metrics: Arc<dyn MetricsReporter>,
    events: broadcast::Sender<CameraEvent>,
}

impl CameraRegistry {
    pub fn new(
        timeouts: SessionTimeouts,
        launcher: Arc<dyn TranscoderLauncher>,
        metrics: Arc<dyn MetricsReporter>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            cameras: RwLock::new(HashMap::new()),
            timeouts,
            launcher,
            metrics,
            events,
        }
    }

    /// Returns the existing orchestrator if the identity is already registered
    pub async fn add_camera(&self, camera: Arc<dyn VendorCamera>) -> Arc<CameraOrchestrator> {
        let mut cameras = self.cameras.write().await;
        if let Some(existing) = cameras.get(camera.id()) {
            return existing.clone();
        }

        let id = camera.id().clone();
        let orchestrator = Arc::new(CameraOrchestrator::new(
            camera,
            self.timeouts,
            self.launcher.clone(),
            self.metrics.clone(),
            self.events.clone(),
        ));
        cameras.insert(id.clone(), orchestrator.clone());

        tracing::info!(camera_id = %id, "Camera registered");
        orchestrator
    }

    pub async fn get(&self, id: &CameraId) -> Result<Arc<CameraOrchestrator>> {
        self.cameras
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::UnknownCamera(id.to_string()))
    }

    pub async fn find_by_signaling_mime(&self, mime: &str) -> Option<Arc<CameraOrchestrator>> {
        self.cameras
            .read()
            .await
            .values()
            .find(|camera| camera.camera_id().matches_signaling_mime(mime))
            .cloned()
    }

    pub async fn camera_ids(&self) -> Vec<CameraId> {
        let mut ids: Vec<CameraId> = self.cameras.read().await.keys().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CameraEvent> {
        self.events.subscribe()
    }

    pub async fn notify_motion(&self, id: &CameraId) {
        if let Some(camera) = self.route(id, "motion").await {
            camera.trigger_motion();
        }
    }

    pub async fn notify_doorbell(&self, id: &CameraId) {
        if let Some(camera) = self.route(id, "doorbell").await {
            camera.trigger_doorbell();
        }
    }

    pub async fn notify_battery(&self, id: &CameraId, level: u8) {
        if let Some(camera) = self.route(id, "battery").await {
            camera.set_battery_level(level);
        }
    }

    pub async fn remove_camera(&self, id: &CameraId) -> Result<()> {
        let removed = self.cameras.write().await.remove(id);
        let camera = removed.ok_or_else(|| DomainError::UnknownCamera(id.to_string()))?;
        camera.shutdown().await;
        tracing::info!(camera_id = %id, "Camera removed");
        Ok(())
    }

    pub async fn shutdown(&self) {
        let cameras: Vec<_> = self.cameras.write().await.drain().map(|(_, camera)| camera).collect();
        for camera in cameras {
            camera.shutdown().await;
        }
    }

    /// Notifications for identities we do not manage are dropped
    async fn route(&self, id: &CameraId, notification: &'static str) -> Option<Arc<CameraOrchestrator>> {
        let camera = self.cameras.read().await.get(id).cloned();
        if camera.is_none() {
            tracing::debug!(camera_id = %id, notification, "Notification for unknown camera ignored");
        }
        camera
    }
}
