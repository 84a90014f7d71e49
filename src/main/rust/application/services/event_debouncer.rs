use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::domain::ports::MetricsReporter;
use crate::domain::value_objects::{CameraEvent, CameraId, SensorFlag};

#[derive(Default)]
struct FlagState {
    active: bool,
    generation: u64,
    reset: Option<JoinHandle<()>>,
}

struct DebouncerInner {
    camera_id: CameraId,
    delay: Option<Duration>,
    events: broadcast::Sender<CameraEvent>,
    metrics: Arc<dyn MetricsReporter>,
    flags: Mutex<HashMap<SensorFlag, FlagState>>,
}

impl DebouncerInner {
    fn flags(&self) -> MutexGuard<'_, HashMap<SensorFlag, FlagState>> {
        self.flags.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, flag: SensorFlag, active: bool) {
        let _ = self.events.send(CameraEvent::SensorChanged {
            camera_id: self.camera_id.clone(),
            flag,
            active,
        });
    }

    /// Only the reset armed by the latest trigger may clear the flag
    fn reset(&self, flag: SensorFlag, generation: u64) {
        {
            let mut flags = self.flags();
            let Some(state) = flags.get_mut(&flag) else {
                return;
            };
            if state.generation != generation || !state.active {
                return;
            }
            state.active = false;
            state.reset = None;
        }

        tracing::debug!(camera_id = %self.camera_id, flag = flag.as_str(), "Sensor flag reset");
        self.publish(flag, false);
    }
}

/// Turns momentary vendor notifications into boolean flags that clear themselves.
///
/// Each trigger sets the flag and restarts its reset timer, so the flag stays
/// set until `delay` has passed since the most recent trigger.
pub struct EventDebouncer {
    inner: Arc<DebouncerInner>,
}

impl EventDebouncer {
    /// `delay` of `None` keeps flags set until re-triggered or shut down
    pub fn new(
        camera_id: CameraId,
        delay: Option<Duration>,
        events: broadcast::Sender<CameraEvent>,
        metrics: Arc<dyn MetricsReporter>,
    ) -> Self {
        Self {
            inner: Arc::new(DebouncerInner {
                camera_id,
                delay,
                events,
                metrics,
                flags: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn trigger(&self, flag: SensorFlag) {
        let was_active = {
            let mut flags = self.inner.flags();
            let state = flags.entry(flag).or_default();
            let was_active = state.active;

            state.active = true;
            state.generation += 1;
            if let Some(previous) = state.reset.take() {
                previous.abort();
            }
            if let Some(delay) = self.inner.delay {
                state.reset = Some(self.arm_reset(flag, state.generation, delay));
            }
            was_active
        };

        self.inner.metrics.report_sensor_triggered(flag);
        tracing::info!(camera_id = %self.inner.camera_id, flag = flag.as_str(), "Sensor triggered");

        if !was_active {
            self.inner.publish(flag, true);
        }
    }

    pub fn is_active(&self, flag: SensorFlag) -> bool {
        self.inner.flags().get(&flag).is_some_and(|state| state.active)
    }

    /// Cancel every pending reset; flags keep their current value
    pub fn shutdown(&self) {
        for state in self.inner.flags().values_mut() {
            if let Some(reset) = state.reset.take() {
                reset.abort();
            }
        }
    }

    fn arm_reset(&self, flag: SensorFlag, generation: u64, delay: Duration) -> JoinHandle<()> {
        let inner = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = inner.upgrade() {
                inner.reset(flag, generation);
            }
        })
    }
}

impl Drop for EventDebouncer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
