use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::domain::ports::MetricsReporter;
use crate::domain::value_objects::{EndReason, SensorFlag, SessionKind};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref ACTIVE_LIVE_VIEW_SESSIONS: IntGauge = IntGauge::new(
        "doorbell_active_live_view_sessions",
        "Number of live view sessions currently holding a camera"
    ).expect("metric can be created");
    pub static ref ACTIVE_REALTIME_SESSIONS: IntGauge = IntGauge::new(
        "doorbell_active_realtime_sessions",
        "Number of realtime sessions currently holding a camera"
    ).expect("metric can be created");
    pub static ref ACTIVE_INTERCOMS: IntGauge = IntGauge::new(
        "doorbell_active_intercoms",
        "Number of running two way audio forwarders"
    ).expect("metric can be created");
    pub static ref SESSIONS_STARTED: IntCounterVec = IntCounterVec::new(
        Opts::new("doorbell_sessions_started_total", "Sessions started since process start"),
        &["kind"]
    ).expect("metric can be created");
    pub static ref SESSIONS_ENDED: IntCounterVec = IntCounterVec::new(
        Opts::new("doorbell_sessions_ended_total", "Sessions ended since process start"),
        &["kind", "reason"]
    ).expect("metric can be created");
    pub static ref SESSION_REFRESHES: IntCounter = IntCounter::new(
        "doorbell_session_refreshes_total",
        "Live view refreshes accepted"
    ).expect("metric can be created");
    pub static ref HANDOFF_TIMEOUTS: IntCounter = IntCounter::new(
        "doorbell_handoff_timeouts_total",
        "Live view setups abandoned because the transcoder never connected"
    ).expect("metric can be created");
    pub static ref SENSOR_TRIGGERS: IntCounterVec = IntCounterVec::new(
        Opts::new("doorbell_sensor_triggers_total", "Motion and doorbell notifications received"),
        &["flag"]
    ).expect("metric can be created");
}

pub struct PrometheusReporter;

impl PrometheusReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn init_metrics() -> Result<(), prometheus::Error> {
        REGISTRY.register(Box::new(ACTIVE_LIVE_VIEW_SESSIONS.clone()))?;
        REGISTRY.register(Box::new(ACTIVE_REALTIME_SESSIONS.clone()))?;
        REGISTRY.register(Box::new(ACTIVE_INTERCOMS.clone()))?;
        REGISTRY.register(Box::new(SESSIONS_STARTED.clone()))?;
        REGISTRY.register(Box::new(SESSIONS_ENDED.clone()))?;
        REGISTRY.register(Box::new(SESSION_REFRESHES.clone()))?;
        REGISTRY.register(Box::new(HANDOFF_TIMEOUTS.clone()))?;
        REGISTRY.register(Box::new(SENSOR_TRIGGERS.clone()))?;
        Ok(())
    }

    pub fn gather_metrics() -> Vec<u8> {
        let encoder = TextEncoder::new();
        let metric_families = REGISTRY.gather();
        let mut buffer = vec![];
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
            return b"# Error encoding metrics\n".to_vec();
        }
        buffer
    }

    fn active_gauge(kind: SessionKind) -> &'static IntGauge {
        match kind {
            SessionKind::LiveView => &ACTIVE_LIVE_VIEW_SESSIONS,
            SessionKind::Realtime => &ACTIVE_REALTIME_SESSIONS,
        }
    }
}

impl Default for PrometheusReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsReporter for PrometheusReporter {
    fn report_session_started(&self, kind: SessionKind) {
        Self::active_gauge(kind).inc();
        SESSIONS_STARTED.with_label_values(&[kind.as_str()]).inc();
    }

    fn report_session_ended(&self, kind: SessionKind, reason: EndReason) {
        Self::active_gauge(kind).dec();
        SESSIONS_ENDED
            .with_label_values(&[kind.as_str(), reason.as_str()])
            .inc();
    }

    fn report_session_refreshed(&self) {
        SESSION_REFRESHES.inc();
    }

    fn report_handoff_timeout(&self) {
        HANDOFF_TIMEOUTS.inc();
    }

    fn report_intercom_started(&self) {
        ACTIVE_INTERCOMS.inc();
    }

    fn report_intercom_stopped(&self) {
        ACTIVE_INTERCOMS.dec();
    }

    fn report_sensor_triggered(&self, flag: SensorFlag) {
        SENSOR_TRIGGERS.with_label_values(&[flag.as_str()]).inc();
    }
}
