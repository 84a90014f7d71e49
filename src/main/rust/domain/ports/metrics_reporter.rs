use crate::domain::value_objects::{EndReason, SensorFlag, SessionKind};

/// Port for metrics reporting
pub trait MetricsReporter: Send + Sync {
    fn report_session_started(&self, kind: SessionKind);
    fn report_session_ended(&self, kind: SessionKind, reason: EndReason);
    fn report_session_refreshed(&self);
    fn report_handoff_timeout(&self);
    fn report_intercom_started(&self);
    fn report_intercom_stopped(&self);
    fn report_sensor_triggered(&self, flag: SensorFlag);
}
