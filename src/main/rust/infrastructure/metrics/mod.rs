mod metrics_server;
mod prometheus_reporter;

pub use metrics_server::metrics_routes;
pub use prometheus_reporter::PrometheusReporter;
