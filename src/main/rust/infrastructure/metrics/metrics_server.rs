use warp::{Filter, Rejection, Reply};

use super::PrometheusReporter;

const SERVICE_NAME: &str = "pipeline-doorbell";

/// Health check response structure
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// `/metrics`, `/health`, `/livez` and `/readyz`
pub fn metrics_routes() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let metrics_route = warp::path!("metrics").and(warp::get()).map(|| {
        let body = PrometheusReporter::gather_metrics();
        warp::reply::with_header(body, "content-type", "text/plain; version=0.0.4; charset=utf-8")
    });

    let health_route = warp::path!("health").and(warp::get()).map(|| {
        let response = HealthResponse {
            status: "healthy",
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
        };
        warp::reply::json(&response)
    });

    // Liveness probe endpoint (minimal check - is the process running?)
    let liveness_route = warp::path!("livez")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", warp::http::StatusCode::OK));

    // Readiness probe endpoint (can the service accept traffic?)
    let readiness_route = warp::path!("readyz").and(warp::get()).map(|| {
        let response = HealthResponse {
            status: "ready",
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
        };
        warp::reply::json(&response)
    });

    metrics_route
        .or(health_route)
        .or(liveness_route)
        .or(readiness_route)
}
