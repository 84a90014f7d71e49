mod api_routes;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use warp::Filter;

use crate::application::services::CameraRegistry;
use crate::infrastructure::metrics::metrics_routes;

pub use api_routes::api_routes;

/// Serve the camera API next to the metrics and health probes until `shutdown` resolves
pub async fn serve(
    addr: SocketAddr,
    registry: Arc<CameraRegistry>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), warp::Error> {
    // CORS configuration for browser access
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_headers(vec!["Content-Type"]);

    let routes = metrics_routes()
        .or(api_routes(registry))
        .with(cors)
        .with(warp::trace::request());

    let (bound, server) = warp::serve(routes).try_bind_with_graceful_shutdown(addr, shutdown)?;
    tracing::info!("HTTP server listening on {}", bound);

    server.await;
    tracing::info!("HTTP server stopped");
    Ok(())
}
