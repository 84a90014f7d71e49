use std::convert::Infallible;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::application::services::{CameraOrchestrator, CameraRegistry};
use crate::domain::errors::{DomainError, Result};
use crate::domain::value_objects::{CameraId, RefreshToken, TranscoderInput};

const MAX_BODY_BYTES: u64 = 64 * 1024;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamRequest {
    #[serde(default)]
    refresh_token: Option<RefreshToken>,
}

#[derive(Debug, Deserialize)]
struct BatteryRequest {
    level: u8,
}

#[derive(Debug, Deserialize)]
struct LightRequest {
    on: bool,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// JSON surface under `/cameras`
pub fn api_routes(
    registry: Arc<CameraRegistry>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_registry = warp::any().map(move || registry.clone());

    let list = warp::path!("cameras")
        .and(warp::get())
        .and(with_registry.clone())
        .and_then(list_cameras);

    let streams = warp::path!("cameras" / String / "streams")
        .and(warp::get())
        .and(with_registry.clone())
        .and_then(stream_options);

    // The body is optional here, so a bare POST carries no Content-Length
    let start_stream = warp::path!("cameras" / String / "stream")
        .and(warp::post())
        .and(warp::header::optional::<u64>("content-length"))
        .and(warp::body::bytes())
        .and(with_registry.clone())
        .and_then(request_stream);

    let end_stream = warp::path!("cameras" / String / "stream")
        .and(warp::delete())
        .and(with_registry.clone())
        .and_then(stop_stream);

    let offer = warp::path!("cameras" / String / "offer")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_registry.clone())
        .and_then(answer_offer);

    let start_intercom = warp::path!("cameras" / String / "intercom")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<TranscoderInput>())
        .and(with_registry.clone())
        .and_then(start_intercom);

    let end_intercom = warp::path!("cameras" / String / "intercom")
        .and(warp::delete())
        .and(with_registry.clone())
        .and_then(stop_intercom);

    let motion = warp::path!("cameras" / String / "motion")
        .and(warp::post())
        .and(with_registry.clone())
        .and_then(notify_motion);

    let doorbell = warp::path!("cameras" / String / "doorbell")
        .and(warp::post())
        .and(with_registry.clone())
        .and_then(notify_doorbell);

    let battery = warp::path!("cameras" / String / "battery")
        .and(warp::post())
        .and(warp::body::json::<BatteryRequest>())
        .and(with_registry.clone())
        .and_then(notify_battery);

    let light = warp::path!("cameras" / String / "light")
        .and(warp::put())
        .and(warp::body::json::<LightRequest>())
        .and(with_registry.clone())
        .and_then(set_light);

    let snapshot = warp::path!("cameras" / String / "snapshot")
        .and(warp::get())
        .and(with_registry)
        .and_then(take_picture);

    list.or(streams)
        .or(start_stream)
        .or(end_stream)
        .or(offer)
        .or(start_intercom)
        .or(end_intercom)
        .or(motion)
        .or(doorbell)
        .or(battery)
        .or(light)
        .or(snapshot)
}

fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::UnknownCamera(_) | DomainError::InvalidCameraId(_) => StatusCode::NOT_FOUND,
        DomainError::StaleRefresh | DomainError::NoActiveCall => StatusCode::CONFLICT,
        DomainError::HandoffTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        DomainError::SessionSetupFailed(_) | DomainError::VendorRequestFailed(_) => StatusCode::BAD_GATEWAY,
        DomainError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: DomainError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::warn!(error = %error, status = status.as_u16(), "Request failed");
    }
    let body = ErrorBody {
        error: error.to_string(),
    };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

fn json_response<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(value) => warp::reply::json(&value).into_response(),
        Err(e) => error_response(e),
    }
}

fn empty_response(result: Result<()>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

async fn lookup(registry: &CameraRegistry, id: &str) -> Result<Arc<CameraOrchestrator>> {
    let id = CameraId::new(id)?;
    registry.get(&id).await
}

async fn list_cameras(registry: Arc<CameraRegistry>) -> std::result::Result<Response, Infallible> {
    let ids = registry.camera_ids().await;
    Ok(warp::reply::json(&ids).into_response())
}

async fn stream_options(id: String, registry: Arc<CameraRegistry>) -> std::result::Result<Response, Infallible> {
    let result = lookup(&registry, &id).await.map(|camera| camera.stream_options());
    Ok(json_response(result))
}

async fn request_stream(
    id: String,
    content_length: Option<u64>,
    body: Bytes,
    registry: Arc<CameraRegistry>,
) -> std::result::Result<Response, Infallible> {
    let result = async {
        let declared = content_length.unwrap_or(0);
        if declared > MAX_BODY_BYTES || body.len() as u64 > MAX_BODY_BYTES {
            return Err(DomainError::InvalidRequest(format!("body exceeds {} bytes", MAX_BODY_BYTES)));
        }
        let request: StreamRequest = if body.is_empty() {
            StreamRequest::default()
        } else {
            serde_json::from_slice(&body).map_err(|e| DomainError::InvalidRequest(e.to_string()))?
        };
        let camera = lookup(&registry, &id).await?;
        camera.request_stream(request.refresh_token.as_ref()).await
    }
    .await;
    Ok(json_response(result))
}

async fn stop_stream(id: String, registry: Arc<CameraRegistry>) -> std::result::Result<Response, Infallible> {
    let result = async {
        lookup(&registry, &id).await?.stop_stream().await;
        Ok::<_, DomainError>(())
    }
    .await;
    Ok(empty_response(result))
}

async fn answer_offer(
    id: String,
    body: Bytes,
    registry: Arc<CameraRegistry>,
) -> std::result::Result<Response, Infallible> {
    let result = async { lookup(&registry, &id).await?.convert_signaling(&body).await }.await;
    Ok(match result {
        Ok(answer) => warp::reply::with_header(answer, "content-type", "application/json").into_response(),
        Err(e) => error_response(e),
    })
}

async fn start_intercom(
    id: String,
    source: TranscoderInput,
    registry: Arc<CameraRegistry>,
) -> std::result::Result<Response, Infallible> {
    let result = async { lookup(&registry, &id).await?.start_intercom(source).await }.await;
    Ok(empty_response(result))
}

async fn stop_intercom(id: String, registry: Arc<CameraRegistry>) -> std::result::Result<Response, Infallible> {
    let result = async {
        lookup(&registry, &id).await?.stop_intercom().await;
        Ok::<_, DomainError>(())
    }
    .await;
    Ok(empty_response(result))
}

async fn notify_motion(id: String, registry: Arc<CameraRegistry>) -> std::result::Result<Response, Infallible> {
    let result = async {
        let id = CameraId::new(id)?;
        registry.notify_motion(&id).await;
        Ok::<_, DomainError>(())
    }
    .await;
    Ok(empty_response(result))
}

async fn notify_doorbell(id: String, registry: Arc<CameraRegistry>) -> std::result::Result<Response, Infallible> {
    let result = async {
        let id = CameraId::new(id)?;
        registry.notify_doorbell(&id).await;
        Ok::<_, DomainError>(())
    }
    .await;
    Ok(empty_response(result))
}

async fn notify_battery(
    id: String,
    request: BatteryRequest,
    registry: Arc<CameraRegistry>,
) -> std::result::Result<Response, Infallible> {
    let result = async {
        let id = CameraId::new(id)?;
        registry.notify_battery(&id, request.level).await;
        Ok::<_, DomainError>(())
    }
    .await;
    Ok(empty_response(result))
}

async fn set_light(
    id: String,
    request: LightRequest,
    registry: Arc<CameraRegistry>,
) -> std::result::Result<Response, Infallible> {
    let result = async { lookup(&registry, &id).await?.set_light(request.on).await }.await;
    Ok(empty_response(result))
}

async fn take_picture(id: String, registry: Arc<CameraRegistry>) -> std::result::Result<Response, Infallible> {
    let result = async { lookup(&registry, &id).await?.take_picture().await }.await;
    Ok(match result {
        Ok(jpeg) => warp::reply::with_header(jpeg, "content-type", "image/jpeg").into_response(),
        Err(e) => error_response(e),
    })
}
