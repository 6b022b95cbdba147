use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use super::handlers::{self, json_reply};
use super::responses::{HealthResponse, MessageResponse};
use crate::application::services::BluetoothAudioService;
use crate::infrastructure::metrics::PrometheusReporter;

/// Request bodies are small JSON objects
const MAX_BODY_BYTES: u64 = 16 * 1024;

fn with_service(
    service: Arc<BluetoothAudioService>,
) -> impl Filter<Extract = (Arc<BluetoothAudioService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

/// Every endpoint the dashboard talks to, plus `/health` and `/metrics`
pub fn routes(
    service: Arc<BluetoothAudioService>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    // CORS configuration for browser access
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["Content-Type"]);

    let scan = warp::path!("bluetooth" / "scan")
        .and(warp::get())
        .and(with_service(service.clone()))
        .and_then(handlers::scan);

    let stop_scan = warp::path!("bluetooth" / "scan" / "stop")
        .and(warp::post())
        .and(with_service(service.clone()))
        .and_then(handlers::stop_scan);

    let connected = warp::path!("bluetooth" / "connected")
        .and(warp::get())
        .and(with_service(service.clone()))
        .and_then(handlers::connected);

    // The body is optional, so it is decoded by the handler
    let disconnect = warp::path!("bluetooth" / "disconnect")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_service(service.clone()))
        .and_then(handlers::disconnect);

    let command = warp::path!("api" / "bluetooth")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_service(service.clone()))
        .and_then(handlers::command);

    let status = warp::path!("api" / "bluetooth" / "status")
        .and(warp::get())
        .and(with_service(service))
        .and_then(handlers::status);

    let metrics = warp::path!("metrics").and(warp::get()).map(|| {
        let body = PrometheusReporter::gather_metrics();
        warp::reply::with_header(body, "content-type", "text/plain; version=0.0.4; charset=utf-8")
    });

    let health = warp::path!("health").and(warp::get()).map(|| {
        let response = HealthResponse {
            status: "healthy",
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        };
        warp::reply::json(&response)
    });

    scan.or(stop_scan)
        .or(connected)
        .or(disconnect)
        .or(command)
        .or(status)
        .or(metrics)
        .or(health)
        .with(cors)
        .recover(handle_rejection)
}

/// Map framework rejections onto the JSON error shape
pub async fn handle_rejection(rejection: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
    } else if rejection.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Request body must be application/json".to_string(),
        )
    } else if rejection.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length required".to_string())
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string())
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else if let Some(e) = rejection.find::<warp::filters::cors::CorsForbidden>() {
        (StatusCode::FORBIDDEN, e.to_string())
    } else {
        tracing::error!("Unhandled rejection: {:?}", rejection);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    Ok(json_reply(
        &MessageResponse {
            success: false,
            message,
        },
        status,
    ))
}

/// Serve until `shutdown` resolves
pub async fn serve(
    service: Arc<BluetoothAudioService>,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), warp::Error> {
    let (bound, server) =
        warp::serve(routes(service)).try_bind_with_graceful_shutdown(addr, shutdown)?;

    tracing::info!("HTTP server listening on {}", bound);
    server.await;

    tracing::info!("HTTP server stopped");
    Ok(())
}
