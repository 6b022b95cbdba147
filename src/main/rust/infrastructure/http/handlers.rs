use std::convert::Infallible;
use std::sync::Arc;

use serde::Serialize;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::Response;
use warp::Reply;

use super::responses::{
    AttemptData, CommandRequest, CommandResponse, ConnectedResponse, DisconnectData,
    DisconnectRequest, InvalidDeviceResponse, MessageResponse, ScanResponse, ScannedDevice,
    StatusResponse,
};
use crate::application::services::BluetoothAudioService;
use crate::domain::entities::{ConnectionAttempt, DisconnectOutcome};
use crate::domain::value_objects::DeviceAddress;

pub const CONNECT_COMMAND: &str = "bluetooth_audio_connect";
pub const DISCONNECT_COMMAND: &str = "bluetooth_audio_disconnect";
pub const STATUS_COMMAND: &str = "bluetooth_audio_status";

pub fn json_reply<T: Serialize>(body: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

fn message_reply(success: bool, message: impl Into<String>, status: StatusCode) -> Response {
    json_reply(
        &MessageResponse {
            success,
            message: message.into(),
        },
        status,
    )
}

/// Validate a caller-supplied id before anything reaches the control tool
fn parse_device_id(raw: &str) -> Result<DeviceAddress, Response> {
    DeviceAddress::parse(raw).map_err(|e| {
        tracing::warn!("Rejected device id: {}", e);
        json_reply(&InvalidDeviceResponse::new(raw), StatusCode::BAD_REQUEST)
    })
}

pub async fn scan(service: Arc<BluetoothAudioService>) -> Result<Response, Infallible> {
    let body = match service.scan().await {
        Ok(devices) => ScanResponse {
            success: true,
            devices: devices.iter().map(ScannedDevice::from).collect(),
            error: None,
            error_kind: None,
        },
        Err(e) => {
            tracing::error!("Scan failed: {}", e);
            ScanResponse {
                success: false,
                devices: Vec::new(),
                error: Some(e.to_string()),
                error_kind: Some(e.kind()),
            }
        }
    };
    Ok(json_reply(&body, StatusCode::OK))
}

pub async fn stop_scan(service: Arc<BluetoothAudioService>) -> Result<Response, Infallible> {
    let reply = match service.stop_scan().await {
        Ok(true) => message_reply(true, "Scan cancelled", StatusCode::OK),
        Ok(false) => message_reply(true, "Discovery stopped", StatusCode::OK),
        Err(e) => message_reply(false, e.to_string(), StatusCode::OK),
    };
    Ok(reply)
}

pub async fn connected(service: Arc<BluetoothAudioService>) -> Result<Response, Infallible> {
    let snapshot = service.snapshot().await;
    Ok(json_reply(&ConnectedResponse::from(&snapshot), StatusCode::OK))
}

pub async fn status(service: Arc<BluetoothAudioService>) -> Result<Response, Infallible> {
    let snapshot = service.snapshot().await;
    let state = service.session_state().await;
    Ok(json_reply(&StatusResponse::new(&snapshot, &state), StatusCode::OK))
}

pub async fn command(
    request: CommandRequest,
    service: Arc<BluetoothAudioService>,
) -> Result<Response, Infallible> {
    let params = request.params;
    let reply = match request.command.as_str() {
        CONNECT_COMMAND => {
            let Some(raw) = params.device_id.as_deref() else {
                return Ok(message_reply(
                    false,
                    "params.deviceId is required",
                    StatusCode::BAD_REQUEST,
                ));
            };
            match parse_device_id(raw) {
                Ok(address) => {
                    let attempt = service
                        .connect(&address, params.device_name.as_deref())
                        .await;
                    connect_reply(&attempt)
                }
                Err(rejection) => rejection,
            }
        }
        DISCONNECT_COMMAND => disconnect_reply(&service, params.device_id.as_deref()).await,
        STATUS_COMMAND => {
            let snapshot = service.snapshot().await;
            let state = service.session_state().await;
            json_reply(
                &CommandResponse::ok(
                    "Bluetooth status".to_string(),
                    StatusResponse::new(&snapshot, &state),
                ),
                StatusCode::OK,
            )
        }
        other => message_reply(
            false,
            format!("Unknown command: {}", other),
            StatusCode::BAD_REQUEST,
        ),
    };
    Ok(reply)
}

pub async fn disconnect(
    body: Bytes,
    service: Arc<BluetoothAudioService>,
) -> Result<Response, Infallible> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        DisconnectRequest::default()
    } else {
        match serde_json::from_slice::<DisconnectRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                return Ok(message_reply(
                    false,
                    format!("Invalid request body: {}", e),
                    StatusCode::BAD_REQUEST,
                ))
            }
        }
    };
    Ok(disconnect_reply(&service, request.device_id.as_deref()).await)
}

fn connect_reply(attempt: &ConnectionAttempt) -> Response {
    let result = attempt.result();
    let name = attempt.target_name();

    let message = match (result.connected, result.audio_routed) {
        (true, true) => format!("Connected to {} and routed audio", name),
        (true, false) => format!("Connected to {} but audio could not be routed", name),
        (false, _) => format!(
            "Failed to connect to {}: {}",
            name,
            attempt.failure_reason().unwrap_or("unknown error")
        ),
    };

    let body = CommandResponse {
        success: result.connected,
        message,
        data: Some(AttemptData::from(attempt)),
        error_kind: None,
    };
    json_reply(&body, StatusCode::OK)
}

async fn disconnect_reply(service: &BluetoothAudioService, raw_id: Option<&str>) -> Response {
    let address = match raw_id.map(parse_device_id).transpose() {
        Ok(address) => address,
        Err(rejection) => return rejection,
    };

    match service.disconnect(address.as_ref()).await {
        Ok(outcome) => {
            let message = disconnect_message(address.as_ref(), &outcome);
            json_reply(
                &CommandResponse::ok(message, DisconnectData::from(&outcome)),
                StatusCode::OK,
            )
        }
        Err(e) => {
            tracing::error!("Disconnect failed: {}", e);
            json_reply(
                &CommandResponse::<DisconnectData>::failed(
                    format!("Disconnect failed: {}", e),
                    None,
                    Some(&e),
                ),
                StatusCode::OK,
            )
        }
    }
}

fn disconnect_message(address: Option<&DeviceAddress>, outcome: &DisconnectOutcome) -> String {
    match address {
        Some(address) if !outcome.was_connected => format!("{} was not connected", address),
        Some(address) => format!("Disconnected {}", address),
        None if !outcome.was_connected => "No devices were connected".to_string(),
        None if outcome.is_clean() => {
            format!("Disconnected {} device(s)", outcome.disconnected.len())
        }
        None => format!(
            "Disconnected {} device(s), {} failed",
            outcome.disconnected.len(),
            outcome.failed.len()
        ),
    }
}
