use serde::{Deserialize, Serialize};

use crate::application::services::SessionState;
use crate::domain::entities::{ConnectionAttempt, DisconnectOutcome};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{
    AudioSink, BluetoothDevice, ConnectionStep, DiscoveredDevice, StatusSnapshot, StepOutcome,
};

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    #[serde(default)]
    pub params: CommandParams,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandParams {
    pub device_id: Option<String>,
    pub device_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectRequest {
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScannedDevice {
    pub id: String,
    pub name: String,
}

impl From<&DiscoveredDevice> for ScannedDevice {
    fn from(device: &DiscoveredDevice) -> Self {
        Self {
            id: device.address.to_string(),
            name: device.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub success: bool,
    pub devices: Vec<ScannedDevice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceBody {
    pub id: String,
    pub name: String,
    pub mac: String,
    pub connected: bool,
    pub paired: bool,
    pub is_audio_device: bool,
}

impl From<&BluetoothDevice> for DeviceBody {
    fn from(device: &BluetoothDevice) -> Self {
        Self {
            id: device.address.to_string(),
            name: device.name.clone(),
            mac: device.address.to_string(),
            connected: device.connected,
            paired: device.paired,
            is_audio_device: device.is_audio_device,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedResponse {
    pub success: bool,
    pub connected_devices: Vec<DeviceBody>,
    pub current_audio_sink: String,
    pub is_bluetooth_audio: bool,
    pub has_connected_audio_device: bool,
}

impl From<&StatusSnapshot> for ConnectedResponse {
    fn from(snapshot: &StatusSnapshot) -> Self {
        Self {
            success: snapshot.service_active,
            connected_devices: snapshot.connected_devices.iter().map(DeviceBody::from).collect(),
            current_audio_sink: snapshot.current_audio_sink.clone(),
            is_bluetooth_audio: snapshot.is_bluetooth_audio,
            has_connected_audio_device: snapshot.has_connected_audio_device,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    pub service_active: bool,
    pub service_reachable: Option<bool>,
    pub connected_devices: Vec<DeviceBody>,
    pub audio_devices: Vec<DeviceBody>,
    pub current_audio_sink: String,
    pub volume: Option<u8>,
    pub muted: Option<bool>,
    pub is_bluetooth_audio: bool,
    pub has_connected_audio_device: bool,
    pub active_device: Option<String>,
    pub active_sink: Option<String>,
    pub last_attempt: Option<AttemptData>,
}

impl StatusResponse {
    pub fn new(snapshot: &StatusSnapshot, state: &SessionState) -> Self {
        Self {
            success: true,
            service_active: snapshot.service_active,
            service_reachable: state.service_reachable,
            connected_devices: snapshot.connected_devices.iter().map(DeviceBody::from).collect(),
            audio_devices: snapshot.audio_devices.iter().map(DeviceBody::from).collect(),
            current_audio_sink: snapshot.current_audio_sink.clone(),
            volume: snapshot.current_sink.as_ref().map(AudioSink::volume_percent),
            muted: snapshot.current_sink.as_ref().map(AudioSink::is_muted),
            is_bluetooth_audio: snapshot.is_bluetooth_audio,
            has_connected_audio_device: snapshot.has_connected_audio_device,
            active_device: state.active_device.as_ref().map(ToString::to_string),
            active_sink: state.active_sink.clone(),
            last_attempt: state.last_attempt.as_ref().map(AttemptData::from),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepBody {
    pub step: ConnectionStep,
    pub outcome: StepOutcome,
    pub elapsed_ms: u64,
}

/// Composite result of a connection attempt
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptData {
    pub attempt_id: String,
    pub device_id: String,
    pub device_name: String,
    pub connected: bool,
    pub audio_routed: bool,
    pub was_reconnected: bool,
    pub sink_name: Option<String>,
    pub steps: Vec<StepBody>,
}

impl From<&ConnectionAttempt> for AttemptData {
    fn from(attempt: &ConnectionAttempt) -> Self {
        let result = attempt.result();
        Self {
            attempt_id: attempt.id().to_string(),
            device_id: attempt.target().to_string(),
            device_name: attempt.target_name().to_string(),
            connected: result.connected,
            audio_routed: result.audio_routed,
            was_reconnected: result.was_reconnected,
            sink_name: result.sink_name,
            steps: attempt
                .steps()
                .iter()
                .map(|record| StepBody {
                    step: record.step,
                    outcome: record.outcome.clone(),
                    elapsed_ms: record.elapsed.as_millis() as u64,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedDisconnect {
    pub device_id: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectData {
    pub disconnected: Vec<String>,
    pub failed: Vec<FailedDisconnect>,
    pub was_connected: bool,
    pub audio_reset: bool,
}

impl From<&DisconnectOutcome> for DisconnectData {
    fn from(outcome: &DisconnectOutcome) -> Self {
        Self {
            disconnected: outcome.disconnected.iter().map(ToString::to_string).collect(),
            failed: outcome
                .failed
                .iter()
                .map(|(address, reason)| FailedDisconnect {
                    device_id: address.to_string(),
                    reason: reason.clone(),
                })
                .collect(),
            was_connected: outcome.was_connected,
            audio_reset: outcome.audio_reset,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

impl<T: Serialize> CommandResponse<T> {
    pub fn ok(message: String, data: T) -> Self {
        Self {
            success: true,
            message,
            data: Some(data),
            error_kind: None,
        }
    }

    pub fn failed(message: String, data: Option<T>, error: Option<&DomainError>) -> Self {
        Self {
            success: false,
            message,
            data,
            error_kind: error.map(DomainError::kind),
        }
    }
}

/// Returned with 400 when a device id is not address-shaped
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidDeviceResponse {
    pub success: bool,
    pub message: String,
    pub needs_pi_scan: bool,
}

impl InvalidDeviceResponse {
    pub fn new(raw: &str) -> Self {
        Self {
            success: false,
            message: format!(
                "Device id {:?} is not a Bluetooth address; scan for devices first",
                raw
            ),
            needs_pi_scan: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}
