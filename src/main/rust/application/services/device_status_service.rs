use std::sync::Arc;

use crate::domain::errors::{DomainError, Result};
use crate::domain::ports::{AudioRouter, ControlPlane};
use crate::domain::value_objects::{
    is_bluetooth_sink_name, AudioSink, BluetoothDevice, SinkTarget, StatusSnapshot,
};

/// Devices from the control tool's list whose info block reports them connected.
///
/// Devices that vanish between the list and their info query are skipped;
/// any other failure aborts the enumeration.
pub async fn connected_devices(control: &dyn ControlPlane) -> Result<Vec<BluetoothDevice>> {
    let listed = control.list_devices().await?;
    let mut connected = Vec::new();

    for device in &listed {
        match control.device_info(&device.address).await {
            Ok(info) if info.connected => {
                connected.push(BluetoothDevice::from_listing(device, &info));
            }
            Ok(_) => {}
            Err(DomainError::ParseError(reason)) => {
                tracing::debug!(device = %device.address, "Skipping device: {}", reason);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(connected)
}

/// Combines device enumeration and audio routing into one status view
pub struct DeviceStatusService {
    control: Arc<dyn ControlPlane>,
    audio: Arc<dyn AudioRouter>,
}

impl DeviceStatusService {
    pub fn new(control: Arc<dyn ControlPlane>, audio: Arc<dyn AudioRouter>) -> Self {
        Self { control, audio }
    }

    /// Never fails: any underlying error yields an inactive snapshot
    pub async fn snapshot(&self) -> StatusSnapshot {
        match self.try_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Status snapshot degraded to inactive: {}", e);
                StatusSnapshot::inactive()
            }
        }
    }

    async fn try_snapshot(&self) -> Result<StatusSnapshot> {
        if !self.control.is_service_active().await? {
            return Ok(StatusSnapshot::inactive());
        }

        let connected = connected_devices(self.control.as_ref()).await?;
        let current_audio_sink = self.audio.default_sink_name().await?;
        let current_sink = self.current_sink(&current_audio_sink).await;

        let audio_devices: Vec<BluetoothDevice> = connected
            .iter()
            .filter(|device| device.is_audio_device)
            .cloned()
            .collect();

        Ok(StatusSnapshot {
            service_active: true,
            has_connected_audio_device: !audio_devices.is_empty(),
            is_bluetooth_audio: is_bluetooth_sink_name(&current_audio_sink),
            connected_devices: connected,
            audio_devices,
            current_audio_sink,
            current_sink,
        })
    }

    /// Volume and mute are informational; failing to read them does not degrade the snapshot
    async fn current_sink(&self, name: &str) -> Option<AudioSink> {
        match self.audio.volume_and_mute(&SinkTarget::Default).await {
            Ok((volume, muted)) => Some(AudioSink::new(name.to_string(), volume, muted)),
            Err(e) => {
                tracing::debug!(sink = %name, "Could not read sink volume: {}", e);
                None
            }
        }
    }
}
