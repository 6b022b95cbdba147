use super::{AudioSink, BluetoothDevice};

/// Point-in-time view of devices and audio routing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub service_active: bool,
    pub connected_devices: Vec<BluetoothDevice>,
    /// Connected devices that are audio capable
    pub audio_devices: Vec<BluetoothDevice>,
    pub current_audio_sink: String,
    /// Volume and mute of the default sink, when the audio server reported them
    pub current_sink: Option<AudioSink>,
    pub is_bluetooth_audio: bool,
    pub has_connected_audio_device: bool,
}

impl StatusSnapshot {
    /// Reported whenever an underlying query fails
    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn is_connected(&self, device: &super::DeviceAddress) -> bool {
        self.connected_devices.iter().any(|d| &d.address == device)
    }
}
