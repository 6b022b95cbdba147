use serde::Serialize;

use super::{DeviceAddress, DeviceInfo};

/// Name reported for list entries that carry no name
pub const LISTED_NAME_FALLBACK: &str = "Unknown";

/// Display name used when no usable name is known for a device
pub const DISPLAY_NAME_FALLBACK: &str = "Unknown Device";

/// A device as it appears in the control tool's device list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredDevice {
    pub address: DeviceAddress,
    pub name: String,
}

/// Transient view of a device, rebuilt on every enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BluetoothDevice {
    pub address: DeviceAddress,
    pub name: String,
    pub paired: bool,
    pub connected: bool,
    pub is_audio_device: bool,
}

impl BluetoothDevice {
    /// Merge a list entry with its info block. The info block's alias/name wins.
    pub fn from_listing(listed: &DiscoveredDevice, info: &DeviceInfo) -> Self {
        let name = info
            .display_name()
            .or_else(|| usable_name(&listed.name))
            .unwrap_or(DISPLAY_NAME_FALLBACK)
            .to_string();

        Self {
            address: listed.address.clone(),
            name,
            paired: info.paired,
            connected: info.connected,
            is_audio_device: info.is_audio_device,
        }
    }
}

fn usable_name(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == LISTED_NAME_FALLBACK {
        None
    } else {
        Some(trimmed)
    }
}
