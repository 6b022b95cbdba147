use super::DeviceAddress;

/// Per-device state as reported by the control tool's `info` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub address: DeviceAddress,
    pub name: Option<String>,
    pub alias: Option<String>,
    pub paired: bool,
    pub trusted: bool,
    pub connected: bool,
    pub is_audio_device: bool,
}

impl DeviceInfo {
    /// Alias first, then name; blank values are ignored
    pub fn display_name(&self) -> Option<&str> {
        self.alias
            .as_deref()
            .or(self.name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
