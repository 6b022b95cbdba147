use crate::domain::value_objects::DeviceAddress;

/// What a disconnect request actually did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisconnectOutcome {
    pub disconnected: Vec<DeviceAddress>,
    pub failed: Vec<(DeviceAddress, String)>,
    /// False when the requested device was not connected (no-op)
    pub was_connected: bool,
    pub audio_reset: bool,
}

impl DisconnectOutcome {
    pub fn not_connected() -> Self {
        Self::default()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
