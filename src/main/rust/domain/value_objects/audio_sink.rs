use std::fmt;

use super::DeviceAddress;

/// Prefix the audio server gives sinks registered by Bluetooth devices
pub const BLUETOOTH_SINK_PREFIX: &str = "bluez_sink.";

/// Newer audio-server generations register Bluetooth outputs under this prefix
pub const BLUETOOTH_OUTPUT_PREFIX: &str = "bluez_output.";

/// Profile suffix of a connected A2DP audio device
pub const A2DP_SINK_SUFFIX: &str = "a2dp_sink";

/// Sink name a connected Bluetooth audio device is expected to register under.
///
/// `AA:BB:CC:DD:EE:FF` becomes `bluez_sink.AA_BB_CC_DD_EE_FF.a2dp_sink`.
pub fn sink_name_for(address: &DeviceAddress) -> String {
    format!(
        "{}{}.{}",
        BLUETOOTH_SINK_PREFIX,
        address.as_str().replace(':', "_"),
        A2DP_SINK_SUFFIX
    )
}

pub fn is_bluetooth_sink_name(name: &str) -> bool {
    name.starts_with(BLUETOOTH_SINK_PREFIX) || name.starts_with(BLUETOOTH_OUTPUT_PREFIX)
}

/// Audio output destination managed by the audio server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSink {
    name: String,
    volume_percent: u8,
    muted: bool,
}

impl AudioSink {
    pub fn new(name: String, volume_percent: u8, muted: bool) -> Self {
        Self {
            name,
            volume_percent,
            muted,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn volume_percent(&self) -> u8 {
        self.volume_percent
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_bluetooth(&self) -> bool {
        is_bluetooth_sink_name(&self.name)
    }
}

/// Which sink a mute/volume operation applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    Default,
    Named(String),
}

impl SinkTarget {
    /// Argument form understood by the audio server's control tools
    pub fn as_tool_arg(&self) -> &str {
        match self {
            Self::Default => "@DEFAULT_SINK@",
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for SinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tool_arg())
    }
}
