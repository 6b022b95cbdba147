mod audio_sink;
mod bluetooth_device;
mod connection_step;
mod device_address;
mod device_info;
mod status_snapshot;
mod tool_timings;

pub use audio_sink::{
    is_bluetooth_sink_name, sink_name_for, AudioSink, SinkTarget, A2DP_SINK_SUFFIX,
    BLUETOOTH_OUTPUT_PREFIX, BLUETOOTH_SINK_PREFIX,
};
pub use bluetooth_device::{
    BluetoothDevice, DiscoveredDevice, DISPLAY_NAME_FALLBACK, LISTED_NAME_FALLBACK,
};
pub use connection_step::{ConnectionStep, StepOutcome};
pub use device_address::DeviceAddress;
pub use device_info::DeviceInfo;
pub use status_snapshot::StatusSnapshot;
pub use tool_timings::ToolTimings;
