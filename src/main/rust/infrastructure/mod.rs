pub mod bluetoothctl;
pub mod http;
pub mod metrics;
pub mod process;
pub mod pulseaudio;
