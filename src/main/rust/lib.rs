pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-exports for convenience
pub use application::services::{
    process_operation_lock, BluetoothAudioService, ConnectionOrchestrator, DeviceStatusService,
    OperationLock, SessionState,
};
pub use config::Config;
pub use domain::entities::{ConnectionAttempt, ConnectionResult, DisconnectOutcome, StepRecord};
pub use domain::errors::{DomainError, Result};
pub use domain::ports::{AudioRouter, ControlPlane, MetricsReporter};
pub use domain::value_objects::{
    AudioSink, BluetoothDevice, ConnectionStep, DeviceAddress, DeviceInfo, DiscoveredDevice,
    SinkTarget, StatusSnapshot, StepOutcome, ToolTimings,
};
pub use infrastructure::bluetoothctl::BluetoothCtlClient;
pub use infrastructure::http::{routes, serve};
pub use infrastructure::metrics::PrometheusReporter;
pub use infrastructure::process::ToolRunner;
pub use infrastructure::pulseaudio::PulseAudioRouter;
