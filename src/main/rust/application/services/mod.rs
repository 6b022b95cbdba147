mod bluetooth_audio_service;
mod connection_orchestrator;
mod device_status_service;

pub use bluetooth_audio_service::{
    process_operation_lock, BluetoothAudioService, OperationLock, SessionState,
};
pub use connection_orchestrator::ConnectionOrchestrator;
pub use device_status_service::{connected_devices, DeviceStatusService};
