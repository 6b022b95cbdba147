use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::Result;
use crate::domain::value_objects::{DeviceAddress, DeviceInfo, DiscoveredDevice};

/// Port for the Bluetooth control tool.
///
/// Every operation is bounded by a deadline; exceeding it yields
/// `DomainError::ToolTimeout`, distinct from a tool-reported failure.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Whether the Bluetooth service is running; never starts it
    async fn is_service_active(&self) -> Result<bool>;

    /// Start the Bluetooth service if it is stopped.
    /// Fails with `DomainError::ServiceUnavailable` if it stays down.
    async fn ensure_service_running(&self) -> Result<()>;

    /// Begin discovery. Results only become trustworthy after a settle window.
    async fn start_discovery(&self, duration: Duration) -> Result<()>;

    async fn stop_discovery(&self) -> Result<()>;

    /// Every device the tool currently knows about
    async fn list_devices(&self) -> Result<Vec<DiscoveredDevice>>;

    /// Fails with `DomainError::ParseError` for devices the tool does not know
    async fn device_info(&self, address: &DeviceAddress) -> Result<DeviceInfo>;

    async fn trust(&self, address: &DeviceAddress) -> Result<()>;

    /// Pairing an already-paired device succeeds
    async fn pair(&self, address: &DeviceAddress) -> Result<()>;

    async fn connect(&self, address: &DeviceAddress) -> Result<()>;

    async fn disconnect(&self, address: &DeviceAddress) -> Result<()>;
}
