use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Child;
use tokio::sync::Mutex;

use super::output_parser;
use crate::domain::errors::{DomainError, Result};
use crate::domain::ports::ControlPlane;
use crate::domain::value_objects::{DeviceAddress, DeviceInfo, DiscoveredDevice, ToolTimings};
use crate::infrastructure::process::{ToolOutput, ToolRunner};

/// systemd unit of the Bluetooth daemon
const BLUETOOTH_UNIT: &str = "bluetooth";

/// How long to wait for the daemon to report active after a start
const SERVICE_START_GRACE: Duration = Duration::from_secs(1);

/// Control plane backed by the `bluetoothctl` command-line tool
pub struct BluetoothCtlClient {
    bluetoothctl: ToolRunner,
    systemctl: ToolRunner,
    timings: ToolTimings,
    scan: Mutex<Option<Child>>,
}

impl BluetoothCtlClient {
    pub fn new(bluetoothctl: ToolRunner, systemctl: ToolRunner, timings: ToolTimings) -> Self {
        Self {
            bluetoothctl,
            systemctl,
            timings,
            scan: Mutex::new(None),
        }
    }

    /// Run a per-device verb; a non-zero exit or a failure line is an error
    async fn device_command(
        &self,
        verb: &str,
        address: &DeviceAddress,
        timeout: Duration,
    ) -> Result<ToolOutput> {
        let output = self
            .bluetoothctl
            .run(&[verb, address.as_str()], timeout)
            .await?;
        Self::check(output)
    }

    fn check(output: ToolOutput) -> Result<ToolOutput> {
        if let Some(line) = output_parser::failure_line(&output.stdout) {
            return Err(DomainError::ToolReportedFailure {
                command: output.command.clone(),
                detail: line.to_string(),
            });
        }
        output.into_checked()
    }

    async fn stop_scan_process(&self) {
        if let Some(mut child) = self.scan.lock().await.take() {
            if let Err(e) = child.kill().await {
                tracing::debug!("Scan process already gone: {}", e);
            }
        }
    }
}

#[async_trait]
impl ControlPlane for BluetoothCtlClient {
    async fn is_service_active(&self) -> Result<bool> {
        let output = self
            .systemctl
            .run(&["is-active", BLUETOOTH_UNIT], self.timings.command_timeout())
            .await?;
        Ok(output.stdout.trim() == "active")
    }

    async fn ensure_service_running(&self) -> Result<()> {
        if self.is_service_active().await? {
            return Ok(());
        }

        tracing::info!("Bluetooth service is stopped, starting it");
        self.systemctl
            .run_checked(&["start", BLUETOOTH_UNIT], self.timings.command_timeout())
            .await
            .map_err(|e| DomainError::ServiceUnavailable(e.to_string()))?;

        tokio::time::sleep(SERVICE_START_GRACE).await;
        if !self.is_service_active().await? {
            return Err(DomainError::ServiceUnavailable(
                "bluetooth service did not become active".to_string(),
            ));
        }

        if let Err(e) = self
            .bluetoothctl
            .run_checked(&["power", "on"], self.timings.command_timeout())
            .await
        {
            tracing::warn!("Could not power on controller: {}", e);
        }
        Ok(())
    }

    async fn start_discovery(&self, duration: Duration) -> Result<()> {
        self.stop_scan_process().await;

        let secs = duration.as_secs().max(1).to_string();
        let child = self.bluetoothctl.spawn(&["--timeout", &secs, "scan", "on"])?;
        *self.scan.lock().await = Some(child);

        tracing::info!("Discovery started for {}s", secs);
        Ok(())
    }

    async fn stop_discovery(&self) -> Result<()> {
        self.stop_scan_process().await;

        let output = self
            .bluetoothctl
            .run(&["scan", "off"], self.timings.command_timeout())
            .await?;
        if !output.success {
            // Nothing to stop is not a failure
            tracing::debug!("scan off: {}", output.failure_detail());
        }
        tracing::info!("Discovery stopped");
        Ok(())
    }

    async fn list_devices(&self) -> Result<Vec<DiscoveredDevice>> {
        let output = self
            .bluetoothctl
            .run_checked(&["devices"], self.timings.command_timeout())
            .await?;
        Ok(output_parser::parse_device_list(&output.stdout))
    }

    async fn device_info(&self, address: &DeviceAddress) -> Result<DeviceInfo> {
        // Exit status is non-zero for unknown devices; the parser reports that
        let output = self
            .bluetoothctl
            .run(&["info", address.as_str()], self.timings.command_timeout())
            .await?;
        output_parser::parse_device_info(address, &output.stdout)
    }

    async fn trust(&self, address: &DeviceAddress) -> Result<()> {
        self.device_command("trust", address, self.timings.command_timeout())
            .await
            .map(|_| ())
    }

    async fn pair(&self, address: &DeviceAddress) -> Result<()> {
        let output = self
            .bluetoothctl
            .run(&["pair", address.as_str()], self.timings.connect_timeout())
            .await?;
        if output_parser::reports_already_paired(&output.stdout)
            || output_parser::reports_already_paired(&output.stderr)
        {
            tracing::debug!(device = %address, "Already paired");
            return Ok(());
        }
        Self::check(output).map(|_| ())
    }

    async fn connect(&self, address: &DeviceAddress) -> Result<()> {
        self.device_command("connect", address, self.timings.connect_timeout())
            .await
            .map(|_| ())
    }

    async fn disconnect(&self, address: &DeviceAddress) -> Result<()> {
        self.device_command("disconnect", address, self.timings.command_timeout())
            .await
            .map(|_| ())
    }
}
