use std::sync::Arc;
use std::time::{Duration, Instant};

use lazy_static::lazy_static;
use tokio::sync::{oneshot, Mutex, RwLock};

use super::{ConnectionOrchestrator, DeviceStatusService};
use crate::domain::entities::{ConnectionAttempt, DisconnectOutcome};
use crate::domain::errors::Result;
use crate::domain::ports::{AudioRouter, ControlPlane, MetricsReporter};
use crate::domain::value_objects::{DeviceAddress, DiscoveredDevice, StatusSnapshot, ToolTimings};

/// Serializes every control-plane and audio-routing operation in the process.
/// Connect, disconnect and scan take it exclusively; status reads share it.
pub type OperationLock = Arc<RwLock<()>>;

lazy_static! {
    static ref BLUETOOTH_OPERATION_LOCK: OperationLock = Arc::new(RwLock::new(()));
}

/// The process-wide operation lock
pub fn process_operation_lock() -> OperationLock {
    BLUETOOTH_OPERATION_LOCK.clone()
}

/// What the service knows between requests
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Cached result of the background reachability check
    pub service_reachable: Option<bool>,
    pub last_reachability_check: Option<Instant>,
    /// Device most recently connected through this service
    pub active_device: Option<DeviceAddress>,
    /// Sink that device's audio was routed to
    pub active_sink: Option<String>,
    pub last_attempt: Option<ConnectionAttempt>,
}

/// Entry point for scan/connect/disconnect/status requests
pub struct BluetoothAudioService {
    control: Arc<dyn ControlPlane>,
    orchestrator: ConnectionOrchestrator,
    status: DeviceStatusService,
    metrics: Arc<dyn MetricsReporter>,
    timings: ToolTimings,
    operation_lock: OperationLock,
    state: RwLock<SessionState>,
    scan_cancel: Mutex<Option<oneshot::Sender<()>>>,
}

impl BluetoothAudioService {
    pub fn new(
        control: Arc<dyn ControlPlane>,
        audio: Arc<dyn AudioRouter>,
        metrics: Arc<dyn MetricsReporter>,
        timings: ToolTimings,
    ) -> Self {
        Self {
            orchestrator: ConnectionOrchestrator::new(
                control.clone(),
                audio.clone(),
                metrics.clone(),
                timings.clone(),
            ),
            status: DeviceStatusService::new(control.clone(), audio),
            control,
            metrics,
            timings,
            operation_lock: process_operation_lock(),
            state: RwLock::new(SessionState::default()),
            scan_cancel: Mutex::new(None),
        }
    }

    /// Use a private lock instead of the process-wide one
    pub fn with_operation_lock(mut self, lock: OperationLock) -> Self {
        self.operation_lock = lock;
        self
    }

    pub fn timings(&self) -> &ToolTimings {
        &self.timings
    }

    /// Run a discovery window and list what the tool knows afterwards.
    /// `stop_scan` ends the window early.
    pub async fn scan(&self) -> Result<Vec<DiscoveredDevice>> {
        let _guard = self.operation_lock.write().await;
        let window = self.timings.scan_window();

        let (cancel_tx, cancel_rx) = oneshot::channel();
        *self.scan_cancel.lock().await = Some(cancel_tx);

        if let Err(e) = self.control.start_discovery(window).await {
            self.scan_cancel.lock().await.take();
            return Err(e);
        }

        tokio::select! {
            _ = tokio::time::sleep(window) => {}
            _ = cancel_rx => tracing::info!("Discovery window cancelled"),
        }
        self.scan_cancel.lock().await.take();

        if let Err(e) = self.control.stop_discovery().await {
            tracing::warn!("Could not stop discovery: {}", e);
        }

        let devices = self.control.list_devices().await?;
        tracing::info!("Scan found {} devices", devices.len());
        self.metrics.report_scan(devices.len());
        Ok(devices)
    }

    /// Cancel a running discovery window, or stop discovery directly if none is running.
    /// Returns whether a running window was cancelled.
    pub async fn stop_scan(&self) -> Result<bool> {
        if let Some(cancel) = self.scan_cancel.lock().await.take() {
            // The scan stops discovery itself once it wakes
            if cancel.send(()).is_ok() {
                return Ok(true);
            }
            // Sender left behind by a scan that was dropped mid-window
            tracing::debug!("Discovery window already abandoned; stopping discovery directly");
        }

        let _guard = self.operation_lock.write().await;
        self.control.stop_discovery().await?;
        Ok(false)
    }

    pub async fn connect(&self, address: &DeviceAddress, name_hint: Option<&str>) -> ConnectionAttempt {
        let _guard = self.operation_lock.write().await;
        let attempt = self.orchestrator.connect(address, name_hint).await;
        let result = attempt.result();

        let mut state = self.state.write().await;
        if result.connected {
            state.active_device = Some(address.clone());
            state.active_sink = if result.audio_routed {
                result.sink_name.clone()
            } else {
                None
            };
        }
        state.last_attempt = Some(attempt.clone());

        attempt
    }

    /// Disconnect one device, or every connected device when `address` is `None`
    pub async fn disconnect(&self, address: Option<&DeviceAddress>) -> Result<DisconnectOutcome> {
        let _guard = self.operation_lock.write().await;
        let outcome = match address {
            Some(address) => self.orchestrator.disconnect_one(address).await?,
            None => self.orchestrator.disconnect_all().await?,
        };

        let mut state = self.state.write().await;
        let active_dropped = match &state.active_device {
            Some(active) => outcome.disconnected.contains(active),
            None => false,
        };
        if active_dropped || (address.is_none() && outcome.is_clean()) {
            state.active_device = None;
            state.active_sink = None;
        }

        Ok(outcome)
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        let _guard = self.operation_lock.read().await;
        let snapshot = self.status.snapshot().await;
        self.metrics
            .report_connected_devices(snapshot.connected_devices.len());
        snapshot
    }

    pub async fn session_state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Refresh the cached reachability flag. Skipped while an exclusive operation runs.
    pub async fn check_reachability(&self) -> Option<bool> {
        let Ok(_guard) = self.operation_lock.try_read() else {
            tracing::debug!("Operation in progress, skipping reachability check");
            return None;
        };

        let reachable = match self.control.is_service_active().await {
            Ok(active) => active,
            Err(e) => {
                tracing::warn!("Reachability check failed: {}", e);
                false
            }
        };

        let mut state = self.state.write().await;
        state.service_reachable = Some(reachable);
        state.last_reachability_check = Some(Instant::now());
        self.metrics.report_service_reachable(reachable);

        Some(reachable)
    }

    /// Background loop; only ever checks reachability, never enumerates devices
    pub async fn run_reachability_monitor(self: Arc<Self>, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately; startup already checked
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Some(reachable) = self.check_reachability().await {
                tracing::debug!(reachable, "Bluetooth service reachability checked");
            }
        }
    }
}
