use std::sync::Arc;

use super::device_status_service::connected_devices;
use crate::domain::entities::{ConnectionAttempt, DisconnectOutcome};
use crate::domain::errors::Result;
use crate::domain::ports::{AudioRouter, ControlPlane, MetricsReporter};
use crate::domain::value_objects::{
    sink_name_for, ConnectionStep, DeviceAddress, SinkTarget, StepOutcome, ToolTimings,
    DISPLAY_NAME_FALLBACK,
};

/// Drives a device from "discovered" to "connected and audio-routed".
///
/// Steps run in order with no retries. Only preflight and connect failures
/// end an attempt; every other failure is recorded and the attempt continues.
/// Callers are responsible for serializing calls.
pub struct ConnectionOrchestrator {
    control: Arc<dyn ControlPlane>,
    audio: Arc<dyn AudioRouter>,
    metrics: Arc<dyn MetricsReporter>,
    timings: ToolTimings,
}

impl ConnectionOrchestrator {
    pub fn new(
        control: Arc<dyn ControlPlane>,
        audio: Arc<dyn AudioRouter>,
        metrics: Arc<dyn MetricsReporter>,
        timings: ToolTimings,
    ) -> Self {
        Self {
            control,
            audio,
            metrics,
            timings,
        }
    }

    pub async fn connect(&self, target: &DeviceAddress, name_hint: Option<&str>) -> ConnectionAttempt {
        let name = name_hint
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DISPLAY_NAME_FALLBACK);
        let mut attempt = ConnectionAttempt::new(target.clone(), name.to_string());

        tracing::info!(device = %target, attempt = %attempt.id(), "Connection attempt started");
        self.run_steps(&mut attempt).await;

        let result = attempt.result();
        self.metrics.report_connection_attempt(&result);

        match attempt.failure_reason() {
            Some(reason) => tracing::error!(
                device = %target,
                "Connection attempt failed after {:?}: {}",
                attempt.duration(),
                reason
            ),
            None => tracing::info!(
                device = %target,
                connected = result.connected,
                audio_routed = result.audio_routed,
                was_reconnected = result.was_reconnected,
                "Connection attempt finished in {:?}",
                attempt.duration()
            ),
        }

        attempt
    }

    async fn run_steps(&self, attempt: &mut ConnectionAttempt) {
        let target = attempt.target().clone();

        let preflight = match self.control.ensure_service_running().await {
            Ok(()) => StepOutcome::Succeeded,
            Err(e) => StepOutcome::FailedFatal(e.to_string()),
        };
        attempt.record(ConnectionStep::Preflight, preflight);
        if attempt.is_terminated() {
            return;
        }

        let cleared = self.clear_prior_connections(&target).await;
        attempt.record(ConnectionStep::ClearPriorConnections, cleared);

        let trust = match self.control.trust(&target).await {
            Ok(()) => StepOutcome::Succeeded,
            Err(e) => {
                tracing::warn!(device = %target, "Trust failed, continuing: {}", e);
                StepOutcome::FailedNonFatal(e.to_string())
            }
        };
        attempt.record(ConnectionStep::Trust, trust);

        // The tool's exit status cannot tell "already paired" from some transient errors
        let pair = match self.control.pair(&target).await {
            Ok(()) => StepOutcome::Succeeded,
            Err(e) => {
                tracing::warn!(device = %target, "Pair failed, assuming already paired: {}", e);
                StepOutcome::FailedNonFatal(format!("{} (treated as already paired)", e))
            }
        };
        attempt.record(ConnectionStep::Pair, pair);

        let reconnect = self.disconnect_if_connected(attempt).await;
        attempt.record(ConnectionStep::Reconnect, reconnect);

        match self.control.connect(&target).await {
            Ok(()) => {
                attempt.record(ConnectionStep::Connect, StepOutcome::Succeeded);
                tokio::time::sleep(self.timings.connect_settle()).await;
            }
            Err(e) => {
                attempt.record(ConnectionStep::Connect, StepOutcome::FailedFatal(e.to_string()));
                return;
            }
        }

        let sink = sink_name_for(&target);
        attempt.set_sink_name(sink.clone());
        let routed = self.route_audio(&sink).await;
        let audio_routed = routed.is_success();
        attempt.record(ConnectionStep::RouteAudio, routed);

        let tone = if audio_routed {
            self.play_confirmation_tone(&sink).await
        } else {
            StepOutcome::Skipped("audio not routed".to_string())
        };
        attempt.record(ConnectionStep::ConfirmationTone, tone);
    }

    /// Best effort: a stale "connected" report must not block the new connection
    async fn clear_prior_connections(&self, target: &DeviceAddress) -> StepOutcome {
        let connected = match connected_devices(self.control.as_ref()).await {
            Ok(devices) => devices,
            Err(e) => {
                tracing::warn!("Could not enumerate connected devices: {}", e);
                return StepOutcome::FailedNonFatal(format!("enumeration failed: {}", e));
            }
        };

        // The target is handled by the reconnect step
        let others: Vec<_> = connected
            .into_iter()
            .filter(|device| &device.address != target)
            .collect();
        if others.is_empty() {
            return StepOutcome::Skipped("no other connected devices".to_string());
        }

        let mut failures = Vec::new();
        for device in &others {
            match self.control.disconnect(&device.address).await {
                Ok(()) => tracing::info!(device = %device.address, "Disconnected prior device"),
                Err(e) => {
                    tracing::warn!(device = %device.address, "Could not disconnect prior device: {}", e);
                    failures.push(format!("{}: {}", device.address, e));
                }
            }
        }

        if failures.is_empty() {
            StepOutcome::Succeeded
        } else {
            StepOutcome::FailedNonFatal(failures.join("; "))
        }
    }

    /// Connecting an already-connected device is unreliable, so always cycle it
    async fn disconnect_if_connected(&self, attempt: &mut ConnectionAttempt) -> StepOutcome {
        let target = attempt.target().clone();

        let info = match self.control.device_info(&target).await {
            Ok(info) => info,
            Err(e) => return StepOutcome::Skipped(format!("state unknown: {}", e)),
        };
        if let Some(name) = info.display_name() {
            attempt.set_target_name(name.to_string());
        }
        if !info.connected {
            return StepOutcome::Skipped("not connected".to_string());
        }

        tracing::info!(device = %target, "Already connected, forcing reconnect");
        match self.control.disconnect(&target).await {
            Ok(()) => {
                tokio::time::sleep(self.timings.disconnect_settle()).await;
                StepOutcome::Succeeded
            }
            Err(e) => {
                tracing::warn!(device = %target, "Disconnect before reconnect failed: {}", e);
                StepOutcome::FailedNonFatal(e.to_string())
            }
        }
    }

    async fn route_audio(&self, sink: &str) -> StepOutcome {
        if let Err(e) = self.audio.set_default_sink(sink).await {
            tracing::warn!(sink = %sink, "Audio routing failed: {}", e);
            return StepOutcome::FailedNonFatal(e.to_string());
        }

        if let Err(e) = self
            .audio
            .set_mute(&SinkTarget::Named(sink.to_string()), false)
            .await
        {
            tracing::warn!(sink = %sink, "Could not unmute new sink: {}", e);
        }
        StepOutcome::Succeeded
    }

    async fn play_confirmation_tone(&self, sink: &str) -> StepOutcome {
        match self.audio.play_confirmation_tone(sink).await {
            Ok(true) => StepOutcome::Succeeded,
            Ok(false) => StepOutcome::Skipped("no confirmation tone configured".to_string()),
            Err(e) => {
                tracing::warn!(sink = %sink, "Confirmation tone failed: {}", e);
                StepOutcome::FailedNonFatal(e.to_string())
            }
        }
    }

    /// Disconnect every connected device and fall back to the built-in output
    pub async fn disconnect_all(&self) -> Result<DisconnectOutcome> {
        let connected = connected_devices(self.control.as_ref()).await?;
        let mut outcome = DisconnectOutcome {
            was_connected: !connected.is_empty(),
            ..DisconnectOutcome::default()
        };

        for device in connected {
            match self.control.disconnect(&device.address).await {
                Ok(()) => {
                    tracing::info!(device = %device.address, "Disconnected");
                    outcome.disconnected.push(device.address);
                }
                Err(e) => {
                    tracing::warn!(device = %device.address, "Disconnect failed: {}", e);
                    outcome.failed.push((device.address, e.to_string()));
                }
            }
        }

        if !outcome.disconnected.is_empty() {
            tokio::time::sleep(self.timings.disconnect_settle()).await;
        }
        outcome.audio_reset = self.reset_audio().await;

        self.metrics.report_disconnect(&outcome);
        Ok(outcome)
    }

    /// Disconnect one device; a device that is not connected is a no-op
    pub async fn disconnect_one(&self, address: &DeviceAddress) -> Result<DisconnectOutcome> {
        let info = self.control.device_info(address).await?;
        if !info.connected {
            tracing::info!(device = %address, "Not connected, nothing to disconnect");
            return Ok(DisconnectOutcome::not_connected());
        }

        self.control.disconnect(address).await?;
        tokio::time::sleep(self.timings.disconnect_settle()).await;

        let outcome = DisconnectOutcome {
            disconnected: vec![address.clone()],
            failed: Vec::new(),
            was_connected: true,
            audio_reset: self.reset_audio().await,
        };
        self.metrics.report_disconnect(&outcome);
        Ok(outcome)
    }

    async fn reset_audio(&self) -> bool {
        match self.audio.reset_to_builtin_output().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Could not restore built-in output: {}", e);
                false
            }
        }
    }
}
