use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

use crate::domain::entities::{ConnectionResult, DisconnectOutcome};
use crate::domain::ports::MetricsReporter;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref CONNECTION_ATTEMPTS: IntCounter = IntCounter::new(
        "bluetooth_connection_attempts_total",
        "Total number of device connection attempts"
    ).expect("metric can be created");
    pub static ref CONNECTIONS_SUCCEEDED: IntCounter = IntCounter::new(
        "bluetooth_connections_succeeded_total",
        "Connection attempts that left the device connected"
    ).expect("metric can be created");
    pub static ref AUDIO_ROUTING_FAILURES: IntCounter = IntCounter::new(
        "bluetooth_audio_routing_failures_total",
        "Connected devices whose audio could not be routed"
    ).expect("metric can be created");
    pub static ref DISCONNECTS: IntCounter = IntCounter::new(
        "bluetooth_disconnects_total",
        "Devices disconnected on request"
    ).expect("metric can be created");
    pub static ref SCANS: IntCounter = IntCounter::new(
        "bluetooth_scans_total",
        "Completed discovery windows"
    ).expect("metric can be created");
    pub static ref CONNECTED_DEVICES: IntGauge = IntGauge::new(
        "bluetooth_connected_devices",
        "Connected devices in the latest status snapshot"
    ).expect("metric can be created");
    pub static ref SERVICE_REACHABLE: IntGauge = IntGauge::new(
        "bluetooth_service_reachable",
        "Bluetooth service state from the background check (0=down, 1=up)"
    ).expect("metric can be created");
}

pub struct PrometheusReporter;

impl PrometheusReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn init_metrics() -> Result<(), prometheus::Error> {
        REGISTRY.register(Box::new(CONNECTION_ATTEMPTS.clone()))?;
        REGISTRY.register(Box::new(CONNECTIONS_SUCCEEDED.clone()))?;
        REGISTRY.register(Box::new(AUDIO_ROUTING_FAILURES.clone()))?;
        REGISTRY.register(Box::new(DISCONNECTS.clone()))?;
        REGISTRY.register(Box::new(SCANS.clone()))?;
        REGISTRY.register(Box::new(CONNECTED_DEVICES.clone()))?;
        REGISTRY.register(Box::new(SERVICE_REACHABLE.clone()))?;
        Ok(())
    }

    pub fn gather_metrics() -> Vec<u8> {
        let encoder = TextEncoder::new();
        let metric_families = REGISTRY.gather();
        let mut buffer = vec![];
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
            return b"# Error encoding metrics\n".to_vec();
        }
        buffer
    }
}

impl Default for PrometheusReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsReporter for PrometheusReporter {
    fn report_connection_attempt(&self, result: &ConnectionResult) {
        CONNECTION_ATTEMPTS.inc();
        if result.connected {
            CONNECTIONS_SUCCEEDED.inc();
            if !result.audio_routed {
                AUDIO_ROUTING_FAILURES.inc();
            }
        }
    }

    fn report_disconnect(&self, outcome: &DisconnectOutcome) {
        DISCONNECTS.inc_by(outcome.disconnected.len() as u64);
    }

    fn report_scan(&self, _devices_found: usize) {
        SCANS.inc();
    }

    fn report_connected_devices(&self, count: usize) {
        CONNECTED_DEVICES.set(count as i64);
    }

    fn report_service_reachable(&self, reachable: bool) {
        SERVICE_REACHABLE.set(if reachable { 1 } else { 0 });
    }
}
