#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use smart_monitor_bluetooth::{
    AudioRouter, BluetoothAudioService, ConnectionResult, ControlPlane, DeviceAddress, DeviceInfo,
    DisconnectOutcome, DiscoveredDevice, DomainError, MetricsReporter, Result, SinkTarget,
    ToolTimings,
};

pub const HEADPHONES: &str = "AA:BB:CC:DD:EE:FF";
pub const SPEAKER: &str = "11:22:33:44:55:66";
pub const KEYBOARD: &str = "66:55:44:33:22:11";
pub const BUILTIN_SINK: &str = "alsa_output.platform-bcm2835_audio.analog-stereo";

pub fn addr(raw: &str) -> DeviceAddress {
    DeviceAddress::parse(raw).unwrap()
}

/// Calls made to both fakes, in order
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries().iter().any(|e| e == entry)
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }

    pub fn positions_of(&self, prefix: &str) -> Vec<usize> {
        self.entries()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.starts_with(prefix))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FakeDevice {
    pub address: DeviceAddress,
    pub name: String,
    pub paired: bool,
    pub trusted: bool,
    pub connected: bool,
    pub is_audio_device: bool,
}

impl FakeDevice {
    pub fn audio(raw: &str, name: &str) -> Self {
        Self {
            address: addr(raw),
            name: name.to_string(),
            paired: false,
            trusted: false,
            connected: false,
            is_audio_device: true,
        }
    }

    pub fn keyboard(raw: &str, name: &str) -> Self {
        Self {
            is_audio_device: false,
            ..Self::audio(raw, name)
        }
    }

    pub fn connected(mut self) -> Self {
        self.paired = true;
        self.connected = true;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Fault {
    Fail,
    Timeout,
}

#[derive(Default)]
struct ControlState {
    service_active: bool,
    known: Vec<FakeDevice>,
    nearby: Vec<FakeDevice>,
    faults: HashMap<String, Fault>,
}

/// In-memory Bluetooth control plane
pub struct FakeControlPlane {
    log: CallLog,
    state: Mutex<ControlState>,
    connect_delay: Mutex<Duration>,
}

impl FakeControlPlane {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            state: Mutex::new(ControlState {
                service_active: true,
                ..ControlState::default()
            }),
            connect_delay: Mutex::new(Duration::ZERO),
        }
    }

    /// Already known to the tool
    pub fn with_known(self, device: FakeDevice) -> Self {
        self.state.lock().unwrap().known.push(device);
        self
    }

    /// Only becomes known after discovery
    pub fn with_nearby(self, device: FakeDevice) -> Self {
        self.state.lock().unwrap().nearby.push(device);
        self
    }

    pub fn with_service_active(self, active: bool) -> Self {
        self.state.lock().unwrap().service_active = active;
        self
    }

    pub fn with_fault(self, operation: &str, fault: Fault) -> Self {
        self.state
            .lock()
            .unwrap()
            .faults
            .insert(operation.to_string(), fault);
        self
    }

    pub fn with_connect_delay(self, delay: Duration) -> Self {
        *self.connect_delay.lock().unwrap() = delay;
        self
    }

    pub fn device(&self, raw: &str) -> Option<FakeDevice> {
        let address = addr(raw);
        self.state
            .lock()
            .unwrap()
            .known
            .iter()
            .find(|d| d.address == address)
            .cloned()
    }

    fn enter(&self, operation: &str, target: Option<&DeviceAddress>) -> Result<()> {
        let entry = match target {
            Some(address) => format!("control:{} {}", operation, address),
            None => format!("control:{}", operation),
        };
        self.log.push(entry.clone());

        match self.state.lock().unwrap().faults.get(operation) {
            Some(Fault::Fail) => Err(DomainError::ToolReportedFailure {
                command: entry,
                detail: format!("Failed to {}", operation),
            }),
            Some(Fault::Timeout) => Err(DomainError::ToolTimeout {
                command: entry,
                timeout: Duration::from_secs(5),
            }),
            None => Ok(()),
        }
    }

    fn update<F>(&self, address: &DeviceAddress, change: F) -> Result<()>
    where
        F: FnOnce(&mut FakeDevice),
    {
        let mut state = self.state.lock().unwrap();
        match state.known.iter_mut().find(|d| &d.address == address) {
            Some(device) => {
                change(device);
                Ok(())
            }
            None => Err(DomainError::ToolReportedFailure {
                command: format!("bluetoothctl {}", address),
                detail: format!("Device {} not available", address),
            }),
        }
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn is_service_active(&self) -> Result<bool> {
        self.enter("is-service-active", None)?;
        Ok(self.state.lock().unwrap().service_active)
    }

    async fn ensure_service_running(&self) -> Result<()> {
        self.enter("ensure-service", None)?;
        self.state.lock().unwrap().service_active = true;
        Ok(())
    }

    async fn start_discovery(&self, _duration: Duration) -> Result<()> {
        self.enter("start-discovery", None)?;
        let mut state = self.state.lock().unwrap();
        let nearby = std::mem::take(&mut state.nearby);
        state.known.extend(nearby);
        Ok(())
    }

    async fn stop_discovery(&self) -> Result<()> {
        self.enter("stop-discovery", None)
    }

    async fn list_devices(&self) -> Result<Vec<DiscoveredDevice>> {
        self.enter("devices", None)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .known
            .iter()
            .map(|d| DiscoveredDevice {
                address: d.address.clone(),
                name: d.name.clone(),
            })
            .collect())
    }

    async fn device_info(&self, address: &DeviceAddress) -> Result<DeviceInfo> {
        self.enter("info", Some(address))?;
        let state = self.state.lock().unwrap();
        let device = state
            .known
            .iter()
            .find(|d| &d.address == address)
            .ok_or_else(|| DomainError::ParseError(format!("device {} not available", address)))?;
        Ok(DeviceInfo {
            address: device.address.clone(),
            name: Some(device.name.clone()),
            alias: Some(device.name.clone()),
            paired: device.paired,
            trusted: device.trusted,
            connected: device.connected,
            is_audio_device: device.is_audio_device,
        })
    }

    async fn trust(&self, address: &DeviceAddress) -> Result<()> {
        self.enter("trust", Some(address))?;
        self.update(address, |d| d.trusted = true)
    }

    async fn pair(&self, address: &DeviceAddress) -> Result<()> {
        self.enter("pair", Some(address))?;
        self.update(address, |d| d.paired = true)
    }

    async fn connect(&self, address: &DeviceAddress) -> Result<()> {
        self.enter("connect", Some(address))?;
        let delay = *self.connect_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.update(address, |d| d.connected = true)
    }

    async fn disconnect(&self, address: &DeviceAddress) -> Result<()> {
        self.enter("disconnect", Some(address))?;
        self.update(address, |d| d.connected = false)
    }
}

/// In-memory audio server
pub struct FakeAudioRouter {
    log: CallLog,
    default_sink: Mutex<String>,
    muted: Mutex<bool>,
    volume: Mutex<u8>,
    fail_routing: Mutex<bool>,
    tone_configured: bool,
}

impl FakeAudioRouter {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            default_sink: Mutex::new(BUILTIN_SINK.to_string()),
            muted: Mutex::new(true),
            volume: Mutex::new(50),
            fail_routing: Mutex::new(false),
            tone_configured: true,
        }
    }

    pub fn failing_routing(self) -> Self {
        *self.fail_routing.lock().unwrap() = true;
        self
    }

    pub fn without_tone(mut self) -> Self {
        self.tone_configured = false;
        self
    }

    pub fn current_sink(&self) -> String {
        self.default_sink.lock().unwrap().clone()
    }

    pub fn is_muted(&self) -> bool {
        *self.muted.lock().unwrap()
    }
}

#[async_trait]
impl AudioRouter for FakeAudioRouter {
    async fn set_default_sink(&self, sink_name: &str) -> Result<()> {
        self.log.push(format!("audio:set-default-sink {}", sink_name));
        if *self.fail_routing.lock().unwrap() {
            return Err(DomainError::AudioRoutingFailed {
                primary: "No such entity".to_string(),
                secondary: "No sink found".to_string(),
            });
        }
        *self.default_sink.lock().unwrap() = sink_name.to_string();
        Ok(())
    }

    async fn default_sink_name(&self) -> Result<String> {
        self.log.push("audio:default-sink".to_string());
        Ok(self.current_sink())
    }

    async fn set_mute(&self, target: &SinkTarget, muted: bool) -> Result<()> {
        self.log.push(format!("audio:set-mute {} {}", target, muted));
        *self.muted.lock().unwrap() = muted;
        Ok(())
    }

    async fn set_volume(&self, target: &SinkTarget, percent: u8) -> Result<()> {
        self.log.push(format!("audio:set-volume {} {}", target, percent));
        *self.volume.lock().unwrap() = percent;
        Ok(())
    }

    async fn volume_and_mute(&self, _target: &SinkTarget) -> Result<(u8, bool)> {
        Ok((*self.volume.lock().unwrap(), self.is_muted()))
    }

    async fn reset_to_builtin_output(&self) -> Result<()> {
        self.log.push("audio:reset".to_string());
        *self.default_sink.lock().unwrap() = BUILTIN_SINK.to_string();
        Ok(())
    }

    async fn play_confirmation_tone(&self, sink_name: &str) -> Result<bool> {
        if !self.tone_configured {
            return Ok(false);
        }
        self.log.push(format!("audio:tone {}", sink_name));
        Ok(true)
    }
}

/// Metrics sink that keeps what it was told
#[derive(Default)]
pub struct RecordingMetrics {
    pub attempts: Mutex<Vec<ConnectionResult>>,
    pub disconnects: Mutex<Vec<DisconnectOutcome>>,
    pub scans: Mutex<Vec<usize>>,
    pub reachability: Mutex<Vec<bool>>,
}

impl MetricsReporter for RecordingMetrics {
    fn report_connection_attempt(&self, result: &ConnectionResult) {
        self.attempts.lock().unwrap().push(result.clone());
    }

    fn report_disconnect(&self, outcome: &DisconnectOutcome) {
        self.disconnects.lock().unwrap().push(outcome.clone());
    }

    fn report_scan(&self, devices_found: usize) {
        self.scans.lock().unwrap().push(devices_found);
    }

    fn report_connected_devices(&self, _count: usize) {}

    fn report_service_reachable(&self, reachable: bool) {
        self.reachability.lock().unwrap().push(reachable);
    }
}

/// A service wired to fakes, with its own operation lock
pub struct Harness {
    pub log: CallLog,
    pub control: Arc<FakeControlPlane>,
    pub audio: Arc<FakeAudioRouter>,
    pub metrics: Arc<RecordingMetrics>,
    pub lock: Arc<RwLock<()>>,
    pub service: Arc<BluetoothAudioService>,
}

impl Harness {
    pub fn new<C, A>(control: C, audio: A) -> Self
    where
        C: FnOnce(CallLog) -> FakeControlPlane,
        A: FnOnce(CallLog) -> FakeAudioRouter,
    {
        Self::with_timings(control, audio, ToolTimings::immediate())
    }

    pub fn with_timings<C, A>(control: C, audio: A, timings: ToolTimings) -> Self
    where
        C: FnOnce(CallLog) -> FakeControlPlane,
        A: FnOnce(CallLog) -> FakeAudioRouter,
    {
        let log = CallLog::default();
        let control = Arc::new(control(log.clone()));
        let audio = Arc::new(audio(log.clone()));
        let metrics = Arc::new(RecordingMetrics::default());
        let lock = Arc::new(RwLock::new(()));

        let service = Arc::new(
            BluetoothAudioService::new(control.clone(), audio.clone(), metrics.clone(), timings)
                .with_operation_lock(lock.clone()),
        );

        Self {
            log,
            control,
            audio,
            metrics,
            lock,
            service,
        }
    }
}
