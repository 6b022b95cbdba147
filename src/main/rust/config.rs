use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::domain::value_objects::ToolTimings;
use crate::infrastructure::bluetoothctl::BluetoothCtlClient;
use crate::infrastructure::process::ToolRunner;
use crate::infrastructure::pulseaudio::PulseAudioRouter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "smart-monitor-bluetooth",
    version,
    about = "Bluetooth audio device manager for the Smart Monitor dashboard"
)]
pub struct Config {
    /// Address the HTTP API binds to
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: IpAddr,

    /// HTTP API port
    #[arg(long, env = "HTTP_PORT", default_value = "5000")]
    pub http_port: u16,

    /// Bluetooth control tool
    #[arg(long, env = "BLUETOOTHCTL_PATH", default_value = "bluetoothctl")]
    pub bluetoothctl_path: String,

    /// Audio server control tool
    #[arg(long, env = "PACTL_PATH", default_value = "pactl")]
    pub pactl_path: String,

    /// Fallback audio server control tool
    #[arg(long, env = "PACMD_PATH", default_value = "pacmd")]
    pub pacmd_path: String,

    /// Service manager used to check and start the Bluetooth service
    #[arg(long, env = "SYSTEMCTL_PATH", default_value = "systemctl")]
    pub systemctl_path: String,

    /// Player for the confirmation tone
    #[arg(long, env = "PAPLAY_PATH", default_value = "paplay")]
    pub paplay_path: String,

    /// Sink restored after disconnecting
    #[arg(
        long,
        env = "BUILTIN_SINK",
        default_value = "alsa_output.platform-bcm2835_audio.analog-stereo"
    )]
    pub builtin_sink: String,

    /// WAV file played on a newly routed device
    #[arg(long, env = "CONFIRMATION_TONE")]
    pub confirmation_tone: Option<PathBuf>,

    /// Deadline for ordinary tool invocations
    #[arg(long, env = "COMMAND_TIMEOUT_SECS", default_value = "5")]
    pub command_timeout_secs: u64,

    /// Deadline for pair and connect
    #[arg(long, env = "CONNECT_TIMEOUT_SECS", default_value = "15")]
    pub connect_timeout_secs: u64,

    /// Length of a discovery window
    #[arg(long, env = "SCAN_WINDOW_SECS", default_value = "10")]
    pub scan_window_secs: u64,

    /// Wait after a successful connect before routing audio
    #[arg(long, env = "CONNECT_SETTLE_MS", default_value = "3000")]
    pub connect_settle_ms: u64,

    /// Wait after a disconnect
    #[arg(long, env = "DISCONNECT_SETTLE_MS", default_value = "2000")]
    pub disconnect_settle_ms: u64,

    /// Period of the background service reachability check
    #[arg(long, env = "STATUS_CHECK_INTERVAL_SECS", default_value = "60")]
    pub status_check_interval_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Minimum allowed port (ports below 1024 are privileged)
const MIN_USER_PORT: u16 = 1024;

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        Self::validate_port(self.http_port, "HTTP")?;

        if let Some(tone) = &self.confirmation_tone {
            if !tone.is_file() {
                anyhow::bail!("Confirmation tone not found: {:?}", tone);
            }
        }

        if self.builtin_sink.trim().is_empty() {
            anyhow::bail!("Built-in sink name cannot be empty");
        }

        for (value, name) in [
            (self.command_timeout_secs, "command timeout"),
            (self.connect_timeout_secs, "connect timeout"),
            (self.status_check_interval_secs, "status check interval"),
        ] {
            if value == 0 {
                anyhow::bail!("Invalid {}: must be at least 1 second", name);
            }
        }

        self.to_tool_timings()?;
        Ok(())
    }

    fn validate_port(port: u16, name: &str) -> anyhow::Result<()> {
        if port == 0 {
            anyhow::bail!("Invalid {} port: port cannot be 0", name);
        }
        if port < MIN_USER_PORT {
            anyhow::bail!(
                "Invalid {} port: {} is a privileged port (< {}). Use a port >= {}",
                name,
                port,
                MIN_USER_PORT,
                MIN_USER_PORT
            );
        }
        Ok(())
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.http_port)
    }

    pub fn status_check_interval(&self) -> Duration {
        Duration::from_secs(self.status_check_interval_secs)
    }

    pub fn to_tool_timings(&self) -> anyhow::Result<ToolTimings> {
        let timings = ToolTimings::new(
            Duration::from_secs(self.command_timeout_secs),
            Duration::from_secs(self.connect_timeout_secs),
            Duration::from_secs(self.scan_window_secs),
            Duration::from_millis(self.connect_settle_ms),
            Duration::from_millis(self.disconnect_settle_ms),
        )?;
        Ok(timings)
    }

    pub fn control_plane(&self, timings: ToolTimings) -> BluetoothCtlClient {
        BluetoothCtlClient::new(
            ToolRunner::new(&self.bluetoothctl_path),
            ToolRunner::new(&self.systemctl_path),
            timings,
        )
    }

    pub fn audio_router(&self, timings: &ToolTimings) -> PulseAudioRouter {
        PulseAudioRouter::new(
            ToolRunner::new(&self.pactl_path),
            ToolRunner::new(&self.pacmd_path),
            ToolRunner::new(&self.paplay_path),
            self.builtin_sink.clone(),
            timings.command_timeout(),
        )
        .with_confirmation_tone(self.confirmation_tone.clone())
    }
}
