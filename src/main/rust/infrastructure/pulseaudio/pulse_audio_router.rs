use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use super::sink_parser;
use crate::domain::errors::{DomainError, Result};
use crate::domain::ports::AudioRouter;
use crate::domain::value_objects::SinkTarget;
use crate::infrastructure::process::{ToolOutput, ToolRunner};

/// Audio router for PulseAudio-compatible servers.
///
/// `pactl` is tried first; `pacmd` (older servers) is the fallback.
pub struct PulseAudioRouter {
    pactl: ToolRunner,
    pacmd: ToolRunner,
    paplay: ToolRunner,
    builtin_sink: String,
    confirmation_tone: Option<PathBuf>,
    timeout: Duration,
}

impl PulseAudioRouter {
    pub fn new(
        pactl: ToolRunner,
        pacmd: ToolRunner,
        paplay: ToolRunner,
        builtin_sink: String,
        timeout: Duration,
    ) -> Self {
        Self {
            pactl,
            pacmd,
            paplay,
            builtin_sink,
            confirmation_tone: None,
            timeout,
        }
    }

    pub fn with_confirmation_tone(mut self, tone: Option<PathBuf>) -> Self {
        self.confirmation_tone = tone;
        self
    }

    pub fn builtin_sink(&self) -> &str {
        &self.builtin_sink
    }

    async fn run(runner: &ToolRunner, args: &[&str], timeout: Duration) -> Result<ToolOutput> {
        let output = runner.run_checked(args, timeout).await?;
        let failure = sink_parser::failure_line(&output.stdout)
            .or_else(|| sink_parser::failure_line(&output.stderr))
            .map(str::to_string);
        match failure {
            Some(detail) => Err(DomainError::ToolReportedFailure {
                command: output.command,
                detail,
            }),
            None => Ok(output),
        }
    }

    async fn pactl(&self, args: &[&str]) -> Result<ToolOutput> {
        Self::run(&self.pactl, args, self.timeout).await
    }

    async fn pacmd(&self, args: &[&str]) -> Result<ToolOutput> {
        Self::run(&self.pacmd, args, self.timeout).await
    }

    /// Keep the primary result if it succeeded, otherwise try the secondary
    async fn with_fallback<T, F>(&self, operation: &str, primary: Result<T>, secondary: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let primary_err = match primary {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        tracing::debug!("{} via pactl failed ({}), trying pacmd", operation, primary_err);

        secondary.await.map_err(|secondary_err| {
            tracing::warn!(
                "{} failed with both tools: {} / {}",
                operation,
                primary_err,
                secondary_err
            );
            DomainError::AudioRoutingFailed {
                primary: primary_err.to_string(),
                secondary: secondary_err.to_string(),
            }
        })
    }

    async fn pactl_volume_and_mute(&self, target: &SinkTarget) -> Result<(u8, bool)> {
        let sink = target.as_tool_arg();
        let volume = self.pactl(&["get-sink-volume", sink]).await?;
        let mute = self.pactl(&["get-sink-mute", sink]).await?;

        let percent = sink_parser::parse_volume_percent(&volume.stdout)
            .ok_or_else(|| DomainError::ParseError(format!("no volume in {:?}", volume.stdout)))?;
        let muted = sink_parser::parse_mute(&mute.stdout)
            .ok_or_else(|| DomainError::ParseError(format!("no mute state in {:?}", mute.stdout)))?;
        Ok((percent, muted))
    }

    async fn pacmd_volume_and_mute(&self, target: &SinkTarget) -> Result<(u8, bool)> {
        let output = self.pacmd(&["list-sinks"]).await?;
        let sinks = sink_parser::parse_pacmd_sinks(&output.stdout);

        let sink = match target {
            SinkTarget::Default => sinks.iter().find(|s| s.is_default),
            SinkTarget::Named(name) => sinks.iter().find(|s| &s.name == name),
        }
        .ok_or_else(|| DomainError::ParseError(format!("sink {} not listed", target)))?;

        match (sink.volume_percent, sink.muted) {
            (Some(percent), Some(muted)) => Ok((percent, muted)),
            _ => Err(DomainError::ParseError(format!(
                "incomplete state for sink {}",
                sink.name
            ))),
        }
    }

    async fn pactl_default_sink(&self) -> Result<String> {
        let output = self.pactl(&["get-default-sink"]).await?;
        let name = output.stdout.trim();
        if name.is_empty() {
            return Err(DomainError::ParseError("empty default sink".to_string()));
        }
        Ok(name.to_string())
    }

    async fn pacmd_default_sink(&self) -> Result<String> {
        let output = self.pacmd(&["stat"]).await?;
        sink_parser::parse_default_sink(&output.stdout)
            .ok_or_else(|| DomainError::ParseError("no default sink in pacmd stat".to_string()))
    }
}

#[async_trait]
impl AudioRouter for PulseAudioRouter {
    async fn set_default_sink(&self, sink_name: &str) -> Result<()> {
        let primary = self.pactl(&["set-default-sink", sink_name]).await;
        self.with_fallback(
            "set default sink",
            primary,
            self.pacmd(&["set-default-sink", sink_name]),
        )
        .await?;
        tracing::info!(sink = %sink_name, "Default sink set");
        Ok(())
    }

    async fn default_sink_name(&self) -> Result<String> {
        let primary = self.pactl_default_sink().await;
        self.with_fallback("get default sink", primary, self.pacmd_default_sink())
            .await
    }

    async fn set_mute(&self, target: &SinkTarget, muted: bool) -> Result<()> {
        let flag = if muted { "1" } else { "0" };
        let sink = target.as_tool_arg();
        let primary = self.pactl(&["set-sink-mute", sink, flag]).await;
        self.with_fallback("set mute", primary, self.pacmd(&["set-sink-mute", sink, flag]))
            .await
            .map(|_| ())
    }

    async fn set_volume(&self, target: &SinkTarget, percent: u8) -> Result<()> {
        let sink = target.as_tool_arg();
        let pactl_volume = format!("{}%", percent);
        let pacmd_volume = sink_parser::percent_to_pacmd_volume(percent).to_string();

        let primary = self.pactl(&["set-sink-volume", sink, &pactl_volume]).await;
        self.with_fallback(
            "set volume",
            primary,
            self.pacmd(&["set-sink-volume", sink, &pacmd_volume]),
        )
        .await
        .map(|_| ())
    }

    async fn volume_and_mute(&self, target: &SinkTarget) -> Result<(u8, bool)> {
        let primary = self.pactl_volume_and_mute(target).await;
        self.with_fallback(
            "read volume",
            primary,
            self.pacmd_volume_and_mute(target),
        )
        .await
    }

    async fn reset_to_builtin_output(&self) -> Result<()> {
        tracing::info!(sink = %self.builtin_sink, "Restoring built-in output");
        self.set_default_sink(&self.builtin_sink).await
    }

    async fn play_confirmation_tone(&self, sink_name: &str) -> Result<bool> {
        let Some(tone) = &self.confirmation_tone else {
            return Ok(false);
        };
        let device = format!("--device={}", sink_name);
        let tone = tone.to_string_lossy();
        self.paplay
            .run_checked(&[device.as_str(), tone.as_ref()], self.timeout)
            .await?;
        Ok(true)
    }
}
