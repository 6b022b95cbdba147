use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("`{command}` did not finish within {timeout:?}")]
    ToolTimeout { command: String, timeout: Duration },

    #[error("`{command}` failed: {detail}")]
    ToolReportedFailure { command: String, detail: String },

    #[error("Unexpected tool output: {0}")]
    ParseError(String),

    #[error("Audio routing failed (primary: {primary}; secondary: {secondary})")]
    AudioRoutingFailed { primary: String, secondary: String },

    #[error("Invalid device identifier: {0}")]
    InvalidDeviceIdentifier(String),

    #[error("Bluetooth service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid timing: {0}")]
    InvalidTiming(String),
}

impl DomainError {
    /// Stable tag used in JSON error payloads
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ToolTimeout { .. } => "tool_timeout",
            Self::ToolReportedFailure { .. } => "tool_reported_failure",
            Self::ParseError(_) => "parse_error",
            Self::AudioRoutingFailed { .. } => "audio_routing_failed",
            Self::InvalidDeviceIdentifier(_) => "invalid_device_identifier",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::InvalidTiming(_) => "invalid_timing",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ToolTimeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
