use std::fmt;

use serde::Serialize;

/// Steps of a connection attempt, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStep {
    /// Make sure the Bluetooth service is running
    Preflight,
    /// Disconnect other connected devices
    ClearPriorConnections,
    Trust,
    Pair,
    /// Force a disconnect when the target is already connected
    Reconnect,
    Connect,
    RouteAudio,
    ConfirmationTone,
}

impl fmt::Display for ConnectionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Preflight => "PREFLIGHT",
            Self::ClearPriorConnections => "CLEAR_PRIOR_CONNECTIONS",
            Self::Trust => "TRUST",
            Self::Pair => "PAIR",
            Self::Reconnect => "RECONNECT",
            Self::Connect => "CONNECT",
            Self::RouteAudio => "ROUTE_AUDIO",
            Self::ConfirmationTone => "CONFIRMATION_TONE",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    Skipped(String),
    FailedNonFatal(String),
    FailedFatal(String),
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// A fatal outcome ends the attempt
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FailedFatal(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::FailedNonFatal(_) | Self::FailedFatal(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Succeeded => None,
            Self::Skipped(reason) | Self::FailedNonFatal(reason) | Self::FailedFatal(reason) => {
                Some(reason)
            }
        }
    }
}
