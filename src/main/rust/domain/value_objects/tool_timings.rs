use std::time::Duration;

use crate::domain::errors::{DomainError, Result};

/// Longest discovery window a caller may hold the control tool for
const MAX_SCAN_WINDOW: Duration = Duration::from_secs(60);

/// Deadlines and settle delays for external tool interaction
#[derive(Debug, Clone, PartialEq)]
pub struct ToolTimings {
    command_timeout: Duration,
    connect_timeout: Duration,
    scan_window: Duration,
    connect_settle: Duration,
    disconnect_settle: Duration,
}

impl ToolTimings {
    pub fn new(
        command_timeout: Duration,
        connect_timeout: Duration,
        scan_window: Duration,
        connect_settle: Duration,
        disconnect_settle: Duration,
    ) -> Result<Self> {
        if command_timeout.is_zero() {
            return Err(DomainError::InvalidTiming(
                "command timeout cannot be zero".to_string(),
            ));
        }
        if connect_timeout < command_timeout {
            return Err(DomainError::InvalidTiming(format!(
                "connect timeout ({:?}) cannot be shorter than command timeout ({:?})",
                connect_timeout, command_timeout
            )));
        }
        if scan_window.is_zero() || scan_window > MAX_SCAN_WINDOW {
            return Err(DomainError::InvalidTiming(format!(
                "scan window must be between 1s and {:?}, got {:?}",
                MAX_SCAN_WINDOW, scan_window
            )));
        }

        Ok(Self {
            command_timeout,
            connect_timeout,
            scan_window,
            connect_settle,
            disconnect_settle,
        })
    }

    /// No settle delays; for driving in-memory fakes
    pub fn immediate() -> Self {
        Self {
            connect_settle: Duration::ZERO,
            disconnect_settle: Duration::ZERO,
            scan_window: Duration::from_millis(10),
            ..Self::default()
        }
    }

    pub fn with_settle_delays(mut self, connect_settle: Duration, disconnect_settle: Duration) -> Self {
        self.connect_settle = connect_settle;
        self.disconnect_settle = disconnect_settle;
        self
    }

    pub fn with_scan_window(mut self, scan_window: Duration) -> Self {
        self.scan_window = scan_window;
        self
    }

    /// Deadline for simple commands (info, trust, audio server calls)
    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    /// Deadline for pair/connect, which wait on the remote device
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn scan_window(&self) -> Duration {
        self.scan_window
    }

    /// Wait after connect for the audio profile to register with the audio server
    pub fn connect_settle(&self) -> Duration {
        self.connect_settle
    }

    pub fn disconnect_settle(&self) -> Duration {
        self.disconnect_settle
    }
}

impl Default for ToolTimings {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(15),
            scan_window: Duration::from_secs(10),
            connect_settle: Duration::from_secs(3),
            disconnect_settle: Duration::from_secs(2),
        }
    }
}
