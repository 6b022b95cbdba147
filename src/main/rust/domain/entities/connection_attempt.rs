use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::domain::value_objects::{ConnectionStep, DeviceAddress, StepOutcome};

/// Outcome of one step of an attempt
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub step: ConnectionStep,
    pub outcome: StepOutcome,
    pub elapsed: Duration,
}

/// Composite result of an attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionResult {
    pub connected: bool,
    pub audio_routed: bool,
    pub was_reconnected: bool,
    pub sink_name: Option<String>,
}

/// Per-request record of driving a device to "connected and audio-routed"
#[derive(Debug, Clone)]
pub struct ConnectionAttempt {
    id: String,
    target: DeviceAddress,
    target_name: String,
    started_at: Instant,
    steps: Vec<StepRecord>,
    sink_name: Option<String>,
}

impl ConnectionAttempt {
    pub fn new(target: DeviceAddress, target_name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            target,
            target_name,
            started_at: Instant::now(),
            steps: Vec::new(),
            sink_name: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target(&self) -> &DeviceAddress {
        &self.target
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn set_target_name(&mut self, name: String) {
        self.target_name = name;
    }

    pub fn set_sink_name(&mut self, sink_name: String) {
        self.sink_name = Some(sink_name);
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn duration(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn record(&mut self, step: ConnectionStep, outcome: StepOutcome) {
        self.steps.push(StepRecord {
            step,
            outcome,
            elapsed: self.started_at.elapsed(),
        });
    }

    pub fn outcome_of(&self, step: ConnectionStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .rev()
            .find(|record| record.step == step)
            .map(|record| &record.outcome)
    }

    /// Set once a fatal step has been recorded
    pub fn is_terminated(&self) -> bool {
        self.steps.iter().any(|record| record.outcome.is_fatal())
    }

    /// Reason of the fatal step, if any
    pub fn failure_reason(&self) -> Option<&str> {
        self.steps
            .iter()
            .find(|record| record.outcome.is_fatal())
            .and_then(|record| record.outcome.reason())
    }

    pub fn result(&self) -> ConnectionResult {
        let succeeded = |step| {
            self.outcome_of(step)
                .map(StepOutcome::is_success)
                .unwrap_or(false)
        };

        ConnectionResult {
            connected: succeeded(ConnectionStep::Connect),
            audio_routed: succeeded(ConnectionStep::RouteAudio),
            // Triggered whenever the target was found connected, even if the disconnect failed
            was_reconnected: matches!(
                self.outcome_of(ConnectionStep::Reconnect),
                Some(StepOutcome::Succeeded | StepOutcome::FailedNonFatal(_))
            ),
            sink_name: self.sink_name.clone(),
        }
    }
}
