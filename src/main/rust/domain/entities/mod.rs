mod connection_attempt;
mod disconnect_outcome;

pub use connection_attempt::{ConnectionAttempt, ConnectionResult, StepRecord};
pub use disconnect_outcome::DisconnectOutcome;
