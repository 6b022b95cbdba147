use async_trait::async_trait;

use crate::domain::errors::Result;
use crate::domain::value_objects::SinkTarget;

/// Port for the audio server's sink controls
#[async_trait]
pub trait AudioRouter: Send + Sync {
    /// Fails with `DomainError::AudioRoutingFailed` only if every mechanism failed
    async fn set_default_sink(&self, sink_name: &str) -> Result<()>;

    async fn default_sink_name(&self) -> Result<String>;

    async fn set_mute(&self, target: &SinkTarget, muted: bool) -> Result<()>;

    async fn set_volume(&self, target: &SinkTarget, percent: u8) -> Result<()>;

    /// `(volume percent, muted)`
    async fn volume_and_mute(&self, target: &SinkTarget) -> Result<(u8, bool)>;

    /// Route output back to the built-in analog sink
    async fn reset_to_builtin_output(&self) -> Result<()>;

    /// Short tone through the given sink.
    /// Returns `Ok(false)` when no tone is configured.
    async fn play_confirmation_tone(&self, sink_name: &str) -> Result<bool>;
}
