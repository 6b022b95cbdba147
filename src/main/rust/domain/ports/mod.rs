mod audio_router;
mod control_plane;
mod metrics_reporter;

pub use audio_router::AudioRouter;
pub use control_plane::ControlPlane;
pub use metrics_reporter::MetricsReporter;
