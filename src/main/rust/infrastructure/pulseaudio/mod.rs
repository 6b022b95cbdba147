mod pulse_audio_router;
pub mod sink_parser;

pub use pulse_audio_router::PulseAudioRouter;
