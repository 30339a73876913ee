pub mod audio_router;
pub mod event_sink;
pub mod playback_backend;
pub mod recording_backend;
