pub mod config;
pub mod error;
pub mod events;
pub mod output_route;
pub mod recording_result;
pub mod state;
