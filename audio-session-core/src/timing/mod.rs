pub mod progress_timer;
pub mod stop_watch;
