use std::time::{Duration, Instant};

/// Accumulates active time across start/stop cycles.
///
/// `elapsed = accumulated + (now - running_since)` while running,
/// `accumulated` otherwise.
#[derive(Debug, Clone, Default)]
pub struct StopWatch {
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl StopWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a running segment. No-op if already running.
    pub fn start(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    /// Close the running segment and return the total elapsed time.
    pub fn stop(&mut self) -> Duration {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
        self.accumulated
    }

    /// Zero the total and stop running.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.running_since = None;
    }

    pub fn elapsed(&self) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + since.elapsed(),
            None => self.accumulated,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }
}
