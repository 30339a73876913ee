use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::time::Duration;

/// How a `play` invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The backend reached end-of-stream.
    Completed(String),
    /// Explicit `stop`, a superseding `play`, or session teardown.
    Stopped(String),
    /// `play` was issued while paused and resumed the existing playback.
    Resumed(String),
}

impl PlayOutcome {
    /// Path or URL of the playback this outcome belongs to.
    pub fn location(&self) -> &str {
        match self {
            Self::Completed(location) | Self::Stopped(location) | Self::Resumed(location) => location,
        }
    }
}

/// Host-side handle for the pending outcome of one `play` call.
#[derive(Debug)]
pub struct PlayCompletion {
    rx: Receiver<PlayOutcome>,
}

impl PlayCompletion {
    /// Block until the playback resolves.
    ///
    /// `None` only if the resolver was dropped unresolved, which sessions never do.
    pub fn wait(&self) -> Option<PlayOutcome> {
        self.rx.recv().ok()
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Option<PlayOutcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Non-blocking poll.
    pub fn try_outcome(&self) -> Option<PlayOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// Session-side half. Consumed on use, so each play resolves at most once.
pub(crate) struct PlayResolver {
    tx: SyncSender<PlayOutcome>,
}

impl PlayResolver {
    pub(crate) fn resolve(self, outcome: PlayOutcome) {
        // Capacity 1 and a single send: never blocks. A dropped receiver is fine.
        let _ = self.tx.try_send(outcome);
    }
}

pub(crate) fn play_channel() -> (PlayResolver, PlayCompletion) {
    let (tx, rx) = mpsc::sync_channel(1);
    (PlayResolver { tx }, PlayCompletion { rx })
}

/// A completion that is already resolved.
pub(crate) fn resolved(outcome: PlayOutcome) -> PlayCompletion {
    let (resolver, completion) = play_channel();
    resolver.resolve(outcome);
    completion
}
