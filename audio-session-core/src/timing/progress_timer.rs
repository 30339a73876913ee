use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::models::error::SessionError;

/// Progress period while playing.
pub const PLAYER_PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

/// Progress period while recording.
pub const RECORDER_PROGRESS_INTERVAL: Duration = Duration::from_millis(1000);

/// Shared cancellation flag that also wakes a sleeping timer thread.
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, cvar) = &*self.inner;
        *flag.lock() = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Sleep for `timeout` or until cancelled. Returns `true` if cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut cancelled = flag.lock();
        while !*cancelled {
            if cvar.wait_until(&mut cancelled, deadline).timed_out() {
                break;
            }
        }
        *cancelled
    }
}

/// Periodic tick on a dedicated thread, cancelled through a [`CancellationToken`].
///
/// The first tick fires immediately. The tick receives the token so it can
/// re-check cancellation after taking whatever lock it needs: a session
/// cancels while holding its own lock, so a tick that observes the token
/// under that lock can never emit after the session moved on.
pub struct ProgressTimer {
    token: CancellationToken,
    handle: Option<thread::JoinHandle<()>>,
}

impl ProgressTimer {
    pub fn spawn<F>(name: &str, period: Duration, mut tick: F) -> Result<Self, SessionError>
    where
        F: FnMut(&CancellationToken) + Send + 'static,
    {
        let token = CancellationToken::new();
        let thread_token = token.clone();

        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                while !thread_token.is_cancelled() {
                    tick(&thread_token);
                    if thread_token.wait_timeout(period) {
                        break;
                    }
                }
            })
            .map_err(|e| SessionError::BackendFailure(format!("failed to spawn {}: {}", name, e)))?;

        Ok(Self {
            token,
            handle: Some(handle),
        })
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Signal the thread to stop. Non-blocking and idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel and wait for the thread to exit.
    ///
    /// Must not be called while holding a lock the tick acquires.
    pub fn join(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                log::error!("progress timer thread panicked");
            }
        }
    }
}

impl Drop for ProgressTimer {
    fn drop(&mut self) {
        // Never join here: the owner may hold the lock the tick is waiting on.
        self.token.cancel();
    }
}
