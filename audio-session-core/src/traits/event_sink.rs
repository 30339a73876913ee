use crate::models::events::SessionEvent;

/// One-way notification channel from sessions to the host.
///
/// Fire-and-forget: no acknowledgement, no backpressure. Progress events are
/// emitted while the session lock is held so that none can land after a
/// stop, which means implementations must return quickly and must never
/// call back into the emitting session.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &SessionEvent);
}
