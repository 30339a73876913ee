use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use audio_session_core::{EventSink, SessionEvent};

/// Event as delivered to the host: name plus JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostEvent {
    pub name: &'static str,
    pub payload: Value,
}

impl From<&SessionEvent> for HostEvent {
    fn from(event: &SessionEvent) -> Self {
        Self {
            name: event.name(),
            payload: event.payload(),
        }
    }
}

/// EventSink that forwards events over an unbounded channel.
///
/// Sending never blocks; once the receiver is dropped events are discarded.
pub struct ChannelEventSink {
    tx: Sender<HostEvent>,
}

impl ChannelEventSink {
    pub fn new() -> (Arc<Self>, Receiver<HostEvent>) {
        let (tx, rx) = mpsc::channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: &SessionEvent) {
        if self.tx.send(HostEvent::from(event)).is_err() && !event.is_progress() {
            log::debug!("no listener for {}", event.name());
        }
    }
}
