//! Event delivery.
//!
//! Events are queued on a channel and handed to the listener by a single
//! dedicated thread, so the listener sees them in the order they were raised
//! and a slow listener never blocks the code raising them.

use std::thread::JoinHandle;

use tokio::sync::mpsc;
use types::BreezEvent;

use crate::error::{SdkError, SdkResult};

/// Receiver of SDK events.
///
/// `on_event` runs on the SDK's event thread, one event at a time.
pub trait EventListener: Send + Sync {
    /// Handle one event.
    fn on_event(&self, e: BreezEvent);
}

/// Queues events for in-order delivery to an [`EventListener`].
pub struct EventDispatcher {
    sender: mpsc::UnboundedSender<BreezEvent>,
    worker: JoinHandle<()>,
}

impl EventDispatcher {
    /// Spawns the delivery thread for `listener`.
    pub fn new(listener: Box<dyn EventListener>) -> SdkResult<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<BreezEvent>();
        let worker = std::thread::Builder::new()
            .name("lnsdk-events".to_string())
            .spawn(move || {
                while let Some(event) = receiver.blocking_recv() {
                    listener.on_event(event);
                }
            })
            .map_err(|e| SdkError::Generic(format!("failed to spawn event thread: {}", e)))?;

        Ok(Self { sender, worker })
    }

    /// Queues `event` for delivery.
    pub fn raise(&self, event: BreezEvent) {
        tracing::debug!("raising event {:?}", event);
        if self.sender.send(event).is_err() {
            tracing::warn!("event listener is gone, dropping event");
        }
    }

    /// Stops accepting events and waits until the queued ones are delivered.
    pub fn close(self) {
        let Self { sender, worker } = self;
        drop(sender);
        if worker.join().is_err() {
            tracing::error!("event listener panicked");
        }
    }
}
