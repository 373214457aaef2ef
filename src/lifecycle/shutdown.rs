//! Shutdown coordination for the membrane.

use tokio::sync::broadcast;

use crate::lifecycle::signals::wait_for_signal;

/// Broadcast coordinator for graceful shutdown.
///
/// The HTTP server and any background task subscribe; a single trigger
/// (manual, or from an OS signal) releases all of them.
#[derive(Clone)]
pub struct Shutdown {
    notify: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(1);
        Self { notify }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.notify.subscribe()
    }

    /// Release every subscriber. Triggering twice is harmless.
    pub fn trigger(&self) {
        let _ = self.notify.send(());
    }

    /// Number of tasks still waiting on the signal.
    pub fn receiver_count(&self) -> usize {
        self.notify.receiver_count()
    }

    /// Trigger shutdown when SIGINT or SIGTERM arrives.
    pub fn trigger_on_signal(&self) -> tokio::task::JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            shutdown.trigger();
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
