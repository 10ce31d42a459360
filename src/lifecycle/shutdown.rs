//! Stop signal shared by the listener and the process signal task.

use tokio::sync::broadcast;

/// One-shot stop signal for a serving [`HttpServer`](crate::HttpServer).
///
/// `HttpServer::run` and `run_tls` each take a receiver from [`Shutdown::subscribe`];
/// whoever owns the `Shutdown` (the signal task in the binary, the harness in tests)
/// calls [`Shutdown::trigger`] to start draining. Receivers must be taken before the
/// trigger, a late subscriber never sees it.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscribed server to stop accepting and drain.
    ///
    /// Returns how many receivers were notified; zero once the servers have exited.
    pub fn trigger(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
