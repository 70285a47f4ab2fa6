//! Realtime subscription handle.

use std::fmt;

use tokio::sync::mpsc;

type CloseHook = Box<dyn FnOnce() + Send + 'static>;

/// A live feed of events from the messaging backend.
///
/// Dropping the handle unsubscribes: the close hook supplied by the backend
/// runs exactly once, on whichever path releases the handle.
pub struct Subscription<T> {
    receiver: mpsc::UnboundedReceiver<T>,
    on_close: Option<CloseHook>,
}

impl<T> Subscription<T> {
    /// Wraps a receiver with a hook that runs when the subscription closes.
    pub fn new(
        receiver: mpsc::UnboundedReceiver<T>,
        on_close: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            receiver,
            on_close: Some(Box::new(on_close)),
        }
    }

    /// Wraps a receiver that needs no cleanup on close.
    pub fn detached(receiver: mpsc::UnboundedReceiver<T>) -> Self {
        Self {
            receiver,
            on_close: None,
        }
    }

    /// Waits for the next event. Returns `None` once the backend hangs up.
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Unsubscribes explicitly.
    pub fn close(self) {
        drop(self);
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.receiver.close();
        if let Some(on_close) = self.on_close.take() {
            on_close();
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.receiver.is_closed())
            .finish()
    }
}
