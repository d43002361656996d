//! Cooperative cancellation for session operations.
//!
//! A [`CancelHandle`] is held by whoever may want to stop the session (a UI, a signal
//! handler). The session owns the matching [`CancelSignal`] and races every pending channel
//! operation against it.

use std::future::Future;

use tokio::sync::watch;

use crate::error::SessionError;

#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

impl CancelHandle {
    /// Requests cancellation. Idempotent; later requests are no-ops.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation has been requested. Never resolves if every handle was
    /// dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Runs `op` unless cancellation wins the race, in which case `op` is dropped.
    pub async fn guard<T, F>(&mut self, op: F) -> Result<T, SessionError>
    where
        F: Future<Output = Result<T, SessionError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(SessionError::Cancelled),
            result = op => result,
        }
    }
}

#[cfg(test)]
#[path = "tests/cancel_tests.rs"]
mod tests;
