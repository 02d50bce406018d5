//! Caller-side cancellation for fetch calls
//!
//! An [`AbortController`] hands out [`AbortSignal`]s. Firing the controller
//! wakes every signal, including clones taken before or after the abort.

use tokio::sync::watch;

/// Owner side of a cancellation pair
#[derive(Debug)]
pub struct AbortController {
    sender: watch::Sender<bool>,
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortController {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        AbortController { sender }
    }

    /// A signal tied to this controller
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            receiver: self.sender.subscribe(),
        }
    }

    /// Fire every signal handed out by this controller; repeated calls are no-ops
    pub fn abort(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.sender.borrow()
    }
}

/// Listener side of a cancellation pair
#[derive(Debug, Clone)]
pub struct AbortSignal {
    receiver: watch::Receiver<bool>,
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once the controller aborts
    ///
    /// Never resolves if the controller is dropped without aborting.
    pub async fn aborted(&self) {
        let mut receiver = self.receiver.clone();
        if receiver.wait_for(|fired| *fired).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
