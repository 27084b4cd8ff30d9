use std::sync::Arc;

use tokio::sync::watch;

/// What ended the session. Only the first trigger is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The operator interrupted the process (ctrl-c).
    Interrupted,
    /// The server sent an `ERROR` line.
    ServerError,
    /// The operator typed `exit` or closed standard input.
    LocalExit,
    /// The connection hit end of stream or an I/O fault.
    ConnectionLost,
}

/// Shared shutdown signal observed by both session loops.
///
/// Setting it is one-way: once triggered it stays triggered, and later
/// triggers neither overwrite the reason nor wake anyone again.
#[derive(Clone, Debug)]
pub struct Shutdown {
    state: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            state: Arc::new(state),
        }
    }

    /// Records `reason` if nothing has triggered shutdown yet.
    ///
    /// Returns `true` for the caller that actually started the shutdown, which
    /// is the one allowed to print a notice about it.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        self.state.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        *self.state.borrow()
    }

    /// Resolves once shutdown has been triggered, immediately if it already was.
    pub async fn wait(&self) -> ShutdownReason {
        let mut updates = self.state.subscribe();
        // `self` keeps the sender alive, so the wait can only end by a trigger.
        let reason = updates
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|reason| *reason);
        reason.unwrap_or(ShutdownReason::ConnectionLost)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[test]
    fn first_trigger_wins() {
        let shutdown = Shutdown::new();
        assert_eq!(shutdown.reason(), None);

        assert!(shutdown.trigger(ShutdownReason::ServerError));
        assert!(!shutdown.trigger(ShutdownReason::ConnectionLost));
        assert!(!shutdown.clone().trigger(ShutdownReason::LocalExit));

        assert_eq!(shutdown.reason(), Some(ShutdownReason::ServerError));
    }

    #[tokio::test]
    async fn wait_resolves_after_trigger_from_another_task() {
        let shutdown = Shutdown::new();
        let waiter = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { shutdown.wait().await })
        };

        tokio::task::yield_now().await;
        shutdown.trigger(ShutdownReason::Interrupted);

        let reason = timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .expect("waiter task");
        assert_eq!(reason, ShutdownReason::Interrupted);
    }

    #[tokio::test]
    async fn wait_returns_immediately_when_already_triggered() {
        let shutdown = Shutdown::new();
        shutdown.trigger(ShutdownReason::LocalExit);

        let reason = timeout(Duration::from_millis(100), shutdown.wait())
            .await
            .expect("already triggered");
        assert_eq!(reason, ShutdownReason::LocalExit);
    }
}
