use std::sync::Arc;
use tokio::sync::watch;

/// Stop signal shared by the worker, the HTTP server and the signal handler.
///
/// The signal is level triggered: a handle cloned or polled after `trigger()` sees it
/// straight away.
#[derive(Clone)]
pub struct Shutdown {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub async fn recv(&mut self) {
        // Only fails once every sender is gone, and we always hold one.
        let _ = self.receiver.wait_for(|stopping| *stopping).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn every_clone_sees_the_trigger() {
        let mut first = Shutdown::new();
        let mut second = first.clone();

        second.trigger();
        first.recv().await;
        second.recv().await;

        // Already triggered, must not block.
        first.recv().await;
    }

    #[tokio::test]
    async fn late_clones_see_an_earlier_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let mut late = shutdown.clone();
        timeout(Duration::from_secs(1), late.recv())
            .await
            .expect("late clone should not wait");
    }

    #[tokio::test]
    async fn waits_until_triggered() {
        let mut shutdown = Shutdown::new();
        assert!(
            timeout(Duration::from_millis(20), shutdown.recv())
                .await
                .is_err()
        );
    }
}
