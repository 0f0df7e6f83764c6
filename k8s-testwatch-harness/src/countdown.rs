use std::sync::Arc;

use tokio::sync::watch;

/// Shared "N things still outstanding" signal.
///
/// Every clone refers to the same counter. Waiters call [`Countdown::count_down`]
/// once when they are done, the coordinator parks in [`Countdown::wait`]
/// until the counter reaches zero.
#[derive(Clone, Debug)]
pub struct Countdown {
    remaining: Arc<watch::Sender<usize>>,
}

impl Countdown {
    pub fn new(count: usize) -> Self {
        let (remaining, _) = watch::channel(count);
        Self {
            remaining: Arc::new(remaining),
        }
    }

    pub fn count_down(&self) {
        self.remaining.send_modify(|remaining| *remaining = remaining.saturating_sub(1));
    }

    pub fn remaining(&self) -> usize {
        *self.remaining.borrow()
    }

    pub async fn wait(&self) {
        let mut rx = self.remaining.subscribe();
        // The sender lives as long as `self`, so this never sees a closed channel.
        let _ = rx.wait_for(|remaining| *remaining == 0).await;
    }
}
