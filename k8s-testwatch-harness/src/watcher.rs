use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::AsyncBufReadExt as _;
use tokio::sync::oneshot;
use tokio::time;

use super::*;

/// Tails a test container's log and turns it into a [`Verdict`].
#[derive(Debug)]
pub struct LogResultWatcher<A> {
    api: Arc<A>,
    lookback: Duration,
}

impl<A> Clone for LogResultWatcher<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            lookback: self.lookback,
        }
    }
}

impl<A: PodApi> LogResultWatcher<A> {
    pub fn new(api: Arc<A>, settings: &Settings) -> Self {
        Self {
            api,
            lookback: settings.log_lookback,
        }
    }

    /// Opens a follow-mode log stream and scans it in the background.
    ///
    /// Returns as soon as the stream is open. The handle resolves exactly once,
    /// to `Passed` or `Failed` when the container prints one of `tokens` or the
    /// stream ends, or to `TimedOut` once `budget` has elapsed. The stream is
    /// dropped on every one of those paths.
    pub async fn watch_for_result(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        budget: Duration,
        tokens: Tokens,
    ) -> Result<VerdictHandle> {
        let params = LogParams::follow(container, self.lookback);
        let stream = self
            .api
            .log_stream(namespace, pod, &params)
            .await
            .map_err(|source| {
                tracing::error!(namespace, pod, container, ?source, "Error in opening stream");
                Error::StreamOpen {
                    namespace: namespace.to_string(),
                    pod: pod.to_string(),
                    container: container.to_string(),
                    source,
                }
            })?;

        let scan = Scan {
            namespace: namespace.to_string(),
            pod: pod.to_string(),
            container: container.to_string(),
            budget: WaitBudget::start(budget),
            tokens,
        };
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let verdict = scan.run(stream).await;
            if tx.send(verdict).is_err() {
                tracing::debug!(pod = scan.pod, %verdict, "Nobody is waiting for the verdict");
            }
        });

        Ok(VerdictHandle {
            container: container.to_string(),
            rx,
        })
    }
}

/// One-shot receiver of a watch session's verdict.
///
/// Awaiting the handle yields the verdict. Should the scanning task die
/// without reporting, the session counts as `Failed`.
#[derive(Debug)]
pub struct VerdictHandle {
    container: String,
    rx: oneshot::Receiver<Verdict>,
}

impl VerdictHandle {
    pub fn container(&self) -> &str {
        &self.container
    }
}

impl Future for VerdictHandle {
    type Output = Verdict;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Verdict::Failed))
    }
}

/// Awaits every handle, keeping the input order.
pub async fn collect_verdicts<I>(handles: I) -> Vec<(String, Verdict)>
where
    I: IntoIterator<Item = VerdictHandle>,
{
    let mut verdicts = Vec::new();
    for handle in handles {
        let container = handle.container.clone();
        verdicts.push((container, handle.await));
    }
    verdicts
}

#[derive(Debug)]
struct Scan {
    namespace: String,
    pod: String,
    container: String,
    budget: WaitBudget,
    tokens: Tokens,
}

impl Scan {
    async fn run(&self, mut stream: LogStream) -> Verdict {
        let Self {
            namespace,
            pod,
            container,
            budget,
            tokens,
        } = self;
        let deadline = budget.deadline();
        let mut line = Vec::new();

        loop {
            line.clear();
            // The deadline is polled first, so a line racing it loses.
            let read = tokio::select! {
                biased;
                () = time::sleep_until(deadline) => None,
                read = stream.read_until(b'\n', &mut line) => Some(read),
            };

            let read = match read {
                Some(read) if !budget.is_exhausted() => read,
                _ => {
                    tracing::warn!(
                        namespace,
                        pod,
                        container,
                        total = ?budget.total(),
                        "Timed out waiting for a result"
                    );
                    return Verdict::TimedOut;
                }
            };

            match read {
                Ok(0) => {
                    tracing::error!(
                        namespace,
                        pod,
                        container,
                        "EOF reading from pod before a result"
                    );
                    return Verdict::Failed;
                }
                Err(err) => {
                    tracing::error!(namespace, pod, container, ?err, "Error reading from pod");
                    return Verdict::Failed;
                }
                Ok(_) => {
                    // Log lines are not guaranteed to be UTF-8.
                    let text = String::from_utf8_lossy(&line);
                    if let Some(verdict) = tokens.match_line(&text) {
                        let token = if verdict.is_passed() {
                            tokens.success()
                        } else {
                            tokens.failure()
                        };
                        tracing::info!(namespace, pod, container, token, "Found result token");
                        return verdict;
                    }
                }
            }
        }
    }
}
