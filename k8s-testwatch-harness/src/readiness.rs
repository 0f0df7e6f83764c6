use tokio::task::JoinSet;
use tokio::time;

use super::*;

/// Polls a pod until none of its containers are still starting up.
#[derive(Debug)]
pub struct ReadinessWaiter<A> {
    selector: PodSelector<A>,
    poll_interval: Duration,
    reasons: WaitingReasons,
}

impl<A> Clone for ReadinessWaiter<A> {
    fn clone(&self) -> Self {
        Self {
            selector: self.selector.clone(),
            poll_interval: self.poll_interval,
            reasons: self.reasons.clone(),
        }
    }
}

impl<A: PodApi> ReadinessWaiter<A> {
    pub fn new(api: Arc<A>, settings: &Settings) -> Self {
        Self {
            selector: PodSelector::new(api),
            poll_interval: settings.poll_interval,
            reasons: settings.waiting_reasons.clone(),
        }
    }

    /// Blocks until the canonical pod for `selector` is past initialization,
    /// then signals `on_ready` exactly once.
    ///
    /// A pod without any container status yet has not started initializing
    /// and is polled again.
    ///
    /// Not finding any pod yet is expected right after deployment and is
    /// retried. Everything else ends the wait, as does running out of `budget`.
    pub async fn wait_ready(
        &self,
        namespace: &str,
        selector: &str,
        budget: WaitBudget,
        on_ready: &Countdown,
    ) -> Result<()> {
        loop {
            if budget.is_exhausted() {
                tracing::error!(
                    namespace,
                    selector,
                    total = ?budget.total(),
                    "Waited for pod to become ready; didn't happen"
                );
                return Err(Error::DeadlineExceeded {
                    namespace: namespace.to_string(),
                    selector: selector.to_string(),
                    total: budget.total(),
                });
            }

            let name = match self.selector.select_canonical(namespace, selector).await {
                Ok(pod) => pod.name_any(),
                Err(Error::NoPodsFound { .. }) => {
                    tracing::warn!(namespace, selector, "Pod might not be up yet, trying again");
                    time::sleep(self.poll_interval).await;
                    continue;
                }
                Err(err) => return Err(err),
            };

            let pod = self
                .selector
                .api()
                .get_pod(namespace, &name)
                .await
                .map_err(Error::ClusterQuery)?
                .ok_or_else(|| {
                    tracing::error!(namespace, pod = name, "Pod disappeared after selection");
                    Error::not_found(namespace, &name)
                })?;

            let pending = self.pending_reasons(&pod);
            if pod.container_statuses().is_empty() {
                tracing::info!(
                    namespace,
                    pod = name,
                    elapsed = ?budget.elapsed(),
                    total = ?budget.total(),
                    "Pod reports no containers yet; waiting {:?}",
                    self.poll_interval
                );
                time::sleep(self.poll_interval).await;
                continue;
            }
            if !pending.is_empty() {
                tracing::info!(
                    namespace,
                    pod = name,
                    ?pending,
                    elapsed = ?budget.elapsed(),
                    total = ?budget.total(),
                    "Pod is still initializing; waiting {:?}",
                    self.poll_interval
                );
                time::sleep(self.poll_interval).await;
                continue;
            }

            tracing::info!(namespace, pod = name, "Pod is ready");
            on_ready.count_down();
            return Ok(());
        }
    }

    /// Waiting reasons of `pod` containers that are worth waiting for.
    fn pending_reasons<'p>(&self, pod: &'p corev1::Pod) -> Vec<&'p str> {
        pod.waiting_reasons()
            .filter(|reason| self.reasons.contains(reason))
            .collect()
    }
}

impl<A: PodApi + 'static> ReadinessWaiter<A> {
    /// Runs one independent wait per selector and returns once all of them
    /// signalled readiness.
    ///
    /// Every wait shares `budget`. The first failing wait ends the whole
    /// operation; the remaining waits are aborted.
    pub async fn wait_all_ready<I>(
        &self,
        namespace: &str,
        selectors: I,
        budget: WaitBudget,
    ) -> Result<()>
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        let selectors = selectors
            .into_iter()
            .map(|selector| selector.to_string())
            .collect::<Vec<_>>();
        let countdown = Countdown::new(selectors.len());

        let mut waits = JoinSet::new();
        for selector in selectors {
            let waiter = self.clone();
            let namespace = namespace.to_string();
            let countdown = countdown.clone();
            waits.spawn(async move {
                waiter
                    .wait_ready(&namespace, &selector, budget, &countdown)
                    .await
            });
        }

        loop {
            tokio::select! {
                () = countdown.wait() => {
                    tracing::info!(namespace, "All pods are ready");
                    return Ok(());
                }
                Some(joined) = waits.join_next() => joined??,
            }
        }
    }
}
