use std::sync::Arc;
use std::time::Duration;

use k8s_testwatch::Settings;
use k8s_testwatch::Tokens;
use k8s_testwatch::Verdict;
use k8s_testwatch::WaitingReasons;
use k8s_testwatch_ext as k8s;
use k8s_testwatch_kubeapi::KubeApi;
use k8s_testwatch_kubeapi::LogStream;
use k8s_testwatch_kubeapi::PodApi;
use kube::ResourceExt as _;

use k8s::corev1;
use k8s::LogParams;
use k8s::LogParamsExt as _;
use k8s::PodExt as _;

pub use budget::WaitBudget;
pub use countdown::Countdown;
pub use error::Error;
pub use error::Result;
pub use readiness::ReadinessWaiter;
pub use selector::canonical;
pub use selector::PodSelector;
pub use watcher::collect_verdicts;
pub use watcher::LogResultWatcher;
pub use watcher::VerdictHandle;

mod budget;
mod countdown;
mod error;
mod readiness;
mod selector;
mod watcher;

/// Entry point tying pod selection, readiness waits and log verdicts to one
/// cluster connection and one set of [`Settings`].
#[derive(Debug)]
pub struct Harness<A = KubeApi> {
    api: Arc<A>,
    settings: Settings,
}

impl Harness {
    /// Connects to the cluster found in the environment.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use std::time::Duration;
    /// # use k8s_testwatch::{Settings, Tokens};
    /// # use kube::ResourceExt as _;
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let harness = k8s_testwatch_harness::Harness::new(Settings::from_env()?).await?;
    /// harness
    ///     .wait_all_ready("e2e", ["app=server", "app=client"], Duration::from_secs(300))
    ///     .await?;
    /// let pod = harness.select_canonical("e2e", "app=client").await?.name_any();
    /// let tokens = Tokens::new("SUCCESS", "FAILURE");
    /// let verdict = harness
    ///     .watch_for_result("e2e", &pod, "tests", Duration::from_secs(600), tokens)
    ///     .await?
    ///     .await;
    /// println!("{verdict}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(settings: Settings) -> kube::Result<Self> {
        let kubeapi = KubeApi::new().await?;
        Ok(Self::with_api(kubeapi, settings))
    }
}

impl<A: PodApi + 'static> Harness<A> {
    /// Harness over an already constructed cluster API.
    pub fn with_api(api: A, settings: Settings) -> Self {
        let api = Arc::new(api);
        Self { api, settings }
    }

    /// The cluster API every component shares.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Settings the harness was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A [`PodSelector`] over the shared cluster API.
    pub fn selector(&self) -> PodSelector<A> {
        PodSelector::new(Arc::clone(&self.api))
    }

    /// A [`ReadinessWaiter`] using the configured poll interval and waiting reasons.
    pub fn readiness(&self) -> ReadinessWaiter<A> {
        ReadinessWaiter::new(Arc::clone(&self.api), &self.settings)
    }

    /// A [`LogResultWatcher`] replaying the configured log lookback.
    pub fn watcher(&self) -> LogResultWatcher<A> {
        LogResultWatcher::new(Arc::clone(&self.api), &self.settings)
    }

    /// Newest pod matching `selector`, see [`PodSelector::select_canonical`].
    pub async fn select_canonical(&self, namespace: &str, selector: &str) -> Result<corev1::Pod> {
        self.selector().select_canonical(namespace, selector).await
    }

    /// Waits for a single pod, see [`ReadinessWaiter::wait_ready`].
    #[allow(tail_expr_drop_order)]
    pub async fn wait_ready(&self, namespace: &str, selector: &str, total: Duration) -> Result<()> {
        let countdown = Countdown::new(1);
        self.readiness()
            .wait_ready(namespace, selector, WaitBudget::start(total), &countdown)
            .await
    }

    /// Waits for every selector at once, all of them sharing `total`.
    pub async fn wait_all_ready<I>(
        &self,
        namespace: &str,
        selectors: I,
        total: Duration,
    ) -> Result<()>
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        self.readiness()
            .wait_all_ready(namespace, selectors, WaitBudget::start(total))
            .await
    }

    /// Starts a log watch, see [`LogResultWatcher::watch_for_result`].
    pub async fn watch_for_result(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        budget: Duration,
        tokens: Tokens,
    ) -> Result<VerdictHandle> {
        self.watcher()
            .watch_for_result(namespace, pod, container, budget, tokens)
            .await
    }

    /// Fetches whatever `container` logged during the last `since`, without
    /// following. Handy for dumping a failed test's output.
    pub async fn pod_logs(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
        since: Duration,
    ) -> Result<String> {
        let params = LogParams::since(container, since);
        self.api
            .logs(namespace, pod, &params)
            .await
            .inspect_err(|err| {
                tracing::error!(namespace, pod, container, ?err, "Error reading pod logs");
            })
            .map_err(Error::ClusterQuery)
    }
}
