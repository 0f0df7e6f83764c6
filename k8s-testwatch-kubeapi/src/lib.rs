use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use futures::io::AsyncBufRead;
use k8s_testwatch_ext as k8s;
use kube::api;

use k8s::corev1;

/// Line-readable body of a pod log request.
pub type LogStream = Pin<Box<dyn AsyncBufRead + Send>>;

/// The slice of the cluster API the test harness talks to.
pub trait PodApi: Send + Sync {
    /// Pods in `namespace` matching the label `selector`, in server order.
    fn list_pods(
        &self,
        namespace: &str,
        selector: &str,
    ) -> impl Future<Output = kube::Result<Vec<corev1::Pod>>> + Send;

    /// Full pod object, `None` when the pod does not exist.
    fn get_pod(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = kube::Result<Option<corev1::Pod>>> + Send;

    fn log_stream(
        &self,
        namespace: &str,
        name: &str,
        params: &api::LogParams,
    ) -> impl Future<Output = kube::Result<LogStream>> + Send;

    fn logs(
        &self,
        namespace: &str,
        name: &str,
        params: &api::LogParams,
    ) -> impl Future<Output = kube::Result<String>> + Send;
}

pub struct KubeApi {
    list_params: api::ListParams,
    client: kube::Client,
}

impl KubeApi {
    /// Create a KubeApi configured with a default Kubernetes client.
    ///
    /// The client is inferred from the environment: `KUBECONFIG` or the local
    /// kubeconfig first, the in-cluster service account otherwise.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), kube::Error> {
    /// let api = k8s_testwatch_kubeapi::KubeApi::new().await?;
    /// // use `api`...
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new() -> kube::Result<Self> {
        kube::Client::try_default().await.map(Self::with_client)
    }

    /// Create a KubeApi backed by the provided Kubernetes client.
    ///
    /// The returned KubeApi is initialized with default `ListParams` and uses
    /// `client` for all Kubernetes interactions.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = kube::Client::try_default().await?;
    /// let api = k8s_testwatch_kubeapi::KubeApi::with_client(client);
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_client(client: kube::Client) -> Self {
        Self {
            list_params: api::ListParams::default(),
            client,
        }
    }

    /// Get an Api handle scoped to the Pods of a single namespace.
    fn pods(&self, namespace: &str) -> api::Api<corev1::Pod> {
        api::Api::namespaced(self.client.clone(), namespace)
    }

    /// Default list parameters narrowed down to the given label selector.
    fn list_params(&self, selector: &str) -> api::ListParams {
        self.list_params.clone().labels(selector)
    }
}

impl PodApi for KubeApi {
    /// Lists the Pods in `namespace` whose labels match `selector`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use k8s_testwatch_kubeapi::{KubeApi, PodApi as _};
    /// # async fn example() -> kube::Result<()> {
    /// let api = KubeApi::new().await?;
    /// let pods = api.list_pods("e2e", "app=tests").await?;
    /// println!("discovered {} pods", pods.len());
    /// # Ok(())
    /// # }
    /// ```
    async fn list_pods(&self, namespace: &str, selector: &str) -> kube::Result<Vec<corev1::Pod>> {
        let lp = self.list_params(selector);
        self.pods(namespace).list(&lp).await.map(|list| list.items)
    }

    /// Fetches a single Pod, mapping a 404 from the API server to `Ok(None)`.
    async fn get_pod(&self, namespace: &str, name: &str) -> kube::Result<Option<corev1::Pod>> {
        self.pods(namespace).get_opt(name).await
    }

    /// Opens the log endpoint of a Pod container and hands back the body as a
    /// line-readable stream.
    ///
    /// With `params.follow` set the stream stays open until the container
    /// exits or the connection drops.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use std::time::Duration;
    /// # use futures::AsyncBufReadExt as _;
    /// # use k8s_testwatch_ext::LogParamsExt as _;
    /// # use k8s_testwatch_kubeapi::{KubeApi, PodApi as _};
    /// # async fn example() -> kube::Result<()> {
    /// let api = KubeApi::new().await?;
    /// let params = kube::api::LogParams::follow("tests", Duration::from_secs(60));
    /// let lines = api.log_stream("e2e", "tests-7d9f", &params).await?.lines();
    /// # Ok(())
    /// # }
    /// ```
    async fn log_stream(
        &self,
        namespace: &str,
        name: &str,
        params: &api::LogParams,
    ) -> kube::Result<LogStream> {
        tracing::debug!(
            namespace,
            pod = name,
            container = ?params.container,
            follow = params.follow,
            "Opening log stream"
        );
        let stream = self.pods(namespace).log_stream(name, params).await?;
        Ok(Box::pin(stream))
    }

    /// Reads the requested Pod logs in one go.
    async fn logs(
        &self,
        namespace: &str,
        name: &str,
        params: &api::LogParams,
    ) -> kube::Result<String> {
        self.pods(namespace).logs(name, params).await
    }
}

impl Debug for KubeApi {
    /// Formats the `KubeApi` for debugging, showing `list_params` while redacting the `client`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeApi")
            .field("list_params", &self.list_params)
            .field("client", &"<kube::Client>")
            .finish()
    }
}
