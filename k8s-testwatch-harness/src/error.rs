use std::time::Duration;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("zero pods found for selector {selector:?} in namespace {namespace}")]
    NoPodsFound { namespace: String, selector: String },

    #[error("pod {selector:?} in namespace {namespace} did not become ready within {total:?}")]
    DeadlineExceeded {
        namespace: String,
        selector: String,
        total: Duration,
    },

    #[error("pod {namespace}/{name} not found")]
    NotFound { namespace: String, name: String },

    #[error("cluster query failed: {0}")]
    ClusterQuery(#[source] kube::Error),

    #[error("failed to open log stream for {namespace}/{pod} [{container}]: {source}")]
    StreamOpen {
        namespace: String,
        pod: String,
        container: String,
        source: kube::Error,
    },

    #[error("readiness task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn no_pods_found(namespace: &str, selector: &str) -> Self {
        Self::NoPodsFound {
            namespace: namespace.to_string(),
            selector: selector.to_string(),
        }
    }

    pub(crate) fn not_found(namespace: &str, name: &str) -> Self {
        Self::NotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}
