use super::*;

/// Picks the authoritative pod among everything a label selector matches.
#[derive(Debug)]
pub struct PodSelector<A> {
    api: Arc<A>,
}

impl<A> Clone for PodSelector<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

impl<A: PodApi> PodSelector<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    pub(crate) fn api(&self) -> &A {
        &self.api
    }

    /// Re-queries the cluster and returns the newest pod matching `selector`.
    ///
    /// A previous pod generation may still linger after a rolling restart;
    /// the most recently created pod always wins.
    pub async fn select_canonical(&self, namespace: &str, selector: &str) -> Result<corev1::Pod> {
        let pods = self
            .api
            .list_pods(namespace, selector)
            .await
            .map_err(Error::ClusterQuery)?;
        tracing::trace!(namespace, selector, count = pods.len(), "Listed candidate pods");
        canonical(pods).ok_or_else(|| {
            tracing::debug!(namespace, selector, "Zero pods found for selector");
            Error::no_pods_found(namespace, selector)
        })
    }
}

/// Newest pod first. The sort is stable, so pods sharing a creation
/// timestamp keep the order the API server returned them in.
pub fn canonical(mut pods: Vec<corev1::Pod>) -> Option<corev1::Pod> {
    pods.sort_by(|a, b| {
        b.metadata
            .creation_timestamp
            .cmp(&a.metadata.creation_timestamp)
    });
    pods.into_iter().next()
}
