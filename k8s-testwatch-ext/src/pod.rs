use super::*;

pub trait PodExt {
    /// Container statuses in the order the kubelet reported them, empty when
    /// the pod has no status yet.
    fn container_statuses(&self) -> &[corev1::ContainerStatus];

    fn waiting_reasons(&self) -> impl Iterator<Item = &str> {
        self.container_statuses()
            .iter()
            .filter_map(ContainerStatusExt::waiting_reason)
    }
}

impl PodExt for corev1::Pod {
    fn container_statuses(&self) -> &[corev1::ContainerStatus] {
        self.status
            .as_ref()
            .and_then(|status| status.container_statuses.as_deref())
            .unwrap_or_default()
    }
}

pub trait ContainerStatusExt {
    /// Reason of the `Waiting` state, `None` for running or terminated
    /// containers.
    fn waiting_reason(&self) -> Option<&str>;
}

impl ContainerStatusExt for corev1::ContainerStatus {
    fn waiting_reason(&self) -> Option<&str> {
        self.state
            .as_ref()?
            .waiting
            .as_ref()?
            .reason
            .as_deref()
    }
}
