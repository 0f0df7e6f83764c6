pub use k8s_openapi as openapi;
pub use k8s_openapi::api::core::v1 as corev1;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
pub use kube::api::LogParams;

pub use logs::LogParamsExt;
pub use pod::ContainerStatusExt;
pub use pod::PodExt;

mod logs;
mod pod;

pub fn default<T: Default>() -> T {
    T::default()
}
