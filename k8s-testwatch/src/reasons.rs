use std::collections::BTreeSet;

/// Container waiting reasons that are expected while a pod starts up.
///
/// A container waiting with one of these reasons is worth waiting for, any
/// other waiting reason is left for the caller to judge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaitingReasons(BTreeSet<String>);

impl WaitingReasons {
    pub const CONTAINER_CREATING: &'static str = "ContainerCreating";
    pub const POD_INITIALIZING: &'static str = "PodInitializing";

    pub fn new<I>(reasons: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        Self(reasons.into_iter().map(|reason| reason.to_string()).collect())
    }

    pub fn contains(&self, reason: &str) -> bool {
        self.0.contains(reason)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for WaitingReasons {
    fn default() -> Self {
        Self::new([Self::CONTAINER_CREATING, Self::POD_INITIALIZING])
    }
}
