use std::time::Duration;

use super::*;

pub trait LogParamsExt {
    /// Live tail of `container`, replaying `lookback` worth of history first.
    fn follow(container: impl ToString, lookback: Duration) -> Self;

    /// One-shot read of `container` logs written during the last `since`.
    fn since(container: impl ToString, since: Duration) -> Self;
}

impl LogParamsExt for LogParams {
    fn follow(container: impl ToString, lookback: Duration) -> Self {
        Self {
            follow: true,
            ..Self::since(container, lookback)
        }
    }

    fn since(container: impl ToString, since: Duration) -> Self {
        Self {
            container: Some(container.to_string()),
            follow: false,
            since_seconds: since_seconds(since),
            ..default()
        }
    }
}

// The API server rejects `sinceSeconds` below one, so a zero window means
// "everything" rather than "nothing".
fn since_seconds(since: Duration) -> Option<i64> {
    let seconds = since.as_secs().max(u64::from(since.subsec_nanos() > 0));
    (seconds > 0).then(|| i64::try_from(seconds).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_sets_container_and_window() {
        let params = LogParams::follow("tests", Duration::from_secs(300));
        assert!(params.follow);
        assert_eq!(params.container.as_deref(), Some("tests"));
        assert_eq!(params.since_seconds, Some(300));
    }

    #[test]
    fn since_does_not_follow() {
        let params = LogParams::since("tests", Duration::from_secs(60));
        assert!(!params.follow);
        assert_eq!(params.since_seconds, Some(60));
    }

    #[test]
    fn sub_second_window_rounds_up() {
        let params = LogParams::follow("tests", Duration::from_millis(200));
        assert_eq!(params.since_seconds, Some(1));
    }

    #[test]
    fn zero_window_replays_everything() {
        let params = LogParams::follow("tests", Duration::ZERO);
        assert_eq!(params.since_seconds, None);
    }
}
