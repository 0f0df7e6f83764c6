use std::env;
use std::time::Duration;

use constcat::concat;
use time::ext::NumericalStdDuration as _;

use super::WaitingReasons;

const ENV_PREFIX: &str = "TESTWATCH_";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Fixed delay between readiness polls.
    pub poll_interval: Duration,
    /// How much log history is replayed before live tailing starts.
    pub log_lookback: Duration,
    pub waiting_reasons: WaitingReasons,
}

impl Settings {
    pub const POLL_INTERVAL_ENV: &'static str = concat!(ENV_PREFIX, "POLL_INTERVAL");
    pub const LOG_LOOKBACK_ENV: &'static str = concat!(ENV_PREFIX, "LOG_LOOKBACK");
    pub const WAITING_REASONS_ENV: &'static str = concat!(ENV_PREFIX, "WAITING_REASONS");

    /// Defaults overlaid with whatever `TESTWATCH_*` variables are set.
    ///
    /// Durations use the Go notation (`"5s"`, `"1m30s"`), waiting reasons are
    /// a comma separated list.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(text) = lookup(Self::POLL_INTERVAL_ENV) {
            settings.poll_interval = parse_duration(Self::POLL_INTERVAL_ENV, &text)?;
        }
        if let Some(text) = lookup(Self::LOG_LOOKBACK_ENV) {
            settings.log_lookback = parse_duration(Self::LOG_LOOKBACK_ENV, &text)?;
        }
        if let Some(text) = lookup(Self::WAITING_REASONS_ENV) {
            settings.waiting_reasons = parse_reasons(Self::WAITING_REASONS_ENV, &text)?;
        }
        Ok(settings)
    }

    pub fn with_poll_interval(self, poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..self
        }
    }

    pub fn with_log_lookback(self, log_lookback: Duration) -> Self {
        Self {
            log_lookback,
            ..self
        }
    }

    pub fn with_waiting_reasons(self, waiting_reasons: WaitingReasons) -> Self {
        Self {
            waiting_reasons,
            ..self
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval: 5.std_seconds(),
            log_lookback: 5.std_minutes(),
            waiting_reasons: WaitingReasons::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{key}: invalid duration {text:?}: {reason}")]
    InvalidDuration {
        key: &'static str,
        text: String,
        reason: String,
    },
    #[error("{key}: no waiting reasons in {text:?}")]
    NoWaitingReasons { key: &'static str, text: String },
}

fn parse_duration(key: &'static str, text: &str) -> Result<Duration, SettingsError> {
    let invalid = |reason: String| SettingsError::InvalidDuration {
        key,
        text: text.to_string(),
        reason,
    };
    let nanos = go_parse_duration::parse_duration(text.trim())
        .map_err(|err| invalid(format!("{err:?}")))?;
    u64::try_from(nanos)
        .map(Duration::from_nanos)
        .map_err(|_| invalid("negative duration".to_string()))
}

fn parse_reasons(key: &'static str, text: &str) -> Result<WaitingReasons, SettingsError> {
    let reasons = text
        .split(',')
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .collect::<Vec<_>>();
    if reasons.is_empty() {
        Err(SettingsError::NoWaitingReasons {
            key,
            text: text.to_string(),
        })
    } else {
        Ok(WaitingReasons::new(reasons))
    }
}
