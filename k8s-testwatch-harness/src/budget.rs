use std::time::Duration;

use tokio::time::Instant;

// Roughly 30 years, far enough that nobody waits for it.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Deadline window shared by every retry of one logical wait.
///
/// The start instant is fixed when the budget is created; each check
/// recomputes against it, nothing ever resets it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitBudget {
    started: Instant,
    total: Duration,
}

impl WaitBudget {
    pub fn start(total: Duration) -> Self {
        Self {
            started: Instant::now(),
            total,
        }
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.total.saturating_sub(self.elapsed())
    }

    pub fn is_exhausted(&self) -> bool {
        self.elapsed() >= self.total
    }

    pub fn deadline(&self) -> Instant {
        self.started
            .checked_add(self.total)
            .unwrap_or_else(|| self.started + FAR_FUTURE)
    }
}

#[cfg(test)]
mod tests {
    use tokio::time;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn counts_down_without_reset() {
        let budget = WaitBudget::start(Duration::from_secs(10));
        assert!(!budget.is_exhausted());
        assert_eq!(budget.remaining(), Duration::from_secs(10));

        time::advance(Duration::from_secs(4)).await;
        let copy = budget;
        assert_eq!(copy.elapsed(), Duration::from_secs(4));
        assert_eq!(copy.remaining(), Duration::from_secs(6));

        time::advance(Duration::from_secs(6)).await;
        assert!(budget.is_exhausted());
        assert_eq!(budget.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_budget_is_exhausted() {
        let budget = WaitBudget::start(Duration::ZERO);
        assert!(budget.is_exhausted());
        assert_eq!(budget.deadline(), Instant::now());
    }

    #[tokio::test(start_paused = true)]
    async fn huge_budget_has_a_deadline() {
        let budget = WaitBudget::start(Duration::MAX);
        assert!(budget.deadline() > Instant::now());
        assert!(!budget.is_exhausted());
    }
}
