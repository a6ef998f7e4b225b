use std::time::Duration;

use tokio::time::Instant;

/// Wall-clock budget for every statement download of a run.
///
/// The deadline is fixed when the run starts. Each account gets an equal
/// share of whatever is left when its turn comes, so time an early account
/// does not use flows to the later ones.
#[derive(Debug, Clone, Copy)]
pub struct DownloadBudget {
    deadline: Instant,
}

impl DownloadBudget {
    pub fn starting_now(total: Duration) -> Self {
        Self::with_deadline(Instant::now() + total)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self { deadline }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_exhausted(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Deadline for account `index` (0-based) out of `total`.
    pub fn slice_for(&self, index: usize, total: usize) -> Instant {
        self.slice_from(Instant::now(), index, total)
    }

    fn slice_from(&self, now: Instant, index: usize, total: usize) -> Instant {
        let remaining = self.deadline.saturating_duration_since(now);
        let accounts_left = total.saturating_sub(index).max(1) as u32;
        now + remaining / accounts_left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_account_gets_equal_share() {
        let now = Instant::now();
        let budget = DownloadBudget::with_deadline(now + Duration::from_secs(240));
        assert_eq!(budget.slice_from(now, 0, 4), now + Duration::from_secs(60));
    }

    #[test]
    fn test_unused_time_flows_to_later_accounts() {
        let start = Instant::now();
        let budget = DownloadBudget::with_deadline(start + Duration::from_secs(240));

        // First account finished after 10s out of its 60s share.
        let later = start + Duration::from_secs(10);
        assert_eq!(budget.slice_from(later, 1, 4), later + Duration::from_secs(230) / 3);
    }

    #[test]
    fn test_last_account_gets_everything_left() {
        let start = Instant::now();
        let budget = DownloadBudget::with_deadline(start + Duration::from_secs(100));
        let now = start + Duration::from_secs(70);
        assert_eq!(budget.slice_from(now, 2, 3), budget.deadline());
    }

    #[test]
    fn test_expired_budget_yields_now() {
        let start = Instant::now();
        let budget = DownloadBudget::with_deadline(start);
        let now = start + Duration::from_secs(5);
        assert_eq!(budget.slice_from(now, 0, 2), now);
        assert!(budget.is_exhausted());
        assert_eq!(budget.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_out_of_range_index_does_not_divide_by_zero() {
        let now = Instant::now();
        let budget = DownloadBudget::with_deadline(now + Duration::from_secs(10));
        assert_eq!(budget.slice_from(now, 5, 2), now + Duration::from_secs(10));
    }
}
