use crate::domain::ports::LookupError;
use std::time::Duration;
use tokio::time::Instant;

/// Per-run ceiling on outbound requests, with a minimum spacing between them.
#[derive(Debug)]
pub struct RequestBudget {
    limit: u64,
    used: u64,
    delay: Duration,
    last_request: Option<Instant>,
}

impl RequestBudget {
    pub fn new(limit: u64, delay: Duration) -> Self {
        Self {
            limit,
            used: 0,
            delay,
            last_request: None,
        }
    }

    /// Reserves one request, sleeping first if the previous one was too recent.
    pub async fn acquire(&mut self) -> Result<(), LookupError> {
        if self.is_exhausted() {
            return Err(LookupError::BudgetExhausted);
        }

        if let Some(last) = self.last_request {
            let ready_at = last + self.delay;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }

        self.used += 1;
        self.last_request = Some(Instant::now());
        tracing::trace!("Request {}/{} acquired", self.used, self.limit);
        Ok(())
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn remaining(&self) -> u64 {
        self.limit - self.used
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_acquire_stops_at_limit() {
        let mut budget = RequestBudget::new(2, Duration::ZERO);
        assert_ok!(budget.acquire().await);
        assert_ok!(budget.acquire().await);
        assert!(budget.is_exhausted());
        assert!(matches!(
            assert_err!(budget.acquire().await),
            LookupError::BudgetExhausted
        ));
        assert_eq!(budget.used(), 2);
        assert_eq!(budget.remaining(), 0);
    }

    #[tokio::test]
    async fn test_zero_limit_allows_nothing() {
        let mut budget = RequestBudget::new(0, Duration::ZERO);
        assert!(budget.is_exhausted());
        assert_err!(budget.acquire().await);
        assert_eq!(budget.used(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_are_spaced_by_delay() {
        let mut budget = RequestBudget::new(3, Duration::from_millis(200));
        let start = Instant::now();
        assert_ok!(budget.acquire().await);
        assert!(start.elapsed() < Duration::from_millis(200));
        assert_ok!(budget.acquire().await);
        assert_ok!(budget.acquire().await);
        assert!(start.elapsed() >= Duration::from_millis(400));
        assert_eq!(budget.limit(), 3);
    }
}
