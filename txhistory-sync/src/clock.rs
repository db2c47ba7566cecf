//! Time source and sleep used by the retry loop

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Clock abstraction so retries and time clamping can run without real delays
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Suspend for `duration`
    async fn sleep(&self, duration: Duration);

    /// Current unix time in seconds
    fn now_unix(&self) -> i64 {
        self.now().timestamp()
    }
}

/// System clock backed by `tokio::time`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
