//! Millisecond clock abstraction.
//!
//! Core logic never talks to a hardware timer directly; it is handed a
//! [`Clock`] so the same code runs on the target (backed by
//! `embassy_time`) and under host tests (backed by a stepping fake).

use core::ops::Add;
use core::time::Duration;

/// A monotonic timestamp with millisecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Instant {
    millis: u64,
}

impl Instant {
    pub const fn from_millis(millis: u64) -> Self {
        Instant { millis }
    }

    pub const fn as_millis(&self) -> u64 {
        self.millis
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is later.
    pub fn saturating_duration_since(&self, earlier: Instant) -> Duration {
        Duration::from_millis(self.millis.saturating_sub(earlier.millis))
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        Instant {
            millis: self.millis.saturating_add(rhs.as_millis() as u64),
        }
    }
}

/// Time source used by all async logic in this crate.
pub trait Clock {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);

    async fn sleep_until(&self, deadline: Instant) {
        let now = self.now();
        if deadline > now {
            self.sleep(deadline.saturating_duration_since(now)).await;
        }
    }
}

impl<T: Clock> Clock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }

    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await
    }

    async fn sleep_until(&self, deadline: Instant) {
        (**self).sleep_until(deadline).await
    }
}

/// Clock backed by the embassy time driver.
#[cfg(feature = "embedded")]
#[derive(Clone, Copy, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embedded")]
impl Clock for EmbassyClock {
    fn now(&self) -> Instant {
        Instant::from_millis(embassy_time::Instant::now().as_millis())
    }

    async fn sleep(&self, duration: Duration) {
        embassy_time::Timer::after_millis(duration.as_millis() as u64).await;
    }
}
