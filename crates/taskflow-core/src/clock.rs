use std::{
    sync::{Mutex, OnceLock},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use time::OffsetDateTime;

static ORIGIN: OnceLock<Instant> = OnceLock::new();

/// Source of the current time and of simulated delays.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Wall time, used for task timestamps.
    fn now(&self) -> OffsetDateTime;
    /// Time since a fixed origin. Never affected by wall-clock adjustments; use it to measure intervals.
    fn monotonic(&self) -> Duration;
    async fn sleep(&self, d: Duration);
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn monotonic(&self) -> Duration {
        ORIGIN.get_or_init(Instant::now).elapsed()
    }

    async fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            tokio::time::sleep(d).await;
        }
    }
}

/// Deterministic clock.
///
/// Every `now()` returns the current reading and then advances it by `tick`.
/// `sleep(d)` does not wait: it advances the reading by `d` and yields to the scheduler.
/// `monotonic()` is the reading (ticking the same way) minus the start time, floored at zero.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<OffsetDateTime>,
    start: OffsetDateTime,
    tick: Duration,
}

impl ManualClock {
    pub fn new(start: OffsetDateTime) -> Self {
        Self::with_tick(start, Duration::ZERO)
    }

    pub fn with_tick(start: OffsetDateTime, tick: Duration) -> Self {
        Self {
            now: Mutex::new(start),
            start,
            tick,
        }
    }

    /// Current reading without advancing.
    pub fn peek(&self) -> OffsetDateTime {
        *self.lock()
    }

    pub fn advance(&self, d: Duration) {
        let mut now = self.lock();
        *now += d;
    }

    pub fn set(&self, at: OffsetDateTime) {
        *self.lock() = at;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OffsetDateTime> {
        // Readings are plain values; a poisoned guard still holds a valid instant.
        self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(OffsetDateTime::UNIX_EPOCH)
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        let mut now = self.lock();
        let reading = *now;
        *now += self.tick;
        reading
    }

    fn monotonic(&self) -> Duration {
        Duration::try_from(self.now() - self.start).unwrap_or(Duration::ZERO)
    }

    async fn sleep(&self, d: Duration) {
        self.advance(d);
        tokio::task::yield_now().await;
    }
}
