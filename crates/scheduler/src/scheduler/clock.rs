use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Wall-clock timestamps for one run, derived from a monotonic origin.
///
/// Every timestamp is `origin_wall + (Instant::now() - origin_mono)`, so
/// timestamps taken later are never earlier, even if the system clock is
/// stepped mid-run.
#[derive(Debug, Clone, Copy)]
pub struct RunClock {
    origin_wall: DateTime<Utc>,
    origin_mono: Instant,
}

impl RunClock {
    pub fn start() -> Self {
        Self {
            origin_wall: Utc::now(),
            origin_mono: Instant::now(),
        }
    }

    pub fn origin(&self) -> DateTime<Utc> {
        self.origin_wall
    }

    pub fn now(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.origin_mono.elapsed())
            .ok()
            .and_then(|elapsed| self.origin_wall.checked_add_signed(elapsed))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// `end - start` as a std duration; zero if `end` precedes `start`.
pub fn span_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Duration {
    end.signed_duration_since(start).to_std().unwrap_or_default()
}
