//! Practice-time tracking.
//!
//! Elapsed time is measured on a monotonic clock, so wall-clock changes (DST,
//! manual adjustments) neither lose nor invent practice. The seconds are
//! credited to the local calendar day on which they are flushed. The front end
//! flushes periodically while a game is active and once more when it stops, so
//! an interrupted session loses at most one flush interval.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Seconds credited to one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeEntry {
    /// Local calendar day.
    pub day: NaiveDate,
    /// Seconds to add.
    pub seconds: u64,
}

/// Practice seconds per local day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PracticeLog {
    days: BTreeMap<NaiveDate, u64>,
}

impl PracticeLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry's seconds to its day.
    pub fn record(&mut self, entry: PracticeEntry) {
        *self.days.entry(entry.day).or_default() += entry.seconds;
    }

    /// Seconds recorded on `day`.
    #[must_use]
    pub fn seconds_on(&self, day: NaiveDate) -> u64 {
        self.days.get(&day).copied().unwrap_or_default()
    }

    /// Seconds across every recorded day.
    #[must_use]
    pub fn total_seconds(&self) -> u64 {
        self.days.values().sum()
    }

    /// Seconds from the start of the week containing `today` (weeks begin on
    /// Sunday) onwards.
    #[must_use]
    pub fn this_week_seconds(&self, today: NaiveDate) -> u64 {
        let week_start = start_of_week(today);
        self.days.range(week_start..).map(|(_, secs)| secs).sum()
    }

    /// Number of days with recorded practice.
    #[must_use]
    pub fn days(&self) -> usize {
        self.days.len()
    }

    /// Iterate days in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.days.iter().map(|(day, secs)| (*day, *secs))
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl FromIterator<PracticeEntry> for PracticeLog {
    fn from_iter<I: IntoIterator<Item = PracticeEntry>>(iter: I) -> Self {
        let mut log = Self::new();
        for entry in iter {
            log.record(entry);
        }
        log
    }
}

/// The Sunday on or before `day`.
#[must_use]
pub fn start_of_week(day: NaiveDate) -> NaiveDate {
    day - Days::new(u64::from(day.weekday().num_days_from_sunday()))
}

/// Measures active practice time and turns it into [`PracticeEntry`]s.
#[derive(Debug, Clone, Default)]
pub struct PracticeTracker {
    session_start: Option<Instant>,
}

impl PracticeTracker {
    /// Create an idle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session is being timed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session_start.is_some()
    }

    /// Start or stop timing.
    ///
    /// Stopping returns the time accumulated since the last flush, credited
    /// to `today`.
    pub fn set_active(
        &mut self,
        active: bool,
        now: Instant,
        today: NaiveDate,
    ) -> Option<PracticeEntry> {
        if active {
            if self.session_start.is_none() {
                self.session_start = Some(now);
            }
            return None;
        }
        let entry = self.flush(now, today);
        self.session_start = None;
        entry
    }

    /// Periodic flush while active.
    pub fn tick(&mut self, now: Instant, today: NaiveDate) -> Option<PracticeEntry> {
        self.flush(now, today)
    }

    fn flush(&mut self, now: Instant, today: NaiveDate) -> Option<PracticeEntry> {
        let start = self.session_start?;
        let seconds = now.saturating_duration_since(start).as_secs();
        if seconds == 0 {
            return None;
        }
        // carry the sub-second remainder into the next flush
        self.session_start = Some(start + Duration::from_secs(seconds));
        trace!(seconds, "Flushed practice time");
        Some(PracticeEntry {
            day: today,
            seconds,
        })
    }
}

/// Compact human-readable duration: `45s`, `1m 30s`, `1h 1m`, `1d 1h`.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    if seconds < MINUTE {
        format!("{seconds}s")
    } else if seconds < HOUR {
        format!("{}m {}s", seconds / MINUTE, seconds % MINUTE)
    } else if seconds < DAY {
        format!("{}h {}m", seconds / HOUR, (seconds % HOUR) / MINUTE)
    } else {
        format!("{}d {}h", seconds / DAY, (seconds % DAY) / HOUR)
    }
}
