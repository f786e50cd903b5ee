//! Per-card countdown timer.
//!
//! The timer never reads the clock itself; every call takes the current
//! [`Instant`]. Time only drains while the timer is running, so pausing and
//! resuming simply folds the elapsed time into `remaining`.

use std::time::{Duration, Instant};

/// Outcome of polling the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Not running.
    Idle,
    /// Running with time left.
    Running,
    /// Ran out during this poll. Reported once.
    Expired,
}

/// A pausable countdown.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    duration: Duration,
    remaining: Duration,
    started_at: Option<Instant>,
}

impl CountdownTimer {
    /// Create a stopped timer with the full duration left.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            remaining: duration,
            started_at: None,
        }
    }

    /// Full length of the countdown.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Begin (or continue) counting down. No-op if running or out of time.
    pub fn start(&mut self, now: Instant) {
        if self.started_at.is_none() && !self.remaining.is_zero() {
            self.started_at = Some(now);
        }
    }

    /// Stop counting, keeping whatever time is left.
    pub fn pause(&mut self, now: Instant) {
        if let Some(started) = self.started_at.take() {
            self.remaining = self
                .remaining
                .saturating_sub(now.saturating_duration_since(started));
        }
    }

    /// Stop and refill.
    pub fn reset(&mut self) {
        self.started_at = None;
        self.remaining = self.duration;
    }

    /// Change the countdown length. Resets the timer.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
        self.reset();
    }

    /// Whether the timer is counting down.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Time left as of `now`.
    #[must_use]
    pub fn time_left(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(started) => self
                .remaining
                .saturating_sub(now.saturating_duration_since(started)),
            None => self.remaining,
        }
    }

    /// Fraction of the countdown left, from 1.0 (full) to 0.0.
    #[must_use]
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        self.time_left(now).as_secs_f64() / self.duration.as_secs_f64()
    }

    /// When the timer will run out, if it is running.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.started_at.map(|started| started + self.remaining)
    }

    /// Check for expiry.
    ///
    /// A running timer that has reached zero stops and reports
    /// [`TimerEvent::Expired`]; later polls report [`TimerEvent::Idle`] until
    /// it is reset and restarted.
    pub fn poll(&mut self, now: Instant) -> TimerEvent {
        if self.started_at.is_none() {
            return TimerEvent::Idle;
        }
        if self.time_left(now).is_zero() {
            self.started_at = None;
            self.remaining = Duration::ZERO;
            return TimerEvent::Expired;
        }
        TimerEvent::Running
    }
}
