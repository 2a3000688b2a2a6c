//! Periodic triggers
//!
//! The session never sleeps or spawns anything itself. It arms and disarms a [`Trigger`]
//! and whoever owns the event loop delivers the ticks.

use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// A periodic trigger the session registers on start and deregisters on stop
pub trait Trigger {
    /// Start firing every `period`, replacing any previous schedule
    fn arm(&mut self, period: Duration);

    /// Stop firing
    fn disarm(&mut self);

    fn is_armed(&self) -> bool;
}

/// Trigger backed by a tokio interval.
///
/// The first tick fires one period after arming. Ticks missed because a handler ran long
/// are skipped, never replayed in a burst.
#[derive(Debug, Default)]
pub struct IntervalTrigger {
    interval: Option<Interval>,
}

impl IntervalTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the next tick. Never resolves while disarmed.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl Trigger for IntervalTrigger {
    fn arm(&mut self, period: Duration) {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
    }

    fn disarm(&mut self) {
        self.interval = None;
    }

    fn is_armed(&self) -> bool {
        self.interval.is_some()
    }
}

/// Trigger whose ticks are delivered by hand.
///
/// Useful when the caller already runs its own loop, and in tests.
#[derive(Debug, Default, Clone)]
pub struct ManualTrigger {
    period: Option<Duration>,
    arm_count: usize,
}

impl ManualTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Period of the current schedule, if armed
    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// How many times the trigger has been armed
    pub fn arm_count(&self) -> usize {
        self.arm_count
    }
}

impl Trigger for ManualTrigger {
    fn arm(&mut self, period: Duration) {
        self.period = Some(period);
        self.arm_count += 1;
    }

    fn disarm(&mut self) {
        self.period = None;
    }

    fn is_armed(&self) -> bool {
        self.period.is_some()
    }
}
