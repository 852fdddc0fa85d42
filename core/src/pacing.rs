//! Reveal pacing: the injectable timer seam.
//!
//! The reveal scheduler never sleeps and never owns a timer. It asks a
//! TickScheduler to wake it later with a PendingTick, and the host calls
//! RevealScheduler::on_wake when that time comes. Each PendingTick carries
//! the epoch it was scheduled under; a wake whose epoch is stale is dropped.

use std::collections::VecDeque;
use std::time::Duration;

/// Opaque handle for a scheduled wake, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Wake token delivered back to the reveal scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTick {
    pub epoch: u64,
}

pub trait TickScheduler {
    /// Arrange for `tick` to be delivered after `delay`.
    fn schedule(&mut self, delay: Duration, tick: PendingTick) -> TimerId;

    /// Best effort. A cancelled tick that still fires is caught by the
    /// epoch check, so implementations may ignore this.
    fn cancel(&mut self, timer: TimerId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTick {
    pub timer: TimerId,
    pub delay: Duration,
    pub tick:  PendingTick,
}

/// Queue-backed scheduler with no clock. The host (or a test) pops due
/// ticks and feeds them to on_wake. Cancelled ticks stay queued unless
/// `drop_cancelled` is set, which lets tests exercise stale wakes.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    queue:              VecDeque<ScheduledTick>,
    next_timer:         u64,
    pub cancelled:      Vec<TimerId>,
    pub drop_cancelled: bool,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self { drop_cancelled: true, ..Self::default() }
    }

    /// Keeps cancelled ticks queued so they still get delivered.
    pub fn keeping_cancelled() -> Self {
        Self::default()
    }

    /// Next tick in scheduling order.
    pub fn pop(&mut self) -> Option<PendingTick> {
        self.queue.pop_front().map(|s| s.tick)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn peek(&self) -> Option<&ScheduledTick> {
        self.queue.front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, tick: PendingTick) -> TimerId {
        self.next_timer += 1;
        let timer = TimerId(self.next_timer);
        self.queue.push_back(ScheduledTick { timer, delay, tick });
        timer
    }

    fn cancel(&mut self, timer: TimerId) {
        self.cancelled.push(timer);
        if self.drop_cancelled {
            self.queue.retain(|s| s.timer != timer);
        }
    }
}
