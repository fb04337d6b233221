//! Timer scheduling for the round choreography.
//!
//! Timers carry a plain [`Timer`] value instead of a callback. The owner polls
//! the queue and dispatches whatever became due, so every effect runs on the
//! caller's thread in deadline order.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::palette::Color;

/// What a timer means to the engine when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    PreRoll,
    FlashOn(usize),
    FlashOff(usize),
    PlaybackDone,
    CadencePulse,
    Deadline,
    PressFlashOff(Color),
    ResultPause,
}

/// A scheduled timer, stamped with the round that armed it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub round: u64,
    pub kind: TimerKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub handle: TimerHandle,
    pub timer: Timer,
}

pub trait Clock {
    /// Time elapsed since the clock was created
    fn now(&self) -> Duration;
    /// Fire `timer` once, `delay` from now.
    fn after(&mut self, delay: Duration, timer: Timer) -> TimerHandle;
    /// Fire `timer` every `interval` until cancelled. The first firing is one
    /// interval from now.
    fn every(&mut self, interval: Duration, timer: Timer) -> TimerHandle;
    /// Idempotent; unknown, fired and already cancelled handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
    /// Next timer whose deadline has passed, earliest first.
    fn poll_due(&mut self) -> Option<Fired>;
    fn pending(&self) -> usize;
}

pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-advanced time. Clones share the same instant, so a test can keep one
/// and move time forward while the engine owns the queue.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    now: Rc<Cell<Duration>>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    handle: TimerHandle,
    timer: Timer,
    interval: Option<Duration>,
}

/// Deadline-ordered timer queue. Ties fire in registration order; a periodic
/// timer keeps its original sequence number when it is re-armed.
#[derive(Debug)]
pub struct TimerQueue<S: TimeSource> {
    source: S,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Entry>,
    deadlines: BTreeMap<TimerHandle, Duration>,
}

impl<S: TimeSource> TimerQueue<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            next_id: 0,
            queue: BTreeMap::new(),
            deadlines: BTreeMap::new(),
        }
    }

    fn schedule(&mut self, delay: Duration, timer: Timer, interval: Option<Duration>) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        let deadline = self.source.now() + delay;
        self.queue.insert(
            (deadline, handle.0),
            Entry {
                handle,
                timer,
                interval,
            },
        );
        self.deadlines.insert(handle, deadline);
        handle
    }
}

impl<S: TimeSource> Clock for TimerQueue<S> {
    fn now(&self) -> Duration {
        self.source.now()
    }

    fn after(&mut self, delay: Duration, timer: Timer) -> TimerHandle {
        self.schedule(delay, timer, None)
    }

    fn every(&mut self, interval: Duration, timer: Timer) -> TimerHandle {
        // a zero interval would re-fire forever within one poll loop
        let interval = interval.max(Duration::from_millis(1));
        self.schedule(interval, timer, Some(interval))
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(deadline) = self.deadlines.remove(&handle) {
            self.queue.remove(&(deadline, handle.0));
        }
    }

    fn poll_due(&mut self) -> Option<Fired> {
        let now = self.source.now();
        let (&(deadline, seq), _) = self.queue.first_key_value()?;
        if deadline > now {
            return None;
        }
        let entry = self.queue.remove(&(deadline, seq))?;
        match entry.interval {
            Some(interval) => {
                let next = deadline + interval;
                self.queue.insert((next, seq), entry);
                self.deadlines.insert(entry.handle, next);
            }
            None => {
                self.deadlines.remove(&entry.handle);
            }
        }
        Some(Fired {
            handle: entry.handle,
            timer: entry.timer,
        })
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}
