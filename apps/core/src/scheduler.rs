use std::cell::Cell;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::time::Duration;

pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Virtual time. Clones share the same reading, so a test can keep one
/// handle and hand another to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Moves the clock to `at`. Never moves backwards.
    pub fn set(&self, at: Duration) {
        if at > self.now.get() {
            self.now.set(at);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Debug)]
struct Timer<T> {
    due: Duration,
    seq: u64,
    task: T,
}

impl<T> Timer<T> {
    fn key(&self) -> (Duration, u64) {
        (self.due, self.seq)
    }
}

impl<T> PartialEq for Timer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for Timer<T> {}

impl<T> PartialOrd for Timer<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Timer<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Deadline-ordered task queue. Equal deadlines fire in scheduling order.
#[derive(Debug)]
pub struct TimerQueue<T> {
    timers: BinaryHeap<Reverse<Timer<T>>>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            timers: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Duration, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Reverse(Timer { due, seq, task }));
    }

    pub fn pop_due(&mut self, now: Duration) -> Option<T> {
        if self.next_due()? > now {
            return None;
        }
        self.timers.pop().map(|Reverse(timer)| timer.task)
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.timers.peek().map(|Reverse(timer)| timer.due)
    }

    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.timers.len();
        self.timers.clear();
        cancelled
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
