// core/timers.rs
//
// Timer registry — one scope of pending scheduled steps.
//
// Cancellation is bulk only. A step that was superseded is made harmless by
// whoever owns the registry (see systems/reveal.rs), not by removing it here.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Handle returned by `schedule`. Ordered by registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

#[derive(Debug)]
struct Pending<T> {
    due: u64,
    handle: TimerHandle,
    payload: T,
}

impl<T> PartialEq for Pending<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.handle == other.handle
    }
}

impl<T> Eq for Pending<T> {}

impl<T> PartialOrd for Pending<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Pending<T> {
    // Reversed so the max-heap pops the earliest (due, handle) first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.handle).cmp(&(self.due, self.handle))
    }
}

/// Pending steps for one timer scope, fired in (due, registration) order.
#[derive(Debug)]
pub struct TimerRegistry<T> {
    pending: BinaryHeap<Pending<T>>,
    next_handle: u64,
}

impl<T> TimerRegistry<T> {
    pub fn new() -> Self {
        Self {
            pending: BinaryHeap::new(),
            next_handle: 0,
        }
    }

    /// Schedule `payload` to fire `delay_ms` after `now`.
    pub fn schedule(&mut self, now: u64, delay_ms: u64, payload: T) -> TimerHandle {
        self.schedule_at(now.saturating_add(delay_ms), payload)
    }

    /// Schedule `payload` at an absolute time.
    pub fn schedule_at(&mut self, due: u64, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(Pending { due, handle, payload });
        handle
    }

    /// Drop every pending step. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    /// Earliest deadline, if anything is pending.
    pub fn next_due(&self) -> Option<u64> {
        self.pending.peek().map(|p| p.due)
    }

    /// Pop the earliest step whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<(TimerHandle, T)> {
        if self.next_due()? > now {
            return None;
        }
        self.pending.pop().map(|p| (p.handle, p.payload))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for TimerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_due_order() {
        let mut timers = TimerRegistry::new();
        timers.schedule(0, 300, "c");
        timers.schedule(0, 100, "a");
        timers.schedule(0, 200, "b");

        assert_eq!(timers.next_due(), Some(100));
        assert!(timers.pop_due(99).is_none());

        let fired: Vec<_> = std::iter::from_fn(|| timers.pop_due(1_000))
            .map(|(_, p)| p)
            .collect();
        assert_eq!(fired, vec!["a", "b", "c"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn ties_fire_in_registration_order() {
        let mut timers = TimerRegistry::new();
        let first = timers.schedule(0, 50, 1);
        let second = timers.schedule(0, 50, 2);
        assert!(first < second);

        assert_eq!(timers.pop_due(50).map(|(h, p)| (h, p)), Some((first, 1)));
        assert_eq!(timers.pop_due(50).map(|(h, p)| (h, p)), Some((second, 2)));
    }

    #[test]
    fn cancel_all_clears_every_handle() {
        let mut timers = TimerRegistry::new();
        timers.schedule(0, 10, ());
        timers.schedule(0, 20, ());
        assert_eq!(timers.cancel_all(), 2);
        assert!(timers.pop_due(u64::MAX).is_none());
        assert_eq!(timers.next_due(), None);

        // Handles keep increasing after a cancel.
        let h = timers.schedule(0, 5, ());
        assert_eq!(h, TimerHandle(2));
    }
}
