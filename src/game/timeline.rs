// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Logical-time scheduler for deferred game steps.
//!
//! Steps are kept in a priority queue ordered by due time, with ties broken
//! by insertion order so that equal-delay steps run in the order they were
//! scheduled. Time is a plain [`Duration`] since the owner's epoch; nothing
//! here reads a wall clock, which lets tests drive the game deterministically.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

/// A step waiting on the timeline
#[derive(Debug, Clone)]
pub struct ScheduledStep<T> {
    /// Logical time at which the step becomes due
    pub due: Duration,
    /// Generation of the session that scheduled the step
    pub generation: u64,
    /// The deferred work
    pub step: T,
    /// Insertion counter, used as a tie-breaker
    order: u64,
}

// For BinaryHeap - we want earliest due (then earliest inserted) first
impl<T> Eq for ScheduledStep<T> {}

impl<T> PartialEq for ScheduledStep<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.order == other.order
    }
}

impl<T> Ord for ScheduledStep<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl<T> PartialOrd for ScheduledStep<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue of deferred steps
#[derive(Debug)]
pub struct Timeline<T> {
    queue: BinaryHeap<ScheduledStep<T>>,
    next_order: u64,
}

impl<T> Timeline<T> {
    /// Create an empty timeline
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::with_capacity(64),
            next_order: 0,
        }
    }

    /// Schedule a step to become due at `due`
    pub fn schedule(&mut self, due: Duration, generation: u64, step: T) {
        let order = self.next_order;
        self.next_order += 1;
        self.queue.push(ScheduledStep {
            due,
            generation,
            step,
            order,
        });
    }

    /// Pop the earliest step if it is due at or before `now`.
    ///
    /// Steps never fire early: a step due at 300ms is not returned for
    /// `now = 299ms`.
    pub fn pop_due(&mut self, now: Duration) -> Option<ScheduledStep<T>> {
        match self.queue.peek() {
            Some(next) if next.due <= now => self.queue.pop(),
            _ => None,
        }
    }

    /// Due time of the earliest pending step
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|step| step.due)
    }

    /// Drop every pending step
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Number of pending steps
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_timeline_creation() {
        let timeline: Timeline<u8> = Timeline::new();
        assert!(timeline.is_empty());
        assert_eq!(timeline.len(), 0);
        assert_eq!(timeline.next_due(), None);
    }

    #[test]
    fn test_step_ordering() {
        let mut timeline = Timeline::new();

        // Schedule steps out of order
        timeline.schedule(ms(48), 0, 'c');
        timeline.schedule(ms(0), 0, 'a');
        timeline.schedule(ms(24), 0, 'b');

        let drained: Vec<char> = std::iter::from_fn(|| timeline.pop_due(ms(1000)))
            .map(|s| s.step)
            .collect();
        assert_eq!(drained, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut timeline = Timeline::new();
        for step in 0..10u8 {
            timeline.schedule(ms(100), 0, step);
        }

        let drained: Vec<u8> = std::iter::from_fn(|| timeline.pop_due(ms(100)))
            .map(|s| s.step)
            .collect();
        assert_eq!(drained, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_never_fires_early() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(300), 0, ());

        assert!(timeline.pop_due(ms(299)).is_none());
        assert_eq!(timeline.len(), 1);

        let step = timeline.pop_due(ms(300)).unwrap();
        assert_eq!(step.due, ms(300));
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_generation_is_carried() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(10), 7, "late");

        let step = timeline.pop_due(ms(10)).unwrap();
        assert_eq!(step.generation, 7);
        assert_eq!(step.step, "late");
    }

    #[test]
    fn test_clear() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(0), 0, 1);
        timeline.schedule(ms(24), 0, 2);

        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.next_due(), Some(ms(0)));
        timeline.clear();
        assert_eq!(timeline.len(), 0);
        assert_eq!(timeline.next_due(), None);
    }
}
