//! Deferred work on the simulation clock.
//!
//! Everything that used to be a wall-clock timer (wave starts, staggered enemy
//! spawns, the repeating power-up check) is a `Task` queued here with a due
//! time. The world drains due tasks once per tick, so pausing the simulation
//! pauses every timer with it and `clear` cancels them all at once.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    StartWave(u32),
    SpawnEnemy { wave: u32 },
    PowerupCheck,
}

#[derive(Debug)]
struct Entry<T> {
    due: Duration,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed: BinaryHeap is a max-heap and we want the earliest (due, seq) on top.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug)]
pub struct Scheduler<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(&mut self, due: Duration, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { due, seq, task });
    }

    /// Removes and returns the earliest task due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<T> {
        if self.heap.peek()?.due > now {
            return None;
        }
        self.heap.pop().map(|entry| entry.task)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.heap.iter().map(|entry| &entry.task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn pops_in_due_order() {
        let mut s = Scheduler::new();
        s.schedule_at(ms(300), "c");
        s.schedule_at(ms(100), "a");
        s.schedule_at(ms(200), "b");

        assert_eq!(s.pop_due(ms(1000)), Some("a"));
        assert_eq!(s.pop_due(ms(1000)), Some("b"));
        assert_eq!(s.pop_due(ms(1000)), Some("c"));
        assert_eq!(s.pop_due(ms(1000)), None);
    }

    #[test]
    fn equal_due_times_are_fifo() {
        let mut s = Scheduler::new();
        for i in 0..10 {
            s.schedule_at(ms(50), i);
        }
        let order: Vec<i32> = std::iter::from_fn(|| s.pop_due(ms(50))).collect();
        assert_eq!(order, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn nothing_pops_before_it_is_due() {
        let mut s = Scheduler::new();
        s.schedule_at(ms(1000), Task::PowerupCheck);
        assert_eq!(s.pop_due(ms(999)), None);
        assert_eq!(s.pop_due(ms(1000)), Some(Task::PowerupCheck));
    }

    #[test]
    fn clear_cancels_everything() {
        let mut s = Scheduler::new();
        s.schedule_at(ms(10), Task::StartWave(1));
        s.schedule_at(ms(20), Task::SpawnEnemy { wave: 1 });
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.pop_due(ms(10_000)), None);
    }
}
