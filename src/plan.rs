//! A priority queue that stores arbitrary data sorted by simulated day
//!
//! Defines a `Queue<T, P>` that stores items of type `T`, called 'plans', sorted by an integer
//! day and then by a definable phase `P` within that day. Adding a plan and retrieving the
//! earliest plan are both *O*(log(*n*)).
//!
//! This queue is used by `Context` to store the steps of each simulated day, where some callback
//! closure `FnOnce(&mut Context)` will be executed on a given day.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A priority queue that stores arbitrary data sorted by day
///
/// Items of type `T` are stored in order by `u32` day and called `Plan<T>`. Plans scheduled for
/// the same day are ordered by phase `P`, lowest first. If two plans have the same day and phase
/// then the plan that was added first is placed earlier.
pub struct Queue<T, P: Ord> {
    queue: BinaryHeap<Entry<T, P>>,
    plan_counter: u64,
}

impl<T, P: Ord> Queue<T, P> {
    /// Create a new empty `Queue<T, P>`
    #[must_use]
    pub fn new() -> Queue<T, P> {
        Queue {
            queue: BinaryHeap::new(),
            plan_counter: 0,
        }
    }

    /// Add a plan to the queue for the given day and phase
    pub fn add_plan(&mut self, day: u32, data: T, phase: P) {
        let id = self.plan_counter;
        self.queue.push(Entry {
            day,
            phase,
            id,
            data,
        });
        self.plan_counter += 1;
    }

    /// Retrieve the earliest plan in the queue
    ///
    /// Returns the next plan if it exists or else `None` if the queue is empty
    pub fn get_next_plan(&mut self) -> Option<Plan<T>> {
        self.queue.pop().map(|entry| Plan {
            day: entry.day,
            data: entry.data,
        })
    }
}

impl<T, P: Ord> Default for Queue<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

/// A plan payload with the day, phase and insertion id that order it in the `Queue<T, P>`
struct Entry<T, P: Ord> {
    day: u32,
    phase: P,
    id: u64,
    data: T,
}

impl<T, P: Ord> PartialEq for Entry<T, P> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T, P: Ord> Eq for Entry<T, P> {}

impl<T, P: Ord> PartialOrd for Entry<T, P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reversed so that the max-heap pops the earliest day, then the lowest phase, then the
/// lowest id. The payload takes no part in the ordering.
impl<T, P: Ord> Ord for Entry<T, P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.day
            .cmp(&other.day)
            .then_with(|| self.phase.cmp(&other.phase))
            .then_with(|| self.id.cmp(&other.id))
            .reverse()
    }
}

/// A plan that holds data of type `T` intended to be used on the specified day
pub struct Plan<T> {
    pub day: u32,
    pub data: T,
}

#[cfg(test)]
mod tests {
    use super::Queue;

    #[test]
    fn plans_come_out_by_day() {
        let mut plan_queue = Queue::new();
        plan_queue.add_plan(1, 1, ());
        plan_queue.add_plan(3, 3, ());
        plan_queue.add_plan(2, 2, ());

        let days: Vec<(u32, i32)> = std::iter::from_fn(|| plan_queue.get_next_plan())
            .map(|plan| (plan.day, plan.data))
            .collect();
        assert_eq!(days, vec![(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn same_day_plans_are_ordered_by_phase_then_insertion() {
        let mut plan_queue = Queue::new();
        plan_queue.add_plan(0, "advance", 3);
        plan_queue.add_plan(0, "interact", 1);
        plan_queue.add_plan(0, "refresh", 0);
        plan_queue.add_plan(0, "interact again", 1);

        let order: Vec<&str> = std::iter::from_fn(|| plan_queue.get_next_plan())
            .map(|plan| plan.data)
            .collect();
        assert_eq!(order, vec!["refresh", "interact", "interact again", "advance"]);
    }

    #[test]
    fn earlier_day_wins_over_lower_phase() {
        let mut plan_queue = Queue::new();
        plan_queue.add_plan(1, 'b', 0);
        plan_queue.add_plan(0, 'a', 9);

        assert_eq!(plan_queue.get_next_plan().unwrap().data, 'a');
        assert_eq!(plan_queue.get_next_plan().unwrap().data, 'b');
    }
}
