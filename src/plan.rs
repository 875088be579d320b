//! A priority queue that stores arbitrary data sorted by simulated day
//!
//! Defines a `Queue<T>` that is intended to store a queue of items of type
//! T - sorted by `u64` day and then by `ExecutionPhase` - called 'plans'.
//! This queue has methods for adding plans, cancelling plans, and retrieving
//! the earliest plan in the queue. Adding a plan is *O*(log(*n*)) while
//! cancellation and retrieval are *O*(1).
//!
//! This queue is used by `Context` to store the daily tick and any other
//! callback closure `FnOnce(&mut Context)` that should run on a given day.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::hashing::{HashMap, HashMapExt};

/// The phase of a day in which a plan runs. Plans scheduled for the same day
/// run `First`, then `Normal`, then `Last`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ExecutionPhase {
    First,
    #[default]
    Normal,
    Last,
}

/// A priority queue that stores arbitrary data sorted by day
///
/// Items of type `T` are stored in order by `u64` day and called `Plan<T>`.
/// When plans are created they are sequentially assigned a `PlanId` that is a
/// wrapped `u64`. If two plans are scheduled for the same day then the plan
/// with the earlier phase is placed earlier. If two plans have the same day
/// and phase then the plan that is scheduled first (i.e., that has the
/// lowest id) is placed earlier.
///
/// The day, plan id, and phase are stored in a binary heap of `Entry`
/// objects. The data payload of the plan is stored in a hash map by plan id.
/// Plan cancellation occurs by removing the corresponding entry from the data
/// hash map.
pub struct Queue<T> {
    queue: BinaryHeap<Entry>,
    data_map: HashMap<u64, T>,
    plan_counter: u64,
}

impl<T> Queue<T> {
    /// Create a new empty `Queue<T>`
    #[must_use]
    pub fn new() -> Queue<T> {
        Queue {
            queue: BinaryHeap::new(),
            data_map: HashMap::new(),
            plan_counter: 0,
        }
    }

    /// Add a plan to the queue on the specified day
    ///
    /// Returns a `PlanId` for the newly-added plan that can be used to cancel it
    /// if needed.
    pub fn add_plan(&mut self, day: u64, data: T, phase: ExecutionPhase) -> PlanId {
        let id = self.plan_counter;
        self.queue.push(Entry { day, phase, id });
        self.data_map.insert(id, data);
        self.plan_counter += 1;
        PlanId { id }
    }

    /// Cancel a plan that has been added to the queue
    ///
    /// # Panics
    ///
    /// This function panics if you cancel a plan which has already
    /// been cancelled or executed.
    pub fn cancel_plan(&mut self, id: &PlanId) {
        // The entry stays in the heap and is skipped when popped
        self.data_map.remove(&id.id).expect("Plan does not exist");
    }

    /// Returns true if no live plans remain
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data_map.is_empty()
    }

    /// Drops every pending plan
    pub fn clear(&mut self) {
        self.queue.clear();
        self.data_map.clear();
    }

    /// Retrieve the earliest plan in the queue
    ///
    /// Returns the next plan if it exists or else `None` if the queue is empty
    pub fn get_next_plan(&mut self) -> Option<Plan<T>> {
        while let Some(entry) = self.queue.pop() {
            if let Some(data) = self.data_map.remove(&entry.id) {
                return Some(Plan {
                    day: entry.day,
                    data,
                });
            }
        }
        None
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A day, phase and id object used to order plans in the `Queue<T>`
#[derive(PartialEq, Eq, Debug)]
struct Entry {
    day: u64,
    phase: ExecutionPhase,
    id: u64,
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Entries are ordered in increasing order by day, phase and then plan id.
/// `BinaryHeap` is a max-heap, so the comparison is reversed.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.day
            .cmp(&other.day)
            .then(self.phase.cmp(&other.phase))
            .then(self.id.cmp(&other.id))
            .reverse()
    }
}

/// A unique identifier for a plan added to a `Queue<T>`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlanId {
    id: u64,
}

/// A plan that holds data of type `T` intended to be used on the specified day
pub struct Plan<T> {
    pub day: u64,
    pub data: T,
}
