//! The `Context` hosts a simulation: it keeps the simulated day, the queue of
//! plans and callbacks, and the type-keyed data containers that modules use
//! to hold their state.
use std::any::{Any, TypeId};
use std::collections::VecDeque;

use log::trace;

use crate::hashing::{HashMap, HashMapExt};
use crate::plan::{ExecutionPhase, PlanId, Queue};

/// A trait for objects that can provide data containers to be held by `Context`
pub trait DataPlugin: Any {
    type DataContainer;

    fn create_data_container() -> Self::DataContainer;
}

/// Defines a new type for storing data in `Context`.
#[macro_export]
macro_rules! define_data_plugin {
    ($plugin:ident, $data_container:ty, $default: expr) => {
        struct $plugin;

        impl $crate::context::DataPlugin for $plugin {
            type DataContainer = $data_container;

            fn create_data_container() -> Self::DataContainer {
                $default
            }
        }
    };
}
pub use define_data_plugin;

type Callback = dyn FnOnce(&mut Context);

/// A manager for the state of a simulation.
///
/// Plans are keyed by simulated day. On each day the plans run in
/// `ExecutionPhase` order and, within a phase, in the order they were added.
/// Callbacks queued with `queue_callback` run before the next plan.
pub struct Context {
    plan_queue: Queue<Box<Callback>>,
    callback_queue: VecDeque<Box<Callback>>,
    data_plugins: HashMap<TypeId, Box<dyn Any>>,
    current_day: u64,
    shutdown_requested: bool,
}

impl Context {
    /// Create a new empty `Context`
    #[must_use]
    pub fn new() -> Context {
        Context {
            plan_queue: Queue::new(),
            callback_queue: VecDeque::new(),
            data_plugins: HashMap::new(),
            current_day: 0,
            shutdown_requested: false,
        }
    }

    /// Add a plan to run on `day` in the `Normal` phase.
    ///
    /// # Panics
    ///
    /// Panics if `day` is earlier than the current day.
    pub fn add_plan(&mut self, day: u64, callback: impl FnOnce(&mut Context) + 'static) -> PlanId {
        self.add_plan_with_phase(day, callback, ExecutionPhase::Normal)
    }

    /// Add a plan to run on `day` in the given phase.
    ///
    /// # Panics
    ///
    /// Panics if `day` is earlier than the current day.
    pub fn add_plan_with_phase(
        &mut self,
        day: u64,
        callback: impl FnOnce(&mut Context) + 'static,
        phase: ExecutionPhase,
    ) -> PlanId {
        assert!(
            day >= self.current_day,
            "Plan day {day} is before the current day {}",
            self.current_day
        );
        trace!("adding plan at {day}");
        self.plan_queue.add_plan(day, Box::new(callback), phase)
    }

    /// Cancel a plan that has not run yet.
    ///
    /// # Panics
    ///
    /// Panics if the plan has already run or was already cancelled.
    pub fn cancel_plan(&mut self, id: &PlanId) {
        trace!("canceling plan {id:?}");
        self.plan_queue.cancel_plan(id);
    }

    /// Run `callback` before the next plan.
    pub fn queue_callback(&mut self, callback: impl FnOnce(&mut Context) + 'static) {
        self.callback_queue.push_back(Box::new(callback));
    }

    /// Stop `execute` once the running callback returns. Pending plans are dropped.
    pub fn shutdown(&mut self) {
        trace!("shutdown requested at day {}", self.current_day);
        self.shutdown_requested = true;
    }

    /// Get a mutable reference to the data container for `T`, creating it with
    /// its default value on first use.
    #[allow(clippy::needless_pass_by_value)]
    pub fn get_data_mut<T: DataPlugin>(&mut self, _plugin: T) -> &mut T::DataContainer {
        self.data_plugins
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::create_data_container()))
            .downcast_mut::<T::DataContainer>()
            .expect("Data container type mismatch")
    }

    /// Get a reference to the data container for `T`, or `None` if it has
    /// never been created.
    #[allow(clippy::needless_pass_by_value)]
    #[must_use]
    pub fn get_data<T: DataPlugin>(&self, _plugin: T) -> Option<&T::DataContainer> {
        self.data_plugins
            .get(&TypeId::of::<T>())
            .and_then(|container| container.downcast_ref::<T::DataContainer>())
    }

    #[must_use]
    pub fn get_current_day(&self) -> u64 {
        self.current_day
    }

    /// Run plans and callbacks until none remain or `shutdown` is called.
    pub fn execute(&mut self) {
        trace!("entering event loop");
        loop {
            if self.shutdown_requested {
                self.shutdown_requested = false;
                self.callback_queue.clear();
                self.plan_queue.clear();
                break;
            }

            if let Some(callback) = self.callback_queue.pop_front() {
                callback(self);
                continue;
            }

            if let Some(plan) = self.plan_queue.get_next_plan() {
                self.current_day = plan.day;
                (plan.data)(self);
            } else {
                break;
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
