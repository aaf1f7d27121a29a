//! The `Context` owns all state of one simulation instance: the day schedule and the data
//! containers of every module. Modules keep their state in a data plugin and expose it through a
//! `Context*Ext` trait, so a simulation is nothing more than a `Context` plus the plans that
//! were added to it.
use std::any::{Any, TypeId};

use log::trace;

use crate::plan::Queue;
use crate::HashMap;

/// A trait for objects that can provide data containers to be held by `Context`
pub trait DataPlugin: Any {
    type DataContainer;

    fn create_data_container() -> Self::DataContainer;
}

/// Defines a new type for storing data in Context.
#[macro_export]
macro_rules! define_data_plugin {
    ($data_plugin:ident, $data_container:ty, $default: expr) => {
        #[derive(Copy, Clone)]
        struct $data_plugin;

        impl $crate::context::DataPlugin for $data_plugin {
            type DataContainer = $data_container;

            fn create_data_container() -> Self::DataContainer {
                $default
            }
        }
    };
}
pub use define_data_plugin;

/// The steps of a simulated day. Plans scheduled for the same day run in this order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DayPhase {
    /// Recompute the quarantined and infected index sets read by the rest of the day
    RefreshIndices,
    /// Sample contacts and evaluate transmission for each realized pair
    Interaction,
    /// Alert and quarantine the contacts of symptomatic app owners
    ContactTracing,
    /// Age infection and quarantine countdowns and commit new infections
    Advance,
}

type Callback = dyn FnOnce(&mut Context);

pub struct Context {
    plan_queue: Queue<Box<Callback>, DayPhase>,
    data_plugins: HashMap<TypeId, Box<dyn Any>>,
    current_day: u32,
}

impl Context {
    #[must_use]
    pub fn new() -> Context {
        Context {
            plan_queue: Queue::new(),
            data_plugins: HashMap::default(),
            current_day: 0,
        }
    }

    /// Add a plan to run on `day` during `phase`.
    ///
    /// # Panics
    ///
    /// Panics if `day` is earlier than the current day.
    pub fn add_plan(
        &mut self,
        day: u32,
        phase: DayPhase,
        callback: impl FnOnce(&mut Context) + 'static,
    ) {
        assert!(
            day >= self.current_day,
            "Invalid day {day}: current day is {}",
            self.current_day
        );
        trace!("adding plan at day {day} ({phase:?})");
        self.plan_queue.add_plan(day, Box::new(callback), phase);
    }

    /// Returns a mutable reference to the data container for `T`, creating it if it doesn't
    /// exist yet.
    #[allow(clippy::missing_panics_doc)]
    pub fn get_data_mut<T: DataPlugin>(&mut self, _plugin: T) -> &mut T::DataContainer {
        self.data_plugins
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::create_data_container()))
            .downcast_mut::<T::DataContainer>()
            .unwrap() // Will never panic as data container has the matching type
    }

    /// Returns a reference to the data container for `T`.
    ///
    /// # Panics
    ///
    /// Panics if the data container has not been created yet by `get_data_mut`. Every module
    /// creates its container in its `init` function.
    pub fn get_data<T: DataPlugin>(&self, _plugin: T) -> &T::DataContainer {
        self.data_plugins
            .get(&TypeId::of::<T>())
            .unwrap_or_else(|| {
                panic!(
                    "data plugin {} was used before it was initialized",
                    std::any::type_name::<T>()
                )
            })
            .downcast_ref::<T::DataContainer>()
            .unwrap()
    }

    /// Returns the day of the plan that is executing, or that executed last.
    #[must_use]
    pub fn get_current_day(&self) -> u32 {
        self.current_day
    }

    /// Execute plans in day and phase order until none remain.
    pub fn execute(&mut self) {
        while let Some(plan) = self.plan_queue.get_next_plan() {
            self.current_day = plan.day;
            (plan.data)(self);
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
