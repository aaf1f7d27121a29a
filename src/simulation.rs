//! One simulation instance: a `Context` with every module initialized and a day schedule of
//! four plans per simulated day.
use log::{debug, info, trace};
use serde::Serialize;

use crate::context::{Context, DayPhase};
use crate::error::SimulationError;
use crate::infection_manager::ContextInfectionExt;
use crate::interaction_manager::ContextInteractionExt;
use crate::parameters::{ContextParametersExt, ModelParameters};
use crate::population::{ContextPopulationExt, PersonId};
use crate::quarantine_manager::ContextQuarantineExt;
use crate::random::ContextRandomExt;
use crate::{
    contact_tracing, infection_manager, interaction_manager, population, quarantine_manager,
    transmission_manager,
};

/// The fractions reported at the end of a run, each in `[0, 1]`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct InfectionSummary {
    /// People seeded on day 0 over the population size
    pub start_infection_fraction: f64,
    /// People currently infected over the population size
    pub end_infection_fraction: f64,
    /// People ever infected, seeded ones included, over the population size
    pub total_infected_fraction: f64,
}

pub struct Simulation {
    context: Context,
    /// The first day that has not been scheduled yet
    next_day: u32,
}

impl Simulation {
    /// Validates `parameters` and builds the population with the given base seed.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidParameter` if any parameter is out of range.
    pub fn new(parameters: &ModelParameters, seed: u64) -> Result<Simulation, SimulationError> {
        parameters.validate()?;
        trace!("building simulation with seed {seed}: {parameters:?}");

        let mut context = Context::new();
        context.init_random(seed);
        context.set_parameters(*parameters);
        population::init(&mut context);
        quarantine_manager::init(&mut context);
        infection_manager::init(&mut context);
        transmission_manager::init(&mut context);
        interaction_manager::init(&mut context);
        contact_tracing::init(&mut context);

        Ok(Simulation {
            context,
            next_day: 0,
        })
    }

    /// Runs `days` more days, continuing from the current day, and returns the summary as of
    /// the last completed day.
    pub fn run(&mut self, days: u32) -> InfectionSummary {
        let first_day = self.next_day;
        self.next_day += days;
        for day in first_day..self.next_day {
            schedule_day(&mut self.context, day);
        }
        self.context.execute();
        self.summary()
    }

    #[must_use]
    pub fn summary(&self) -> InfectionSummary {
        let population_size = self.context.get_population_size() as f64;
        InfectionSummary {
            start_infection_fraction: self.context.get_seeded_count() as f64 / population_size,
            end_infection_fraction: self.context.get_infected_count() as f64 / population_size,
            total_infected_fraction: self.context.get_total_infected() as f64 / population_size,
        }
    }

    /// Number of days completed so far.
    #[must_use]
    pub fn days_completed(&self) -> u32 {
        self.next_day
    }

    #[must_use]
    pub fn parameters(&self) -> &ModelParameters {
        self.context.get_parameters()
    }

    #[must_use]
    pub fn population_size(&self) -> usize {
        self.context.get_population_size()
    }

    #[must_use]
    pub fn has_app(&self, person_id: PersonId) -> bool {
        self.context.has_app(person_id)
    }

    #[must_use]
    pub fn is_immune(&self, person_id: PersonId) -> bool {
        self.context.is_immune(person_id)
    }

    #[must_use]
    pub fn is_infected(&self, person_id: PersonId) -> bool {
        self.context.is_infected(person_id)
    }

    #[must_use]
    pub fn is_quarantined(&self, person_id: PersonId) -> bool {
        self.context.is_quarantined(person_id)
    }

    #[must_use]
    pub fn interaction_history_len(&self, person_id: PersonId) -> usize {
        self.context.get_interaction_history_len(person_id)
    }

    #[must_use]
    pub fn infected_count(&self) -> usize {
        self.context.get_infected_count()
    }

    #[must_use]
    pub fn quarantined_count(&self) -> usize {
        self.context.get_quarantined_count()
    }

    #[must_use]
    pub fn total_infected(&self) -> usize {
        self.context.get_total_infected()
    }

    #[must_use]
    pub fn wasted_attempts(&self) -> usize {
        self.context.get_wasted_attempt_count()
    }

    /// The underlying context, for module-level inspection.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }
}

fn schedule_day(context: &mut Context, day: u32) {
    context.add_plan(day, DayPhase::RefreshIndices, refresh_indices);
    context.add_plan(day, DayPhase::Interaction, interaction_manager::interact);
    context.add_plan(day, DayPhase::ContactTracing, contact_tracing::trace_contacts);
    context.add_plan(day, DayPhase::Advance, advance_day);
}

fn refresh_indices(context: &mut Context) {
    context.refresh_quarantine_index();
    context.refresh_infected_index();

    let infected = context.get_infected_count();
    let percent = 100.0 * infected as f64 / context.get_population_size() as f64;
    info!(
        "day {}: {infected} infected ({percent:.2}%)",
        context.get_current_day()
    );
}

fn advance_day(context: &mut Context) {
    context.advance_infections();
    context.advance_quarantines();
    context.commit_pending_infections();
    debug!(
        "day {} done: {} infected, {} quarantined, {} ever infected",
        context.get_current_day(),
        context.get_infected_count(),
        context.get_quarantined_count(),
        context.get_total_infected()
    );

    #[cfg(debug_assertions)]
    check_invariants(context);
}

#[cfg(debug_assertions)]
fn check_invariants(context: &Context) {
    let capacity = context.get_parameters().history_capacity();
    for index in 0..context.get_population_size() {
        let person_id = PersonId::new(index);
        debug_assert!(
            !(context.is_infected(person_id) && context.is_immune(person_id)),
            "{person_id} is both infected and immune"
        );
        debug_assert!(context.get_interaction_history_len(person_id) <= capacity);
    }
}
