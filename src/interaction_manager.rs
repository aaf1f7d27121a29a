//! Daily random mixing. Every person outside quarantine makes `interaction_amount` draws from the
//! whole population; a draw that hits themselves, someone already in their history, or someone
//! quarantined is wasted and not retried.
use log::{debug, trace};

use crate::context::Context;
use crate::define_data_plugin;
use crate::define_rng;
use crate::parameters::ContextParametersExt;
use crate::population::{ContextPopulationExt, PersonId};
use crate::quarantine_manager::ContextQuarantineExt;
use crate::random::ContextRandomExt;
use crate::transmission_manager;

define_rng!(InteractionRng);

#[derive(Default)]
struct InteractionData {
    realized_interactions: usize,
    wasted_attempts: usize,
}

define_data_plugin!(
    InteractionPlugin,
    InteractionData,
    InteractionData::default()
);

pub fn init(context: &mut Context) {
    trace!("Initializing interaction_manager");
    let _ = context.get_data_mut(InteractionPlugin);
}

/// Draws one candidate for `person_id`. Returns `None` if the draw is rejected.
fn draw_contact(context: &Context, person_id: PersonId) -> Option<PersonId> {
    let population_size = context.get_population_size();
    let candidate = PersonId::new(context.sample_range(InteractionRng, 0..population_size));
    if candidate == person_id
        || context.has_interacted_with(person_id, candidate)
        || context.was_quarantined_at_day_start(candidate)
    {
        return None;
    }
    Some(candidate)
}

/// Runs the interaction phase of the current day, passing each realized pair to the
/// transmission model, then truncates every history to its capacity.
pub fn interact(context: &mut Context) {
    let interaction_amount = context.get_parameters().interaction_amount;
    let population_size = context.get_population_size();
    let mut realized = 0;
    let mut wasted = 0;

    for index in 0..population_size {
        let person_id = PersonId::new(index);
        if context.was_quarantined_at_day_start(person_id) {
            continue;
        }
        for _ in 0..interaction_amount {
            let Some(contact) = draw_contact(context, person_id) else {
                wasted += 1;
                continue;
            };
            context.record_interaction(person_id, contact);
            transmission_manager::evaluate_pair(context, person_id, contact);
            realized += 1;
        }
    }
    context.truncate_interaction_histories();

    let data_container = context.get_data_mut(InteractionPlugin);
    data_container.realized_interactions += realized;
    data_container.wasted_attempts += wasted;
    debug!(
        "day {}: {realized} interactions, {wasted} wasted attempts",
        context.get_current_day()
    );
}

pub trait ContextInteractionExt {
    /// Number of accepted draws since the simulation started.
    fn get_realized_interaction_count(&self) -> usize;

    /// Number of rejected draws since the simulation started.
    fn get_wasted_attempt_count(&self) -> usize;
}

impl ContextInteractionExt for Context {
    fn get_realized_interaction_count(&self) -> usize {
        self.get_data(InteractionPlugin).realized_interactions
    }

    fn get_wasted_attempt_count(&self) -> usize {
        self.get_data(InteractionPlugin).wasted_attempts
    }
}
