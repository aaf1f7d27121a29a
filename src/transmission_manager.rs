//! Infection across a single realized interaction.
use log::trace;

use crate::context::Context;
use crate::define_data_plugin;
use crate::define_rng;
use crate::infection_manager::ContextInfectionExt;
use crate::parameters::ContextParametersExt;
use crate::population::{ContextPopulationExt, PersonId};
use crate::quarantine_manager::ContextQuarantineExt;
use crate::random::ContextRandomExt;

define_rng!(TransmissionRng);

#[derive(Default)]
struct TransmissionData {
    /// Pairs with exactly one infected side and an eligible other side
    eligible_contacts: usize,
    transmissions: usize,
}

define_data_plugin!(
    TransmissionPlugin,
    TransmissionData,
    TransmissionData::default()
);

pub fn init(context: &mut Context) {
    trace!("Initializing transmission_manager");
    let _ = context.get_data_mut(TransmissionPlugin);
}

fn is_susceptible(context: &Context, person_id: PersonId) -> bool {
    !context.is_infected(person_id)
        && !context.is_immune(person_id)
        && !context.is_quarantined(person_id)
        && !context.was_quarantined_at_day_start(person_id)
        && !context.is_pending_infection(person_id)
}

/// Evaluates one realized interaction. If exactly one side was infected at the start of the day
/// and the other side is susceptible, the susceptible side is staged for infection with
/// probability `spread_rate`. Returns the newly staged person.
pub fn evaluate_pair(context: &mut Context, a: PersonId, b: PersonId) -> Option<PersonId> {
    let target = match (
        context.was_infected_at_day_start(a),
        context.was_infected_at_day_start(b),
    ) {
        (true, false) => b,
        (false, true) => a,
        _ => return None,
    };
    if !is_susceptible(context, target) {
        return None;
    }

    context.get_data_mut(TransmissionPlugin).eligible_contacts += 1;
    let spread_rate = context.get_parameters().spread_rate;
    if !context.sample_bool(TransmissionRng, spread_rate) {
        return None;
    }

    context.stage_infection(target);
    context.get_data_mut(TransmissionPlugin).transmissions += 1;
    trace!("{target} exposed on day {}", context.get_current_day());
    Some(target)
}

pub trait ContextTransmissionExt {
    /// Number of interactions that were eligible for transmission.
    fn get_eligible_contact_count(&self) -> usize;

    fn get_transmission_count(&self) -> usize;
}

impl ContextTransmissionExt for Context {
    fn get_eligible_contact_count(&self) -> usize {
        self.get_data(TransmissionPlugin).eligible_contacts
    }

    fn get_transmission_count(&self) -> usize {
        self.get_data(TransmissionPlugin).transmissions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ModelParameters;
    use crate::{infection_manager, population, quarantine_manager};

    fn init_context(spread_rate: f64) -> Context {
        let mut context = Context::new();
        context.init_random(42);
        context.set_parameters(ModelParameters {
            population_size: 10,
            interaction_amount: 1,
            spread_rate,
            app_percent_usage: 0.0,
            covid_percent_start: 0.0,
        });
        population::init(&mut context);
        quarantine_manager::init(&mut context);
        infection_manager::init(&mut context);
        init(&mut context);
        context
    }

    fn infect(context: &mut Context, person_id: PersonId) {
        context.stage_infection(person_id);
        context.commit_pending_infections();
        context.refresh_infected_index();
        context.refresh_quarantine_index();
    }

    #[test]
    fn either_side_can_be_the_source() {
        let mut context = init_context(1.0);
        let (a, b, c) = (PersonId::new(0), PersonId::new(1), PersonId::new(2));
        infect(&mut context, a);

        assert_eq!(evaluate_pair(&mut context, a, b), Some(b));
        assert_eq!(evaluate_pair(&mut context, c, a), Some(c));
        assert!(context.is_pending_infection(b));
        assert!(context.is_pending_infection(c));
        assert_eq!(context.get_transmission_count(), 2);
    }

    #[test]
    fn no_transmission_between_two_infected_or_two_healthy() {
        let mut context = init_context(1.0);
        let (a, b, c, d) = (
            PersonId::new(0),
            PersonId::new(1),
            PersonId::new(2),
            PersonId::new(3),
        );
        infect(&mut context, a);
        infect(&mut context, b);

        assert_eq!(evaluate_pair(&mut context, a, b), None);
        assert_eq!(evaluate_pair(&mut context, c, d), None);
        assert_eq!(context.get_eligible_contact_count(), 0);
    }

    #[test]
    fn infected_after_day_start_cannot_transmit() {
        let mut context = init_context(1.0);
        let (a, b) = (PersonId::new(0), PersonId::new(1));
        context.stage_infection(a);
        context.commit_pending_infections();
        assert_eq!(evaluate_pair(&mut context, a, b), None);
    }

    #[test]
    fn ineligible_targets() {
        let mut context = init_context(1.0);
        let source = PersonId::new(0);
        let (immune, quarantined, pending) = (PersonId::new(1), PersonId::new(2), PersonId::new(3));
        context.set_immune(immune);
        context.quarantine(quarantined);
        infect(&mut context, source);
        assert_eq!(evaluate_pair(&mut context, source, pending), Some(pending));

        assert_eq!(evaluate_pair(&mut context, source, immune), None);
        assert_eq!(evaluate_pair(&mut context, source, quarantined), None);
        assert_eq!(evaluate_pair(&mut context, source, pending), None);
        assert_eq!(context.get_total_infected(), 2);
    }

    #[test]
    fn zero_spread_rate_counts_eligible_contacts_only() {
        let mut context = init_context(0.0);
        let (a, b) = (PersonId::new(0), PersonId::new(1));
        infect(&mut context, a);
        for _ in 0..10 {
            assert_eq!(evaluate_pair(&mut context, a, b), None);
        }
        assert_eq!(context.get_eligible_contact_count(), 10);
        assert_eq!(context.get_transmission_count(), 0);
    }
}
