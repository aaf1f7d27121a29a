//! Infected records, the same-day pending infections, and the infected index used by the rest
//! of the day.
use log::{debug, trace};

use crate::context::Context;
use crate::define_data_plugin;
use crate::define_rng;
use crate::parameters::ContextParametersExt;
use crate::population::{ContextPopulationExt, PersonId};
use crate::quarantine_manager::ContextQuarantineExt;
use crate::random::ContextRandomExt;
use crate::{HashSet, IndexMap, IndexSet};

/// App owners report on a fixed schedule.
pub const APP_OWNER_INFECTION_DAYS: u32 = 2;
/// Bounds of the uniform infection countdown for people without the app.
pub const MIN_INFECTION_DAYS: u32 = 2;
pub const MAX_INFECTION_DAYS: u32 = 14;

define_rng!(SeedingRng);
define_rng!(InfectionDurationRng);

#[derive(Default)]
struct InfectionData {
    /// Days remaining per infected person, in the order the infections were committed
    infected: IndexMap<PersonId, u32>,
    /// Exposed today, committed by `commit_pending_infections`
    pending: IndexSet<PersonId>,
    /// Infected people as of the start of the day
    infected_index: HashSet<PersonId>,
    seeded_count: usize,
    total_infected: usize,
}

define_data_plugin!(InfectionPlugin, InfectionData, InfectionData::default());

fn sample_infection_days(context: &Context, person_id: PersonId) -> u32 {
    if context.has_app(person_id) {
        APP_OWNER_INFECTION_DAYS
    } else {
        context.sample_range(InfectionDurationRng, MIN_INFECTION_DAYS..=MAX_INFECTION_DAYS)
    }
}

/// Seeds the initial infections. Each person is independently infected with probability
/// `covid_percent_start`; seeded people count toward the cumulative total.
pub fn init(context: &mut Context) {
    trace!("Initializing infection_manager");
    let parameters = *context.get_parameters();
    let mut seeded = IndexMap::default();
    for index in 0..parameters.population_size {
        if context.sample_bool(SeedingRng, parameters.covid_percent_start) {
            let person_id = PersonId::new(index);
            seeded.insert(person_id, sample_infection_days(context, person_id));
        }
    }

    let data_container = context.get_data_mut(InfectionPlugin);
    data_container.seeded_count = seeded.len();
    data_container.total_infected = seeded.len();
    data_container.infected = seeded;
    debug!(
        "seeded {} of {} people",
        data_container.seeded_count, parameters.population_size
    );
}

pub trait ContextInfectionExt {
    /// Returns true if the person currently holds an infected record.
    fn is_infected(&self, person_id: PersonId) -> bool;

    /// Returns true if the person was infected at the start of the current day.
    fn was_infected_at_day_start(&self, person_id: PersonId) -> bool;

    fn get_infection_days_remaining(&self, person_id: PersonId) -> Option<u32>;

    fn get_infected_count(&self) -> usize;

    /// Number of people infected on day 0.
    fn get_seeded_count(&self) -> usize;

    /// Number of people ever infected, seeded ones included.
    fn get_total_infected(&self) -> usize;

    fn is_pending_infection(&self, person_id: PersonId) -> bool;

    fn get_pending_infection_count(&self) -> usize;

    /// Stages a new infection for today. Returns false if the person was already staged.
    fn stage_infection(&mut self, person_id: PersonId) -> bool;

    /// Snapshots the infected people for the rest of the day.
    fn refresh_infected_index(&mut self);

    /// App owners whose countdown reached zero, in record order.
    fn get_alerting_people(&self) -> Vec<PersonId>;

    /// Ends an infection early: removes the record and marks the person immune.
    fn promote_to_immune(&mut self, person_id: PersonId);

    /// Removes records at zero days (the person becomes immune) and decrements the rest.
    fn advance_infections(&mut self);

    /// Gives every pending person an infected record and clears the staging set.
    fn commit_pending_infections(&mut self);
}

impl ContextInfectionExt for Context {
    fn is_infected(&self, person_id: PersonId) -> bool {
        self.get_data(InfectionPlugin)
            .infected
            .contains_key(&person_id)
    }

    fn was_infected_at_day_start(&self, person_id: PersonId) -> bool {
        self.get_data(InfectionPlugin)
            .infected_index
            .contains(&person_id)
    }

    fn get_infection_days_remaining(&self, person_id: PersonId) -> Option<u32> {
        self.get_data(InfectionPlugin)
            .infected
            .get(&person_id)
            .copied()
    }

    fn get_infected_count(&self) -> usize {
        self.get_data(InfectionPlugin).infected.len()
    }

    fn get_seeded_count(&self) -> usize {
        self.get_data(InfectionPlugin).seeded_count
    }

    fn get_total_infected(&self) -> usize {
        self.get_data(InfectionPlugin).total_infected
    }

    fn is_pending_infection(&self, person_id: PersonId) -> bool {
        self.get_data(InfectionPlugin).pending.contains(&person_id)
    }

    fn get_pending_infection_count(&self) -> usize {
        self.get_data(InfectionPlugin).pending.len()
    }

    fn stage_infection(&mut self, person_id: PersonId) -> bool {
        debug_assert!(!self.is_infected(person_id), "{person_id} is already infected");
        debug_assert!(!self.is_immune(person_id), "{person_id} is immune");
        debug_assert!(
            !self.is_quarantined(person_id),
            "{person_id} is quarantined"
        );
        let data_container = self.get_data_mut(InfectionPlugin);
        if !data_container.pending.insert(person_id) {
            return false;
        }
        data_container.total_infected += 1;
        trace!("{person_id} staged for infection");
        true
    }

    fn refresh_infected_index(&mut self) {
        let data_container = self.get_data_mut(InfectionPlugin);
        data_container.infected_index = data_container.infected.keys().copied().collect();
    }

    fn get_alerting_people(&self) -> Vec<PersonId> {
        self.get_data(InfectionPlugin)
            .infected
            .iter()
            .filter(|&(&person_id, &days)| days == 0 && self.has_app(person_id))
            .map(|(&person_id, _)| person_id)
            .collect()
    }

    fn promote_to_immune(&mut self, person_id: PersonId) {
        if self
            .get_data_mut(InfectionPlugin)
            .infected
            .swap_remove(&person_id)
            .is_some()
        {
            trace!("{person_id} already infected, promoted to immune");
        }
        self.set_immune(person_id);
    }

    fn advance_infections(&mut self) {
        let mut recovered = Vec::new();
        self.get_data_mut(InfectionPlugin)
            .infected
            .retain(|&person_id, days| {
                if *days == 0 {
                    recovered.push(person_id);
                    false
                } else {
                    *days -= 1;
                    true
                }
            });
        for &person_id in &recovered {
            self.set_immune(person_id);
        }
        debug!("{} infections ended", recovered.len());
    }

    fn commit_pending_infections(&mut self) {
        let pending = std::mem::take(&mut self.get_data_mut(InfectionPlugin).pending);
        let records: Vec<(PersonId, u32)> = pending
            .into_iter()
            .map(|person_id| (person_id, sample_infection_days(self, person_id)))
            .collect();
        debug!("{} new infections committed", records.len());
        let data_container = self.get_data_mut(InfectionPlugin);
        for (person_id, days) in records {
            let previous = data_container.infected.insert(person_id, days);
            debug_assert!(previous.is_none(), "{person_id} infected twice");
        }
    }
}
