//! Per-person status: app ownership, immunity and the rolling interaction history.
use std::collections::VecDeque;
use std::fmt;

use log::trace;
use serde::Serialize;

use crate::context::Context;
use crate::define_data_plugin;
use crate::define_rng;
use crate::parameters::ContextParametersExt;
use crate::random::ContextRandomExt;
use crate::HashMap;

/// Number of days of contacts an interaction history covers.
pub const HISTORY_DAYS: usize = 14;

define_rng!(AppOwnershipRng);

/// A person's stable index in `[0, population_size)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PersonId(usize);

impl PersonId {
    #[must_use]
    pub fn new(index: usize) -> PersonId {
        PersonId(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Person {}", self.0)
    }
}

/// Contacts of the last 14 days in insertion order. Repeated contacts across days are kept as
/// separate entries; `counts` holds the multiplicity of each contact for O(1) membership tests.
#[derive(Debug, Default)]
struct InteractionHistory {
    contacts: VecDeque<PersonId>,
    counts: HashMap<PersonId, u32>,
}

impl InteractionHistory {
    fn contains(&self, person_id: PersonId) -> bool {
        self.counts.contains_key(&person_id)
    }

    fn push(&mut self, person_id: PersonId) {
        self.contacts.push_back(person_id);
        *self.counts.entry(person_id).or_insert(0) += 1;
    }

    /// Drops the oldest entries until at most `capacity` remain.
    fn truncate_front(&mut self, capacity: usize) {
        while self.contacts.len() > capacity {
            let Some(oldest) = self.contacts.pop_front() else {
                break;
            };
            if let Some(count) = self.counts.get_mut(&oldest) {
                *count -= 1;
                if *count == 0 {
                    self.counts.remove(&oldest);
                }
            }
        }
    }
}

#[derive(Debug)]
struct Person {
    has_app: bool,
    immune: bool,
    history: InteractionHistory,
}

#[derive(Default)]
struct PopulationData {
    people: Vec<Person>,
    history_capacity: usize,
}

define_data_plugin!(PopulationPlugin, PopulationData, PopulationData::default());

/// Creates the population. Each person independently owns the app with probability
/// `app_percent_usage`.
pub fn init(context: &mut Context) {
    trace!("Initializing population");
    let parameters = *context.get_parameters();
    let people: Vec<Person> = (0..parameters.population_size)
        .map(|_| Person {
            has_app: context.sample_bool(AppOwnershipRng, parameters.app_percent_usage),
            immune: false,
            history: InteractionHistory::default(),
        })
        .collect();

    let data_container = context.get_data_mut(PopulationPlugin);
    data_container.people = people;
    data_container.history_capacity = parameters.history_capacity();
}

pub trait ContextPopulationExt {
    fn get_population_size(&self) -> usize;

    fn has_app(&self, person_id: PersonId) -> bool;

    fn get_app_user_count(&self) -> usize;

    fn is_immune(&self, person_id: PersonId) -> bool;

    /// Marks a person immune. Immunity is permanent.
    fn set_immune(&mut self, person_id: PersonId);

    fn get_immune_count(&self) -> usize;

    /// Returns true if `other` appears anywhere in the interaction history of `person_id`.
    fn has_interacted_with(&self, person_id: PersonId, other: PersonId) -> bool;

    /// Records an interaction in the history of both people.
    fn record_interaction(&mut self, person_id: PersonId, other: PersonId);

    /// A copy of the interaction history of `person_id`, oldest first.
    fn get_interaction_history(&self, person_id: PersonId) -> Vec<PersonId>;

    fn get_interaction_history_len(&self, person_id: PersonId) -> usize;

    /// Drops the oldest entries of every history that is over the 14 day capacity.
    fn truncate_interaction_histories(&mut self);
}

impl ContextPopulationExt for Context {
    fn get_population_size(&self) -> usize {
        self.get_data(PopulationPlugin).people.len()
    }

    fn has_app(&self, person_id: PersonId) -> bool {
        self.get_data(PopulationPlugin).people[person_id.0].has_app
    }

    fn get_app_user_count(&self) -> usize {
        self.get_data(PopulationPlugin)
            .people
            .iter()
            .filter(|person| person.has_app)
            .count()
    }

    fn is_immune(&self, person_id: PersonId) -> bool {
        self.get_data(PopulationPlugin).people[person_id.0].immune
    }

    fn set_immune(&mut self, person_id: PersonId) {
        trace!("{person_id} is now immune");
        self.get_data_mut(PopulationPlugin).people[person_id.0].immune = true;
    }

    fn get_immune_count(&self) -> usize {
        self.get_data(PopulationPlugin)
            .people
            .iter()
            .filter(|person| person.immune)
            .count()
    }

    fn has_interacted_with(&self, person_id: PersonId, other: PersonId) -> bool {
        self.get_data(PopulationPlugin).people[person_id.0]
            .history
            .contains(other)
    }

    fn record_interaction(&mut self, person_id: PersonId, other: PersonId) {
        debug_assert_ne!(person_id, other, "a person cannot interact with themselves");
        let people = &mut self.get_data_mut(PopulationPlugin).people;
        people[person_id.0].history.push(other);
        people[other.0].history.push(person_id);
    }

    fn get_interaction_history(&self, person_id: PersonId) -> Vec<PersonId> {
        self.get_data(PopulationPlugin).people[person_id.0]
            .history
            .contacts
            .iter()
            .copied()
            .collect()
    }

    fn get_interaction_history_len(&self, person_id: PersonId) -> usize {
        self.get_data(PopulationPlugin).people[person_id.0]
            .history
            .contacts
            .len()
    }

    fn truncate_interaction_histories(&mut self) {
        let data_container = self.get_data_mut(PopulationPlugin);
        let capacity = data_container.history_capacity;
        for person in &mut data_container.people {
            person.history.truncate_front(capacity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ModelParameters;

    fn init_context(population_size: usize, app_percent_usage: f64) -> Context {
        let mut context = Context::new();
        context.init_random(42);
        context.set_parameters(ModelParameters {
            population_size,
            interaction_amount: 1,
            spread_rate: 0.0,
            app_percent_usage,
            covid_percent_start: 0.0,
        });
        init(&mut context);
        context
    }

    #[test]
    fn app_ownership_extremes() {
        let context = init_context(50, 0.0);
        assert_eq!(context.get_population_size(), 50);
        assert_eq!(context.get_app_user_count(), 0);

        let context = init_context(50, 1.0);
        assert_eq!(context.get_app_user_count(), 50);
    }

    #[test]
    fn app_ownership_frequency() {
        let context = init_context(10_000, 0.3);
        let app_users = context.get_app_user_count();
        // The expected value of `app_users` is 3000.
        assert!((app_users as i64 - 3000).abs() < 200, "{app_users}");
    }

    #[test]
    fn interactions_are_symmetric() {
        let mut context = init_context(10, 0.0);
        let (a, b, c) = (PersonId::new(0), PersonId::new(1), PersonId::new(2));
        context.record_interaction(a, b);

        assert!(context.has_interacted_with(a, b));
        assert!(context.has_interacted_with(b, a));
        assert!(!context.has_interacted_with(a, c));
        assert_eq!(context.get_interaction_history(a), vec![b]);
        assert_eq!(context.get_interaction_history(b), vec![a]);
    }

    #[test]
    fn truncation_drops_oldest_and_keeps_repeats() {
        // interaction_amount 1 keeps 14 entries
        let mut context = init_context(20, 0.0);
        let person = PersonId::new(0);
        for other in 1..=15 {
            context.record_interaction(person, PersonId::new(other));
        }
        context.record_interaction(person, PersonId::new(15));
        assert_eq!(context.get_interaction_history_len(person), 16);

        context.truncate_interaction_histories();
        assert_eq!(context.get_interaction_history_len(person), HISTORY_DAYS);
        assert!(!context.has_interacted_with(person, PersonId::new(1)));
        assert!(!context.has_interacted_with(person, PersonId::new(2)));
        assert!(context.has_interacted_with(person, PersonId::new(3)));
        let history = context.get_interaction_history(person);
        assert_eq!(history.last(), Some(&PersonId::new(15)));
        assert_eq!(history[history.len() - 2], PersonId::new(15));
    }

    #[test]
    fn repeated_contact_survives_partial_truncation() {
        let mut history = InteractionHistory::default();
        let (a, b) = (PersonId::new(1), PersonId::new(2));
        history.push(a);
        history.push(b);
        history.push(a);
        history.truncate_front(2);
        assert!(history.contains(a));
        assert!(history.contains(b));
        history.truncate_front(1);
        assert!(history.contains(a));
        assert!(!history.contains(b));
    }

    #[test]
    fn immunity() {
        let mut context = init_context(5, 0.0);
        let person = PersonId::new(3);
        assert!(!context.is_immune(person));
        context.set_immune(person);
        assert!(context.is_immune(person));
        assert_eq!(context.get_immune_count(), 1);
    }
}
