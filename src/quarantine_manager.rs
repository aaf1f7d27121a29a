//! Quarantine records created by contact tracing.
use log::{debug, trace};

use crate::context::Context;
use crate::define_data_plugin;
use crate::population::PersonId;
use crate::{HashSet, IndexMap};

/// Length of a quarantine.
pub const QUARANTINE_DAYS: u32 = 14;

#[derive(Default)]
struct QuarantineData {
    /// Days remaining per quarantined person
    records: IndexMap<PersonId, u32>,
    /// Quarantined people as of the start of the day
    quarantined_index: HashSet<PersonId>,
}

define_data_plugin!(QuarantinePlugin, QuarantineData, QuarantineData::default());

pub fn init(context: &mut Context) {
    trace!("Initializing quarantine_manager");
    let _ = context.get_data_mut(QuarantinePlugin);
}

pub trait ContextQuarantineExt {
    /// Returns true if the person currently holds a quarantine record.
    fn is_quarantined(&self, person_id: PersonId) -> bool;

    /// Returns true if the person was quarantined at the start of the current day.
    fn was_quarantined_at_day_start(&self, person_id: PersonId) -> bool;

    fn get_quarantine_days_remaining(&self, person_id: PersonId) -> Option<u32>;

    fn get_quarantined_count(&self) -> usize;

    /// Quarantines a person for `QUARANTINE_DAYS`. An existing record keeps its countdown.
    /// Returns true if a new record was created.
    fn quarantine(&mut self, person_id: PersonId) -> bool;

    /// Snapshots the quarantined people for the rest of the day.
    fn refresh_quarantine_index(&mut self);

    /// Removes records at zero days and decrements the rest.
    fn advance_quarantines(&mut self);
}

impl ContextQuarantineExt for Context {
    fn is_quarantined(&self, person_id: PersonId) -> bool {
        self.get_data(QuarantinePlugin)
            .records
            .contains_key(&person_id)
    }

    fn was_quarantined_at_day_start(&self, person_id: PersonId) -> bool {
        self.get_data(QuarantinePlugin)
            .quarantined_index
            .contains(&person_id)
    }

    fn get_quarantine_days_remaining(&self, person_id: PersonId) -> Option<u32> {
        self.get_data(QuarantinePlugin)
            .records
            .get(&person_id)
            .copied()
    }

    fn get_quarantined_count(&self) -> usize {
        self.get_data(QuarantinePlugin).records.len()
    }

    fn quarantine(&mut self, person_id: PersonId) -> bool {
        let records = &mut self.get_data_mut(QuarantinePlugin).records;
        if records.contains_key(&person_id) {
            return false;
        }
        records.insert(person_id, QUARANTINE_DAYS);
        trace!("{person_id} quarantined for {QUARANTINE_DAYS} days");
        true
    }

    fn refresh_quarantine_index(&mut self) {
        let data_container = self.get_data_mut(QuarantinePlugin);
        data_container.quarantined_index = data_container.records.keys().copied().collect();
    }

    fn advance_quarantines(&mut self) {
        let records = &mut self.get_data_mut(QuarantinePlugin).records;
        let before = records.len();
        records.retain(|_, days| {
            if *days == 0 {
                false
            } else {
                *days -= 1;
                true
            }
        });
        debug!("{} quarantines ended", before - records.len());
    }
}
