//! Alerts from the app. When an app owner's infection countdown reaches zero, every app-owning
//! contact in their history is either promoted to immune (if already infected) or quarantined.
use log::{debug, trace};

use crate::context::Context;
use crate::define_data_plugin;
use crate::infection_manager::ContextInfectionExt;
use crate::population::{ContextPopulationExt, PersonId};
use crate::quarantine_manager::ContextQuarantineExt;

#[derive(Default)]
struct ContactTracingData {
    alerts: usize,
    quarantines: usize,
    promotions: usize,
}

define_data_plugin!(
    ContactTracingPlugin,
    ContactTracingData,
    ContactTracingData::default()
);

pub fn init(context: &mut Context) {
    trace!("Initializing contact_tracing");
    let _ = context.get_data_mut(ContactTracingPlugin);
}

/// Processes the contacts of one alerting person.
fn alert_contacts(context: &mut Context, person_id: PersonId) {
    let mut quarantines = 0;
    let mut promotions = 0;
    for contact in context.get_interaction_history(person_id) {
        if !context.has_app(contact)
            || context.is_immune(contact)
            || context.was_quarantined_at_day_start(contact)
        {
            continue;
        }
        if context.was_infected_at_day_start(contact) {
            context.promote_to_immune(contact);
            promotions += 1;
        } else if context.quarantine(contact) {
            quarantines += 1;
        }
    }
    trace!("{person_id} alerted {quarantines} quarantines and {promotions} promotions");

    let data_container = context.get_data_mut(ContactTracingPlugin);
    data_container.alerts += 1;
    data_container.quarantines += quarantines;
    data_container.promotions += promotions;
}

/// Runs the tracing phase of the current day.
pub fn trace_contacts(context: &mut Context) {
    let alerting = context.get_alerting_people();
    for &person_id in &alerting {
        alert_contacts(context, person_id);
    }
    debug!(
        "day {}: {} alerting app owners",
        context.get_current_day(),
        alerting.len()
    );
}

pub trait ContextContactTracingExt {
    /// Number of alerts raised since the simulation started.
    fn get_alert_count(&self) -> usize;

    /// Number of quarantine records created by alerts.
    fn get_traced_quarantine_count(&self) -> usize;

    /// Number of infected contacts promoted to immune by alerts.
    fn get_promotion_count(&self) -> usize;
}

impl ContextContactTracingExt for Context {
    fn get_alert_count(&self) -> usize {
        self.get_data(ContactTracingPlugin).alerts
    }

    fn get_traced_quarantine_count(&self) -> usize {
        self.get_data(ContactTracingPlugin).quarantines
    }

    fn get_promotion_count(&self) -> usize {
        self.get_data(ContactTracingPlugin).promotions
    }
}
