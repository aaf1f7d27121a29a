//! A day-stepped epidemic model of app-based contact tracing.
//!
//! A synthetic population mixes at random once per simulated day. Infected people pass the
//! disease to their contacts with a fixed probability, and people who carry the contact tracing
//! app alert their recent contacts when they become symptomatic, sending those contacts into
//! quarantine. A sweep over app adoption levels estimates how much tracing lowers the share of the
//! population that is ever infected.
//!
//! The central object is the `Context`, which holds the state of one simulation instance and its
//! day schedule. Each module keeps its own data in the context and exposes it through an
//! extension trait:
//! * `population`: app ownership, immunity and the 14-day interaction histories
//! * `infection_manager`: seeding, infected records and same-day pending infections
//! * `quarantine_manager`: quarantine records
//! * `interaction_manager`: the daily random mixing
//! * `transmission_manager`: infection across a single interaction
//! * `contact_tracing`: alerts raised by symptomatic app owners
//!
//! A `Simulation` wires these together and schedules four plans per day, ordered by `DayPhase`:
//! refresh the day-start index sets, interact, trace contacts, then age every countdown and
//! commit the day's new infections.
//!
//! ```rust
//! use contact_tracing_sim::{ModelParameters, Simulation};
//!
//! let parameters = ModelParameters {
//!     population_size: 500,
//!     interaction_amount: 5,
//!     spread_rate: 0.1,
//!     app_percent_usage: 0.5,
//!     covid_percent_start: 0.05,
//! };
//! let mut simulation = Simulation::new(&parameters, 42).unwrap();
//! let summary = simulation.run(30);
//! assert!(summary.total_infected_fraction >= summary.end_infection_fraction);
//! ```
pub mod context;
pub mod error;
pub mod hashing;
pub mod log;
pub mod parameters;
pub mod plan;
pub mod random;

pub mod contact_tracing;
pub mod infection_manager;
pub mod interaction_manager;
pub mod population;
pub mod quarantine_manager;
pub mod transmission_manager;

pub mod report;
pub mod runner;
pub mod simulation;
pub mod sweep;

pub mod prelude;

pub use context::{Context, DayPhase};
pub use error::SimulationError;
pub use hashing::{HashMap, HashSet, IndexMap, IndexSet};
pub use parameters::{ModelParameters, ParametersValues};
pub use population::PersonId;
pub use simulation::{InfectionSummary, Simulation};
pub use sweep::{run_sweep, ScenarioResult};

// Re-exports for the macros
pub use paste;
pub use rand;
