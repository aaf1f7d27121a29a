pub use crate::contact_tracing::ContextContactTracingExt;
pub use crate::context::{Context, DayPhase};
pub use crate::error::SimulationError;
pub use crate::infection_manager::ContextInfectionExt;
pub use crate::interaction_manager::ContextInteractionExt;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::parameters::{ContextParametersExt, ModelParameters, ParametersValues};
pub use crate::population::{ContextPopulationExt, PersonId};
pub use crate::quarantine_manager::ContextQuarantineExt;
pub use crate::random::ContextRandomExt;
pub use crate::simulation::{InfectionSummary, Simulation};
pub use crate::sweep::{run_sweep, ScenarioResult};
pub use crate::transmission_manager::ContextTransmissionExt;
pub use crate::{define_data_plugin, define_rng};
