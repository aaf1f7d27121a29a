use std::fs;
use std::path::Path;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::define_data_plugin;
use crate::error::SimulationError;

/// The inputs of a single simulation instance. Immutable once the simulation is constructed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ModelParameters {
    /// Number of people in the population
    pub population_size: usize,
    /// Interaction draws per person per day, in `[1, population_size - 1]`
    pub interaction_amount: usize,
    /// Probability that an eligible contact between an infected and a susceptible person
    /// transmits
    pub spread_rate: f64,
    /// Probability that a person uses the contact tracing app
    pub app_percent_usage: f64,
    /// Probability that a person is infected on day 0
    pub covid_percent_start: f64,
}

fn check_probability(name: &str, value: f64) -> Result<(), SimulationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SimulationError::InvalidParameter(format!(
            "{name} must be in [0, 1], got {value}"
        )));
    }
    Ok(())
}

impl ModelParameters {
    /// Check every bound. Out-of-range values are rejected, never clamped.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidParameter` naming the first violated bound.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.population_size == 0 {
            return Err(SimulationError::InvalidParameter(
                "population_size must be positive".to_string(),
            ));
        }
        if self.interaction_amount == 0 || self.interaction_amount >= self.population_size {
            return Err(SimulationError::InvalidParameter(format!(
                "interaction_amount must be in [1, {}], got {}",
                self.population_size - 1,
                self.interaction_amount
            )));
        }
        // NaN fails the range check as well
        check_probability("spread_rate", self.spread_rate)?;
        check_probability("app_percent_usage", self.app_percent_usage)?;
        check_probability("covid_percent_start", self.covid_percent_start)?;
        Ok(())
    }

    /// Maximum number of entries kept in an interaction history: 14 days of contacts.
    #[must_use]
    pub fn history_capacity(&self) -> usize {
        self.interaction_amount * crate::population::HISTORY_DAYS
    }
}

fn default_population_size() -> usize {
    10_000
}

fn default_interaction_amount() -> usize {
    5
}

fn default_spread_rate() -> f64 {
    0.01
}

fn default_covid_percent_start() -> f64 {
    0.05
}

fn default_days() -> u32 {
    100
}

fn default_app_usage_levels() -> Vec<f64> {
    vec![0.0]
}

/// The run configuration as read from a JSON file. Each entry of `app_usage_levels` becomes one
/// scenario with its own `ModelParameters`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ParametersValues {
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    #[serde(default = "default_interaction_amount")]
    pub interaction_amount: usize,
    #[serde(default = "default_spread_rate")]
    pub spread_rate: f64,
    #[serde(default = "default_covid_percent_start")]
    pub covid_percent_start: f64,
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_app_usage_levels")]
    pub app_usage_levels: Vec<f64>,
    #[serde(default)]
    pub seed: u64,
}

impl Default for ParametersValues {
    fn default() -> Self {
        ParametersValues {
            population_size: default_population_size(),
            interaction_amount: default_interaction_amount(),
            spread_rate: default_spread_rate(),
            covid_percent_start: default_covid_percent_start(),
            days: default_days(),
            app_usage_levels: default_app_usage_levels(),
            seed: 0,
        }
    }
}

impl ParametersValues {
    /// The model parameters of the scenario with the given app usage level.
    #[must_use]
    pub fn model_parameters(&self, app_percent_usage: f64) -> ModelParameters {
        ModelParameters {
            population_size: self.population_size,
            interaction_amount: self.interaction_amount,
            spread_rate: self.spread_rate,
            app_percent_usage,
            covid_percent_start: self.covid_percent_start,
        }
    }

    /// Check whether the configured values are valid for every scenario before any population
    /// is built, so a bad level at the end of a sweep fails fast.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidParameter` naming the first violated bound.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.app_usage_levels.is_empty() {
            return Err(SimulationError::InvalidParameter(
                "app_usage_levels must not be empty".to_string(),
            ));
        }
        for &level in &self.app_usage_levels {
            self.model_parameters(level).validate()?;
        }
        Ok(())
    }
}

/// Reads and validates a `ParametersValues` JSON file. Missing fields take their defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON for `ParametersValues`, or
/// holds out-of-range values.
pub fn load_parameters_from_json(file_path: &Path) -> Result<ParametersValues, SimulationError> {
    trace!("loading parameters from {}", file_path.display());
    let contents = fs::read_to_string(file_path)?;
    let parameters: ParametersValues = serde_json::from_str(&contents)?;
    parameters.validate()?;
    Ok(parameters)
}

define_data_plugin!(ParametersPlugin, Option<ModelParameters>, None);

pub trait ContextParametersExt {
    /// Stores the model parameters of this simulation. Called once, at construction.
    fn set_parameters(&mut self, parameters: ModelParameters);

    /// # Panics
    ///
    /// Panics if the parameters have not been set.
    fn get_parameters(&self) -> &ModelParameters;
}

impl ContextParametersExt for Context {
    fn set_parameters(&mut self, parameters: ModelParameters) {
        *self.get_data_mut(ParametersPlugin) = Some(parameters);
    }

    fn get_parameters(&self) -> &ModelParameters {
        self.get_data(ParametersPlugin)
            .as_ref()
            .expect("model parameters have not been set")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn valid() -> ModelParameters {
        ModelParameters {
            population_size: 100,
            interaction_amount: 5,
            spread_rate: 0.5,
            app_percent_usage: 0.5,
            covid_percent_start: 0.1,
        }
    }

    #[test]
    fn valid_parameters_pass() {
        assert!(valid().validate().is_ok());
        let max_interactions = ModelParameters {
            interaction_amount: 99,
            ..valid()
        };
        assert!(max_interactions.validate().is_ok());
    }

    #[test]
    fn zero_population_is_rejected() {
        let parameters = ModelParameters {
            population_size: 0,
            interaction_amount: 0,
            ..valid()
        };
        assert!(matches!(
            parameters.validate(),
            Err(SimulationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn interaction_amount_bounds() {
        for interaction_amount in [0, 100, 150] {
            let parameters = ModelParameters {
                interaction_amount,
                ..valid()
            };
            assert!(parameters.validate().is_err(), "{interaction_amount}");
        }
    }

    #[test]
    fn probabilities_are_not_clamped() {
        for bad in [-0.01, 1.01, f64::NAN, f64::INFINITY] {
            assert!(ModelParameters {
                spread_rate: bad,
                ..valid()
            }
            .validate()
            .is_err());
            assert!(ModelParameters {
                app_percent_usage: bad,
                ..valid()
            }
            .validate()
            .is_err());
            assert!(ModelParameters {
                covid_percent_start: bad,
                ..valid()
            }
            .validate()
            .is_err());
        }
    }

    #[test]
    fn history_capacity_is_fourteen_days() {
        assert_eq!(valid().history_capacity(), 70);
    }

    #[test]
    fn load_with_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{ "population_size": 200, "app_usage_levels": [0.0, 0.5] }}"#
        )
        .unwrap();

        let parameters = load_parameters_from_json(file.path()).unwrap();
        assert_eq!(parameters.population_size, 200);
        assert_eq!(parameters.interaction_amount, 5);
        assert_eq!(parameters.days, 100);
        assert_eq!(parameters.app_usage_levels, vec![0.0, 0.5]);
        assert_eq!(parameters.model_parameters(0.5).app_percent_usage, 0.5);
    }

    #[test]
    fn load_rejects_bad_level() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "app_usage_levels": [0.2, 1.5] }}"#).unwrap();
        assert!(matches!(
            load_parameters_from_json(file.path()),
            Err(SimulationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn load_rejects_unknown_field() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "populationsize": 10 }}"#).unwrap();
        assert!(matches!(
            load_parameters_from_json(file.path()),
            Err(SimulationError::JsonError(_))
        ));
    }

    #[test]
    fn context_round_trip() {
        let mut context = Context::new();
        context.set_parameters(valid());
        assert_eq!(*context.get_parameters(), valid());
    }
}
