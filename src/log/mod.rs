//! Console logging for simulation runs. This is not to be confused with _reporting_, which writes
//! the per-scenario results table.
//!
//! Modules emit messages with the `log` macros: `info!` for the daily status line, `debug!` for
//! per-phase summaries and `trace!` for individual events. Logging is _disabled_ by default and
//! is enabled from the command line with `--log-level <spec>` or programmatically:
//!
//! ```rust
//! use contact_tracing_sim::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! pub fn setup_logging() {
//!     // Print the daily status line of every scenario.
//!     set_log_level(LevelFilter::Info);
//!     // Print every staged infection as well.
//!     set_module_filter("contact_tracing_sim::transmission_manager", LevelFilter::Trace);
//! }
//! ```
mod standard_logger;

use std::collections::hash_map::Entry;
use std::str::FromStr;
use std::sync::LazyLock;
use std::sync::{Mutex, MutexGuard};

pub use log::{debug, error, info, trace, warn, LevelFilter};
use log4rs::Handle;

use crate::error::SimulationError;
use crate::HashMap;

// Logging disabled
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;

/// A global instance of the logging configuration.
static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// A level filter applied to the messages of one module path (e.g.
/// `"contact_tracing_sim::contact_tracing"`).
#[derive(Debug, PartialEq)]
struct ModuleLogConfiguration {
    /// The module path this configuration applies to
    module: String,
    /// The maximum log level for this module path
    level: LevelFilter,
}

impl From<(&str, LevelFilter)> for ModuleLogConfiguration {
    fn from((module, level): (&str, LevelFilter)) -> Self {
        Self {
            module: module.to_string(),
            level,
        }
    }
}

/// Holds the global level, the module filters and the handle to the installed `log4rs` logger.
///
/// Because loggers are globally installed, only one instance of this struct exists. The public
/// API are free functions which fetch the singleton and call the matching member function.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// The level filter for modules without an explicitly set filter. `LevelFilter::Off`
    /// disables logging.
    pub(in crate::log) global_log_level: LevelFilter,
    pub(in crate::log) module_configurations: HashMap<String, ModuleLogConfiguration>,
    /// Handle to the `log4rs` logger, `None` until the first configuration is applied.
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_configurations: HashMap::default(),
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    pub(in crate::log) fn set_log_level(&mut self, level: LevelFilter) {
        self.global_log_level = level;
        self.set_config();
    }

    /// Returns true if the configuration was mutated, false otherwise.
    fn insert_module_filter(&mut self, module: &str, level: LevelFilter) -> bool {
        match self.module_configurations.entry(module.to_string()) {
            Entry::Occupied(mut entry) => {
                let module_config = entry.get_mut();
                if module_config.level == level {
                    return false;
                }
                module_config.level = level;
            }
            Entry::Vacant(entry) => {
                entry.insert((module, level).into());
            }
        }
        true
    }

    pub(in crate::log) fn set_module_filter(&mut self, module: &str, level: LevelFilter) {
        if self.insert_module_filter(module, level) {
            self.set_config();
        }
    }

    pub(in crate::log) fn set_module_filters(&mut self, module_filters: &[(&str, LevelFilter)]) {
        let mut mutated = false;
        for (module, level) in module_filters {
            mutated |= self.insert_module_filter(module, *level);
        }
        if mutated {
            self.set_config();
        }
    }

    pub(in crate::log) fn remove_module_filter(&mut self, module: &str) {
        if self.module_configurations.remove(module).is_some() {
            self.set_config();
        }
    }
}

// The public API

/// Enables the logger with no global level filter / full logging. Equivalent to
/// `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Disables logging completely. Equivalent to `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the global log level. A global filter level of `LevelFilter::Off` disables logging.
pub fn set_log_level(level: LevelFilter) {
    get_log_configuration().set_log_level(level);
}

/// Sets a level filter for the given module path.
pub fn set_module_filter(module_path: &str, level_filter: LevelFilter) {
    get_log_configuration().set_module_filter(module_path, level_filter);
}

/// Removes a module-specific level filter for the given module path. The global level filter will
/// apply to the module.
pub fn remove_module_filter(module_path: &str) {
    get_log_configuration().remove_module_filter(module_path);
}

/// Sets the level filters for a set of modules. Use this instead of `set_module_filter()` to set
/// filters in bulk.
pub fn set_module_filters(module_filters: &[(&str, LevelFilter)]) {
    get_log_configuration().set_module_filters(module_filters);
}

/// Applies a log level specification such as `info` or
/// `warn,contact_tracing_sim::contact_tracing=trace`. A bare level sets the global level; a
/// `module=level` pair sets a module filter.
///
/// # Errors
///
/// Returns `SimulationError::InvalidParameter` if a level name is not recognized.
pub fn apply_log_level_spec(spec: &str) -> Result<(), SimulationError> {
    let parse_level = |level: &str| {
        LevelFilter::from_str(level.trim()).map_err(|_| {
            SimulationError::InvalidParameter(format!("unknown log level '{}'", level.trim()))
        })
    };

    let mut global_level = None;
    let mut module_filters = Vec::new();
    for item in spec.split(',').filter(|item| !item.trim().is_empty()) {
        match item.split_once('=') {
            Some((module, level)) => module_filters.push((module.trim(), parse_level(level)?)),
            None => global_level = Some(parse_level(item)?),
        }
    }

    // A module filter alone still needs the logger to be on for that module.
    let global_level = global_level.unwrap_or(LevelFilter::Error);
    let mut log_configuration = get_log_configuration();
    log_configuration.set_module_filters(&module_filters);
    log_configuration.set_log_level(global_level);
    Ok(())
}

/// Fetches a mutable reference to the global `LogConfiguration`.
fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}
