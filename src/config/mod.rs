//! Configuration loading for the payroll engine.
//!
//! Configuration is read from a directory of YAML files and passed to the
//! engine explicitly; nothing in the crate reads it ambiently.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("EPF rate: {}", config.statutory_rates().employee_epf);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EngineConfig, PayrollConfig, ReconciliationConfig, RetryPolicy, StatutoryRates};
