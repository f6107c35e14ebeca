//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, PayrollConfig, ReconciliationConfig, StatutoryRates};

/// Loads and validates engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── payroll.yaml          # Baseline hours and statutory rates
/// └── reconciliation.yaml   # Tick interval and retry policy
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// println!("Ticking every {:?}", loader.config().reconciliation.interval());
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either file is missing (`ConfigNotFound`)
    /// - Either file contains invalid YAML (`ConfigParseError`)
    /// - A loaded value is out of range (`InvalidConfiguration`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let payroll = Self::load_yaml::<PayrollConfig>(&path.join("payroll.yaml"))?;
        let reconciliation =
            Self::load_yaml::<ReconciliationConfig>(&path.join("reconciliation.yaml"))?;

        Self::from_config(EngineConfig {
            payroll,
            reconciliation,
        })
    }

    /// Wraps an already-built configuration after validating it.
    pub fn from_config(config: EngineConfig) -> EngineResult<Self> {
        validate(&config)?;
        Ok(Self { config })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }

    /// Returns the statutory rates.
    pub fn statutory_rates(&self) -> &StatutoryRates {
        &self.config.payroll.statutory
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }
}

fn validate(config: &EngineConfig) -> EngineResult<()> {
    if config.payroll.default_monthly_baseline_hours <= Decimal::ZERO {
        return Err(invalid(
            "payroll.default_monthly_baseline_hours",
            format!(
                "must be greater than zero, got {}",
                config.payroll.default_monthly_baseline_hours
            ),
        ));
    }

    let statutory = &config.payroll.statutory;
    for (field, rate) in [
        ("payroll.statutory.employee_epf", statutory.employee_epf),
        ("payroll.statutory.employer_epf", statutory.employer_epf),
        ("payroll.statutory.employer_etf", statutory.employer_etf),
    ] {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(invalid(field, format!("must be within [0, 1], got {}", rate)));
        }
    }

    if config.reconciliation.interval_secs == 0 {
        return Err(invalid(
            "reconciliation.interval_secs",
            "must be greater than zero".to_string(),
        ));
    }

    if config.reconciliation.retry.max_attempts == 0 {
        return Err(invalid(
            "reconciliation.retry.max_attempts",
            "must be at least 1".to_string(),
        ));
    }

    Ok(())
}

fn invalid(field: &str, message: String) -> EngineError {
    EngineError::InvalidConfiguration {
        field: field.to_string(),
        message,
    }
}
