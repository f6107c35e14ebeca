//! Configuration types for the payroll engine.
//!
//! These types are deserialized from the YAML files under a configuration
//! directory. Their `Default` impls mirror `config/default/`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Payroll parameters from `payroll.yaml`.
    pub payroll: PayrollConfig,
    /// Reconciliation loop parameters from `reconciliation.yaml`.
    pub reconciliation: ReconciliationConfig,
}

/// Payroll parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollConfig {
    /// The baseline hours used when a month record is built without one.
    pub default_monthly_baseline_hours: Decimal,
    /// Statutory contribution rates.
    #[serde(default)]
    pub statutory: StatutoryRates,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            default_monthly_baseline_hours: Decimal::new(200, 0),
            statutory: StatutoryRates::default(),
        }
    }
}

/// EPF/ETF rates as fractions of the payroll salary.
///
/// # Example
///
/// ```
/// use payroll_engine::config::StatutoryRates;
/// use rust_decimal::Decimal;
///
/// let rates = StatutoryRates::default();
/// assert_eq!(rates.employee_epf, Decimal::new(8, 2));
/// assert_eq!(rates.employer_epf, Decimal::new(12, 2));
/// assert_eq!(rates.employer_etf, Decimal::new(3, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryRates {
    /// Employee EPF deduction rate.
    pub employee_epf: Decimal,
    /// Employer EPF contribution rate.
    pub employer_epf: Decimal,
    /// Employer ETF contribution rate.
    pub employer_etf: Decimal,
}

impl Default for StatutoryRates {
    fn default() -> Self {
        Self {
            employee_epf: Decimal::new(8, 2),
            employer_epf: Decimal::new(12, 2),
            employer_etf: Decimal::new(3, 2),
        }
    }
}

/// Reconciliation loop parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Seconds between periodic ticks.
    pub interval_secs: u64,
    /// Retry policy for store calls.
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl ReconciliationConfig {
    /// The tick interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            retry: RetryPolicy::default(),
        }
    }
}

/// Bounded retry with linear backoff.
///
/// Attempt `n` (1-based) that fails waits `n * backoff_ms` before the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Backoff unit in milliseconds.
    pub backoff_ms: u64,
}

impl RetryPolicy {
    /// The delay after the given failed attempt.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(u64::from(attempt)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 500,
        }
    }
}
