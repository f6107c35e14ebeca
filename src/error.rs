//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the engine can return, plus the non-fatal
//! [`DataQualityIssue`] type used for warnings during aggregation.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::TaskStatus;

/// The main error type for the payroll engine.
///
/// Pure computations return it as a value; store I/O failures are mapped
/// into it once the retry policy gives up.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/payroll.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/payroll.yaml");
/// ```
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value or input parameter was out of range.
    #[error("Invalid configuration '{field}': {message}")]
    InvalidConfiguration {
        /// The offending field.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// The monthly baseline hours for a payroll computation were not positive.
    #[error("Invalid monthly baseline of {baseline} hours for employee '{employee_id}' ({year}-{month:02})")]
    InvalidBaseline {
        /// The employee whose month record was rejected.
        employee_id: String,
        /// The year of the month record.
        year: i32,
        /// The month of the month record.
        month: u32,
        /// The rejected baseline value.
        baseline: Decimal,
    },

    /// An operator tried to complete a task that is already terminal.
    #[error("Illegal transition for task '{task_id}': task is already {status}")]
    IllegalTransition {
        /// The task the transition was attempted on.
        task_id: String,
        /// The terminal status the task is in.
        status: TaskStatus,
    },

    /// A store call kept failing after the retry policy was exhausted.
    #[error("Store operation '{operation}' failed after {attempts} attempt(s): {message}")]
    TransientIo {
        /// The store operation that failed.
        operation: String,
        /// How many attempts were made.
        attempts: u32,
        /// The last error reported by the store.
        message: String,
    },

    /// The store rejected a call with a non-retryable error.
    #[error("Store rejected '{operation}': {message}")]
    StoreRejected {
        /// The store operation that was rejected.
        operation: String,
        /// The reason given by the store.
        message: String,
    },

    /// A record the engine needed does not exist in the store.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record (e.g. "task", "pay profile").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },
}

/// Broad classes of engine failures, used for routing and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad input data; clamped and reported, never fatal.
    DataQuality,
    /// Invalid configuration; fatal for the single computation.
    InvalidConfiguration,
    /// Network or store failure.
    TransientIo,
    /// Rejected task state change.
    IllegalTransition,
}

impl EngineError {
    /// Returns the error class this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfiguration { .. }
            | EngineError::InvalidBaseline { .. } => ErrorCategory::InvalidConfiguration,
            EngineError::IllegalTransition { .. } => ErrorCategory::IllegalTransition,
            EngineError::TransientIo { .. }
            | EngineError::StoreRejected { .. }
            | EngineError::NotFound { .. } => ErrorCategory::TransientIo,
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

/// A non-fatal problem with an input record.
///
/// These never abort a computation. The offending value is clamped to a safe
/// default and the issue is surfaced as an audit warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataQualityIssue {
    /// The start timestamp is absent.
    #[error("missing start timestamp")]
    MissingStart,
    /// The end timestamp is absent.
    #[error("missing end timestamp")]
    MissingEnd,
    /// A timestamp was present but could not be parsed.
    #[error("unparseable timestamp: {raw}")]
    UnparseableTimestamp {
        /// The raw value as received.
        raw: String,
    },
    /// The end instant precedes the start instant.
    #[error("end is {seconds}s before start")]
    NegativeInterval {
        /// How far before the start the end lies, in seconds.
        seconds: i64,
    },
    /// A precomputed duration was negative.
    #[error("negative precomputed duration of {seconds}s")]
    NegativePrecomputed {
        /// The negative value.
        seconds: i64,
    },
    /// A ledger entry carried a negative amount.
    #[error("negative ledger amount {amount}")]
    NegativeAmount {
        /// The negative amount.
        amount: Decimal,
    },
}

impl DataQualityIssue {
    /// A stable code for the issue, used in audit warnings.
    pub fn code(&self) -> &'static str {
        match self {
            DataQualityIssue::MissingStart => "MISSING_START",
            DataQualityIssue::MissingEnd => "MISSING_END",
            DataQualityIssue::UnparseableTimestamp { .. } => "UNPARSEABLE_TIMESTAMP",
            DataQualityIssue::NegativeInterval { .. } => "NEGATIVE_INTERVAL",
            DataQualityIssue::NegativePrecomputed { .. } => "NEGATIVE_PRECOMPUTED",
            DataQualityIssue::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
        }
    }

    /// How serious the issue is for the figures it affects.
    pub fn severity(&self) -> &'static str {
        match self {
            DataQualityIssue::MissingStart | DataQualityIssue::MissingEnd => "low",
            DataQualityIssue::UnparseableTimestamp { .. }
            | DataQualityIssue::NegativeInterval { .. }
            | DataQualityIssue::NegativePrecomputed { .. } => "medium",
            DataQualityIssue::NegativeAmount { .. } => "high",
        }
    }

    /// Data-quality issues always fall in [`ErrorCategory::DataQuality`].
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::DataQuality
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/payroll.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/payroll.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_invalid_baseline_displays_employee_and_month() {
        let error = EngineError::InvalidBaseline {
            employee_id: "emp_001".to_string(),
            year: 2026,
            month: 3,
            baseline: Decimal::ZERO,
        };
        assert_eq!(
            error.to_string(),
            "Invalid monthly baseline of 0 hours for employee 'emp_001' (2026-03)"
        );
        assert_eq!(error.category(), ErrorCategory::InvalidConfiguration);
    }

    #[test]
    fn test_illegal_transition_displays_status() {
        let error = EngineError::IllegalTransition {
            task_id: "task_001".to_string(),
            status: TaskStatus::Overtime,
        };
        assert_eq!(
            error.to_string(),
            "Illegal transition for task 'task_001': task is already overtime"
        );
        assert_eq!(error.category(), ErrorCategory::IllegalTransition);
    }

    #[test]
    fn test_transient_io_displays_attempts() {
        let error = EngineError::TransientIo {
            operation: "upsert_daily_work_hours".to_string(),
            attempts: 3,
            message: "connection reset".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Store operation 'upsert_daily_work_hours' failed after 3 attempt(s): connection reset"
        );
        assert_eq!(error.category(), ErrorCategory::TransientIo);
    }

    #[test]
    fn test_data_quality_codes() {
        assert_eq!(DataQualityIssue::MissingStart.code(), "MISSING_START");
        assert_eq!(
            DataQualityIssue::NegativeInterval { seconds: 60 }.code(),
            "NEGATIVE_INTERVAL"
        );
        assert_eq!(
            DataQualityIssue::NegativeInterval { seconds: 60 }.to_string(),
            "end is 60s before start"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
        assert_error::<DataQualityIssue>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_not_found() -> EngineResult<()> {
            Err(EngineError::NotFound {
                entity: "task".to_string(),
                id: "task_404".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }

    #[test]
    fn test_data_quality_issue_category() {
        let issue = DataQualityIssue::NegativeInterval { seconds: 300 };
        assert_eq!(issue.category(), ErrorCategory::DataQuality);
        assert_eq!(issue.code(), "NEGATIVE_INTERVAL");
        assert_eq!(issue.to_string(), "end is 300s before start");
    }
}
