//! Reconciliation with the external system of record.
//!
//! The calculators are pure; this module does the I/O around them. It reads
//! snapshots from a [`WorkHoursStore`](crate::store::WorkHoursStore), pushes
//! the derived totals back under a bounded retry policy, and runs the
//! periodic loop that keeps daily totals current.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use payroll_engine::config::ConfigLoader;
//! use payroll_engine::reconciliation::{ReconciliationLoop, WorkHoursService};
//! use payroll_engine::store::InMemoryStore;
//!
//! # async fn run() -> Result<(), payroll_engine::error::EngineError> {
//! let config = ConfigLoader::load("./config/default")?;
//! let service = WorkHoursService::new(Arc::new(InMemoryStore::new()), config);
//!
//! let handle = ReconciliationLoop::new(service).start();
//! handle.trigger();
//! handle.stop().await;
//! # Ok(())
//! # }
//! ```

mod retry;
mod scheduler;
mod service;

pub use retry::with_retry;
pub use scheduler::{Clock, ReconciliationHandle, ReconciliationLoop};
pub use service::{DayReconciliation, PayrollRun, ReconciliationFailure, WorkHoursService};
