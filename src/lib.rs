//! Work-hours aggregation and payroll computation engine.
//!
//! This crate turns raw shift records into per-day and per-month worked
//! totals, derives task statuses from consumed time, computes monthly
//! payroll with EPF/ETF figures, and folds in income/expense adjustments.
//! Derived totals are pushed to an external system of record by a
//! retrying reconciliation loop.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod reconciliation;
pub mod store;
