//! Rule-based default-risk scoring for mobile lending applicants.
//!
//! The [`scoring`] module holds the scorer and its data model; the remaining
//! modules provide the configuration, telemetry and error plumbing shared by
//! the HTTP service and the command line.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
