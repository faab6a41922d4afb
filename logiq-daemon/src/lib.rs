//! logiq-daemon library.
//!
//! Exposes the daemon building blocks for the binary and for
//! integration tests.

pub mod cli;
pub mod cycle;
pub mod logging;
pub mod metrics_server;
pub mod scheduler;

pub use cycle::{CycleOutcome, CycleRunner, CycleSummary};
