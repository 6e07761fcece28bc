//! Application-level configuration.
//!
//! - [`ExecutionParams`]: turn loop control (iterations, consensus budgets, timeouts)

pub mod execution_params;

pub use execution_params::ExecutionParams;
