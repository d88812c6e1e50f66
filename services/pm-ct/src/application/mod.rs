//! Application layer

pub mod commands;
pub mod handler;
pub mod queries;
pub mod sweeps;

pub use handler::{AmendmentResult, ContractSettings, SaveOutcome, ServiceHandler};
pub use sweeps::SweepSummary;
