//! Commands

mod contract_commands;

pub use contract_commands::*;
