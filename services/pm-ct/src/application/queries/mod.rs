//! Queries

mod contract_queries;

pub use contract_queries::*;
