//! HTTP API

pub mod actor;
pub mod dto;
pub mod routes;

pub use actor::RequestActor;
pub use routes::routes;
