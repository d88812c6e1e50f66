//! Domain layer

pub mod advisory;
pub mod dashboard;
pub mod entities;
pub mod enums;
pub mod notifications;
pub mod repositories;
pub mod snapshot;
pub mod value_objects;
