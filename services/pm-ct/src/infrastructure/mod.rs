//! Infrastructure layer

pub mod notifier;
pub mod persistence;
pub mod scheduler;

pub use notifier::LoggingNotifier;
pub use scheduler::ContractScheduler;
