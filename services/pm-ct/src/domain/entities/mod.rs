//! 实体

mod contract;
mod records;
mod schedule;

pub use contract::{AmendmentRequest, Contract, ContractFilter, ContractTerms};
pub use records::{Amendment, Comment, RelatedContract, VersionEntry};
pub use schedule::{Deliverable, Milestone, Obligation, PaymentScheduleItem};
