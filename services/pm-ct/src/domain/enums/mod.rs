//! 领域枚举

mod approval_status;
mod contract_status;
mod doc_status;
mod item_status;
mod relationship_type;
mod renewal_period;

pub use approval_status::ApprovalStatus;
pub use contract_status::ContractStatus;
pub use doc_status::DocStatus;
pub use item_status::{DeliverableStatus, ObligationStatus, PaymentStatus};
pub use relationship_type::RelationshipType;
pub use renewal_period::RenewalPeriod;
