//! 值对象

mod document_version;
mod ids;

pub use document_version::DocumentVersion;
pub use ids::ContractId;
