//! 合同附属记录：修订、关联合同、版本历史、备注

use chrono::{DateTime, NaiveDate, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};

use crate::domain::enums::RelationshipType;
use crate::domain::value_objects::{ContractId, DocumentVersion};

/// 合同修订
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amendment {
    /// 修订编号，如 `AMD-001`
    pub amendment_number: String,
    pub amendment_date: NaiveDate,
    pub amendment_type: String,
    pub description: String,
    pub previous_value: Option<String>,
    pub new_value: Option<String>,
    pub effective_from: NaiveDate,
}

/// 关联合同
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedContract {
    pub contract: ContractId,
    pub relationship_type: RelationshipType,
    #[serde(default)]
    pub description: Option<String>,
}

/// 版本历史
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version_number: DocumentVersion,
    pub timestamp: DateTime<Utc>,
    pub actor: UserId,
    pub change_summary: String,
}

/// 时间线备注
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub timestamp: DateTime<Utc>,
    pub actor: UserId,
    pub text: String,
}
