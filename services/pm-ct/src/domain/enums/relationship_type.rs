//! 关联合同类型

use serde::{Deserialize, Serialize};

/// 关联关系类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    /// 续签生成的新合同
    Renewal,
    /// 上级框架协议
    Parent,
    /// 下级子合同
    Child,
    /// 其他关联
    Related,
}
