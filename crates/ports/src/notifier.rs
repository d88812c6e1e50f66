//! 通知发送

use async_trait::async_trait;
use common::UserId;
use errors::AppResult;
use serde::{Deserialize, Serialize};

/// 通知关联的业务单据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRef {
    /// 单据类型，如 `Contract`
    pub doc_type: String,
    /// 单据标识
    pub doc_id: String,
}

impl ContextRef {
    pub fn new(doc_type: impl Into<String>, doc_id: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            doc_id: doc_id.into(),
        }
    }
}

/// 通知发送 trait
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        recipients: &[UserId],
        subject: &str,
        body: &str,
        context: &ContextRef,
    ) -> AppResult<()>;
}
