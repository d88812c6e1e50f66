//! 当前操作人

use common::UserId;

/// 当前操作人 trait
///
/// 由调用入口（HTTP 请求、定时任务）提供，用于版本历史与审计
pub trait CurrentActor: Send + Sync {
    fn id(&self) -> UserId;
}

/// 固定操作人
#[derive(Debug, Clone)]
pub struct StaticActor(pub UserId);

impl StaticActor {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self(id.into())
    }

    /// 后台任务使用的系统操作人
    pub fn system() -> Self {
        Self(UserId::system())
    }
}

impl CurrentActor for StaticActor {
    fn id(&self) -> UserId {
        self.0.clone()
    }
}
