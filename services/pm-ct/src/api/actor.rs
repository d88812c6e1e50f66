//! 请求操作人提取

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::UserId;
use errors::AppError;
use ports::CurrentActor;

/// 操作人请求头，由网关在认证后写入
pub const ACTOR_HEADER: &str = "x-user-id";

/// 从请求头提取的当前操作人
#[derive(Debug, Clone)]
pub struct RequestActor(pub UserId);

impl<S> FromRequestParts<S> for RequestActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::unauthenticated(format!("Missing {} header", ACTOR_HEADER)))?;

        Ok(Self(UserId::from(user)))
    }
}

impl CurrentActor for RequestActor {
    fn id(&self) -> UserId {
        self.0.clone()
    }
}
