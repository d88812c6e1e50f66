//! 未配置 SMTP 时使用的日志通知

use async_trait::async_trait;
use common::UserId;
use errors::AppResult;
use ports::{ContextRef, Notifier};
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send(
        &self,
        recipients: &[UserId],
        subject: &str,
        _body: &str,
        context: &ContextRef,
    ) -> AppResult<()> {
        let recipients: Vec<&str> = recipients.iter().map(UserId::as_str).collect();
        info!(
            doc_type = %context.doc_type,
            doc_id = %context.doc_id,
            recipients = ?recipients,
            subject,
            "Notification (email disabled)"
        );
        Ok(())
    }
}
