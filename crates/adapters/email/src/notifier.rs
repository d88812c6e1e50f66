//! 基于邮件的通知实现

use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use errors::{AppError, AppResult};
use ports::{ContextRef, Notifier};
use tracing::{info, warn};

use crate::{EmailSender, EmailTemplate};

/// 将通知渲染为邮件并逐个收件人发送
///
/// 收件人的用户标识即邮件地址。单个收件人失败不会中断其他收件人的发送，
/// 全部失败时返回错误。
pub struct EmailNotifier {
    sender: Arc<dyn EmailSender>,
    template: EmailTemplate,
}

impl EmailNotifier {
    pub fn new(sender: Arc<dyn EmailSender>, template: EmailTemplate) -> Self {
        Self { sender, template }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(
        &self,
        recipients: &[UserId],
        subject: &str,
        body: &str,
        context: &ContextRef,
    ) -> AppResult<()> {
        if recipients.is_empty() {
            return Ok(());
        }

        let (html, text) =
            self.template
                .render_notification(subject, body, &context.doc_type, &context.doc_id)?;

        let mut failed = 0usize;
        for recipient in recipients {
            if let Err(e) = self
                .sender
                .send_html_email(recipient.as_str(), subject, &html, Some(&text))
                .await
            {
                failed += 1;
                warn!(recipient = %recipient, error = %e, "Failed to deliver notification");
            }
        }

        if failed == recipients.len() {
            return Err(AppError::external_service(format!(
                "Notification '{}' could not be delivered to any recipient",
                subject
            )));
        }

        info!(
            doc_type = %context.doc_type,
            doc_id = %context.doc_id,
            delivered = recipients.len() - failed,
            "Notification sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockSender {
        sent: Mutex<Vec<(String, String)>>,
        reject: Option<String>,
    }

    #[async_trait]
    impl EmailSender for MockSender {
        async fn send_text_email(&self, to: &str, subject: &str, _body: &str) -> AppResult<()> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string()));
            Ok(())
        }

        async fn send_html_email(
            &self,
            to: &str,
            subject: &str,
            _html_body: &str,
            _text_body: Option<&str>,
        ) -> AppResult<()> {
            if self.reject.as_deref() == Some(to) {
                return Err(AppError::external_service("mailbox unavailable"));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string()));
            Ok(())
        }
    }

    fn context() -> ContextRef {
        ContextRef::new("Contract", "c-1")
    }

    #[tokio::test]
    async fn test_sends_to_every_recipient() {
        let sender = Arc::new(MockSender::default());
        let notifier = EmailNotifier::new(sender.clone(), EmailTemplate::builtin().unwrap());

        let recipients = vec![UserId::from("a@example.com"), UserId::from("b@example.com")];
        notifier
            .send(&recipients, "Contract Expiring Soon", "<p>soon</p>", &context())
            .await
            .unwrap();

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "a@example.com");
        assert_eq!(sent[1].0, "b@example.com");
    }

    #[tokio::test]
    async fn test_partial_failure_is_tolerated() {
        let sender = Arc::new(MockSender {
            reject: Some("a@example.com".to_string()),
            ..Default::default()
        });
        let notifier = EmailNotifier::new(sender.clone(), EmailTemplate::builtin().unwrap());

        let recipients = vec![UserId::from("a@example.com"), UserId::from("b@example.com")];
        let result = notifier
            .send(&recipients, "Renewal", "<p>renew</p>", &context())
            .await;

        assert!(result.is_ok());
        assert_eq!(sender.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_all_failed_returns_error() {
        let sender = Arc::new(MockSender {
            reject: Some("a@example.com".to_string()),
            ..Default::default()
        });
        let notifier = EmailNotifier::new(sender, EmailTemplate::builtin().unwrap());

        let result = notifier
            .send(&[UserId::from("a@example.com")], "Renewal", "x", &context())
            .await;

        assert!(matches!(result, Err(AppError::ExternalService(_))));
    }
}
