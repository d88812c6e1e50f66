//! 邮件模板系统

use errors::{AppError, AppResult};
use std::collections::HashMap;
use tera::Tera;
use tracing::debug;

/// 通知邮件的 HTML 布局
const NOTIFICATION_HTML: &str = r#"<!DOCTYPE html>
<html>
<body style="font-family: sans-serif;">
  <h2>{{ subject }}</h2>
  <div>{{ body | safe }}</div>
  {% if doc_type %}<p style="color: #888; font-size: 12px;">{{ doc_type }}: {{ doc_id }}</p>{% endif %}
</body>
</html>"#;

/// 通知邮件的纯文本版本
const NOTIFICATION_TXT: &str = r#"{{ subject }}

{{ body | striptags }}
{% if doc_type %}
{{ doc_type }}: {{ doc_id }}{% endif %}
"#;

/// 邮件模板管理器
pub struct EmailTemplate {
    tera: Tera,
}

impl EmailTemplate {
    /// 从目录加载模板
    pub fn new(template_dir: &str) -> AppResult<Self> {
        let pattern = format!("{}/**/*", template_dir);
        let mut tera = Tera::new(&pattern)
            .map_err(|e| AppError::internal(format!("Failed to load email templates: {}", e)))?;
        Self::add_builtin(&mut tera)?;

        debug!(template_dir = %template_dir, "Email templates loaded");

        Ok(Self { tera })
    }

    /// 仅使用内置通知模板
    pub fn builtin() -> AppResult<Self> {
        let mut tera = Tera::default();
        Self::add_builtin(&mut tera)?;
        Ok(Self { tera })
    }

    /// 从内存中的模板字符串创建（用于测试）
    pub fn from_strings(templates: HashMap<String, String>) -> AppResult<Self> {
        let mut tera = Tera::default();

        for (name, content) in templates {
            tera.add_raw_template(&name, &content).map_err(|e| {
                AppError::internal(format!("Failed to add template {}: {}", name, e))
            })?;
        }

        Ok(Self { tera })
    }

    fn add_builtin(tera: &mut Tera) -> AppResult<()> {
        // 目录中的同名模板优先
        let existing: Vec<&str> = tera.get_template_names().collect();
        let mut builtin = Vec::new();
        if !existing.contains(&"notification.html") {
            builtin.push(("notification.html", NOTIFICATION_HTML));
        }
        if !existing.contains(&"notification.txt") {
            builtin.push(("notification.txt", NOTIFICATION_TXT));
        }
        tera.add_raw_templates(builtin)
            .map_err(|e| AppError::internal(format!("Failed to add builtin templates: {}", e)))
    }

    /// 渲染模板
    pub fn render(&self, template_name: &str, context: &serde_json::Value) -> AppResult<String> {
        let context = tera::Context::from_serialize(context)
            .map_err(|e| AppError::internal(format!("Failed to create template context: {}", e)))?;

        self.tera.render(template_name, &context).map_err(|e| {
            AppError::internal(format!(
                "Failed to render template {}: {}",
                template_name, e
            ))
        })
    }

    /// 渲染通知邮件，返回 (HTML, 纯文本)
    pub fn render_notification(
        &self,
        subject: &str,
        body: &str,
        doc_type: &str,
        doc_id: &str,
    ) -> AppResult<(String, String)> {
        let context = serde_json::json!({
            "subject": subject,
            "body": body,
            "doc_type": doc_type,
            "doc_id": doc_id,
        });

        let html = self.render("notification.html", &context)?;
        let text = self.render("notification.txt", &context)?;

        Ok((html, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_from_strings() {
        let mut templates = HashMap::new();
        templates.insert(
            "test.html".to_string(),
            "<h1>Hello {{ name }}!</h1>".to_string(),
        );

        let template = EmailTemplate::from_strings(templates).unwrap();

        let context = serde_json::json!({
            "name": "World"
        });

        let result = template.render("test.html", &context).unwrap();
        assert_eq!(result, "<h1>Hello World!</h1>");
    }

    #[test]
    fn test_render_builtin_notification() {
        let template = EmailTemplate::builtin().unwrap();

        let (html, text) = template
            .render_notification(
                "Contract Expiring Soon: Office Lease",
                "<p>The contract <b>Office Lease</b> expires in 30 days.</p>",
                "Contract",
                "0192a3b4-0000-7000-8000-000000000001",
            )
            .unwrap();

        assert!(html.contains("<b>Office Lease</b>"));
        assert!(html.contains("Contract: 0192a3b4-0000-7000-8000-000000000001"));
        assert!(text.contains("The contract Office Lease expires in 30 days."));
        assert!(!text.contains("<p>"));
    }
}
