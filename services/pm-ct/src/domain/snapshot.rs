//! 保存前快照与字段差异

use serde_json::Value;
use tracing::warn;

use crate::domain::entities::Contract;

/// 参与比较的字段，按展示顺序排列
///
/// 审计信息与版本历史本身不参与比较
const TRACKED_FIELDS: &[&str] = &[
    "contract_name",
    "contract_type",
    "party_name",
    "assigned_to",
    "description",
    "effective_date",
    "signing_date",
    "start_date",
    "end_date",
    "duration_days",
    "currency",
    "contract_value",
    "exchange_rate",
    "contract_value_in_company_currency",
    "advance_payment_required",
    "advance_payment_percentage",
    "status",
    "doc_status",
    "document_version",
    "requires_approval",
    "approval_status",
    "approved_by",
    "approved_on",
    "approval_comments",
    "auto_renew",
    "renewal_period",
    "renewal_count",
    "max_renewals",
    "renewal_notification_days",
    "master_agreement",
    "expiry_notification_enabled",
    "notification_days",
    "payment_schedule",
    "obligations",
    "deliverables",
    "milestones",
    "amendments",
    "related_contracts",
    "comments",
];

/// 版本摘要最多列出的变更数
const SUMMARY_LIMIT: usize = 5;

/// 单个字段的变更
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: &'static str,
    pub old: String,
    pub new: String,
}

/// 合同字段快照
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    values: Vec<(&'static str, Value)>,
}

impl Snapshot {
    /// 捕获合同当前的字段值
    pub fn capture(contract: &Contract) -> Self {
        let document = match serde_json::to_value(contract) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                debug_assert!(false, "contract serialized to a non-object: {other}");
                warn!("Contract snapshot is not a JSON object, history diff skipped");
                serde_json::Map::new()
            }
            Err(e) => {
                debug_assert!(false, "contract snapshot failed: {e}");
                warn!(error = %e, "Failed to capture contract snapshot, history diff skipped");
                serde_json::Map::new()
            }
        };

        let values = TRACKED_FIELDS
            .iter()
            .map(|field| (*field, document.get(*field).cloned().unwrap_or(Value::Null)))
            .collect();

        Self { values }
    }

    /// 按字段顺序列出与另一快照的差异
    pub fn diff(&self, after: &Snapshot) -> Vec<FieldChange> {
        self.values
            .iter()
            .zip(after.values.iter())
            .filter(|((_, old), (_, new))| old != new)
            .map(|((field, old), (_, new))| FieldChange {
                field: *field,
                old: render(old),
                new: render(new),
            })
            .collect()
    }
}

/// 生成版本摘要：`field: old → new`，以 `; ` 连接，只保留前 5 项
pub fn summarize_changes(changes: &[FieldChange]) -> String {
    changes
        .iter()
        .take(SUMMARY_LIMIT)
        .map(|c| format!("{}: {} → {}", c.field, c.old, c.new))
        .collect::<Vec<_>>()
        .join("; ")
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(rows) => format!("{} rows", rows.len()),
        Value::Object(map) => match (map.get("amount"), map.get("currency")) {
            (Some(Value::String(amount)), Some(Value::String(currency))) => {
                format!("{} {}", amount, currency)
            }
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::UserId;
    use domain_core::Currency;

    use crate::domain::entities::ContractTerms;

    fn contract() -> Contract {
        let terms = ContractTerms::new(
            "Cleaning Services",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            Currency::cny(),
        );
        Contract::new(terms, UserId::from("alice@example.com"), chrono::Utc::now())
    }

    #[test]
    fn test_every_serialized_field_is_tracked_or_excluded() {
        let document = serde_json::to_value(contract()).unwrap();
        for key in document.as_object().unwrap().keys() {
            let excluded = matches!(key.as_str(), "id" | "audit_info" | "version_history" | "row_version");
            assert!(
                excluded || TRACKED_FIELDS.contains(&key.as_str()),
                "field {} is not tracked",
                key
            );
        }
    }

    #[test]
    fn test_capture_reads_every_tracked_field() {
        let snapshot = Snapshot::capture(&contract());
        let name = snapshot
            .values
            .iter()
            .find(|(field, _)| *field == "contract_name")
            .map(|(_, value)| value.clone());
        assert_eq!(name, Some(Value::from("Cleaning Services")));
        assert_eq!(snapshot.values.len(), TRACKED_FIELDS.len());
    }

    #[test]
    fn test_no_changes() {
        let contract = contract();
        let snapshot = Snapshot::capture(&contract);
        assert!(snapshot.diff(&Snapshot::capture(&contract)).is_empty());
    }

    #[test]
    fn test_diff_and_summary() {
        let mut contract = contract();
        let before = Snapshot::capture(&contract);

        contract.submit().unwrap();

        let changes = before.diff(&Snapshot::capture(&contract));
        let fields: Vec<_> = changes.iter().map(|c| c.field).collect();
        assert_eq!(fields, vec!["status", "doc_status", "approval_status"]);
        assert_eq!(
            summarize_changes(&changes),
            "status: Draft → Approved; doc_status: Draft → Submitted; approval_status: Pending → Approved"
        );
    }

    #[test]
    fn test_summary_is_limited_to_five() {
        let changes: Vec<FieldChange> = (0..7)
            .map(|i| FieldChange {
                field: TRACKED_FIELDS[i],
                old: "a".to_string(),
                new: "b".to_string(),
            })
            .collect();
        assert_eq!(summarize_changes(&changes).split("; ").count(), 5);
    }

    #[test]
    fn test_render_values() {
        assert_eq!(render(&Value::Null), "None");
        assert_eq!(render(&serde_json::json!([1, 2])), "2 rows");
        assert_eq!(
            render(&serde_json::json!({"amount": "7120.00", "currency": "CNY"})),
            "7120.00 CNY"
        );
        assert_eq!(render(&serde_json::json!(true)), "true");
    }
}
