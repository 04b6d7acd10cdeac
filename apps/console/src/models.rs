use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DefaultOnNull, DisplayFromStr, PickFirst};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "Pagination::first_page")]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub items_per_page: u32,
}

impl Pagination {
    const fn first_page() -> u32 {
        1
    }
}

/// Backend ids arrive as either JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Dashboard slices
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alert {
    pub id: String,
    pub level: String,
    pub message: String,
    pub timestamp: Option<String>,
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSummary {
    #[serde_as(as = "DefaultOnNull")]
    pub emails_processed: u64,
    #[serde_as(as = "DefaultOnNull")]
    pub lpos_extracted: u64,
    #[serde_as(as = "DefaultOnNull")]
    pub pending_review: u64,
    #[serde_as(as = "DefaultOnNull")]
    pub sla_breaches: u64,
    #[serde_as(as = "DefaultOnNull")]
    pub avg_processing_time: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub auto_approval_rate: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub alerts: Vec<Alert>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlyVolume {
    pub hour: String,
    pub volume: u64,
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingStatus {
    #[serde_as(as = "DefaultOnNull")]
    pub status_distribution: Vec<StatusCount>,
    #[serde_as(as = "DefaultOnNull")]
    pub hourly_volume: Vec<HourlyVolume>,
    pub timestamp: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingMetrics {
    pub avg_extraction_seconds: f64,
    pub success_rate: f64,
    pub manual_review_rate: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityMetrics {
    pub extraction_accuracy: f64,
    pub validation_pass_rate: f64,
    pub error_rate: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeMetrics {
    pub total_emails: u64,
    pub lpo_emails: u64,
    pub spam_emails: u64,
    pub daily_average: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsMetrics {
    pub processing: ProcessingMetrics,
    pub quality: QualityMetrics,
    pub volume: VolumeMetrics,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveQueue {
    pub stages: Vec<StatusCount>,
    pub total: u64,
}

// ---------------------------------------------------------------------------
// LPO rows
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl UrgencyLevel {
    pub const ALL: [UrgencyLevel; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    /// Client-side fallback when the backend omits `urgency_level`.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Critical
        } else if score >= 60.0 {
            Self::High
        } else if score >= 40.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAttachment {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRef {
    pub name: String,
    pub url: String,
    pub exists: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAttachmentPair {
    pub attachment: FileRef,
    pub extraction: FileRef,
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLpoRow {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(alias = "customer_name")]
    pub customer: Option<String>,
    pub channel: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub amount: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub urgency_score: Option<f64>,
    pub urgency_level: Option<UrgencyLevel>,
    pub status: Option<String>,
    pub processing_time: Option<f64>,
    #[serde_as(as = "DefaultOnNull")]
    pub attachments: Vec<RawAttachment>,
    pub attachment_extractions: Option<Vec<RawAttachmentPair>>,
    #[serde(alias = "created_at")]
    pub timestamp: Option<String>,
    pub sla_deadline: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LpoQueuePayload {
    #[serde(default, alias = "items")]
    pub lpos: Vec<RawLpoRow>,
    #[serde(default)]
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Emails
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterCategory {
    Lpo,
    Spam,
    #[default]
    Normal,
}

impl FilterCategory {
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Lpo => "LPO",
            Self::Spam => "SPAM",
            Self::Normal => "NORMAL",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailRecord {
    #[serde(alias = "id")]
    pub email_id: String,
    pub subject: String,
    pub sender: String,
    pub recipient: String,
    pub date_received: Option<String>,
    pub is_spam: bool,
    pub lpo_extracted: bool,
    pub has_lpo_data: bool,
    pub filter_category: FilterCategory,
    pub attachment_count: u32,
    pub spam_confidence: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailListPayload {
    #[serde(default, alias = "items")]
    pub emails: Vec<EmailRecord>,
    #[serde(default)]
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Conversations and escalation
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Solved,
    InProgress,
    #[default]
    NotSolved,
}

impl ConversationStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Solved => "Solved",
            Self::InProgress => "In progress",
            Self::NotSolved => "Not solved",
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conversation {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub lpo_number: String,
    pub contact: String,
    pub communication_mode: String,
    pub status: ConversationStatus,
    pub problem: String,
    pub created_at: Option<String>,
    pub last_update: Option<String>,
    /// JSON document embedded as a string; parsed on demand.
    pub escalation_info: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationListPayload {
    #[serde(default, alias = "items")]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationStage {
    pub level: u32,
    pub mode: String,
    pub contact: String,
    pub status: String,
    pub attempted_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationFlow {
    pub current_level: u32,
    pub stages: Vec<EscalationStage>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationStatus {
    pub conversation_id: String,
    pub state: String,
    pub current_level: u32,
    pub next_attempt_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Settings rows are flat JSON objects whose shape depends on the resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsRecord(pub Map<String, Value>);

impl SettingsRecord {
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        ["is_active", "is_enabled"]
            .iter()
            .find_map(|key| self.0.get(*key).and_then(Value::as_bool))
            .unwrap_or(false)
    }

    pub fn display(&self, field: &str) -> String {
        match self.0.get(field) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn lpo_row_accepts_numeric_ids_and_string_amounts() {
        let row: RawLpoRow = serde_json::from_value(json!({
            "id": 4411,
            "customer_name": "Carrefour",
            "amount": "1250.50",
            "urgency_score": 72,
            "attachments": null
        }))
        .unwrap();

        assert_eq!(row.id, "4411");
        assert_eq!(row.customer.as_deref(), Some("Carrefour"));
        assert_eq!(row.amount, Some(1250.5));
        assert_eq!(row.urgency_score, Some(72.0));
        assert!(row.attachments.is_empty());
        assert!(row.attachment_extractions.is_none());
    }

    #[test]
    fn urgency_level_from_score_thresholds() {
        assert_eq!(UrgencyLevel::from_score(80.0), UrgencyLevel::Critical);
        assert_eq!(UrgencyLevel::from_score(79.9), UrgencyLevel::High);
        assert_eq!(UrgencyLevel::from_score(60.0), UrgencyLevel::High);
        assert_eq!(UrgencyLevel::from_score(40.0), UrgencyLevel::Medium);
        assert_eq!(UrgencyLevel::from_score(0.0), UrgencyLevel::Low);
    }

    #[test]
    fn summary_tolerates_nulls() {
        let summary: DashboardSummary = serde_json::from_value(json!({
            "emails_processed": 120,
            "alerts": null,
            "avg_processing_time": null
        }))
        .unwrap();

        assert_eq!(summary.emails_processed, 120);
        assert!(summary.alerts.is_empty());
        assert_eq!(summary.avg_processing_time, 0.0);
    }

    #[test]
    fn settings_record_reads_id_and_active_flag() {
        let record: SettingsRecord =
            serde_json::from_value(json!({"id": 7, "is_enabled": true, "name": "UAE"})).unwrap();
        assert_eq!(record.id().as_deref(), Some("7"));
        assert!(record.is_active());
        assert_eq!(record.display("name"), "UAE");
        assert_eq!(record.display("missing"), "");
    }

    #[test]
    fn email_category_uses_uppercase_wire_names() {
        let email: EmailRecord = serde_json::from_value(json!({
            "email_id": "m-1",
            "filter_category": "SPAM",
            "is_spam": true,
            "spam_confidence": 0.93
        }))
        .unwrap();
        assert_eq!(email.filter_category, FilterCategory::Spam);
        assert!(email.is_spam);
    }
}
