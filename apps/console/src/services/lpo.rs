use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

use crate::models::{FileRef, RawAttachment, RawAttachmentPair, RawLpoRow, UrgencyLevel};

/// Where an extraction reference came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Supplied by the backend alongside the attachment.
    Confirmed,
    /// Synthesized client-side; the file may not exist.
    Assumed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttachmentPair {
    pub attachment: FileRef,
    pub extraction: FileRef,
    pub provenance: Provenance,
}

/// Strategy for pairing attachments with their extraction output when the
/// backend does not provide the pairs itself.
pub trait ExtractionStrategy {
    fn pair(&self, lpo_id: &str, attachments: &[RawAttachment]) -> Vec<AttachmentPair>;
}

/// Assumes each attachment's extraction is published as
/// `/processed/{lpo_id}.json`, named after the attachment with a `.json`
/// extension.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessedPathConvention;

impl ExtractionStrategy for ProcessedPathConvention {
    fn pair(&self, lpo_id: &str, attachments: &[RawAttachment]) -> Vec<AttachmentPair> {
        attachments
            .iter()
            .map(|attachment| AttachmentPair {
                attachment: FileRef {
                    name: attachment.name.clone(),
                    url: attachment.url.clone(),
                    exists: true,
                },
                extraction: FileRef {
                    name: with_json_extension(&attachment.name),
                    url: format!("/processed/{lpo_id}.json"),
                    exists: true,
                },
                provenance: Provenance::Assumed,
            })
            .collect()
    }
}

fn with_json_extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => format!("{stem}.json"),
        _ => format!("{name}.json"),
    }
}

pub fn attachment_pairs(
    lpo_id: &str,
    provided: Option<&[RawAttachmentPair]>,
    attachments: &[RawAttachment],
    strategy: &dyn ExtractionStrategy,
) -> Vec<AttachmentPair> {
    match provided {
        Some(pairs) => pairs
            .iter()
            .map(|pair| AttachmentPair {
                attachment: pair.attachment.clone(),
                extraction: pair.extraction.clone(),
                provenance: Provenance::Confirmed,
            })
            .collect(),
        None => strategy.pair(lpo_id, attachments),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaStatus {
    Breached,
    Critical,
    NearBreach,
    OnTrack,
}

impl SlaStatus {
    pub const ALL: [SlaStatus; 4] = [
        Self::Breached,
        Self::Critical,
        Self::NearBreach,
        Self::OnTrack,
    ];

    /// Classifies a deadline relative to `now`. Callers re-run this on every
    /// render since `now` keeps moving.
    pub fn classify(now: OffsetDateTime, deadline: OffsetDateTime) -> Self {
        if now > deadline {
            return Self::Breached;
        }
        let remaining = deadline - now;
        if remaining < Duration::hours(2) {
            Self::Critical
        } else if remaining < Duration::hours(6) {
            Self::NearBreach
        } else {
            Self::OnTrack
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Self::Breached => "breached",
            Self::Critical => "critical",
            Self::NearBreach => "near_breach",
            Self::OnTrack => "on_track",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Breached => "Breached",
            Self::Critical => "Critical",
            Self::NearBreach => "Near breach",
            Self::OnTrack => "On track",
        }
    }
}

/// Parses backend timestamps: RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS`
/// which is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }
    let naive = time::macros::format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let trimmed = raw.split('.').next().unwrap_or(raw).replace(' ', "T");
    PrimitiveDateTime::parse(&trimmed, naive)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LpoSummary {
    pub id: String,
    pub customer: String,
    pub channel: String,
    pub amount: f64,
    pub urgency_score: f64,
    pub urgency_level: UrgencyLevel,
    pub status: String,
    pub processing_time: f64,
    pub attachments: Vec<AttachmentPair>,
    pub timestamp: Option<String>,
    pub sla_deadline: Option<String>,
}

impl LpoSummary {
    pub fn from_raw(raw: RawLpoRow, strategy: &dyn ExtractionStrategy) -> Self {
        let urgency_score = raw.urgency_score.unwrap_or(0.0);
        let attachments = attachment_pairs(
            &raw.id,
            raw.attachment_extractions.as_deref(),
            &raw.attachments,
            strategy,
        );

        Self {
            customer: raw.customer.unwrap_or_else(|| "Unknown".to_string()),
            channel: raw.channel.unwrap_or_else(|| "email".to_string()),
            amount: raw.amount.unwrap_or(0.0),
            urgency_level: raw
                .urgency_level
                .unwrap_or_else(|| UrgencyLevel::from_score(urgency_score)),
            urgency_score,
            status: raw.status.unwrap_or_else(|| "pending".to_string()),
            processing_time: raw.processing_time.unwrap_or(0.0),
            attachments,
            timestamp: raw.timestamp,
            sla_deadline: raw.sla_deadline,
            id: raw.id,
        }
    }

    pub fn sla_status(&self, now: OffsetDateTime) -> Option<SlaStatus> {
        let deadline = parse_timestamp(self.sla_deadline.as_deref()?)?;
        Some(SlaStatus::classify(now, deadline))
    }
}

pub fn normalize_rows(rows: Vec<RawLpoRow>) -> Vec<LpoSummary> {
    rows.into_iter()
        .map(|row| LpoSummary::from_raw(row, &ProcessedPathConvention))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use super::*;

    #[test]
    fn synthesizes_extraction_for_bare_attachments() {
        let raw: RawLpoRow = serde_json::from_value(json!({
            "id": "LPO-77",
            "attachments": [{"name": "po.pdf", "url": "/x/po.pdf"}]
        }))
        .unwrap();

        let summary = LpoSummary::from_raw(raw, &ProcessedPathConvention);
        assert_eq!(summary.attachments.len(), 1);
        let pair = &summary.attachments[0];
        assert_eq!(
            pair.extraction,
            FileRef {
                name: "po.json".into(),
                url: "/processed/LPO-77.json".into(),
                exists: true,
            }
        );
        assert_eq!(pair.attachment.url, "/x/po.pdf");
        assert_eq!(pair.provenance, Provenance::Assumed);
    }

    #[test]
    fn provided_pairs_are_used_verbatim() {
        let raw: RawLpoRow = serde_json::from_value(json!({
            "id": 9,
            "attachments": [{"name": "ignored.pdf", "url": "/ignored"}],
            "attachment_extractions": [{
                "attachment": {"name": "a.xlsx", "url": "/a.xlsx", "exists": true},
                "extraction": {"name": "a.json", "url": "/out/a.json", "exists": false}
            }]
        }))
        .unwrap();

        let summary = LpoSummary::from_raw(raw, &ProcessedPathConvention);
        assert_eq!(summary.attachments.len(), 1);
        assert_eq!(summary.attachments[0].extraction.url, "/out/a.json");
        assert!(!summary.attachments[0].extraction.exists);
        assert_eq!(summary.attachments[0].provenance, Provenance::Confirmed);
    }

    #[test]
    fn extension_replacement_edge_cases() {
        assert_eq!(with_json_extension("scan.final.pdf"), "scan.final.json");
        assert_eq!(with_json_extension("README"), "README.json");
        assert_eq!(with_json_extension(".hidden"), ".hidden.json");
    }

    #[test]
    fn server_urgency_level_wins_over_score() {
        let raw: RawLpoRow = serde_json::from_value(json!({
            "id": "1",
            "urgency_score": 95,
            "urgency_level": "low"
        }))
        .unwrap();
        let summary = LpoSummary::from_raw(raw, &ProcessedPathConvention);
        assert_eq!(summary.urgency_level, UrgencyLevel::Low);
    }

    #[test]
    fn sla_boundaries() {
        let deadline = datetime!(2024-05-01 12:00 UTC);
        let at = |offset: Duration| deadline - offset;

        assert_eq!(
            SlaStatus::classify(deadline + Duration::seconds(1), deadline),
            SlaStatus::Breached
        );
        assert_eq!(SlaStatus::classify(deadline, deadline), SlaStatus::Critical);
        assert_eq!(
            SlaStatus::classify(at(Duration::hours(2) - Duration::seconds(1)), deadline),
            SlaStatus::Critical
        );
        assert_eq!(
            SlaStatus::classify(at(Duration::hours(2)), deadline),
            SlaStatus::NearBreach
        );
        assert_eq!(
            SlaStatus::classify(at(Duration::hours(6) - Duration::seconds(1)), deadline),
            SlaStatus::NearBreach
        );
        assert_eq!(
            SlaStatus::classify(at(Duration::hours(6)), deadline),
            SlaStatus::OnTrack
        );
    }

    #[test]
    fn sla_status_reads_naive_and_offset_deadlines() {
        let now = datetime!(2024-05-01 08:00 UTC);
        let mut summary = LpoSummary::from_raw(RawLpoRow::default(), &ProcessedPathConvention);

        summary.sla_deadline = Some("2024-05-01T09:00:00Z".into());
        assert_eq!(summary.sla_status(now), Some(SlaStatus::Critical));

        summary.sla_deadline = Some("2024-05-01 20:00:00.123".into());
        assert_eq!(summary.sla_status(now), Some(SlaStatus::OnTrack));

        summary.sla_deadline = Some("not a date".into());
        assert_eq!(summary.sla_status(now), None);
    }
}
