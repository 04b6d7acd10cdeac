use serde_json::{json, Value};

use crate::models::{
    ActiveQueue, AnalyticsMetrics, DashboardSummary, LpoQueuePayload, ProcessingStatus,
};

/// Payloads as they appear in the `data` field of each dashboard endpoint.
#[derive(Clone, Debug)]
pub struct SamplePayloads {
    pub summary: DashboardSummary,
    pub status: ProcessingStatus,
    pub queue: LpoQueuePayload,
    pub analytics: AnalyticsMetrics,
    pub active_queue: ActiveQueue,
}

pub fn sample_payloads() -> SamplePayloads {
    SamplePayloads {
        summary: decode(json!({
            "emails_processed": 120,
            "lpos_extracted": 41,
            "pending_review": 6,
            "sla_breaches": 1,
            "avg_processing_time": 3.4,
            "auto_approval_rate": 0.72,
            "alerts": [
                {"id": "a-1", "level": "warning", "message": "Carrefour LPO near SLA"}
            ]
        })),
        status: decode(json!({
            "status_distribution": [
                {"status": "pending", "count": 4},
                {"status": "processing", "count": 2},
                {"status": "completed", "count": 35}
            ],
            "hourly_volume": [{"hour": "9:00", "volume": 5}],
            "timestamp": "2024-05-01T09:30:00Z"
        })),
        queue: decode(json!({
            "lpos": [
                sample_row("LPO-1001", "Carrefour", 91, "critical"),
                sample_row("LPO-1002", "Lulu Hypermarket", 64, "high"),
                sample_row("LPO-1003", "Spinneys", 22, "low")
            ],
            "pagination": {
                "current_page": 1,
                "total_pages": 1,
                "total_items": 3,
                "items_per_page": 20
            }
        })),
        analytics: decode(json!({
            "processing": {
                "avg_extraction_seconds": 12.5,
                "success_rate": 0.96,
                "manual_review_rate": 0.08
            },
            "quality": {
                "extraction_accuracy": 0.94,
                "validation_pass_rate": 0.9,
                "error_rate": 0.02
            },
            "volume": {
                "total_emails": 410,
                "lpo_emails": 120,
                "spam_emails": 37,
                "daily_average": 58.6
            }
        })),
        active_queue: decode(json!({
            "stages": [
                {"status": "extracting", "count": 3},
                {"status": "pending_review", "count": 6}
            ],
            "total": 9
        })),
    }
}

fn sample_row(id: &str, customer: &str, score: u32, level: &str) -> Value {
    json!({
        "id": id,
        "customer_name": customer,
        "channel": "email",
        "amount": "12500.00",
        "urgency_score": score,
        "urgency_level": level,
        "status": "pending",
        "attachments": [{"name": format!("{id}.pdf"), "url": format!("/files/{id}.pdf")}],
        "timestamp": "2024-05-01T08:15:00Z",
        "sla_deadline": "2024-05-02T08:15:00Z"
    })
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("fixture payload matches model")
}
