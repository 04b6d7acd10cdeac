//! Dashboard fetch aggregation.
//!
//! One aggregation cycle fires every dashboard source at once, waits for all
//! of them to settle and folds the successful ones into a copy of the
//! previous view model. A failed source never fails the cycle; its slice
//! simply keeps the last good value (or the zero value on first load).

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{ClientError, ClientResult, QueryParams};
use crate::models::{
    ActiveQueue, AnalyticsMetrics, DashboardSummary, LpoQueuePayload, Pagination,
    ProcessingStatus,
};
use crate::services::lpo::{normalize_rows, LpoSummary};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl DashboardQuery {
    /// Parameters for the queue preview embedded on the dashboard.
    pub fn queue_params(&self, page_size: u32) -> QueryParams {
        let mut params: QueryParams = vec![
            ("page", "1".to_string()),
            ("limit", page_size.to_string()),
            ("sort_by", "urgency_score".to_string()),
            ("sort_order", "desc".to_string()),
        ];
        if let Some(date) = &self.date {
            params.push(("date", date.clone()));
        }
        if let Some(start) = &self.start_date {
            params.push(("start_date", start.clone()));
        }
        if let Some(end) = &self.end_date {
            params.push(("end_date", end.clone()));
        }
        params
    }
}

#[async_trait(?Send)]
pub trait DashboardBackend {
    async fn summary(&self, query: &DashboardQuery) -> ClientResult<DashboardSummary>;
    async fn processing_status(&self, query: &DashboardQuery) -> ClientResult<ProcessingStatus>;
    async fn lpo_queue(&self, params: &QueryParams) -> ClientResult<LpoQueuePayload>;
    async fn analytics(&self, query: &DashboardQuery) -> ClientResult<AnalyticsMetrics>;
    async fn active_queue(&self, query: &DashboardQuery) -> ClientResult<ActiveQueue>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DashboardSource {
    Summary,
    ProcessingStatus,
    LpoQueue,
    Analytics,
    ActiveQueue,
}

impl DashboardSource {
    pub const ALL: [DashboardSource; 5] = [
        Self::Summary,
        Self::ProcessingStatus,
        Self::LpoQueue,
        Self::Analytics,
        Self::ActiveQueue,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::ProcessingStatus => "processing_status",
            Self::LpoQueue => "lpo_queue",
            Self::Analytics => "analytics",
            Self::ActiveQueue => "active_queue",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overview {
    pub summary: DashboardSummary,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LpoQueuePage {
    pub rows: Vec<LpoSummary>,
    pub pagination: Pagination,
}

impl From<LpoQueuePayload> for LpoQueuePage {
    fn from(payload: LpoQueuePayload) -> Self {
        Self {
            rows: normalize_rows(payload.lpos),
            pagination: payload.pagination,
        }
    }
}

/// Every field has a zero value, so a dashboard that has never heard back
/// from the backend still renders numbers instead of holes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardViewModel {
    pub overview: Overview,
    pub analytics: AnalyticsMetrics,
    pub active_queue: ActiveQueue,
    pub lpo_queue: LpoQueuePage,
    pub processing_status: ProcessingStatus,
}

#[derive(Debug)]
pub struct SourceFailure {
    pub source: DashboardSource,
    pub error: ClientError,
}

#[derive(Debug)]
pub struct Aggregation {
    pub model: DashboardViewModel,
    pub failures: Vec<SourceFailure>,
}

impl Aggregation {
    pub fn failed(&self, source: DashboardSource) -> bool {
        self.failures.iter().any(|failure| failure.source == source)
    }
}

/// Runs one full cycle. All five requests are in flight together and the
/// merge only happens once every one of them has settled.
pub async fn aggregate<B>(
    backend: &B,
    query: &DashboardQuery,
    page_size: u32,
    previous: &DashboardViewModel,
) -> Aggregation
where
    B: DashboardBackend + ?Sized,
{
    let queue_params = query.queue_params(page_size);
    let (summary, status, queue, analytics, active) = futures::join!(
        backend.summary(query),
        backend.processing_status(query),
        backend.lpo_queue(&queue_params),
        backend.analytics(query),
        backend.active_queue(query),
    );

    let mut model = previous.clone();
    let mut failures = Vec::new();

    if let Some(summary) = settle(DashboardSource::Summary, summary, &mut failures) {
        model.overview = Overview { summary };
    }
    if let Some(status) = settle(DashboardSource::ProcessingStatus, status, &mut failures) {
        model.processing_status = status;
    }
    if let Some(queue) = settle(DashboardSource::LpoQueue, queue, &mut failures) {
        model.lpo_queue = queue.into();
    }
    if let Some(analytics) = settle(DashboardSource::Analytics, analytics, &mut failures) {
        model.analytics = analytics;
    }
    if let Some(active) = settle(DashboardSource::ActiveQueue, active, &mut failures) {
        model.active_queue = active;
    }

    Aggregation { model, failures }
}

/// The timer-driven light refresh: only the processing-status slice.
pub async fn refresh_processing_status<B>(
    backend: &B,
    query: &DashboardQuery,
) -> Option<ProcessingStatus>
where
    B: DashboardBackend + ?Sized,
{
    let mut failures = Vec::new();
    let result = backend.processing_status(query).await;
    settle(DashboardSource::ProcessingStatus, result, &mut failures)
}

fn settle<T>(
    source: DashboardSource,
    result: ClientResult<T>,
    failures: &mut Vec<SourceFailure>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(source = source.label(), %error, "dashboard source skipped");
            failures.push(SourceFailure { source, error });
            None
        }
    }
}

/// A request generation issued by [`RequestGeneration::issue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// Monotonic counter used to drop responses that were overtaken by a newer
/// request for the same slice of state.
#[derive(Clone, Debug, Default)]
pub struct RequestGeneration {
    latest: Rc<Cell<u64>>,
}

impl RequestGeneration {
    pub fn issue(&self) -> Generation {
        let next = self.latest.get() + 1;
        self.latest.set(next);
        Generation(next)
    }

    pub fn is_latest(&self, generation: Generation) -> bool {
        self.latest.get() == generation.0
    }
}

/// Generation bookkeeping for one dashboard instance.
///
/// A full cycle claims both counters. A light refresh claims only the status
/// counter, so it can overtake the status slice of an older full cycle but
/// never cancels the cycle's other slices.
#[derive(Clone, Debug, Default)]
pub struct DashboardCycles {
    full: RequestGeneration,
    status: RequestGeneration,
}

#[derive(Clone, Copy, Debug)]
pub struct FullCycleTicket {
    full: Generation,
    status: Generation,
}

impl DashboardCycles {
    pub fn begin_full(&self) -> FullCycleTicket {
        FullCycleTicket {
            full: self.full.issue(),
            status: self.status.issue(),
        }
    }

    pub fn begin_status(&self) -> Generation {
        self.status.issue()
    }

    /// Installs a finished full cycle into `current`. Returns `false` when the
    /// whole cycle was superseded and nothing was applied.
    pub fn apply_full(
        &self,
        ticket: FullCycleTicket,
        current: &mut DashboardViewModel,
        mut next: DashboardViewModel,
    ) -> bool {
        if !self.full.is_latest(ticket.full) {
            debug!(?ticket, "discarding superseded dashboard cycle");
            return false;
        }
        if !self.status.is_latest(ticket.status) {
            next.processing_status = current.processing_status.clone();
        }
        *current = next;
        true
    }

    pub fn apply_status(
        &self,
        generation: Generation,
        current: &mut DashboardViewModel,
        status: ProcessingStatus,
    ) -> bool {
        if !self.status.is_latest(generation) {
            debug!(?generation, "discarding superseded status refresh");
            return false;
        }
        current.processing_status = status;
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use futures::executor::block_on;
    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::fixtures::dashboard::{sample_payloads, SamplePayloads};

    struct StubBackend {
        payloads: SamplePayloads,
        failing: BTreeSet<DashboardSource>,
    }

    impl StubBackend {
        fn new(failing: impl IntoIterator<Item = DashboardSource>) -> Self {
            Self {
                payloads: sample_payloads(),
                failing: failing.into_iter().collect(),
            }
        }

        fn answer<T: Clone>(&self, source: DashboardSource, value: &T) -> ClientResult<T> {
            if self.failing.contains(&source) {
                Err(ClientError::UnexpectedStatus {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: b"boom".to_vec(),
                })
            } else {
                Ok(value.clone())
            }
        }
    }

    #[async_trait(?Send)]
    impl DashboardBackend for StubBackend {
        async fn summary(&self, _query: &DashboardQuery) -> ClientResult<DashboardSummary> {
            self.answer(DashboardSource::Summary, &self.payloads.summary)
        }

        async fn processing_status(
            &self,
            _query: &DashboardQuery,
        ) -> ClientResult<ProcessingStatus> {
            self.answer(DashboardSource::ProcessingStatus, &self.payloads.status)
        }

        async fn lpo_queue(&self, _params: &QueryParams) -> ClientResult<LpoQueuePayload> {
            self.answer(DashboardSource::LpoQueue, &self.payloads.queue)
        }

        async fn analytics(&self, _query: &DashboardQuery) -> ClientResult<AnalyticsMetrics> {
            self.answer(DashboardSource::Analytics, &self.payloads.analytics)
        }

        async fn active_queue(&self, _query: &DashboardQuery) -> ClientResult<ActiveQueue> {
            self.answer(DashboardSource::ActiveQueue, &self.payloads.active_queue)
        }
    }

    fn previous_model() -> DashboardViewModel {
        let mut model = DashboardViewModel::default();
        model.overview.summary.emails_processed = 7;
        model.analytics.volume.total_emails = 99;
        model.active_queue.total = 3;
        model.processing_status.timestamp = Some("earlier".into());
        model
    }

    #[test]
    fn every_failure_subset_yields_a_complete_model() {
        let payloads = sample_payloads();
        let previous = previous_model();

        for mask in 0u32..(1 << DashboardSource::ALL.len()) {
            let failing: Vec<_> = DashboardSource::ALL
                .iter()
                .enumerate()
                .filter(|(idx, _)| mask & (1 << idx) != 0)
                .map(|(_, source)| *source)
                .collect();
            let backend = StubBackend::new(failing.clone());
            let result = block_on(aggregate(
                &backend,
                &DashboardQuery::default(),
                20,
                &previous,
            ));

            assert_eq!(result.failures.len(), failing.len(), "mask {mask:05b}");

            let expected_summary = if result.failed(DashboardSource::Summary) {
                &previous.overview.summary
            } else {
                &payloads.summary
            };
            assert_eq!(&result.model.overview.summary, expected_summary);

            let expected_status = if result.failed(DashboardSource::ProcessingStatus) {
                &previous.processing_status
            } else {
                &payloads.status
            };
            assert_eq!(&result.model.processing_status, expected_status);

            let expected_analytics = if result.failed(DashboardSource::Analytics) {
                &previous.analytics
            } else {
                &payloads.analytics
            };
            assert_eq!(&result.model.analytics, expected_analytics);

            let expected_active = if result.failed(DashboardSource::ActiveQueue) {
                &previous.active_queue
            } else {
                &payloads.active_queue
            };
            assert_eq!(&result.model.active_queue, expected_active);

            if result.failed(DashboardSource::LpoQueue) {
                assert_eq!(result.model.lpo_queue, previous.lpo_queue);
            } else {
                assert_eq!(result.model.lpo_queue.rows.len(), 3);
            }
        }
    }

    #[test]
    fn all_sources_succeed() {
        let backend = StubBackend::new([]);
        let result = block_on(aggregate(
            &backend,
            &DashboardQuery::default(),
            20,
            &DashboardViewModel::default(),
        ));

        assert!(result.failures.is_empty());
        assert_eq!(result.model.overview.summary.emails_processed, 120);
        assert_eq!(result.model.lpo_queue.rows.len(), 3);
        assert_eq!(result.model.lpo_queue.pagination.total_items, 3);

        let window = crate::services::charts::hourly_window(
            &result.model.processing_status.hourly_volume,
            14,
        );
        let hours: Vec<u8> = window.iter().map(|bucket| bucket.hour).collect();
        assert_eq!(hours, vec![7, 8, 9, 10, 11]);
    }

    #[test]
    fn summary_failure_keeps_defaults_and_fills_other_slices() {
        let backend = StubBackend::new([DashboardSource::Summary]);
        let result = block_on(aggregate(
            &backend,
            &DashboardQuery::default(),
            20,
            &DashboardViewModel::default(),
        ));

        assert!(result.failed(DashboardSource::Summary));
        assert_eq!(result.model.overview, Overview::default());
        assert_eq!(result.model.processing_status.hourly_volume.len(), 1);
        assert_eq!(result.model.lpo_queue.rows.len(), 3);
    }

    #[test]
    fn stale_full_cycle_is_discarded() {
        let cycles = DashboardCycles::default();
        let mut current = DashboardViewModel::default();

        let slow = cycles.begin_full();
        let fast = cycles.begin_full();

        let mut fresh = DashboardViewModel::default();
        fresh.overview.summary.emails_processed = 2;
        assert!(cycles.apply_full(fast, &mut current, fresh));

        let mut stale = DashboardViewModel::default();
        stale.overview.summary.emails_processed = 1;
        assert!(!cycles.apply_full(slow, &mut current, stale));
        assert_eq!(current.overview.summary.emails_processed, 2);
    }

    #[test]
    fn light_refresh_overtakes_status_slice_only() {
        let cycles = DashboardCycles::default();
        let mut current = DashboardViewModel::default();

        let full = cycles.begin_full();
        let light = cycles.begin_status();

        let refreshed: ProcessingStatus = serde_json::from_value(json!({
            "timestamp": "light"
        }))
        .unwrap();
        assert!(cycles.apply_status(light, &mut current, refreshed));

        let mut cycle_result = DashboardViewModel::default();
        cycle_result.overview.summary.emails_processed = 5;
        cycle_result.processing_status.timestamp = Some("full".into());
        assert!(cycles.apply_full(full, &mut current, cycle_result));

        assert_eq!(current.overview.summary.emails_processed, 5);
        assert_eq!(current.processing_status.timestamp.as_deref(), Some("light"));
    }

    #[test]
    fn light_refresh_is_dropped_after_newer_full_cycle() {
        let cycles = DashboardCycles::default();
        let mut current = DashboardViewModel::default();

        let light = cycles.begin_status();
        let full = cycles.begin_full();

        let mut cycle_result = DashboardViewModel::default();
        cycle_result.processing_status.timestamp = Some("full".into());
        assert!(cycles.apply_full(full, &mut current, cycle_result));

        let late = ProcessingStatus {
            timestamp: Some("late".into()),
            ..ProcessingStatus::default()
        };
        assert!(!cycles.apply_status(light, &mut current, late));
        assert_eq!(current.processing_status.timestamp.as_deref(), Some("full"));
    }

    #[test]
    fn light_refresh_failure_yields_nothing() {
        let backend = StubBackend::new([DashboardSource::ProcessingStatus]);
        let status = block_on(refresh_processing_status(
            &backend,
            &DashboardQuery::default(),
        ));
        assert!(status.is_none());
    }

    #[test]
    fn queue_params_carry_date_range() {
        let query = DashboardQuery {
            date: None,
            start_date: Some("2024-05-01".into()),
            end_date: Some("2024-05-07".into()),
        };
        let params = query.queue_params(10);
        assert!(params.contains(&("limit", "10".to_string())));
        assert!(params.contains(&("start_date", "2024-05-01".to_string())));
        assert!(params.contains(&("end_date", "2024-05-07".to_string())));
        assert!(!params.iter().any(|(key, _)| *key == "date"));
    }
}
