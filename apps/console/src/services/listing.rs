//! Paginated, filtered, sorted remote lists (LPO queue, email inbox).
//!
//! The view model owns the whole query (filters, sort and page) and hands
//! back the request to issue after each mutation. Rows are replaced wholesale
//! by whatever page the backend returns; nothing is patched locally.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::QueryParams;
use crate::models::{FilterCategory, Pagination, UrgencyLevel};
use crate::services::aggregator::{Generation, RequestGeneration};
use crate::services::lpo::SlaStatus;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

pub trait SortField: Copy + PartialEq + Default {
    fn as_param(self) -> &'static str;
}

pub trait FilterSet: Clone + Default + PartialEq {
    type Change;

    fn apply(&mut self, change: Self::Change);
    fn append_params(&self, params: &mut QueryParams);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sort<S> {
    pub field: S,
    pub direction: SortDirection,
}

impl<S: Default> Default for Sort<S> {
    fn default() -> Self {
        Self {
            field: S::default(),
            direction: SortDirection::Desc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageState {
    pub index: u32,
    pub size: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// The request a mutation asks the caller to issue.
#[derive(Clone, Debug)]
pub struct ListRequest {
    pub generation: Generation,
    pub params: QueryParams,
}

#[derive(Clone, Debug)]
pub struct ListViewModel<F, S, R> {
    pub filters: F,
    pub sort: Sort<S>,
    pub page: PageState,
    pub pagination: Pagination,
    pub rows: Vec<R>,
    pub is_loading: bool,
    pub error: Option<String>,
    generations: RequestGeneration,
}

impl<F, S, R> ListViewModel<F, S, R>
where
    F: FilterSet,
    S: SortField,
{
    pub fn new(page_size: u32) -> Self {
        Self {
            filters: F::default(),
            sort: Sort::default(),
            page: PageState {
                index: 1,
                size: page_size.max(1),
            },
            pagination: Pagination::default(),
            rows: Vec::new(),
            is_loading: false,
            error: None,
            generations: RequestGeneration::default(),
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.pagination.total_pages.max(1)
    }

    pub fn set_filter(&mut self, change: F::Change) -> ListRequest {
        self.filters.apply(change);
        self.page.index = 1;
        self.request()
    }

    pub fn clear_filters(&mut self) -> ListRequest {
        self.filters = F::default();
        self.page.index = 1;
        self.request()
    }

    /// Same field flips direction; a new field starts descending.
    pub fn set_sort(&mut self, field: S) -> ListRequest {
        if self.sort.field == field {
            self.sort.direction = self.sort.direction.flip();
        } else {
            self.sort = Sort {
                field,
                direction: SortDirection::Desc,
            };
        }
        self.page.index = 1;
        self.request()
    }

    pub fn set_page(&mut self, index: u32) -> Option<ListRequest> {
        if index < 1 || index > self.total_pages() {
            return None;
        }
        self.page.index = index;
        Some(self.request())
    }

    pub fn set_page_size(&mut self, size: u32) -> ListRequest {
        self.page.size = size.max(1);
        self.page.index = 1;
        self.request()
    }

    pub fn refresh(&mut self) -> ListRequest {
        self.request()
    }

    pub fn params(&self) -> QueryParams {
        let mut params: QueryParams = vec![
            ("page", self.page.index.to_string()),
            ("limit", self.page.size.to_string()),
            ("sort_by", self.sort.field.as_param().to_string()),
            ("sort_order", self.sort.direction.as_param().to_string()),
        ];
        self.filters.append_params(&mut params);
        params
    }

    fn request(&mut self) -> ListRequest {
        self.is_loading = true;
        ListRequest {
            generation: self.generations.issue(),
            params: self.params(),
        }
    }

    /// Installs a fetched page unless a newer request has been issued since.
    pub fn apply_page(&mut self, generation: Generation, rows: Vec<R>, pagination: Pagination) {
        if !self.generations.is_latest(generation) {
            debug!(?generation, "discarding superseded list page");
            return;
        }
        self.rows = rows;
        self.pagination = pagination;
        self.is_loading = false;
        self.error = None;
    }

    /// Keeps the rows on screen; only the error banner changes.
    pub fn apply_error(&mut self, generation: Generation, message: String) {
        if !self.generations.is_latest(generation) {
            return;
        }
        self.is_loading = false;
        self.error = Some(message);
    }
}

pub(crate) fn push_date_range(range: &Option<DateRange>, params: &mut QueryParams) {
    if let Some(range) = range {
        if range.start == range.end {
            params.push(("date", range.start.clone()));
        } else {
            params.push(("start_date", range.start.clone()));
            params.push(("end_date", range.end.clone()));
        }
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

// ---------------------------------------------------------------------------
// LPO queue
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LpoSortField {
    #[default]
    UrgencyScore,
    Amount,
    Customer,
    Timestamp,
    SlaDeadline,
}

impl SortField for LpoSortField {
    fn as_param(self) -> &'static str {
        match self {
            Self::UrgencyScore => "urgency_score",
            Self::Amount => "amount",
            Self::Customer => "customer",
            Self::Timestamp => "timestamp",
            Self::SlaDeadline => "sla_deadline",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LpoFilters {
    pub urgency_level: Option<UrgencyLevel>,
    pub customer: Option<String>,
    pub sla_status: Option<SlaStatus>,
    pub channel: Option<String>,
    pub date_range: Option<DateRange>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LpoFilter {
    UrgencyLevel(Option<UrgencyLevel>),
    Customer(Option<String>),
    SlaStatus(Option<SlaStatus>),
    Channel(Option<String>),
    DateRange(Option<DateRange>),
}

impl FilterSet for LpoFilters {
    type Change = LpoFilter;

    fn apply(&mut self, change: LpoFilter) {
        match change {
            LpoFilter::UrgencyLevel(level) => self.urgency_level = level,
            LpoFilter::Customer(customer) => self.customer = non_blank(customer),
            LpoFilter::SlaStatus(status) => self.sla_status = status,
            LpoFilter::Channel(channel) => self.channel = non_blank(channel),
            LpoFilter::DateRange(range) => self.date_range = range,
        }
    }

    fn append_params(&self, params: &mut QueryParams) {
        if let Some(level) = self.urgency_level {
            params.push(("urgency_level", level.as_param().to_string()));
        }
        if let Some(status) = self.sla_status {
            params.push(("sla_status", status.as_param().to_string()));
        }
        if let Some(channel) = &self.channel {
            params.push(("channel", channel.clone()));
        }
        if let Some(customer) = &self.customer {
            params.push(("customer", customer.clone()));
        }
        push_date_range(&self.date_range, params);
    }
}

pub type LpoQueueModel = ListViewModel<LpoFilters, LpoSortField, crate::services::lpo::LpoSummary>;

// ---------------------------------------------------------------------------
// Email inbox
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmailSortField {
    #[default]
    DateReceived,
    Sender,
    Subject,
    SpamConfidence,
}

impl SortField for EmailSortField {
    fn as_param(self) -> &'static str {
        match self {
            Self::DateReceived => "date_received",
            Self::Sender => "sender",
            Self::Subject => "subject",
            Self::SpamConfidence => "spam_confidence",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmailFilters {
    pub search: Option<String>,
    pub category: Option<FilterCategory>,
    pub include_spam: bool,
    pub mailbox_folder: Option<String>,
    pub date_range: Option<DateRange>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EmailFilter {
    Search(Option<String>),
    Category(Option<FilterCategory>),
    IncludeSpam(bool),
    MailboxFolder(Option<String>),
    DateRange(Option<DateRange>),
}

impl FilterSet for EmailFilters {
    type Change = EmailFilter;

    fn apply(&mut self, change: EmailFilter) {
        match change {
            EmailFilter::Search(search) => self.search = non_blank(search),
            EmailFilter::Category(category) => self.category = category,
            EmailFilter::IncludeSpam(include) => self.include_spam = include,
            EmailFilter::MailboxFolder(folder) => self.mailbox_folder = non_blank(folder),
            EmailFilter::DateRange(range) => self.date_range = range,
        }
    }

    fn append_params(&self, params: &mut QueryParams) {
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(category) = self.category {
            params.push(("filter_category", category.as_param().to_string()));
        }
        params.push(("include_spam", self.include_spam.to_string()));
        if let Some(folder) = &self.mailbox_folder {
            params.push(("mailbox_folder", folder.clone()));
        }
        push_date_range(&self.date_range, params);
    }
}

pub type EmailListModel = ListViewModel<EmailFilters, EmailSortField, crate::models::EmailRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_queue(total_pages: u32, index: u32) -> LpoQueueModel {
        let mut model = LpoQueueModel::new(20);
        model.pagination.total_pages = total_pages;
        model.page.index = index;
        model
    }

    fn param<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn every_filter_change_resets_to_first_page() {
        let changes = vec![
            LpoFilter::UrgencyLevel(Some(UrgencyLevel::High)),
            LpoFilter::Customer(Some("Lulu".into())),
            LpoFilter::SlaStatus(Some(SlaStatus::Breached)),
            LpoFilter::Channel(Some("whatsapp".into())),
            LpoFilter::DateRange(Some(DateRange {
                start: "2024-05-01".into(),
                end: "2024-05-02".into(),
            })),
            LpoFilter::Customer(None),
        ];
        for change in changes {
            for start in [1, 2, 7] {
                let mut model = loaded_queue(9, start);
                let request = model.set_filter(change.clone());
                assert_eq!(model.page.index, 1);
                assert_eq!(param(&request.params, "page"), Some("1"));
            }
        }
    }

    #[test]
    fn sort_toggles_and_resets_page() {
        let mut model = loaded_queue(5, 4);
        assert_eq!(model.sort.field, LpoSortField::UrgencyScore);

        model.set_sort(LpoSortField::UrgencyScore);
        assert_eq!(model.sort.direction, SortDirection::Asc);
        assert_eq!(model.page.index, 1);

        model.page.index = 3;
        model.set_sort(LpoSortField::Amount);
        assert_eq!(model.sort.field, LpoSortField::Amount);
        assert_eq!(model.sort.direction, SortDirection::Desc);
        assert_eq!(model.page.index, 1);

        let request = model.set_sort(LpoSortField::Amount);
        assert_eq!(param(&request.params, "sort_by"), Some("amount"));
        assert_eq!(param(&request.params, "sort_order"), Some("asc"));
    }

    #[test]
    fn out_of_range_pages_are_ignored() {
        let mut model = loaded_queue(3, 2);
        for index in [0, 4, 99] {
            assert!(model.set_page(index).is_none());
            assert_eq!(model.page.index, 2);
        }
        for index in 1..=3 {
            let request = model.set_page(index).expect("in range");
            assert_eq!(model.page.index, index);
            assert_eq!(param(&request.params, "page"), Some(index.to_string().as_str()));
        }
    }

    #[test]
    fn set_page_keeps_filters() {
        let mut model = loaded_queue(4, 1);
        model.set_filter(LpoFilter::Channel(Some("email".into())));
        model.pagination.total_pages = 4;
        let request = model.set_page(3).unwrap();
        assert_eq!(param(&request.params, "channel"), Some("email"));
        assert_eq!(model.filters.channel.as_deref(), Some("email"));
    }

    #[test]
    fn stale_pages_are_dropped() {
        let mut model = loaded_queue(3, 1);
        let first = model.refresh();
        let second = model.set_filter(LpoFilter::Customer(Some("Spinneys".into())));

        model.apply_page(
            second.generation,
            Vec::new(),
            Pagination {
                total_pages: 1,
                ..Pagination::default()
            },
        );
        model.apply_page(
            first.generation,
            Vec::new(),
            Pagination {
                total_pages: 8,
                ..Pagination::default()
            },
        );
        assert_eq!(model.pagination.total_pages, 1);
        assert!(!model.is_loading);
    }

    #[test]
    fn blank_text_filters_are_cleared() {
        let mut model = loaded_queue(1, 1);
        let request = model.set_filter(LpoFilter::Customer(Some("   ".into())));
        assert_eq!(model.filters.customer, None);
        assert_eq!(param(&request.params, "customer"), None);
    }

    #[test]
    fn single_day_range_uses_date_param() {
        let mut model = EmailListModel::new(25);
        let request = model.set_filter(EmailFilter::DateRange(Some(DateRange {
            start: "2024-05-03".into(),
            end: "2024-05-03".into(),
        })));
        assert_eq!(param(&request.params, "date"), Some("2024-05-03"));
        assert_eq!(param(&request.params, "start_date"), None);
        assert_eq!(param(&request.params, "include_spam"), Some("false"));
        assert_eq!(param(&request.params, "sort_by"), Some("date_received"));
    }

    #[test]
    fn email_filters_reset_page_and_serialize() {
        let mut model = EmailListModel::new(25);
        model.pagination.total_pages = 6;
        model.set_page(5);
        let request = model.set_filter(EmailFilter::Category(Some(FilterCategory::Lpo)));
        assert_eq!(model.page.index, 1);
        assert_eq!(param(&request.params, "filter_category"), Some("LPO"));

        let request = model.set_filter(EmailFilter::MailboxFolder(Some("Inbox".into())));
        assert_eq!(param(&request.params, "mailbox_folder"), Some("Inbox"));
    }

    #[test]
    fn errors_keep_rows() {
        let mut model = EmailListModel::new(10);
        let request = model.refresh();
        model.apply_page(
            request.generation,
            vec![crate::models::EmailRecord::default()],
            Pagination::default(),
        );
        let retry = model.refresh();
        model.apply_error(retry.generation, "offline".into());
        assert_eq!(model.rows.len(), 1);
        assert_eq!(model.error.as_deref(), Some("offline"));
    }
}
