//! Conversation list and per-conversation escalation details.

use tracing::{debug, error};

use crate::api::{ClientError, ClientResult, QueryParams};
use crate::models::{Conversation, ConversationStatus, EscalationFlow, EscalationStatus};
use crate::services::aggregator::{Generation, RequestGeneration};
use crate::services::listing::{non_blank, FilterSet, ListViewModel, SortField};

/// Parses the embedded `escalation_info` document.
///
/// Blank or malformed documents yield `None`; a malformed one is logged and
/// the escalation section is simply not shown.
pub fn escalation_flow(conversation: &Conversation) -> Option<EscalationFlow> {
    let raw = conversation.escalation_info.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }
    match serde_json::from_str::<EscalationFlow>(raw) {
        Ok(flow) => Some(flow),
        Err(err) => {
            error!(
                conversation = %conversation.id,
                error = %err,
                "failed to parse escalation_info"
            );
            None
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConversationSortField {
    #[default]
    LastUpdate,
    CreatedAt,
    LpoNumber,
}

impl SortField for ConversationSortField {
    fn as_param(self) -> &'static str {
        match self {
            Self::LastUpdate => "last_update",
            Self::CreatedAt => "created_at",
            Self::LpoNumber => "lpo_number",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversationFilters {
    pub status: Option<ConversationStatus>,
    pub search: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConversationFilter {
    Status(Option<ConversationStatus>),
    Search(Option<String>),
}

impl FilterSet for ConversationFilters {
    type Change = ConversationFilter;

    fn apply(&mut self, change: ConversationFilter) {
        match change {
            ConversationFilter::Status(status) => self.status = status,
            ConversationFilter::Search(search) => self.search = non_blank(search),
        }
    }

    fn append_params(&self, params: &mut QueryParams) {
        if let Some(status) = self.status {
            let value = match status {
                ConversationStatus::Solved => "solved",
                ConversationStatus::InProgress => "in_progress",
                ConversationStatus::NotSolved => "not_solved",
            };
            params.push(("status", value.to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
    }
}

pub type ConversationListModel =
    ListViewModel<ConversationFilters, ConversationSortField, Conversation>;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum StatusLookup {
    #[default]
    Idle,
    Loading,
    Loaded(EscalationStatus),
    TimedOut,
    Unavailable(String),
}

impl StatusLookup {
    pub fn from_result(result: ClientResult<EscalationStatus>) -> Self {
        match result {
            Ok(status) => Self::Loaded(status),
            Err(ClientError::Timeout(limit)) => {
                debug!(?limit, "escalation status lookup timed out");
                Self::TimedOut
            }
            Err(err) => Self::Unavailable(err.to_string()),
        }
    }
}

/// Detail pane for the selected conversation.
#[derive(Clone, Debug, Default)]
pub struct EscalationPanel {
    pub selected: Option<Conversation>,
    pub flow: Option<EscalationFlow>,
    pub status: StatusLookup,
    generations: RequestGeneration,
}

impl EscalationPanel {
    /// Selects a conversation and returns the generation for its status
    /// lookup. Any lookup still in flight for a previous selection becomes
    /// stale.
    pub fn select(&mut self, conversation: Conversation) -> Generation {
        self.flow = escalation_flow(&conversation);
        self.selected = Some(conversation);
        self.status = StatusLookup::Loading;
        self.generations.issue()
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.flow = None;
        self.status = StatusLookup::Idle;
        self.generations.issue();
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|conversation| conversation.id.as_str())
    }

    pub fn apply_status(&mut self, generation: Generation, result: ClientResult<EscalationStatus>) {
        if !self.generations.is_latest(generation) {
            debug!(?generation, "discarding escalation status for old selection");
            return;
        }
        self.status = StatusLookup::from_result(result);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    fn conversation(info: Option<&str>) -> Conversation {
        Conversation {
            id: "c-1".into(),
            lpo_number: "LPO-5520".into(),
            escalation_info: info.map(str::to_string),
            ..Conversation::default()
        }
    }

    #[test]
    fn malformed_escalation_info_degrades_to_none() {
        assert_eq!(escalation_flow(&conversation(Some("{not valid json"))), None);
        assert_eq!(escalation_flow(&conversation(Some("   "))), None);
        assert_eq!(escalation_flow(&conversation(None)), None);
    }

    #[test]
    fn escalation_info_parses_stages() {
        let info = json!({
            "current_level": 2,
            "stages": [
                {"level": 1, "mode": "email", "contact": "ops@lulu.ae", "status": "sent"},
                {"level": 2, "mode": "whatsapp", "contact": "+971500000000", "status": "pending"}
            ]
        })
        .to_string();

        let flow = escalation_flow(&conversation(Some(&info))).expect("valid flow");
        assert_eq!(flow.current_level, 2);
        assert_eq!(flow.stages.len(), 2);
        assert_eq!(flow.stages[1].mode, "whatsapp");
    }

    #[test]
    fn panel_ignores_status_for_previous_selection() {
        let mut panel = EscalationPanel::default();
        let first = panel.select(conversation(None));
        let second = panel.select(Conversation {
            id: "c-2".into(),
            ..Conversation::default()
        });

        panel.apply_status(
            first,
            Ok(EscalationStatus {
                conversation_id: "c-1".into(),
                ..EscalationStatus::default()
            }),
        );
        assert_eq!(panel.status, StatusLookup::Loading);

        panel.apply_status(second, Err(ClientError::Timeout(Duration::from_secs(10))));
        assert_eq!(panel.status, StatusLookup::TimedOut);
        assert_eq!(panel.selected_id(), Some("c-2"));
    }

    #[test]
    fn malformed_info_still_allows_selection() {
        let mut panel = EscalationPanel::default();
        panel.select(conversation(Some("{not valid json")));
        assert!(panel.flow.is_none());
        assert_eq!(panel.selected_id(), Some("c-1"));

        panel.clear();
        assert_eq!(panel.status, StatusLookup::Idle);
        assert!(panel.selected.is_none());
    }

    #[test]
    fn conversation_filters_reset_page() {
        let mut model = ConversationListModel::new(20);
        model.pagination.total_pages = 3;
        model.set_page(3);
        let request = model.set_filter(ConversationFilter::Status(Some(
            ConversationStatus::InProgress,
        )));
        assert_eq!(model.page.index, 1);
        assert!(request
            .params
            .contains(&("status", "in_progress".to_string())));
    }
}
