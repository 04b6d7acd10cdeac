use dioxus::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::ClientError;

pub type AppSignal = Signal<AppState>;

const MAX_NOTICES: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            title: title.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Error notice for a failed request, preferring the backend's own
    /// message over generic status advice.
    pub fn from_client_error(context: impl Into<String>, err: &ClientError) -> Self {
        let status = err.status().map(|status| status.as_u16());
        let message = match (err, status) {
            (ClientError::Api { message, .. }, _) => message.clone(),
            (_, Some(code)) => http_status_advice(code).to_string(),
            (other, None) => other.to_string(),
        };
        Self {
            status,
            ..Self::new(NoticeKind::Error, context, message)
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OperationState {
    pub last_message: Option<String>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppState {
    pub operation: OperationState,
    pub notices: Vec<Notice>,
}

impl AppState {
    /// Oldest notices are dropped once the stack is full.
    pub fn push_notice(&mut self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error | NoticeKind::Warning => {
                self.operation.error = Some(notice.message.clone());
                self.operation.last_message = None;
            }
            NoticeKind::Success | NoticeKind::Info => {
                self.operation.last_message = Some(notice.message.clone());
                self.operation.error = None;
            }
        }
        self.operation.last_status = notice.status;
        self.operation.context = Some(notice.title.clone());

        self.notices.push(notice);
        if self.notices.len() > MAX_NOTICES {
            let overflow = self.notices.len() - MAX_NOTICES;
            self.notices.drain(..overflow);
        }
    }

    pub fn dismiss(&mut self, id: &str) {
        self.notices.retain(|notice| notice.id != id);
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct AppActions {
    state: AppSignal,
}

impl AppActions {
    pub fn notify_success(&self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Notice::new(NoticeKind::Success, title, message));
    }

    pub fn notify_error(&self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Notice::new(NoticeKind::Error, title, message));
    }

    pub fn notify_warning(&self, title: impl Into<String>, message: impl Into<String>) {
        self.push(Notice::new(NoticeKind::Warning, title, message));
    }

    pub fn record_http_failure(&self, context: impl Into<String>, err: &ClientError) {
        self.push(Notice::from_client_error(context, err));
    }

    pub fn dismiss(&self, id: &str) {
        let mut state = self.state;
        state.write().dismiss(id);
    }

    pub fn clear_operation_status(&self) {
        let mut signal = self.state;
        let mut state = signal.write();
        state.operation = OperationState::default();
        state.notices.clear();
    }

    fn push(&self, notice: Notice) {
        let mut state = self.state;
        state.write().push_notice(notice);
    }
}

fn http_status_advice(status: u16) -> &'static str {
    match status {
        401 => "401 Unauthorized: the access token is missing or expired. Sign in again and retry.",
        403 => "403 Forbidden: your role is not allowed to change this resource.",
        404 => "404 Not found: the record may already be gone. Refresh the list.",
        409 => "409 Conflict: a record with the same key already exists.",
        422 => "422 Rejected: the backend refused one of the submitted values.",
        429 => "429 Too many requests: wait a moment before retrying.",
        500..=599 => "The backend failed to handle the request. Try again shortly.",
        _ => "Request failed. Check the browser console for details.",
    }
}

pub fn use_app_state() -> AppSignal {
    use_context::<AppSignal>()
}

pub fn use_app_actions() -> AppActions {
    let state = use_app_state();
    AppActions { state }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn backend_message_wins_over_status_advice() {
        let notice = Notice::from_client_error(
            "Save price tolerance",
            &ClientError::Api {
                status: Some(StatusCode::CONFLICT),
                message: "tolerance already defined for Carrefour".into(),
            },
        );
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.status, Some(409));
        assert_eq!(notice.message, "tolerance already defined for Carrefour");
    }

    #[test]
    fn bare_status_falls_back_to_advice() {
        let notice = Notice::from_client_error(
            "Delete user",
            &ClientError::UnexpectedStatus {
                status: StatusCode::UNAUTHORIZED,
                body: Vec::new(),
            },
        );
        assert!(notice.message.starts_with("401"));

        let timeout = Notice::from_client_error(
            "Escalation status",
            &ClientError::Timeout(Duration::from_secs(10)),
        );
        assert_eq!(timeout.status, None);
        assert!(timeout.message.contains("timed out"));
    }

    #[test]
    fn notice_stack_is_bounded_and_dismissible() {
        let mut state = AppState::default();
        for idx in 0..6 {
            state.push_notice(Notice::new(NoticeKind::Info, "Refresh", format!("#{idx}")));
        }
        assert_eq!(state.notices.len(), MAX_NOTICES);
        assert_eq!(state.notices[0].message, "#2");

        let id = state.notices[1].id.clone();
        state.dismiss(&id);
        assert_eq!(state.notices.len(), MAX_NOTICES - 1);
        assert!(state.notices.iter().all(|notice| notice.id != id));
    }

    #[test]
    fn operation_tracks_latest_outcome() {
        let mut state = AppState::default();
        state.push_notice(Notice::new(NoticeKind::Error, "Save", "rejected"));
        assert_eq!(state.operation.error.as_deref(), Some("rejected"));

        state.push_notice(Notice::new(NoticeKind::Success, "Save", "User created"));
        assert_eq!(state.operation.error, None);
        assert_eq!(state.operation.last_message.as_deref(), Some("User created"));
        assert_eq!(state.operation.context.as_deref(), Some("Save"));
    }
}
