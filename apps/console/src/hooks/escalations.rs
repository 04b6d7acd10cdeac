use dioxus::prelude::*;
use tracing::warn;

use crate::api::ClientError;
use crate::models::Conversation;
use crate::services::escalation::EscalationPanel;
use crate::API_CLIENT;

#[derive(Clone, Copy, PartialEq)]
pub struct EscalationHandle {
    pub panel: Signal<EscalationPanel>,
}

impl EscalationHandle {
    /// Shows the conversation's escalation flow and looks up its live status
    /// on the escalation service.
    pub fn select(&self, conversation: Conversation) {
        let mut panel = self.panel;
        let id = conversation.id.clone();
        let generation = panel.write().select(conversation);

        spawn(async move {
            let result = match API_CLIENT.get() {
                Some(client) => client.get_escalation_status(&id).await,
                None => Err(ClientError::Setup(anyhow::anyhow!(
                    "API client is not initialised"
                ))),
            };
            if let Err(err) = &result {
                warn!(conversation = %id, %err, "escalation status unavailable");
            }
            panel.write().apply_status(generation, result);
        });
    }

    pub fn close(&self) {
        let mut panel = self.panel;
        panel.write().clear();
    }
}

pub fn use_escalation_panel() -> EscalationHandle {
    let panel = use_signal(EscalationPanel::default);
    EscalationHandle { panel }
}
