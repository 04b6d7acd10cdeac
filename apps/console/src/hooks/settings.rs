use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use tracing::{debug, error};

use crate::api::ClientError;
use crate::hooks::preferences;
use crate::models::SettingsRecord;
use crate::services::settings::{
    execute, load as load_records, ModalMode, Mutation, Outcome, ResourceKind, SettingsModal, SettingsTable,
};
use crate::state::{use_app_actions, AppActions};
use crate::API_CLIENT;

#[derive(Clone, Copy, PartialEq)]
pub struct SettingsHandle {
    pub active: Signal<ResourceKind>,
    pub table: Signal<SettingsTable>,
    pub modal: Signal<SettingsModal>,
    actions: AppActions,
}

impl SettingsHandle {
    pub fn select_tab(&self, kind: ResourceKind) {
        preferences::store_settings_tab(kind);
        let mut active = self.active;
        active.set(kind);
    }

    /// Re-fetches the active tab from the backend.
    pub fn reload(&self) {
        let handle = *self;
        spawn(async move {
            let kind = *handle.active.peek();
            handle.load(kind).await;
        });
    }

    async fn load(self, kind: ResourceKind) {
        let mut table = self.table;
        let generation = table.write().begin(kind);
        let result = match API_CLIENT.get() {
            Some(client) => load_records(client, kind).await,
            None => Err(ClientError::Setup(anyhow::anyhow!(
                "API client is not initialised"
            ))),
        };
        if let Err(err) = &result {
            error!(resource = kind.path(), %err, "settings list failed");
        }
        table.write().apply(generation, result);
    }

    pub fn open_create(&self) {
        let mut modal = self.modal;
        let kind = *self.active.peek();
        modal.write().open(kind, ModalMode::Create, None);
    }

    pub fn open_edit(&self, record: &SettingsRecord) {
        let Some(id) = record.id() else {
            debug!("record without id cannot be edited");
            return;
        };
        let mut modal = self.modal;
        let kind = *self.active.peek();
        modal.write().open(kind, ModalMode::Edit { id }, Some(record));
    }

    pub fn request_delete(&self, id: String) {
        let mut modal = self.modal;
        let kind = *self.active.peek();
        modal.write().request_delete(kind, id);
    }

    pub fn set_field(&self, name: &str, value: String) {
        let mut modal = self.modal;
        modal.write().set_field(name, value);
    }

    pub fn submit(&self) {
        let mut modal = self.modal;
        let submitted = modal.write().submit();
        match submitted {
            Ok(Some(mutation)) => self.run(mutation),
            Ok(None) => {}
            Err(err) => debug!(%err, "settings form rejected"),
        }
    }

    pub fn confirm(&self) {
        let mut modal = self.modal;
        let confirmed = modal.write().confirm();
        if let Some(mutation) = confirmed {
            self.run(mutation);
        }
    }

    pub fn cancel(&self) {
        let mut modal = self.modal;
        modal.write().cancel();
    }

    fn run(&self, mutation: Mutation) {
        let handle = *self;
        spawn(async move {
            let mut modal = handle.modal;
            let Some(client) = API_CLIENT.get() else {
                modal
                    .write()
                    .finish(Err("API client is not initialised".to_string()));
                handle
                    .actions
                    .notify_error(mutation.kind.label(), "API client is not initialised");
                return;
            };

            match execute(client, &mutation).await {
                Ok(()) => {
                    let outcome = modal.write().finish(Ok(()));
                    if let Some(Outcome::Succeeded { kind, message }) = outcome {
                        handle.actions.notify_success(kind.label(), message);
                        handle.load(kind).await;
                    }
                }
                Err(err) => {
                    error!(resource = mutation.kind.path(), %err, "settings mutation failed");
                    modal.write().finish(Err(err.to_string()));
                    handle.actions.record_http_failure(mutation.kind.label(), &err);
                }
            }
        });
    }
}

pub fn use_settings() -> SettingsHandle {
    let actions = use_app_actions();
    let active = use_signal(preferences::settings_tab);
    let table = use_signal(|| SettingsTable::new(*active.peek()));
    let modal = use_signal(SettingsModal::default);
    let handle = SettingsHandle {
        active,
        table,
        modal,
        actions,
    };

    let active_kind = active();
    use_future(use_reactive!(|active_kind| async move {
        TimeoutFuture::new(0).await;
        handle.load(active_kind).await;
    }));

    handle
}
