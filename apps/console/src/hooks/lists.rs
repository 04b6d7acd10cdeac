use dioxus::prelude::*;
use futures::future::{FutureExt, LocalBoxFuture};
use gloo_timers::future::TimeoutFuture;
use tracing::error;

use crate::api::{ClientResult, LpoClient, QueryParams};
use crate::hooks::clock::millis;
use crate::hooks::preferences;
use crate::models::{Conversation, EmailRecord, Pagination};
use crate::services::escalation::{ConversationFilters, ConversationSortField};
use crate::services::listing::{
    EmailFilters, EmailSortField, FilterSet, ListRequest, ListViewModel, LpoFilters,
    LpoSortField, SortField,
};
use crate::services::lpo::{normalize_rows, LpoSummary};
use crate::{API_CLIENT, APP_CONFIG};

type PageFetcher<R> =
    fn(&'static LpoClient, QueryParams) -> LocalBoxFuture<'static, ClientResult<(Vec<R>, Pagination)>>;

/// A remote list bound to component state. Every mutation issues its own
/// request; only the newest one is allowed to land.
pub struct RemoteList<F: 'static, S: 'static, R: 'static> {
    pub model: Signal<ListViewModel<F, S, R>>,
    fetch: PageFetcher<R>,
    label: &'static str,
}

impl<F, S, R> Clone for RemoteList<F, S, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F, S, R> Copy for RemoteList<F, S, R> {}

impl<F, S, R> PartialEq for RemoteList<F, S, R> {
    fn eq(&self, other: &Self) -> bool {
        self.model == other.model
    }
}

impl<F, S, R> RemoteList<F, S, R>
where
    F: FilterSet + 'static,
    S: SortField + 'static,
    R: 'static,
{
    pub fn set_filter(&self, change: F::Change) {
        let mut model = self.model;
        let request = model.write().set_filter(change);
        self.dispatch(request);
    }

    pub fn clear_filters(&self) {
        let mut model = self.model;
        let request = model.write().clear_filters();
        self.dispatch(request);
    }

    pub fn set_sort(&self, field: S) {
        let mut model = self.model;
        let request = model.write().set_sort(field);
        self.dispatch(request);
    }

    pub fn set_page(&self, index: u32) {
        let mut model = self.model;
        let request = model.write().set_page(index);
        if let Some(request) = request {
            self.dispatch(request);
        }
    }

    pub fn set_page_size(&self, size: u32) {
        let mut model = self.model;
        let request = model.write().set_page_size(size);
        self.dispatch(request);
    }

    pub fn refresh(&self) {
        let mut model = self.model;
        let request = model.write().refresh();
        self.dispatch(request);
    }

    fn dispatch(&self, request: ListRequest) {
        let list = *self;
        spawn(async move {
            list.load(request).await;
        });
    }

    async fn load(self, request: ListRequest) {
        let mut model = self.model;
        let Some(client) = API_CLIENT.get() else {
            model
                .write()
                .apply_error(request.generation, "API client is not initialised".into());
            return;
        };

        match (self.fetch)(client, request.params).await {
            Ok((rows, pagination)) => {
                model.write().apply_page(request.generation, rows, pagination);
            }
            Err(err) => {
                error!(list = self.label, %err, status = ?err.status(), "list request failed");
                model.write().apply_error(request.generation, err.to_string());
            }
        }
    }
}

fn use_remote_list<F, S, R>(
    page_size: u32,
    label: &'static str,
    fetch: PageFetcher<R>,
) -> RemoteList<F, S, R>
where
    F: FilterSet + 'static,
    S: SortField + 'static,
    R: 'static,
{
    let model = use_signal(|| ListViewModel::new(page_size));
    let list = RemoteList {
        model,
        fetch,
        label,
    };

    use_future(move || async move {
        TimeoutFuture::new(0).await;
        let mut model = list.model;
        let request = model.write().refresh();
        list.load(request).await;
    });

    list
}

fn fetch_lpo_page(
    client: &'static LpoClient,
    params: QueryParams,
) -> LocalBoxFuture<'static, ClientResult<(Vec<LpoSummary>, Pagination)>> {
    async move {
        let payload = client.get_lpo_queue(&params).await?;
        Ok((normalize_rows(payload.lpos), payload.pagination))
    }
    .boxed_local()
}

fn fetch_email_page(
    client: &'static LpoClient,
    params: QueryParams,
) -> LocalBoxFuture<'static, ClientResult<(Vec<EmailRecord>, Pagination)>> {
    async move {
        let payload = client.get_emails(&params).await?;
        Ok((payload.emails, payload.pagination))
    }
    .boxed_local()
}

fn fetch_conversation_page(
    client: &'static LpoClient,
    params: QueryParams,
) -> LocalBoxFuture<'static, ClientResult<(Vec<Conversation>, Pagination)>> {
    async move {
        let payload = client.get_conversations(&params).await?;
        Ok((payload.conversations, payload.pagination))
    }
    .boxed_local()
}

fn default_page_size() -> u32 {
    APP_CONFIG.get().map(|cfg| cfg.page_size).unwrap_or(20)
}

pub type LpoQueueList = RemoteList<LpoFilters, LpoSortField, LpoSummary>;
pub type EmailList = RemoteList<EmailFilters, EmailSortField, EmailRecord>;
pub type ConversationList = RemoteList<ConversationFilters, ConversationSortField, Conversation>;

/// LPO queue with the stored page size and a periodic refresh of the
/// current page.
pub fn use_lpo_queue() -> LpoQueueList {
    let page_size = use_hook(|| preferences::queue_page_size(default_page_size()));
    let list = use_remote_list(page_size, "lpo_queue", fetch_lpo_page);

    use_future(move || async move {
        let interval = APP_CONFIG
            .get()
            .map(|cfg| millis(cfg.queue_refresh))
            .unwrap_or(60_000);
        loop {
            TimeoutFuture::new(interval).await;
            list.refresh();
        }
    });

    list
}

impl LpoQueueList {
    pub fn resize(&self, size: u32) {
        preferences::store_queue_page_size(size);
        self.set_page_size(size);
    }
}

pub fn use_email_list() -> EmailList {
    use_remote_list(default_page_size(), "emails", fetch_email_page)
}

pub fn use_conversation_list() -> ConversationList {
    use_remote_list(default_page_size(), "conversations", fetch_conversation_page)
}
