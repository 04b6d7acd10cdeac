use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use tracing::{debug, info};

use crate::hooks::clock::millis;
use crate::services::aggregator::{
    aggregate, refresh_processing_status, DashboardCycles, DashboardQuery, DashboardSource,
    DashboardViewModel,
};
use crate::state::use_app_actions;
use crate::{API_CLIENT, APP_CONFIG};

#[derive(Clone, Copy)]
pub struct DashboardHandle {
    pub model: Signal<DashboardViewModel>,
    pub query: Signal<DashboardQuery>,
    pub loading: Signal<bool>,
    pub failed_sources: Signal<Vec<DashboardSource>>,
}

impl DashboardHandle {
    /// Replacing the query re-runs every source.
    pub fn set_query(&self, next: DashboardQuery) {
        let mut query = self.query;
        if *query.peek() != next {
            query.set(next);
        }
    }
}

/// Runs a full aggregation whenever the query changes, plus the periodic
/// processing-status refresh for as long as the caller stays mounted.
pub fn use_dashboard() -> DashboardHandle {
    let actions = use_app_actions();
    let model = use_signal(DashboardViewModel::default);
    let query = use_signal(DashboardQuery::default);
    let loading = use_signal(|| false);
    let failed_sources = use_signal(Vec::new);
    let cycles = use_hook(DashboardCycles::default);

    let current_query = query();
    let full_cycles = cycles.clone();
    use_future(use_reactive!(|current_query| {
        let cycles = full_cycles.clone();
        let mut model = model;
        let mut loading = loading;
        let mut failed_sources = failed_sources;
        async move {
            TimeoutFuture::new(0).await;

            let Some(client) = API_CLIENT.get() else {
                actions.notify_warning("Dashboard", "API client is not initialised");
                return;
            };
            let page_size = APP_CONFIG.get().map(|cfg| cfg.page_size).unwrap_or(20);

            let ticket = cycles.begin_full();
            loading.set(true);
            let previous = model.peek().clone();
            let aggregation = aggregate(client, &current_query, page_size, &previous).await;

            let failed: Vec<DashboardSource> = aggregation
                .failures
                .iter()
                .map(|failure| failure.source)
                .collect();
            if cycles.apply_full(ticket, &mut model.write(), aggregation.model) {
                info!(failed = failed.len(), "dashboard cycle applied");
                failed_sources.set(failed);
                loading.set(false);
            }
        }
    }));

    let status_cycles = cycles.clone();
    use_future(move || {
        let cycles = status_cycles.clone();
        let mut model = model;
        async move {
            let interval = APP_CONFIG
                .get()
                .map(|cfg| millis(cfg.status_refresh))
                .unwrap_or(30_000);

            loop {
                TimeoutFuture::new(interval).await;

                let Some(client) = API_CLIENT.get() else {
                    continue;
                };
                let current = query.peek().clone();
                let generation = cycles.begin_status();
                if let Some(status) = refresh_processing_status(client, &current).await {
                    if !cycles.apply_status(generation, &mut model.write(), status) {
                        debug!("status refresh overtaken by a newer cycle");
                    }
                }
            }
        }
    });

    DashboardHandle {
        model,
        query,
        loading,
        failed_sources,
    }
}
