#![allow(non_snake_case)]

mod api;
mod config;
#[cfg(test)]
mod fixtures;
mod hooks;
mod models;
mod services;
mod state;
mod ui;

use api::{ClientError, LpoClient};
use config::{AppConfig, AppProfile};
use dioxus::prelude::*;
use dioxus_router::prelude::*;
use once_cell::sync::OnceCell;
use state::{use_app_actions, use_app_state, AppState};
use tracing::{error, info};
use ui::dashboard::DashboardPage;
use ui::emails::EmailsPage;
use ui::escalations::EscalationsPage;
use ui::notifications::NotificationCenter;
use ui::queue::LpoQueuePage;
use ui::settings::SettingsPage;

pub(crate) static APP_CONFIG: OnceCell<AppConfig> = OnceCell::new();
pub(crate) static API_CLIENT: OnceCell<LpoClient> = OnceCell::new();

fn main() {
    console_error_panic_hook::set_once();
    let config = AppConfig::from_env();
    init_logging(config.profile);
    bootstrap_infrastructure(config);
    launch(App);
}

fn init_logging(profile: AppProfile) {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let level = match profile {
            AppProfile::Dev => tracing::Level::DEBUG,
            AppProfile::Prod => tracing::Level::INFO,
        };
        let _ = dioxus_logger::init(level);
    });
}

fn bootstrap_infrastructure(config: AppConfig) {
    let _ = APP_CONFIG.set(config.clone());

    match LpoClient::new(config) {
        Ok(client) => {
            let _ = API_CLIENT.set(client);
            info!("LPO client initialized");
        }
        Err(err) => {
            report_client_error("failed to initialise LPO client", &err);
        }
    }
}

fn report_client_error(context: &str, err: &ClientError) {
    error!(%context, ?err, status = ?err.status(), "api bootstrap error");
}

#[component]
fn App() -> Element {
    let app_state = use_signal(AppState::default);

    use_context_provider(|| app_state);

    rsx! {
        div { class: "relative min-h-screen bg-slate-50",
            Router::<Route> {}
            NotificationCenter {}
        }
    }
}

#[derive(Clone, Routable, Debug, PartialEq)]
enum Route {
    #[layout(Shell)]
    #[route("/")]
    Dashboard {},
    #[route("/queue")]
    Queue {},
    #[route("/emails")]
    Emails {},
    #[route("/escalations")]
    Escalations {},
    #[route("/settings")]
    Settings {},
}

#[component]
fn Shell() -> Element {
    let state = use_app_state();
    let actions = use_app_actions();
    let operation = state.read().operation.clone();
    let api_endpoint = APP_CONFIG
        .get()
        .map(|c| c.api_base_url.clone())
        .unwrap_or_else(|| "API endpoint not configured".to_string());

    let status_line = match (&operation.context, operation.last_status) {
        (Some(context), Some(status)) => Some(format!("{context}: HTTP {status}")),
        (Some(context), None) => Some(context.clone()),
        _ => None,
    };

    rsx! {
        div { class: "app-shell",
            header { class: "flex items-center justify-between border-b border-slate-200 bg-white px-6 py-3",
                div { class: "flex items-center gap-6",
                    span { class: "text-sm font-semibold text-slate-900", "LPO Operations" }
                    nav { class: "flex gap-4 text-sm text-slate-600",
                        Link { to: Route::Dashboard {}, "Dashboard" }
                        Link { to: Route::Queue {}, "LPO queue" }
                        Link { to: Route::Emails {}, "Inbox" }
                        Link { to: Route::Escalations {}, "Escalations" }
                        Link { to: Route::Settings {}, "Settings" }
                    }
                }
                div { class: "flex items-center gap-3 text-xs text-slate-500",
                    if let Some(line) = status_line {
                        span { class: "rounded bg-red-50 px-2 py-0.5 text-red-700", "{line}" }
                        button {
                            class: "text-slate-400 hover:text-slate-600",
                            onclick: move |_| actions.clear_operation_status(),
                            "clear"
                        }
                    }
                    span { "{api_endpoint}" }
                }
            }
            main { class: "mx-auto max-w-7xl p-6",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Dashboard() -> Element {
    rsx! { DashboardPage {} }
}

#[component]
fn Queue() -> Element {
    rsx! { LpoQueuePage {} }
}

#[component]
fn Emails() -> Element {
    rsx! { EmailsPage {} }
}

#[component]
fn Escalations() -> Element {
    rsx! { EscalationsPage {} }
}

#[component]
fn Settings() -> Element {
    rsx! { SettingsPage {} }
}
