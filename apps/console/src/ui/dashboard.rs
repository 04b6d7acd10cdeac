use dioxus::prelude::*;

use crate::hooks::clock::{current_hour, now};
use crate::hooks::dashboard::use_dashboard;
use crate::models::{Alert, AnalyticsMetrics};
use crate::services::aggregator::DashboardQuery;
use crate::services::charts::{hourly_series, status_slices, ChartSpec};
use crate::services::lpo::LpoSummary;
use crate::ui::charts::{use_chart_registry, ChartView};
use crate::ui::queue::{sla_badge, urgency_badge};
use crate::ui::widgets::{format_amount, percent};

const HOURLY_CHART: &str = "hourly-volume";
const STATUS_CHART: &str = "status-distribution";
const ACTIVE_QUEUE_CHART: &str = "active-queue";

#[component]
pub fn DashboardPage() -> Element {
    let dashboard = use_dashboard();
    let mut registry = use_chart_registry();

    use_effect(move || {
        let model = dashboard.model.read();
        let mut charts = registry.write();
        charts.register(
            HOURLY_CHART,
            ChartSpec::bars(
                "Emails per hour",
                hourly_series(&model.processing_status.hourly_volume, current_hour()),
            ),
        );
        charts.register(
            STATUS_CHART,
            ChartSpec::distribution(
                "Processing status",
                &status_slices(&model.processing_status.status_distribution),
            ),
        );
        charts.register(
            ACTIVE_QUEUE_CHART,
            ChartSpec::distribution("Active queue", &status_slices(&model.active_queue.stages)),
        );
    });

    let model = dashboard.model.read().clone();
    let is_loading = *dashboard.loading.read();
    let failed = dashboard.failed_sources.read().clone();
    let charts: Vec<ChartSpec> = {
        let registry = registry.read();
        [HOURLY_CHART, STATUS_CHART, ACTIVE_QUEUE_CHART]
            .iter()
            .filter_map(|name| registry.get(name).cloned())
            .collect()
    };

    let summary = model.overview.summary.clone();
    let failed_labels = failed
        .iter()
        .map(|source| source.label())
        .collect::<Vec<_>>()
        .join(", ");

    rsx! {
        div { class: "space-y-4",
            header { class: "flex flex-wrap items-end justify-between gap-4",
                div {
                    h1 { class: "text-xl font-semibold text-slate-900", "Operations dashboard" }
                    if is_loading {
                        p { class: "text-xs text-slate-500", "Refreshing..." }
                    }
                }
                DateFilter { on_apply: move |query: DashboardQuery| dashboard.set_query(query) }
            }

            if !failed.is_empty() {
                p { class: "rounded border border-amber-200 bg-amber-50 px-3 py-2 text-xs text-amber-700",
                    "Some figures may be stale; these sources did not respond: {failed_labels}"
                }
            }

            section { class: "grid grid-cols-2 gap-3 md:grid-cols-3 xl:grid-cols-6",
                KpiCard { label: "Emails processed", value: summary.emails_processed.to_string() }
                KpiCard { label: "LPOs extracted", value: summary.lpos_extracted.to_string() }
                KpiCard { label: "Pending review", value: summary.pending_review.to_string() }
                KpiCard { label: "SLA breaches", value: summary.sla_breaches.to_string() }
                KpiCard { label: "Avg processing", value: format!("{:.1}s", summary.avg_processing_time) }
                KpiCard { label: "Auto-approval", value: percent(summary.auto_approval_rate) }
            }

            {render_alerts(&summary.alerts)}

            section { class: "grid gap-4 lg:grid-cols-3",
                for spec in charts {
                    div { key: "{spec.title}", class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm",
                        ChartView { spec: spec.clone() }
                    }
                }
            }

            {render_analytics(&model.analytics)}

            section { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm space-y-3",
                header { class: "flex items-center justify-between",
                    h2 { class: "text-sm font-semibold text-slate-800", "Most urgent LPOs" }
                    span { class: "text-xs text-slate-500",
                        "{model.lpo_queue.pagination.total_items} in queue"
                    }
                }
                {render_queue_preview(&model.lpo_queue.rows)}
            }
        }
    }
}

#[component]
fn KpiCard(label: &'static str, value: String) -> Element {
    rsx! {
        div { class: "rounded-lg border border-slate-200 bg-white p-3 shadow-sm",
            p { class: "text-[11px] uppercase tracking-wide text-slate-500", "{label}" }
            p { class: "text-lg font-semibold text-slate-900", "{value}" }
        }
    }
}

#[component]
fn DateFilter(on_apply: EventHandler<DashboardQuery>) -> Element {
    let mut start = use_signal(String::new);
    let mut end = use_signal(String::new);

    let apply = move |_: MouseEvent| {
        let start = start.read().trim().to_string();
        let end = end.read().trim().to_string();
        let query = match (start.is_empty(), end.is_empty()) {
            (true, true) => DashboardQuery::default(),
            (false, true) => DashboardQuery {
                date: Some(start),
                ..DashboardQuery::default()
            },
            (true, false) => DashboardQuery {
                date: Some(end),
                ..DashboardQuery::default()
            },
            (false, false) if start == end => DashboardQuery {
                date: Some(start),
                ..DashboardQuery::default()
            },
            (false, false) => DashboardQuery {
                date: None,
                start_date: Some(start),
                end_date: Some(end),
            },
        };
        on_apply.call(query);
    };

    rsx! {
        div { class: "flex items-end gap-2 text-xs",
            label { class: "flex flex-col gap-1 text-slate-500",
                "From"
                input {
                    r#type: "date",
                    class: "rounded border border-slate-200 px-2 py-1",
                    value: "{start}",
                    oninput: move |evt| start.set(evt.value()),
                }
            }
            label { class: "flex flex-col gap-1 text-slate-500",
                "To"
                input {
                    r#type: "date",
                    class: "rounded border border-slate-200 px-2 py-1",
                    value: "{end}",
                    oninput: move |evt| end.set(evt.value()),
                }
            }
            button {
                class: "rounded bg-slate-900 px-3 py-1 text-white hover:bg-slate-700",
                onclick: apply,
                "Apply"
            }
        }
    }
}

fn render_alerts(alerts: &[Alert]) -> Element {
    if alerts.is_empty() {
        return rsx! { Fragment {} };
    }
    let alerts = alerts.to_vec();

    rsx! {
        section { class: "space-y-2",
            for alert in alerts {
                div {
                    key: "{alert.id}",
                    class: alert_classes(&alert.level),
                    "{alert.message}"
                }
            }
        }
    }
}

fn alert_classes(level: &str) -> &'static str {
    match level {
        "critical" | "error" => {
            "rounded border-l-4 border-red-500 bg-red-50 px-3 py-2 text-xs text-red-700"
        }
        _ => "rounded border-l-4 border-amber-500 bg-amber-50 px-3 py-2 text-xs text-amber-700",
    }
}

fn render_analytics(analytics: &AnalyticsMetrics) -> Element {
    let processing = &analytics.processing;
    let quality = &analytics.quality;
    let volume = &analytics.volume;

    rsx! {
        section { class: "grid gap-3 md:grid-cols-3",
            div { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm text-xs text-slate-600 space-y-1",
                h3 { class: "text-sm font-semibold text-slate-800", "Processing" }
                p { "Avg extraction: {processing.avg_extraction_seconds:.1}s" }
                p { {format!("Success rate: {}", percent(processing.success_rate))} }
                p { {format!("Manual review: {}", percent(processing.manual_review_rate))} }
            }
            div { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm text-xs text-slate-600 space-y-1",
                h3 { class: "text-sm font-semibold text-slate-800", "Quality" }
                p { {format!("Extraction accuracy: {}", percent(quality.extraction_accuracy))} }
                p { {format!("Validation pass: {}", percent(quality.validation_pass_rate))} }
                p { {format!("Error rate: {}", percent(quality.error_rate))} }
            }
            div { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm text-xs text-slate-600 space-y-1",
                h3 { class: "text-sm font-semibold text-slate-800", "Volume" }
                p { "Total emails: {volume.total_emails}" }
                p { "LPO emails: {volume.lpo_emails}" }
                p { "Spam: {volume.spam_emails}" }
                p { "Daily average: {volume.daily_average:.1}" }
            }
        }
    }
}

fn render_queue_preview(rows: &[LpoSummary]) -> Element {
    if rows.is_empty() {
        return rsx! { p { class: "text-xs text-slate-500 italic", "No LPOs waiting" } };
    }
    let at = now();
    let rows: Vec<LpoSummary> = rows.iter().take(5).cloned().collect();

    rsx! {
        table { class: "w-full text-xs",
            thead {
                tr { class: "text-left text-slate-500",
                    th { class: "px-3 py-2", "LPO" }
                    th { class: "px-3 py-2", "Customer" }
                    th { class: "px-3 py-2", "Amount" }
                    th { class: "px-3 py-2", "Urgency" }
                    th { class: "px-3 py-2", "SLA" }
                }
            }
            tbody {
                for row in rows {
                    tr { key: "{row.id}", class: "border-t border-slate-100",
                        td { class: "px-3 py-2 font-mono", "{row.id}" }
                        td { class: "px-3 py-2", "{row.customer}" }
                        td { class: "px-3 py-2", {format_amount(row.amount)} }
                        td { class: "px-3 py-2", {urgency_badge(row.urgency_level)} }
                        td { class: "px-3 py-2", {sla_badge(row.sla_status(at))} }
                    }
                }
            }
        }
    }
}
