use dioxus::prelude::*;

use crate::hooks::clock::now;
use crate::hooks::lists::{use_lpo_queue, LpoQueueList};
use crate::models::UrgencyLevel;
use crate::services::listing::{DateRange, LpoFilter, LpoSortField};
use crate::services::lpo::{AttachmentPair, LpoSummary, Provenance, SlaStatus};
use crate::ui::widgets::{format_amount, EmptyState, ErrorBanner, Pager, SortHeader};

const PAGE_SIZES: [u32; 4] = [10, 20, 50, 100];

pub fn urgency_badge(level: UrgencyLevel) -> Element {
    let (classes, label) = match level {
        UrgencyLevel::Critical => ("bg-red-100 text-red-700", "Critical"),
        UrgencyLevel::High => ("bg-orange-100 text-orange-700", "High"),
        UrgencyLevel::Medium => ("bg-yellow-100 text-yellow-700", "Medium"),
        UrgencyLevel::Low => ("bg-emerald-100 text-emerald-700", "Low"),
    };
    rsx! {
        span { class: format!("rounded px-2 py-0.5 text-[11px] font-medium {classes}"), "{label}" }
    }
}

pub fn sla_badge(status: Option<SlaStatus>) -> Element {
    let Some(status) = status else {
        return rsx! { span { class: "text-[11px] text-slate-400", "-" } };
    };
    let classes = match status {
        SlaStatus::Breached => "bg-red-600 text-white",
        SlaStatus::Critical => "bg-red-100 text-red-700",
        SlaStatus::NearBreach => "bg-amber-100 text-amber-700",
        SlaStatus::OnTrack => "bg-emerald-100 text-emerald-700",
    };
    rsx! {
        span { class: format!("rounded px-2 py-0.5 text-[11px] font-medium {classes}"), "{status.label()}" }
    }
}

fn parse_urgency(value: &str) -> Option<UrgencyLevel> {
    UrgencyLevel::ALL
        .into_iter()
        .find(|level| level.as_param() == value)
}

fn parse_sla(value: &str) -> Option<SlaStatus> {
    SlaStatus::ALL
        .into_iter()
        .find(|status| status.as_param() == value)
}

#[component]
pub fn LpoQueuePage() -> Element {
    let queue = use_lpo_queue();
    let mut selected = use_signal(|| None::<LpoSummary>);

    let model = queue.model.read().clone();
    let at = now();
    let sort = model.sort;
    let header = move |label: &'static str, field: LpoSortField| {
        rsx! {
            SortHeader {
                label: label.to_string(),
                active: sort.field == field,
                direction: sort.direction,
                on_sort: move |_| queue.set_sort(field),
            }
        }
    };

    let table = if model.rows.is_empty() && !model.is_loading {
        rsx! {
            EmptyState {
                message: "No LPOs match the current filters".to_string(),
                on_refresh: move |_| queue.refresh(),
            }
        }
    } else {
        let rows = model.rows.clone();
        rsx! {
            table { class: "w-full text-xs",
                thead {
                    tr {
                        th { class: "px-3 py-2 text-left text-xs font-semibold uppercase text-slate-500", "LPO" }
                        {header("Customer", LpoSortField::Customer)}
                        {header("Amount", LpoSortField::Amount)}
                        {header("Urgency", LpoSortField::UrgencyScore)}
                        th { class: "px-3 py-2 text-left text-xs font-semibold uppercase text-slate-500", "Status" }
                        {header("Received", LpoSortField::Timestamp)}
                        {header("SLA", LpoSortField::SlaDeadline)}
                        th { class: "px-3 py-2 text-left text-xs font-semibold uppercase text-slate-500", "Files" }
                    }
                }
                tbody {
                    for row in rows {
                        tr {
                            key: "{row.id}",
                            class: "cursor-pointer border-t border-slate-100 hover:bg-slate-50",
                            onclick: {
                                let row = row.clone();
                                move |_| selected.set(Some(row.clone()))
                            },
                            td { class: "px-3 py-2 font-mono", "{row.id}" }
                            td { class: "px-3 py-2", "{row.customer}" }
                            td { class: "px-3 py-2", {format_amount(row.amount)} }
                            td { class: "px-3 py-2 space-x-1",
                                {urgency_badge(row.urgency_level)}
                                span { class: "text-[11px] text-slate-400", "{row.urgency_score:.0}" }
                            }
                            td { class: "px-3 py-2", "{row.status}" }
                            td { class: "px-3 py-2 text-slate-500", {row.timestamp.clone().unwrap_or_default()} }
                            td { class: "px-3 py-2", {sla_badge(row.sla_status(at))} }
                            td { class: "px-3 py-2", "{row.attachments.len()}" }
                        }
                    }
                }
            }
        }
    };

    let viewer = selected.read().clone();

    rsx! {
        div { class: "space-y-4",
            header { class: "flex items-center justify-between",
                h1 { class: "text-xl font-semibold text-slate-900", "LPO queue" }
                div { class: "flex items-center gap-2 text-xs",
                    if model.is_loading {
                        span { class: "text-slate-500", "Loading..." }
                    }
                    select {
                        class: "rounded border border-slate-200 px-2 py-1",
                        onchange: move |evt| {
                            if let Ok(size) = evt.value().parse::<u32>() {
                                queue.resize(size);
                            }
                        },
                        for size in PAGE_SIZES {
                            option { value: "{size}", selected: model.page.size == size, "{size} / page" }
                        }
                    }
                    button {
                        class: "rounded bg-slate-100 px-3 py-1 text-slate-700 hover:bg-slate-200",
                        onclick: move |_| queue.refresh(),
                        "Refresh"
                    }
                }
            }

            QueueFilters { queue }

            if let Some(err) = model.error.clone() {
                ErrorBanner { message: err }
            }

            section { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm space-y-3",
                {table}
                Pager {
                    current: model.page.index,
                    total_pages: model.total_pages(),
                    total_items: model.pagination.total_items,
                    on_select: move |page| queue.set_page(page),
                }
            }

            if let Some(lpo) = viewer {
                AttachmentViewer { key: "{lpo.id}", lpo: lpo.clone(), on_close: move |_| selected.set(None) }
            }
        }
    }
}

#[component]
fn QueueFilters(queue: LpoQueueList) -> Element {
    let filters = queue.model.read().filters.clone();
    let mut start = use_signal(String::new);
    let mut end = use_signal(String::new);

    let apply_dates = move |_: MouseEvent| {
        let start = start.read().trim().to_string();
        let end = end.read().trim().to_string();
        let range = match (start.is_empty(), end.is_empty()) {
            (true, true) => None,
            (false, true) => Some(DateRange {
                start: start.clone(),
                end: start,
            }),
            (true, false) => Some(DateRange {
                start: end.clone(),
                end,
            }),
            (false, false) => Some(DateRange { start, end }),
        };
        queue.set_filter(LpoFilter::DateRange(range));
    };

    rsx! {
        section { class: "flex flex-wrap items-end gap-3 rounded-lg border border-slate-200 bg-white p-3 text-xs shadow-sm",
            label { class: "flex flex-col gap-1 text-slate-500",
                "Urgency"
                select {
                    class: "rounded border border-slate-200 px-2 py-1",
                    onchange: move |evt| queue.set_filter(LpoFilter::UrgencyLevel(parse_urgency(&evt.value()))),
                    option { value: "", selected: filters.urgency_level.is_none(), "All" }
                    for level in UrgencyLevel::ALL {
                        option {
                            value: level.as_param(),
                            selected: filters.urgency_level == Some(level),
                            "{level.as_param()}"
                        }
                    }
                }
            }
            label { class: "flex flex-col gap-1 text-slate-500",
                "SLA"
                select {
                    class: "rounded border border-slate-200 px-2 py-1",
                    onchange: move |evt| queue.set_filter(LpoFilter::SlaStatus(parse_sla(&evt.value()))),
                    option { value: "", selected: filters.sla_status.is_none(), "All" }
                    for status in SlaStatus::ALL {
                        option {
                            value: status.as_param(),
                            selected: filters.sla_status == Some(status),
                            "{status.label()}"
                        }
                    }
                }
            }
            label { class: "flex flex-col gap-1 text-slate-500",
                "Customer"
                input {
                    class: "rounded border border-slate-200 px-2 py-1",
                    value: filters.customer.clone().unwrap_or_default(),
                    onchange: move |evt| queue.set_filter(LpoFilter::Customer(Some(evt.value()))),
                }
            }
            label { class: "flex flex-col gap-1 text-slate-500",
                "Channel"
                input {
                    class: "rounded border border-slate-200 px-2 py-1",
                    value: filters.channel.clone().unwrap_or_default(),
                    onchange: move |evt| queue.set_filter(LpoFilter::Channel(Some(evt.value()))),
                }
            }
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
                onclick: apply_dates,
                "Apply dates"
            }
            button {
                class: "rounded bg-slate-100 px-3 py-1 text-slate-700 hover:bg-slate-200",
                onclick: move |_| {
                    start.set(String::new());
                    end.set(String::new());
                    queue.clear_filters();
                },
                "Clear"
            }
        }
    }
}

#[component]
fn AttachmentViewer(lpo: LpoSummary, on_close: EventHandler<()>) -> Element {
    let mut active = use_signal(|| lpo.attachments.first().cloned());
    let pairs = lpo.attachments.clone();
    let current = active.read().clone();

    rsx! {
        section { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm space-y-3",
            header { class: "flex items-center justify-between",
                h2 { class: "text-sm font-semibold text-slate-800", "Files for {lpo.id}" }
                button {
                    class: "rounded bg-slate-200 px-2 py-1 text-[11px] text-slate-600 hover:bg-slate-300",
                    onclick: move |_| on_close.call(()),
                    "Close"
                }
            }
            if pairs.is_empty() {
                p { class: "text-xs text-slate-500 italic", "No attachments on this LPO" }
            }
            ul { class: "space-y-1 text-xs",
                for pair in pairs {
                    li { key: "{pair.attachment.url}", class: "flex items-center gap-2",
                        button {
                            class: "text-blue-600 hover:underline",
                            onclick: {
                                let url = pair.attachment.url.clone();
                                move |_| open_in_new_tab(&url)
                            },
                            "{pair.attachment.name}"
                        }
                        span { class: "text-slate-400", "→" }
                        button {
                            class: "text-blue-600 hover:underline",
                            onclick: {
                                let pair = pair.clone();
                                move |_| active.set(Some(pair.clone()))
                            },
                            "{pair.extraction.name}"
                        }
                        {provenance_badge(pair.provenance)}
                    }
                }
            }
            if let Some(pair) = current {
                {render_extraction(&pair)}
            }
        }
    }
}

fn provenance_badge(provenance: Provenance) -> Element {
    match provenance {
        Provenance::Confirmed => rsx! { Fragment {} },
        Provenance::Assumed => rsx! {
            span {
                class: "rounded bg-amber-100 px-1.5 py-0.5 text-[10px] font-medium text-amber-700",
                title: "Extraction path inferred from naming convention; the file may not exist",
                "assumed"
            }
        },
    }
}

fn render_extraction(pair: &AttachmentPair) -> Element {
    if !pair.extraction.exists {
        return rsx! {
            p { class: "text-xs text-slate-500 italic", "Extraction output not available yet" }
        };
    }
    rsx! {
        iframe {
            class: "h-96 w-full rounded border border-slate-200",
            src: "{pair.extraction.url}",
            title: "{pair.extraction.name}",
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn open_in_new_tab(url: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(err) = window.open_with_url_and_target(url, "_blank") {
        tracing::warn!(?err, url, "failed to open attachment");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn open_in_new_tab(url: &str) {
    tracing::debug!(url, "attachment preview requested outside the browser");
}
