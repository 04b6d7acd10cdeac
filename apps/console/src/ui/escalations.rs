use dioxus::prelude::*;

use crate::hooks::escalations::{use_escalation_panel, EscalationHandle};
use crate::hooks::lists::{use_conversation_list, ConversationList};
use crate::models::{Conversation, ConversationStatus, EscalationFlow};
use crate::services::escalation::{ConversationFilter, ConversationSortField, StatusLookup};
use crate::ui::widgets::{EmptyState, ErrorBanner, Pager, SortHeader};

const STATUSES: [ConversationStatus; 3] = [
    ConversationStatus::NotSolved,
    ConversationStatus::InProgress,
    ConversationStatus::Solved,
];

fn status_classes(status: ConversationStatus) -> &'static str {
    match status {
        ConversationStatus::Solved => "bg-emerald-100 text-emerald-700",
        ConversationStatus::InProgress => "bg-amber-100 text-amber-700",
        ConversationStatus::NotSolved => "bg-red-100 text-red-700",
    }
}

fn parse_status(value: &str) -> Option<ConversationStatus> {
    STATUSES
        .into_iter()
        .find(|status| status.label() == value)
}

#[component]
pub fn EscalationsPage() -> Element {
    let conversations = use_conversation_list();
    let panel = use_escalation_panel();
    let model = conversations.model.read().clone();
    let selected = panel.panel.read().selected_id().map(str::to_string);
    let sort = model.sort;

    let header = move |label: &'static str, field: ConversationSortField| {
        rsx! {
            SortHeader {
                label: label.to_string(),
                active: sort.field == field,
                direction: sort.direction,
                on_sort: move |_| conversations.set_sort(field),
            }
        }
    };

    let body = if model.rows.is_empty() && !model.is_loading {
        rsx! {
            EmptyState {
                message: "No conversations match these filters".to_string(),
                on_refresh: move |_| conversations.refresh(),
            }
        }
    } else {
        let rows = model.rows.clone();
        rsx! {
            table { class: "w-full text-xs",
                thead {
                    tr {
                        {header("LPO", ConversationSortField::LpoNumber)}
                        th { class: "px-3 py-2 text-left text-xs font-semibold uppercase text-slate-500", "Contact" }
                        th { class: "px-3 py-2 text-left text-xs font-semibold uppercase text-slate-500", "Problem" }
                        th { class: "px-3 py-2 text-left text-xs font-semibold uppercase text-slate-500", "Status" }
                        {header("Opened", ConversationSortField::CreatedAt)}
                        {header("Updated", ConversationSortField::LastUpdate)}
                    }
                }
                tbody {
                    for conversation in rows {
                        {render_row(conversation, selected.as_deref(), panel)}
                    }
                }
            }
        }
    };

    rsx! {
        div { class: "space-y-4",
            header { class: "flex items-center justify-between",
                h1 { class: "text-xl font-semibold text-slate-900", "Escalations" }
                div { class: "flex items-center gap-2 text-xs",
                    if model.is_loading {
                        span { class: "text-slate-500", "Loading..." }
                    }
                    button {
                        class: "rounded bg-slate-100 px-3 py-1 text-slate-700 hover:bg-slate-200",
                        onclick: move |_| conversations.refresh(),
                        "Refresh"
                    }
                }
            }

            ConversationFilters { conversations }

            if let Some(err) = model.error.clone() {
                ErrorBanner { message: err }
            }

            div { class: "grid gap-4 lg:grid-cols-3",
                section { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm space-y-3 lg:col-span-2",
                    {body}
                    Pager {
                        current: model.page.index,
                        total_pages: model.total_pages(),
                        total_items: model.pagination.total_items,
                        on_select: move |page| conversations.set_page(page),
                    }
                }
                EscalationDetail { panel }
            }
        }
    }
}

fn render_row(conversation: Conversation, selected: Option<&str>, panel: EscalationHandle) -> Element {
    let is_selected = selected == Some(conversation.id.as_str());
    let row_classes = if is_selected {
        "cursor-pointer border-t border-slate-100 bg-blue-50"
    } else {
        "cursor-pointer border-t border-slate-100 hover:bg-slate-50"
    };
    let status = conversation.status;
    let created = conversation.created_at.clone().unwrap_or_default();
    let updated = conversation.last_update.clone().unwrap_or_default();
    let key = conversation.id.clone();
    let picked = conversation.clone();

    rsx! {
        tr {
            key: "{key}",
            class: row_classes,
            onclick: move |_| panel.select(picked.clone()),
            td { class: "px-3 py-2 font-mono", "{conversation.lpo_number}" }
            td { class: "px-3 py-2",
                "{conversation.contact}"
                span { class: "ml-1 text-slate-400", "({conversation.communication_mode})" }
            }
            td { class: "px-3 py-2", "{conversation.problem}" }
            td { class: "px-3 py-2",
                span { class: format!("rounded px-2 py-0.5 text-[11px] {}", status_classes(status)),
                    "{status.label()}"
                }
            }
            td { class: "px-3 py-2 text-slate-500", "{created}" }
            td { class: "px-3 py-2 text-slate-500", "{updated}" }
        }
    }
}

#[component]
fn ConversationFilters(conversations: ConversationList) -> Element {
    let filters = conversations.model.read().filters.clone();

    rsx! {
        section { class: "flex flex-wrap items-end gap-3 rounded-lg border border-slate-200 bg-white p-3 text-xs shadow-sm",
            label { class: "flex flex-col gap-1 text-slate-500",
                "Status"
                select {
                    class: "rounded border border-slate-200 px-2 py-1",
                    onchange: move |evt| conversations.set_filter(ConversationFilter::Status(parse_status(&evt.value()))),
                    option { value: "", selected: filters.status.is_none(), "All" }
                    for status in STATUSES {
                        option {
                            value: status.label(),
                            selected: filters.status == Some(status),
                            "{status.label()}"
                        }
                    }
                }
            }
            label { class: "flex flex-col gap-1 text-slate-500",
                "Search"
                input {
                    class: "rounded border border-slate-200 px-2 py-1",
                    placeholder: "LPO number, contact...",
                    value: filters.search.clone().unwrap_or_default(),
                    onchange: move |evt| conversations.set_filter(ConversationFilter::Search(Some(evt.value()))),
                }
            }
            button {
                class: "rounded bg-slate-100 px-3 py-1 text-slate-700 hover:bg-slate-200",
                onclick: move |_| conversations.clear_filters(),
                "Clear"
            }
        }
    }
}

#[component]
fn EscalationDetail(panel: EscalationHandle) -> Element {
    let state = panel.panel.read().clone();
    let Some(conversation) = state.selected else {
        return rsx! {
            aside { class: "rounded-lg border border-dashed border-slate-200 bg-white p-4 text-xs text-slate-500",
                "Select a conversation to see its escalation path."
            }
        };
    };

    rsx! {
        aside { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm space-y-4 text-xs",
            header { class: "flex items-start justify-between",
                div {
                    h2 { class: "text-sm font-semibold text-slate-800", "LPO {conversation.lpo_number}" }
                    p { class: "text-slate-500", "{conversation.problem}" }
                }
                button {
                    class: "text-slate-400 hover:text-slate-600",
                    onclick: move |_| panel.close(),
                    "✕"
                }
            }
            {render_flow(state.flow.as_ref())}
            {render_status(&state.status)}
        }
    }
}

fn render_flow(flow: Option<&EscalationFlow>) -> Element {
    let Some(flow) = flow else {
        return rsx! {
            p { class: "italic text-slate-500", "No escalation recorded for this conversation." }
        };
    };
    let current = flow.current_level;
    let stages = flow.stages.clone();

    rsx! {
        section { class: "space-y-2",
            h3 { class: "font-semibold text-slate-700", "Escalation path (level {current})" }
            ol { class: "space-y-2",
                for stage in stages {
                    li {
                        key: "{stage.level}",
                        class: stage_classes(stage.level == current),
                        p { class: "font-medium text-slate-700",
                            "Level {stage.level}: {stage.contact} via {stage.mode}"
                        }
                        p { class: "text-slate-500", "{stage.status}" }
                        if let Some(at) = stage.attempted_at.clone() {
                            p { class: "text-slate-400", "Attempted {at}" }
                        }
                    }
                }
            }
        }
    }
}

fn stage_classes(is_current: bool) -> &'static str {
    if is_current {
        "rounded border border-blue-300 bg-blue-50 p-2"
    } else {
        "rounded border border-slate-200 p-2"
    }
}

fn render_status(status: &StatusLookup) -> Element {
    let body = match status {
        StatusLookup::Idle => return rsx! { Fragment {} },
        StatusLookup::Loading => rsx! { p { class: "text-slate-500", "Checking escalation service..." } },
        StatusLookup::Loaded(live) => {
            let next = live.next_attempt_at.clone();
            rsx! {
                p { class: "text-slate-700", "State: {live.state} (level {live.current_level})" }
                if let Some(next) = next {
                    p { class: "text-slate-500", "Next attempt {next}" }
                }
            }
        }
        StatusLookup::TimedOut => rsx! {
            p { class: "text-amber-700", "The escalation service did not answer in time." }
        },
        StatusLookup::Unavailable(message) => rsx! {
            p { class: "text-red-700", "Live status unavailable: {message}" }
        },
    };

    rsx! {
        section { class: "space-y-1 border-t border-slate-100 pt-3",
            h3 { class: "font-semibold text-slate-700", "Live status" }
            {body}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_parse_back() {
        for status in STATUSES {
            assert_eq!(parse_status(status.label()), Some(status));
        }
        assert_eq!(parse_status(""), None);
    }
}
