use dioxus::prelude::*;

use crate::hooks::lists::{use_email_list, EmailList};
use crate::models::{EmailRecord, FilterCategory};
use crate::services::listing::{DateRange, EmailFilter, EmailSortField};
use crate::ui::widgets::{percent, EmptyState, ErrorBanner, Pager, SortHeader};

const CATEGORIES: [FilterCategory; 3] = [
    FilterCategory::Lpo,
    FilterCategory::Spam,
    FilterCategory::Normal,
];

fn parse_category(value: &str) -> Option<FilterCategory> {
    CATEGORIES
        .into_iter()
        .find(|category| category.as_param() == value)
}

#[component]
pub fn EmailsPage() -> Element {
    let emails = use_email_list();
    let model = emails.model.read().clone();
    let sort = model.sort;

    let header = move |label: &'static str, field: EmailSortField| {
        rsx! {
            SortHeader {
                label: label.to_string(),
                active: sort.field == field,
                direction: sort.direction,
                on_sort: move |_| emails.set_sort(field),
            }
        }
    };

    let body = if model.rows.is_empty() && !model.is_loading {
        rsx! {
            EmptyState {
                message: "No emails for this selection".to_string(),
                on_refresh: move |_| emails.refresh(),
            }
        }
    } else {
        let rows = model.rows.clone();
        rsx! {
            table { class: "w-full text-xs",
                thead {
                    tr {
                        {header("Received", EmailSortField::DateReceived)}
                        {header("Sender", EmailSortField::Sender)}
                        {header("Subject", EmailSortField::Subject)}
                        th { class: "px-3 py-2 text-left text-xs font-semibold uppercase text-slate-500", "Category" }
                        {header("Spam score", EmailSortField::SpamConfidence)}
                        th { class: "px-3 py-2 text-left text-xs font-semibold uppercase text-slate-500", "Files" }
                    }
                }
                tbody {
                    for email in rows {
                        {render_row(email)}
                    }
                }
            }
        }
    };

    rsx! {
        div { class: "space-y-4",
            header { class: "flex items-center justify-between",
                h1 { class: "text-xl font-semibold text-slate-900", "Inbox" }
                div { class: "flex items-center gap-2 text-xs",
                    if model.is_loading {
                        span { class: "text-slate-500", "Loading..." }
                    }
                    button {
                        class: "rounded bg-slate-100 px-3 py-1 text-slate-700 hover:bg-slate-200",
                        onclick: move |_| emails.refresh(),
                        "Refresh"
                    }
                }
            }

            EmailFilters { emails }

            if let Some(err) = model.error.clone() {
                ErrorBanner { message: err }
            }

            section { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm space-y-3",
                {body}
                Pager {
                    current: model.page.index,
                    total_pages: model.total_pages(),
                    total_items: model.pagination.total_items,
                    on_select: move |page| emails.set_page(page),
                }
            }
        }
    }
}

fn render_row(email: EmailRecord) -> Element {
    let category_classes = match email.filter_category {
        FilterCategory::Lpo => "bg-blue-100 text-blue-700",
        FilterCategory::Spam => "bg-red-100 text-red-700",
        FilterCategory::Normal => "bg-slate-100 text-slate-600",
    };
    let received = email.date_received.clone().unwrap_or_default();

    rsx! {
        tr { key: "{email.email_id}", class: "border-t border-slate-100",
            td { class: "px-3 py-2 text-slate-500", "{received}" }
            td { class: "px-3 py-2", "{email.sender}" }
            td { class: "px-3 py-2",
                "{email.subject}"
                if email.lpo_extracted {
                    span { class: "ml-2 rounded bg-emerald-100 px-1.5 py-0.5 text-[10px] text-emerald-700", "extracted" }
                }
            }
            td { class: "px-3 py-2",
                span { class: format!("rounded px-2 py-0.5 text-[11px] {category_classes}"),
                    "{email.filter_category.as_param()}"
                }
            }
            td { class: "px-3 py-2", {percent(email.spam_confidence)} }
            td { class: "px-3 py-2", "{email.attachment_count}" }
        }
    }
}

#[component]
fn EmailFilters(emails: EmailList) -> Element {
    let filters = emails.model.read().filters.clone();
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
        emails.set_filter(EmailFilter::DateRange(range));
    };

    rsx! {
        section { class: "flex flex-wrap items-end gap-3 rounded-lg border border-slate-200 bg-white p-3 text-xs shadow-sm",
            label { class: "flex flex-col gap-1 text-slate-500",
                "Search"
                input {
                    class: "rounded border border-slate-200 px-2 py-1",
                    placeholder: "sender, subject...",
                    value: filters.search.clone().unwrap_or_default(),
                    onchange: move |evt| emails.set_filter(EmailFilter::Search(Some(evt.value()))),
                }
            }
            label { class: "flex flex-col gap-1 text-slate-500",
                "Category"
                select {
                    class: "rounded border border-slate-200 px-2 py-1",
                    onchange: move |evt| emails.set_filter(EmailFilter::Category(parse_category(&evt.value()))),
                    option { value: "", selected: filters.category.is_none(), "All" }
                    for category in CATEGORIES {
                        option {
                            value: category.as_param(),
                            selected: filters.category == Some(category),
                            "{category.as_param()}"
                        }
                    }
                }
            }
            label { class: "flex flex-col gap-1 text-slate-500",
                "Folder"
                input {
                    class: "rounded border border-slate-200 px-2 py-1",
                    placeholder: "INBOX",
                    value: filters.mailbox_folder.clone().unwrap_or_default(),
                    onchange: move |evt| emails.set_filter(EmailFilter::MailboxFolder(Some(evt.value()))),
                }
            }
            label { class: "flex items-center gap-2 text-slate-500",
                input {
                    r#type: "checkbox",
                    checked: filters.include_spam,
                    onchange: move |evt| emails.set_filter(EmailFilter::IncludeSpam(evt.checked())),
                }
                "Include spam"
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
                    emails.clear_filters();
                },
                "Clear"
            }
        }
    }
}
