use dioxus::prelude::*;

use crate::hooks::settings::{use_settings, SettingsHandle};
use crate::models::SettingsRecord;
use crate::services::settings::{
    FieldSpec, FieldType, ModalForm, ModalMode, ModalState, Operation, Pending, ResourceKind,
};
use crate::ui::widgets::{EmptyState, ErrorBanner};

const TABLE_COLUMNS: usize = 5;

fn table_columns(kind: ResourceKind) -> Vec<FieldSpec> {
    kind.schema()
        .iter()
        .filter(|field| !matches!(field.kind, FieldType::Boolean | FieldType::LongText))
        .take(TABLE_COLUMNS)
        .copied()
        .collect()
}

fn confirm_prompt(pending: &Pending) -> String {
    let label = pending.mutation.kind.label();
    match &pending.mutation.operation {
        Operation::Delete { id } => format!("Delete {label} #{id}? This cannot be undone."),
        Operation::Update { id, .. } => format!("Save changes to {label} #{id}?"),
        Operation::Create { .. } => format!("Create this {label}?"),
    }
}

#[component]
pub fn SettingsPage() -> Element {
    let settings = use_settings();
    let active = *settings.active.read();

    rsx! {
        div { class: "space-y-4",
            header { class: "flex items-center justify-between",
                h1 { class: "text-xl font-semibold text-slate-900", "Settings" }
                div { class: "flex gap-2 text-xs",
                    button {
                        class: "rounded bg-slate-100 px-3 py-1 text-slate-700 hover:bg-slate-200",
                        onclick: move |_| settings.reload(),
                        "Refresh"
                    }
                    button {
                        class: "rounded bg-slate-900 px-3 py-1 text-white hover:bg-slate-700",
                        onclick: move |_| settings.open_create(),
                        "New {active.label()}"
                    }
                }
            }

            nav { class: "flex flex-wrap gap-1 border-b border-slate-200 text-xs",
                for kind in ResourceKind::ALL {
                    button {
                        key: "{kind.path()}",
                        class: tab_classes(kind == active),
                        onclick: move |_| settings.select_tab(kind),
                        "{kind.label()}"
                    }
                }
            }

            SettingsRecords { settings }
            SettingsDialog { settings }
        }
    }
}

fn tab_classes(is_active: bool) -> &'static str {
    if is_active {
        "rounded-t border-b-2 border-slate-900 px-3 py-2 font-semibold text-slate-900"
    } else {
        "px-3 py-2 text-slate-500 hover:text-slate-800"
    }
}

#[component]
fn SettingsRecords(settings: SettingsHandle) -> Element {
    let table = settings.table.read().clone();
    let columns = table_columns(table.kind);

    if let Some(err) = table.error.clone() {
        return rsx! { ErrorBanner { message: err } };
    }
    if table.is_loading && table.records.is_empty() {
        return rsx! { p { class: "text-xs text-slate-500", "Loading {table.kind.label()}..." } };
    }
    if table.records.is_empty() {
        return rsx! {
            EmptyState {
                message: format!("No {} configured", table.kind.label()),
                on_refresh: move |_| settings.reload(),
            }
        };
    }

    let headers = columns.clone();
    let records = table.records.clone();

    rsx! {
        section { class: "rounded-lg border border-slate-200 bg-white p-4 shadow-sm",
            table { class: "w-full text-xs",
                thead {
                    tr { class: "text-left text-slate-500",
                        for column in headers {
                            th { key: "{column.name}", class: "px-3 py-2 uppercase", "{column.label}" }
                        }
                        th { class: "px-3 py-2 uppercase", "Active" }
                        th { class: "px-3 py-2" }
                    }
                }
                tbody {
                    for (index, record) in records.into_iter().enumerate() {
                        {render_record(index, record, &columns, settings)}
                    }
                }
            }
        }
    }
}

fn render_record(
    index: usize,
    record: SettingsRecord,
    columns: &[FieldSpec],
    settings: SettingsHandle,
) -> Element {
    let key = record.id().unwrap_or_else(|| format!("row-{index}"));
    let cells: Vec<(&'static str, String)> = columns
        .iter()
        .map(|column| (column.name, record.display(column.name)))
        .collect();
    let is_active = record.is_active();
    let delete_id = record.id();
    let editable = record.clone();

    rsx! {
        tr { key: "{key}", class: "border-t border-slate-100",
            for (name, value) in cells {
                td { key: "{name}", class: "px-3 py-2", "{value}" }
            }
            td { class: "px-3 py-2",
                if is_active {
                    span { class: "rounded bg-emerald-100 px-2 py-0.5 text-[11px] text-emerald-700", "active" }
                } else {
                    span { class: "rounded bg-slate-100 px-2 py-0.5 text-[11px] text-slate-500", "inactive" }
                }
            }
            td { class: "px-3 py-2 text-right space-x-2",
                button {
                    class: "text-blue-600 hover:underline",
                    onclick: move |_| settings.open_edit(&editable),
                    "Edit"
                }
                if let Some(id) = delete_id {
                    button {
                        class: "text-red-600 hover:underline",
                        onclick: move |_| settings.request_delete(id.clone()),
                        "Delete"
                    }
                }
            }
        }
    }
}

#[component]
fn SettingsDialog(settings: SettingsHandle) -> Element {
    let state = settings.modal.read().state.clone();

    let body = match state {
        ModalState::Closed => return rsx! { Fragment {} },
        ModalState::Open(form) => render_form(form, settings),
        ModalState::Confirming(pending) => {
            let prompt = confirm_prompt(&pending);
            rsx! {
                div { class: "space-y-4",
                    p { class: "text-sm text-slate-700", "{prompt}" }
                    div { class: "flex justify-end gap-2 text-xs",
                        button {
                            class: "rounded bg-slate-100 px-3 py-1 text-slate-700 hover:bg-slate-200",
                            onclick: move |_| settings.cancel(),
                            "Cancel"
                        }
                        button {
                            class: "rounded bg-red-600 px-3 py-1 text-white hover:bg-red-500",
                            onclick: move |_| settings.confirm(),
                            "Confirm"
                        }
                    }
                }
            }
        }
        ModalState::Submitting(pending) => rsx! {
            div { class: "flex items-center gap-2 text-sm text-slate-600",
                span { class: "inline-block h-3 w-3 animate-spin rounded-full border-2 border-slate-300 border-t-slate-700" }
                "Saving {pending.mutation.kind.label()}..."
            }
        },
    };

    rsx! {
        div { class: "fixed inset-0 z-40 flex items-center justify-center bg-slate-900/40",
            div { class: "w-full max-w-lg rounded-lg bg-white p-5 shadow-xl",
                {body}
            }
        }
    }
}

fn render_form(form: ModalForm, settings: SettingsHandle) -> Element {
    let title = match &form.mode {
        ModalMode::Create => format!("New {}", form.kind.label()),
        ModalMode::Edit { id } => format!("Edit {} #{id}", form.kind.label()),
    };
    let fields: Vec<(FieldSpec, String)> = form
        .kind
        .schema()
        .iter()
        .map(|field| {
            let value = form.values.get(field.name).cloned().unwrap_or_default();
            (*field, value)
        })
        .collect();

    rsx! {
        form {
            class: "space-y-3",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                settings.submit();
            },
            h2 { class: "text-sm font-semibold text-slate-800", "{title}" }
            if let Some(err) = form.error.clone() {
                p { class: "rounded bg-red-50 px-3 py-2 text-xs text-red-700", "{err}" }
            }
            for (field, value) in fields {
                {render_field(field, value, settings)}
            }
            div { class: "flex justify-end gap-2 pt-2 text-xs",
                button {
                    r#type: "button",
                    class: "rounded bg-slate-100 px-3 py-1 text-slate-700 hover:bg-slate-200",
                    onclick: move |_| settings.cancel(),
                    "Cancel"
                }
                button {
                    r#type: "submit",
                    class: "rounded bg-slate-900 px-3 py-1 text-white hover:bg-slate-700",
                    "Save"
                }
            }
        }
    }
}

fn render_field(field: FieldSpec, value: String, settings: SettingsHandle) -> Element {
    let name = field.name;
    let label = if field.required {
        format!("{} *", field.label)
    } else {
        field.label.to_string()
    };

    let input = match field.kind {
        FieldType::Boolean => rsx! {
            input {
                r#type: "checkbox",
                checked: value == "true",
                onchange: move |evt| settings.set_field(name, evt.checked().to_string()),
            }
        },
        FieldType::LongText => rsx! {
            textarea {
                class: "w-full rounded border border-slate-200 px-2 py-1",
                rows: "4",
                value: "{value}",
                oninput: move |evt| settings.set_field(name, evt.value()),
            }
        },
        FieldType::Number | FieldType::Integer => {
            let step = if field.kind == FieldType::Integer { "1" } else { "any" };
            rsx! {
                input {
                    r#type: "number",
                    step,
                    class: "w-full rounded border border-slate-200 px-2 py-1",
                    value: "{value}",
                    oninput: move |evt| settings.set_field(name, evt.value()),
                }
            }
        }
        FieldType::Text => rsx! {
            input {
                class: "w-full rounded border border-slate-200 px-2 py-1",
                value: "{value}",
                oninput: move |evt| settings.set_field(name, evt.value()),
            }
        },
    };

    rsx! {
        label { key: "{name}", class: "flex flex-col gap-1 text-xs text-slate-600",
            "{label}"
            {input}
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::services::settings::Mutation;

    #[test]
    fn table_columns_skip_flags_and_long_text() {
        for kind in ResourceKind::ALL {
            let columns = table_columns(kind);
            assert!(columns.len() <= TABLE_COLUMNS);
            assert!(columns
                .iter()
                .all(|field| !matches!(field.kind, FieldType::Boolean | FieldType::LongText)));
        }
    }

    #[test]
    fn delete_prompt_names_the_record() {
        let pending = Pending {
            mutation: Mutation {
                kind: ResourceKind::User,
                operation: Operation::Delete { id: "31".into() },
            },
            resume: None,
        };
        let prompt = confirm_prompt(&pending);
        assert!(prompt.contains("#31"));
        assert!(prompt.starts_with("Delete"));

        let update = Pending {
            mutation: Mutation {
                kind: ResourceKind::User,
                operation: Operation::Update {
                    id: "31".into(),
                    body: json!({}),
                },
            },
            resume: None,
        };
        assert!(confirm_prompt(&update).starts_with("Save changes"));
    }
}
