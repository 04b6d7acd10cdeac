use crate::services::listing::SortDirection;
use dioxus::prelude::*;

#[component]
pub fn Pager(
    current: u32,
    total_pages: u32,
    total_items: u64,
    on_select: EventHandler<u32>,
) -> Element {
    let total_pages = total_pages.max(1);
    let previous = current.saturating_sub(1);
    let next = current + 1;

    rsx! {
        div { class: "flex items-center justify-between text-xs text-slate-500",
            span { "{total_items} items" }
            div { class: "flex items-center gap-2",
                button {
                    class: "rounded border border-slate-200 px-2 py-1 disabled:opacity-40",
                    disabled: current <= 1,
                    onclick: move |_| on_select.call(previous),
                    "Prev"
                }
                span { "Page {current} of {total_pages}" }
                button {
                    class: "rounded border border-slate-200 px-2 py-1 disabled:opacity-40",
                    disabled: current >= total_pages,
                    onclick: move |_| on_select.call(next),
                    "Next"
                }
            }
        }
    }
}

#[component]
pub fn SortHeader(
    label: String,
    active: bool,
    direction: SortDirection,
    on_sort: EventHandler<()>,
) -> Element {
    let marker = match (active, direction) {
        (false, _) => "",
        (true, SortDirection::Asc) => " ▲",
        (true, SortDirection::Desc) => " ▼",
    };
    let tone = if active { "text-slate-900" } else { "text-slate-500" };

    rsx! {
        th { class: "px-3 py-2 text-left",
            button {
                class: format!("text-xs font-semibold uppercase tracking-wide {tone}"),
                onclick: move |_| on_sort.call(()),
                "{label}{marker}"
            }
        }
    }
}

#[component]
pub fn EmptyState(message: String, on_refresh: EventHandler<()>) -> Element {
    rsx! {
        div { class: "flex flex-col items-center gap-2 rounded border border-dashed border-slate-200 p-6 text-xs text-slate-500",
            p { "{message}" }
            button {
                class: "rounded bg-slate-100 px-3 py-1 text-slate-700 hover:bg-slate-200",
                onclick: move |_| on_refresh.call(()),
                "Refresh"
            }
        }
    }
}

#[component]
pub fn ErrorBanner(message: String) -> Element {
    rsx! {
        p { class: "rounded border border-red-200 bg-red-50 px-3 py-2 text-xs text-red-600", "{message}" }
    }
}

pub fn format_amount(amount: f64) -> String {
    let whole = amount.trunc() as i64;
    let cents = ((amount.fract().abs() * 100.0).round() as i64).min(99);
    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{cents:02}")
}

pub fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_are_grouped_by_thousands() {
        assert_eq!(format_amount(12500.0), "12,500.00");
        assert_eq!(format_amount(1250.5), "1,250.50");
        assert_eq!(format_amount(999.999), "999.99");
        assert_eq!(format_amount(-1000.0), "-1,000.00");
        assert_eq!(format_amount(0.0), "0.00");
    }

    #[test]
    fn ratios_render_as_percentages() {
        assert_eq!(percent(0.5), "50.0%");
        assert_eq!(percent(0.0), "0.0%");
    }
}
