use dioxus::prelude::*;
use tracing::debug;

use crate::services::charts::{ChartKind, ChartRegistry, ChartSpec};

/// A chart registry scoped to the calling component. Everything registered
/// in it is released when the component unmounts.
pub fn use_chart_registry() -> Signal<ChartRegistry> {
    let registry = use_signal(ChartRegistry::default);

    use_drop(move || {
        let mut registry = registry;
        if let Ok(mut charts) = registry.try_write() {
            let released = charts.dispose();
            debug!(released, "chart registry released");
        };
    });

    registry
}

#[component]
pub fn ChartView(spec: ChartSpec) -> Element {
    if spec.is_empty() {
        return rsx! {
            div { class: "space-y-2",
                h3 { class: "text-sm font-semibold text-slate-800", "{spec.title}" }
                p { class: "text-xs text-slate-500 italic", "No data for this period" }
            }
        };
    }

    let body = match spec.kind {
        ChartKind::Bars => render_bars(&spec),
        ChartKind::Distribution => render_distribution(&spec),
    };

    rsx! {
        div { class: "space-y-2",
            h3 { class: "text-sm font-semibold text-slate-800", "{spec.title}" }
            {body}
        }
    }
}

fn render_bars(spec: &ChartSpec) -> Element {
    let max = spec.max_value().max(1);
    let bars: Vec<(String, u64, &'static str, u64)> = spec
        .labels
        .iter()
        .zip(spec.values.iter())
        .zip(spec.colors.iter())
        .map(|((label, value), color)| (label.clone(), *value, *color, value * 100 / max))
        .collect();

    rsx! {
        div { class: "flex h-40 items-end gap-1",
            for (label, value, color, height) in bars {
                div { key: "{label}", class: "flex flex-1 flex-col items-center gap-1",
                    span { class: "text-[10px] text-slate-500", "{value}" }
                    div {
                        class: "w-full rounded-t",
                        style: "height: {height}%; min-height: 2px; background-color: {color};",
                    }
                    span { class: "text-[10px] text-slate-400", "{label}" }
                }
            }
        }
    }
}

fn render_distribution(spec: &ChartSpec) -> Element {
    let total = spec.total().max(1);
    let slices: Vec<(String, u64, &'static str, f64)> = spec
        .labels
        .iter()
        .zip(spec.values.iter())
        .zip(spec.colors.iter())
        .map(|((label, value), color)| {
            (label.clone(), *value, *color, *value as f64 * 100.0 / total as f64)
        })
        .collect();
    let legend = slices.clone();

    rsx! {
        div { class: "space-y-2",
            div { class: "flex h-4 w-full overflow-hidden rounded",
                for (label, _, color, share) in slices {
                    div {
                        key: "{label}",
                        style: "width: {share:.2}%; background-color: {color};",
                        title: "{label}",
                    }
                }
            }
            ul { class: "grid grid-cols-2 gap-1 text-[11px] text-slate-600",
                for (label, value, color, share) in legend {
                    li { key: "{label}", class: "flex items-center gap-2",
                        span { class: "inline-block h-2 w-2 rounded-full", style: "background-color: {color};" }
                        span { "{label}: {value} ({share:.0}%)" }
                    }
                }
            }
        }
    }
}
