use crate::state::{use_app_actions, use_app_state, Notice, NoticeKind};
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;

const AUTO_DISMISS_MS: u32 = 6_000;

impl NoticeKind {
    fn accent_classes(self) -> (&'static str, &'static str) {
        match self {
            Self::Success => ("border-emerald-500 bg-emerald-50", "text-emerald-700"),
            Self::Error => ("border-red-500 bg-red-50", "text-red-700"),
            Self::Warning => ("border-amber-500 bg-amber-50", "text-amber-700"),
            Self::Info => ("border-slate-500 bg-slate-50", "text-slate-700"),
        }
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct ToastProps {
    pub notice: Notice,
    pub on_close: EventHandler<String>,
}

#[component]
pub fn Toast(props: ToastProps) -> Element {
    let (container_class, accent_text) = props.notice.kind.accent_classes();
    let id = props.notice.id.clone();
    let on_close = props.on_close;

    // Successes fade on their own; errors stay until dismissed.
    use_future({
        let id = id.clone();
        let kind = props.notice.kind;
        move || {
            let id = id.clone();
            async move {
                if matches!(kind, NoticeKind::Success | NoticeKind::Info) {
                    TimeoutFuture::new(AUTO_DISMISS_MS).await;
                    on_close.call(id);
                }
            }
        }
    });

    rsx! {
        div { class: format!("pointer-events-auto rounded-lg border-l-4 p-4 shadow-lg {}", container_class),
            div { class: "flex items-start justify-between gap-4",
                div { class: "space-y-1",
                    h3 { class: format!("text-sm font-semibold {}", accent_text), "{props.notice.title}" }
                    p { class: "text-xs text-slate-700", "{props.notice.message}" }
                    if let Some(status) = props.notice.status {
                        p { class: "text-[11px] text-slate-500",
                            span { class: "font-medium", "HTTP status: " }
                            span { class: "font-mono", "{status}" }
                        }
                    }
                }
                button {
                    class: "rounded bg-slate-200 px-2 py-1 text-[11px] text-slate-600 transition hover:bg-slate-300",
                    onclick: move |_| on_close.call(id.clone()),
                    "Close"
                }
            }
        }
    }
}

#[component]
pub fn NotificationCenter() -> Element {
    let actions = use_app_actions();
    let notices = use_app_state().read().notices.clone();

    if notices.is_empty() {
        return rsx! { Fragment {} };
    }

    rsx! {
        div { class: "pointer-events-none fixed right-4 top-4 z-50 flex w-80 flex-col gap-3",
            for notice in notices {
                Toast {
                    key: "{notice.id}",
                    notice: notice.clone(),
                    on_close: move |id: String| actions.dismiss(&id),
                }
            }
        }
    }
}
