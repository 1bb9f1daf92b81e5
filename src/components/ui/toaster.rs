use icons::X;
use leptos::prelude::*;

use crate::state::AppContext;
use crate::toast::ToastVariant;

/// Renders the app's toast queue in the bottom-right corner.
#[component]
pub fn Toaster() -> impl IntoView {
    let toasts = expect_context::<AppContext>().0.toasts;

    view! {
        <div class="pointer-events-none fixed bottom-4 right-4 z-[60] flex w-full max-w-xs flex-col gap-2">
            <For
                each=move || toasts.get().items().to_vec()
                key=|t| t.id
                let:toast
            >
                {
                    let id = toast.id;
                    let class = match toast.variant {
                        ToastVariant::Destructive => "border-destructive/40 bg-destructive text-white",
                        ToastVariant::Default => "border-border bg-background text-foreground",
                    };
                    view! {
                        <div
                            class=format!("pointer-events-auto flex items-start gap-2 rounded-md border p-3 shadow-lg {class}")
                            role="status"
                        >
                            <div class="min-w-0 flex-1 space-y-1">
                                <div class="text-sm font-medium">{toast.title}</div>
                                {toast.description.map(|d| view! { <div class="text-xs opacity-90">{d}</div> })}
                            </div>
                            <button
                                class="shrink-0 opacity-70 hover:opacity-100"
                                aria-label="Fechar"
                                on:click=move |_| toasts.update(|q| {
                                    q.dismiss(id);
                                })
                            >
                                <X class="size-4" />
                            </button>
                        </div>
                    }
                }
            </For>
        </div>
    }
}
