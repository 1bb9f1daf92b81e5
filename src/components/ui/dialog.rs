use icons::X;
use leptos::prelude::*;
use leptos_ui::clx;

use crate::components::ui::button::{Button, ButtonSize, ButtonVariant};

mod components {
    use super::*;
    clx! {DialogTitle, div, "text-sm font-medium"}
    clx! {DialogDescription, div, "text-xs text-muted-foreground"}
    clx! {DialogFooter, div, "flex items-center justify-end gap-2 pt-2"}
}

pub use components::*;

/// Overlay card shown while `open` is true.
#[component]
pub fn Modal(
    open: RwSignal<bool>,
    #[prop(into)] title: String,
    #[prop(optional, into)] description: String,
    children: ChildrenFn,
) -> impl IntoView {
    let title = StoredValue::new(title);
    let description = StoredValue::new(description);
    let children = StoredValue::new(children);

    view! {
        <Show when=move || open.get() fallback=|| ().into_view()>
            <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                <div
                    class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg"
                    role="dialog"
                    aria-modal="true"
                >
                    <div class="mb-3 flex items-start justify-between gap-2">
                        <div class="space-y-1">
                            <DialogTitle>{title.get_value()}</DialogTitle>
                            {move || {
                                let d = description.get_value();
                                (!d.is_empty()).then(|| view! { <DialogDescription>{d}</DialogDescription> })
                            }}
                        </div>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Icon
                            class="h-7 w-7"
                            attr:aria-label="Fechar"
                            on:click=move |_| open.set(false)
                        >
                            <X />
                        </Button>
                    </div>
                    {move || children.with_value(|c| c())}
                </div>
            </div>
        </Show>
    }
}
