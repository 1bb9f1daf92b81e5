use icons::LoaderCircle;
use leptos::prelude::*;
use tw_merge::tw_merge;

#[component]
pub fn Spinner(#[prop(into, optional)] class: String) -> impl IntoView {
    let merged_class = tw_merge!("size-4 animate-spin", class);

    view! { <LoaderCircle class=merged_class attr:role="status" attr:aria-label="Carregando" /> }
}

/// Centered spinner for a whole page or section that is still loading.
#[component]
pub fn LoadingBlock(#[prop(into, optional)] label: String) -> impl IntoView {
    view! {
        <div class="flex items-center justify-center gap-2 py-10 text-xs text-muted-foreground">
            <Spinner />
            {label}
        </div>
    }
}
