use leptos::prelude::*;
use tw_merge::*;

#[component]
pub fn Label(
    #[prop(optional, into)] class: String,
    #[prop(optional, into)] html_for: String,
    children: Children,
) -> impl IntoView {
    let class = tw_merge!(
        "flex items-center gap-2 text-sm leading-none font-medium select-none peer-disabled:cursor-not-allowed peer-disabled:opacity-50",
        class
    );

    view! {
        <label class=class r#for=html_for>
            {children()}
        </label>
    }
}

/// Label plus control stacked, the layout every form here uses.
#[component]
pub fn Field(#[prop(into)] label: String, #[prop(optional, into)] html_for: String, children: Children) -> impl IntoView {
    view! {
        <div class="flex flex-col gap-1.5">
            <Label html_for=html_for class="text-xs">{label}</Label>
            {children()}
        </div>
    }
}
