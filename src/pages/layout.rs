use crate::components::ui::{Button, ButtonSize, ButtonVariant, LoadingBlock};
use crate::nav::{is_active, visible_routes};
use crate::session::SessionState;
use crate::state::AppContext;
use leptos::prelude::*;
use leptos_router::hooks::{use_location, use_navigate};
use leptos_router::NavigateOptions;

/// Top bar with the main navigation.
#[component]
pub fn MainNav(#[prop(optional)] hide_auth_links: bool) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let location = use_location();
    let navigate = StoredValue::new(use_navigate());

    let authenticated = Memo::new(move |_| app_state.0.session.with(SessionState::is_authenticated));

    let on_logout = move |_| {
        app_state.0.sign_out();
        navigate.with_value(|nav| nav("/login", Default::default()));
    };

    view! {
        <header class="border-b border-border bg-background">
            <div class="mx-auto flex w-full max-w-5xl flex-wrap items-center gap-2 px-4 py-3">
                <a href="/" class="mr-2 text-sm font-semibold text-foreground">"SleepWell"</a>
                <nav class="flex min-w-0 flex-1 flex-wrap items-center gap-1" aria-label="Principal">
                    {move || {
                        let pathname = location.pathname.get();
                        visible_routes(authenticated.get(), hide_auth_links)
                            .into_iter()
                            .map(|route| {
                                let active = is_active(&route, &pathname);
                                let variant = if active { ButtonVariant::Accent } else { ButtonVariant::Ghost };
                                view! {
                                    <Button
                                        variant=variant
                                        size=ButtonSize::Sm
                                        attr:aria-current=move || if active { Some("page") } else { None }
                                        href=route.href.to_string()
                                    >
                                        {route.label}
                                    </Button>
                                }
                            })
                            .collect_view()
                    }}
                </nav>
                <Show when=move || authenticated.get() fallback=|| ().into_view()>
                    <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_logout>
                        "Sair"
                    </Button>
                </Show>
            </div>
        </header>
    }
}

#[component]
pub fn AppLayout(children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-background text-foreground">
            <MainNav />
            <main class="mx-auto w-full max-w-5xl px-4 py-6">{children()}</main>
        </div>
    }
}

/// Renders `children` only for a signed-in user; anyone else is sent to `/login`.
#[component]
pub fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    // None while the stored session is still being checked.
    let status = Memo::new(move |_| {
        app_state.0.session.with(|s| match s {
            SessionState::Loading => None,
            other => Some(other.is_authenticated()),
        })
    });

    Effect::new(move |_| {
        if status.get() == Some(false) {
            navigate.with_value(|nav| {
                nav(
                    "/login",
                    NavigateOptions {
                        replace: true,
                        ..Default::default()
                    },
                )
            });
        }
    });

    // Store children so the view macro sees an `Fn` (not an `FnOnce`).
    let children = StoredValue::new(children);

    view! {
        {move || match status.get() {
            Some(true) => view! { <AppLayout>{children.with_value(|c| c())}</AppLayout> }.into_any(),
            Some(false) => ().into_any(),
            None => view! { <LoadingBlock label="Verificando sessão..." /> }.into_any(),
        }}
    }
}
