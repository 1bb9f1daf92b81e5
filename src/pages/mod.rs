mod auth;
mod dashboard;
mod habits;
mod home;
mod layout;
mod profile;
mod shopping;
mod sleep;
mod tasks;

pub use auth::{LoginPage, SignupPage};
pub use dashboard::DashboardPage;
pub use habits::HabitsPage;
pub use home::{AboutPage, HomePage};
pub use layout::{AppLayout, RequireAuth};
pub use profile::ProfilePage;
pub use shopping::ShoppingPage;
pub use sleep::{SleepFormPage, SleepHistoryPage};
pub use tasks::TasksPage;

use crate::api::{ApiClient, ApiResult};
use crate::components::ui::{Alert, AlertDescription};
use crate::data::{ActionError, Keyed};
use crate::state::AppState;
use crate::vm::{ListState, LoadOutcome};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future::Future;

/// Inline error shown under a form while `error` holds a message.
#[component]
fn FormAlert(error: RwSignal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || error.get().is_some() fallback=|| ().into_view()>
            {move || error.get().map(|e| view! {
                <Alert class="border-destructive/30">
                    <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                </Alert>
            })}
        </Show>
    }
}

/// Muted placeholder for a list with no rows yet.
#[component]
fn EmptyState(#[prop(into)] message: String) -> impl IntoView {
    view! {
        <div class="rounded-md border border-dashed border-border px-4 py-8 text-center text-xs text-muted-foreground">
            {message}
        </div>
    }
}

/// Reload `state` for the signed-in user. Stale responses are dropped; failures keep the
/// current rows and raise a toast.
fn load_list<T, F, Fut>(app: AppState, state: RwSignal<ListState<T>>, title: &'static str, fetch: F)
where
    T: Keyed + Send + Sync + 'static,
    F: FnOnce(ApiClient, String) -> Fut + 'static,
    Fut: Future<Output = ApiResult<Vec<T>>> + 'static,
{
    let Some(user_id) = app.user_id_untracked() else {
        return;
    };
    let Some(ticket) = state.try_update(|s| s.begin_load()) else {
        return;
    };
    let client = app.client();

    spawn_local(async move {
        let result = fetch(client, user_id).await;
        if let Some(LoadOutcome::Failed(e)) = state.try_update(|s| s.finish_load(ticket, result)) {
            app.report(title, &e);
        }
    });
}

/// Route a failed form action: validation stays inline, backend errors also toast.
fn action_failed(app: &AppState, title: &str, err: ActionError, inline: RwSignal<Option<String>>) {
    match err {
        ActionError::Invalid(e) => inline.set(Some(e.to_string())),
        ActionError::Backend(e) => {
            app.report(title, &e);
            inline.set(Some(e.to_string()));
        }
    }
}
