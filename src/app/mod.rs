use crate::components::ui::Toaster;
use crate::pages::{
    AboutPage, DashboardPage, HabitsPage, HomePage, LoginPage, ProfilePage, RequireAuth,
    ShoppingPage, SignupPage, SleepFormPage, SleepHistoryPage, TasksPage,
};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    let app_state = AppState::new();
    provide_context(AppContext(app_state));
    app_state.init_session();

    // Every signed-in page is reachable both at `/x` and `/profile/x`.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Página não encontrada"</div> }>
                <Route path=path!("") view=HomePage />
                <Route path=path!("about") view=AboutPage />
                <Route path=path!("login") view=LoginPage />
                <Route path=path!("signup") view=SignupPage />

                <Route path=path!("dashboard") view=|| view! { <RequireAuth><DashboardPage /></RequireAuth> } />
                <Route path=path!("sleep") view=|| view! { <RequireAuth><SleepFormPage /></RequireAuth> } />
                <Route path=path!("sleep/history") view=|| view! { <RequireAuth><SleepHistoryPage /></RequireAuth> } />
                <Route path=path!("habits") view=|| view! { <RequireAuth><HabitsPage /></RequireAuth> } />
                <Route path=path!("tasks") view=|| view! { <RequireAuth><TasksPage /></RequireAuth> } />
                <Route path=path!("shopping") view=|| view! { <RequireAuth><ShoppingPage /></RequireAuth> } />

                <Route path=path!("profile") view=|| view! { <RequireAuth><ProfilePage /></RequireAuth> } />
                <Route path=path!("profile/dashboard") view=|| view! { <RequireAuth><DashboardPage /></RequireAuth> } />
                <Route path=path!("profile/sleep") view=|| view! { <RequireAuth><SleepFormPage /></RequireAuth> } />
                <Route path=path!("profile/sleep/history") view=|| view! { <RequireAuth><SleepHistoryPage /></RequireAuth> } />
                <Route path=path!("profile/habits") view=|| view! { <RequireAuth><HabitsPage /></RequireAuth> } />
                <Route path=path!("profile/tasks") view=|| view! { <RequireAuth><TasksPage /></RequireAuth> } />
                <Route path=path!("profile/shopping") view=|| view! { <RequireAuth><ShoppingPage /></RequireAuth> } />
            </Routes>
            <Toaster />
        </Router>
    }
}
