use super::{load_list, EmptyState};
use crate::components::ui::{
    Button, ButtonSize, Card, CardContent, CardDescription, CardHeader, CardTitle, CardValue,
    LoadingBlock,
};
use crate::data::sleep::{recent_sleep_logs, RECENT_LOGS};
use crate::models::SleepLog;
use crate::state::AppContext;
use crate::util::format_minute_of_day;
use crate::vm::stats::{format_hours, summarize, trend, SleepSummary};
use crate::vm::ListState;
use leptos::prelude::*;

/// Bar scale for the trend table.
const TREND_MAX_HOURS: f64 = 12.0;

#[component]
fn StatCard(#[prop(into)] title: String, value: Signal<String>) -> impl IntoView {
    view! {
        <Card class="gap-2 py-4">
            <CardHeader class="px-4">
                <CardDescription class="text-xs">{title}</CardDescription>
            </CardHeader>
            <CardContent class="px-4">
                <CardValue>{move || value.get()}</CardValue>
            </CardContent>
        </Card>
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let logs: RwSignal<ListState<SleepLog>> = RwSignal::new(ListState::default());
    let time = app_state.0.time_policy();

    let user_id = Memo::new(move |_| app_state.0.session.with(|s| s.user_id().map(str::to_string)));
    Effect::new(move |_| {
        if user_id.get().is_some() {
            load_list(app_state.0, logs, "Erro ao carregar registros", |client, uid| async move {
                recent_sleep_logs(&client, &uid).await
            });
        }
    });

    let summary = Memo::new(move |_| logs.with(|s| summarize(&s.items, &time)));
    let stat = move |f: fn(&SleepSummary) -> String| {
        Signal::derive(move || summary.with(|s| s.as_ref().map(f).unwrap_or_else(|| "-".to_string())))
    };

    view! {
        <div class="space-y-6">
            <div class="flex flex-wrap items-center justify-between gap-2">
                <div>
                    <h1 class="text-lg font-semibold">"Dashboard"</h1>
                    <p class="text-xs text-muted-foreground">
                        {format!("Médias dos últimos {RECENT_LOGS} registros de sono.")}
                    </p>
                </div>
                <Button size=ButtonSize::Sm href="/profile/sleep".to_string()>"Registrar sono"</Button>
            </div>

            <div class="grid grid-cols-2 gap-3 md:grid-cols-4">
                <StatCard title="Horas de sono" value=stat(|s| format_hours(s.avg_hours)) />
                <StatCard title="Qualidade" value=stat(|s| format!("{:.0}%", s.avg_quality)) />
                <StatCard title="Hora de dormir" value=stat(|s| format_minute_of_day(s.avg_bedtime)) />
                <StatCard title="Hora de acordar" value=stat(|s| format_minute_of_day(s.avg_wake)) />
            </div>

            <Card>
                <CardHeader>
                    <CardTitle class="text-sm">"Tendência"</CardTitle>
                    <CardDescription class="text-xs">"Horas dormidas e qualidade por noite."</CardDescription>
                </CardHeader>
                <CardContent>
                    {move || {
                        let state = logs.get();
                        if state.loading && !state.loaded {
                            return view! { <LoadingBlock /> }.into_any();
                        }
                        if state.is_empty_state() {
                            return view! {
                                <EmptyState message="Nenhum registro ainda. Que tal registrar a noite passada?" />
                            }
                            .into_any();
                        }
                        view! {
                            <table class="w-full text-xs">
                                <thead class="text-muted-foreground">
                                    <tr>
                                        <th class="py-1 text-left font-medium">"Noite"</th>
                                        <th class="py-1 text-left font-medium">"Horas"</th>
                                        <th class="w-1/2 py-1"></th>
                                        <th class="py-1 text-right font-medium">"Qualidade"</th>
                                    </tr>
                                </thead>
                                <tbody>
                                    {trend(&state.items, &time)
                                        .into_iter()
                                        .map(|p| {
                                            let width = (p.hours / TREND_MAX_HOURS * 100.0).clamp(0.0, 100.0);
                                            view! {
                                                <tr class="border-t border-border">
                                                    <td class="py-1.5">{p.label}</td>
                                                    <td class="py-1.5 tabular-nums">{format_hours(p.hours)}</td>
                                                    <td class="py-1.5">
                                                        <div class="h-2 rounded-full bg-muted">
                                                            <div
                                                                class="h-2 rounded-full bg-primary"
                                                                style=format!("width: {width:.0}%")
                                                            ></div>
                                                        </div>
                                                    </td>
                                                    <td class="py-1.5 text-right tabular-nums">{format!("{}%", p.quality)}</td>
                                                </tr>
                                            }
                                        })
                                        .collect_view()}
                                </tbody>
                            </table>
                        }
                        .into_any()
                    }}
                </CardContent>
            </Card>
        </div>
    }
}
