use super::{action_failed, load_list, EmptyState, FormAlert};
use crate::components::ui::{
    Badge, Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader,
    CardTitle, Field, Input, LoadingBlock, NativeSelect, Spinner, Textarea,
};
use crate::data::sleep::{sleep_history, submit};
use crate::forms::SleepForm;
use crate::models::{mood_icon, Mood, SleepLog};
use crate::state::AppContext;
use crate::util::format_duration;
use crate::vm::stats::QualityBand;
use crate::vm::ListState;
use chrono::Utc;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use strum::IntoEnumIterator;

fn mood_options() -> Vec<(String, String)> {
    Mood::iter()
        .map(|m| (m.to_string(), format!("{} {}", m.icon(), m.label())))
        .collect()
}

#[component]
pub fn SleepFormPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());
    let time = app_state.0.time_policy();

    let bedtime: RwSignal<String> = RwSignal::new(String::new());
    // Most entries are made right after waking up.
    let wake_time: RwSignal<String> = RwSignal::new(time.to_local_input(Utc::now()));
    let quality: RwSignal<String> = RwSignal::new(SleepForm::default().quality.to_string());
    let mood: RwSignal<String> = RwSignal::new(String::new());
    let notes: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let submitting: RwSignal<bool> = RwSignal::new(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let Some(user_id) = app_state.0.user_id_untracked() else {
            return;
        };

        let form = SleepForm {
            bedtime: bedtime.get_untracked(),
            wake_time: wake_time.get_untracked(),
            // Unparsable input is rejected as out of range.
            quality: quality.get_untracked().trim().parse().unwrap_or(-1),
            mood: mood.get_untracked(),
            notes: notes.get_untracked(),
        };

        submitting.set(true);
        error.set(None);
        let client = app_state.0.client();

        spawn_local(async move {
            match submit(&client, &user_id, &form, &time).await {
                Ok(log) => {
                    app_state.0.notify(
                        "Registro salvo",
                        format!("Você dormiu {}.", format_duration(log.bedtime, log.wake_time)),
                    );
                    navigate.with_value(|nav| nav("/profile/sleep/history", Default::default()));
                }
                Err(e) => action_failed(&app_state.0, "Erro ao salvar registro", e, error),
            }
            submitting.set(false);
        });
    };

    view! {
        <div class="mx-auto max-w-lg space-y-4">
            <div class="flex items-center justify-between gap-2">
                <h1 class="text-lg font-semibold">"Registrar sono"</h1>
                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm href="/profile/sleep/history".to_string()>
                    "Histórico"
                </Button>
            </div>

            <Card>
                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_submit>
                        <div class="grid gap-3 sm:grid-cols-2">
                            <Field label="Horário que Dormiu" html_for="bedtime">
                                <Input id="bedtime" r#type="datetime-local" bind_value=bedtime required=true class="h-8 text-sm" />
                            </Field>
                            <Field label="Horário que Acordou" html_for="wake_time">
                                <Input id="wake_time" r#type="datetime-local" bind_value=wake_time required=true class="h-8 text-sm" />
                            </Field>
                        </div>

                        <Field label="Qualidade do sono" html_for="quality">
                            <div class="flex items-center gap-3">
                                <Input
                                    id="quality"
                                    r#type="range"
                                    min="0"
                                    max="100"
                                    step="1"
                                    bind_value=quality
                                    class="h-8 flex-1 px-0 shadow-none"
                                />
                                <span class="w-10 text-right text-sm tabular-nums">{move || format!("{}%", quality.get())}</span>
                            </div>
                        </Field>

                        <Field label="Como você acordou?" html_for="mood">
                            <NativeSelect id="mood" placeholder="Selecione" options=mood_options() bind_value=mood class="h-8 text-sm" />
                        </Field>

                        <Field label="Observações" html_for="notes">
                            <Textarea id="notes" placeholder="Sonhos, interrupções, cafeína..." bind_value=notes class="text-sm" />
                        </Field>

                        <FormAlert error=error />

                        <Button class="w-full" size=ButtonSize::Sm attr:disabled=move || submitting.get()>
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || submitting.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {move || if submitting.get() { "Salvando..." } else { "Salvar registro" }}
                            </span>
                        </Button>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
fn SleepLogCard(log: SleepLog) -> impl IntoView {
    let time = expect_context::<AppContext>().0.time_policy();
    let date = time.format_date(log.bedtime);
    let span = format!(
        "{} → {} · {}",
        time.format_time(log.bedtime),
        time.format_time(log.wake_time),
        format_duration(log.bedtime, log.wake_time),
    );
    let band = QualityBand::of(log.quality);
    let quality = format!("{}%", log.quality);
    let icon = mood_icon(log.mood.as_deref());
    let mood = log
        .mood()
        .map(|m| m.label().to_string())
        .or(log.mood)
        .unwrap_or_else(|| "Sem humor registrado".to_string());
    let notes = log.notes;

    view! {
        <Card class="gap-3 py-4">
            <CardHeader class="px-4">
                <div class="flex w-full items-center justify-between gap-2">
                    <CardTitle class="text-sm">{date}</CardTitle>
                    <Badge class=band.badge_class()>{quality}</Badge>
                </div>
                <CardDescription class="text-xs">{span}</CardDescription>
            </CardHeader>
            <CardContent class="space-y-1 px-4 text-sm">
                <div class="flex items-center gap-2">
                    <span aria-hidden="true">{icon}</span>
                    <span>{mood}</span>
                </div>
                {notes.map(|n| view! { <p class="text-xs text-muted-foreground">{n}</p> })}
            </CardContent>
        </Card>
    }
}

#[component]
pub fn SleepHistoryPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let logs: RwSignal<ListState<SleepLog>> = RwSignal::new(ListState::default());

    let user_id = Memo::new(move |_| app_state.0.session.with(|s| s.user_id().map(str::to_string)));
    Effect::new(move |_| {
        if user_id.get().is_some() {
            load_list(app_state.0, logs, "Erro ao carregar histórico", |client, uid| async move {
                sleep_history(&client, &uid).await
            });
        }
    });

    view! {
        <div class="space-y-4">
            <div class="flex items-center justify-between gap-2">
                <h1 class="text-lg font-semibold">"Histórico de sono"</h1>
                <Button size=ButtonSize::Sm href="/profile/sleep".to_string()>"Novo registro"</Button>
            </div>

            {move || {
                let state = logs.get();
                if state.loading && !state.loaded {
                    return view! { <LoadingBlock /> }.into_any();
                }
                if state.is_empty_state() {
                    return view! { <EmptyState message="Você ainda não registrou nenhuma noite." /> }.into_any();
                }
                view! {
                    <div class="grid gap-3 sm:grid-cols-2">
                        {state.items.into_iter().map(|log| view! { <SleepLogCard log=log /> }).collect_view()}
                    </div>
                }
                .into_any()
            }}
        </div>
    }
}
