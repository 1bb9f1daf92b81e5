use super::{action_failed, load_list, EmptyState, FormAlert};
use crate::components::ui::{
    Badge, Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader,
    CardTitle, DialogFooter, Field, Input, LoadingBlock, Modal, NativeSelect, Spinner, Textarea,
};
use crate::data::habits::{delete_habit, increment_streak, list_habits, submit};
use crate::forms::HabitForm;
use crate::models::{Frequency, Habit};
use crate::state::AppContext;
use crate::vm::ListState;
use icons::{Flame, Plus, Trash2};
use leptos::prelude::*;
use leptos::task::spawn_local;
use strum::IntoEnumIterator;

#[component]
pub fn HabitsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let habits: RwSignal<ListState<Habit>> = RwSignal::new(ListState::default());

    let create_open: RwSignal<bool> = RwSignal::new(false);
    let name: RwSignal<String> = RwSignal::new(String::new());
    let description: RwSignal<String> = RwSignal::new(String::new());
    let frequency: RwSignal<String> = RwSignal::new(Frequency::default().to_string());
    let create_error: RwSignal<Option<String>> = RwSignal::new(None);
    let create_loading: RwSignal<bool> = RwSignal::new(false);

    // Row currently being written, to disable its buttons.
    let busy_id: RwSignal<Option<String>> = RwSignal::new(None);

    let user_id = Memo::new(move |_| app_state.0.session.with(|s| s.user_id().map(str::to_string)));
    Effect::new(move |_| {
        if user_id.get().is_some() {
            load_list(app_state.0, habits, "Erro ao carregar hábitos", |client, uid| async move {
                list_habits(&client, &uid).await
            });
        }
    });

    let reset_form = move || {
        name.set(String::new());
        description.set(String::new());
        frequency.set(Frequency::default().to_string());
        create_error.set(None);
    };

    let on_create = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if create_loading.get_untracked() {
            return;
        }
        let Some(uid) = app_state.0.user_id_untracked() else {
            return;
        };
        let form = HabitForm {
            name: name.get_untracked(),
            description: description.get_untracked(),
            frequency: frequency.get_untracked(),
        };

        create_loading.set(true);
        create_error.set(None);
        let client = app_state.0.client();

        spawn_local(async move {
            match submit(&client, &uid, &form).await {
                Ok(habit) => {
                    habits.update(|s| s.prepend(habit));
                    reset_form();
                    create_open.set(false);
                    app_state.0.notify("Hábito criado", form.name);
                }
                Err(e) => action_failed(&app_state.0, "Erro ao criar hábito", e, create_error),
            }
            create_loading.set(false);
        });
    };

    let on_increment = move |habit: Habit| {
        busy_id.set(Some(habit.id.clone()));
        let client = app_state.0.client();
        spawn_local(async move {
            match increment_streak(&client, &habit).await {
                Ok(streak) => {
                    habits.update(|s| {
                        s.patch(&habit.id, |h| h.streak = streak);
                    });
                }
                Err(e) => app_state.0.report("Erro ao atualizar sequência", &e),
            }
            busy_id.set(None);
        });
    };

    let on_delete = move |id: String| {
        busy_id.set(Some(id.clone()));
        let client = app_state.0.client();
        spawn_local(async move {
            match delete_habit(&client, &id).await {
                Ok(()) => {
                    habits.update(|s| {
                        s.remove(&id);
                    });
                }
                Err(e) => app_state.0.report("Erro ao excluir hábito", &e),
            }
            busy_id.set(None);
        });
    };

    let frequency_options: Vec<(String, String)> = Frequency::iter()
        .map(|f| (f.to_string(), f.label().to_string()))
        .collect();
    let frequency_options = StoredValue::new(frequency_options);

    view! {
        <div class="space-y-4">
            <div class="flex items-center justify-between gap-2">
                <h1 class="text-lg font-semibold">"Hábitos"</h1>
                <Button size=ButtonSize::Sm on:click=move |_| create_open.set(true)>
                    <Plus />
                    "Novo hábito"
                </Button>
            </div>

            {move || {
                let state = habits.get();
                if state.loading && !state.loaded {
                    return view! { <LoadingBlock /> }.into_any();
                }
                if state.is_empty_state() {
                    return view! { <EmptyState message="Nenhum hábito cadastrado." /> }.into_any();
                }
                view! {
                    <div class="grid gap-3 sm:grid-cols-2">
                        {state
                            .items
                            .into_iter()
                            .map(|habit| {
                                let id = habit.id.clone();
                                let is_busy = {
                                    let id = id.clone();
                                    move || busy_id.with(|b| b.as_deref() == Some(id.as_str()))
                                };
                                let name = habit.name.clone();
                                let description = habit.description.clone();
                                let frequency = habit.frequency_label();
                                let streak = habit.streak;
                                let for_increment = habit;
                                view! {
                                    <Card class="gap-3 py-4">
                                        <CardHeader class="px-4">
                                            <div class="flex w-full items-center justify-between gap-2">
                                                <CardTitle class="text-sm">{name}</CardTitle>
                                                <Badge class="bg-muted text-foreground">{frequency}</Badge>
                                            </div>
                                            {description.map(|d| view! {
                                                <CardDescription class="text-xs">{d}</CardDescription>
                                            })}
                                        </CardHeader>
                                        <CardContent class="flex items-center justify-between gap-2 px-4">
                                            <div class="inline-flex items-center gap-1 text-sm">
                                                <Flame class="size-4 text-orange-500" />
                                                {format!("{streak} dia(s)")}
                                            </div>
                                            <div class="flex items-center gap-1">
                                                <Button
                                                    variant=ButtonVariant::Outline
                                                    size=ButtonSize::Sm
                                                    attr:disabled=is_busy.clone()
                                                    on:click=move |_| on_increment(for_increment.clone())
                                                >
                                                    "+1"
                                                </Button>
                                                <Button
                                                    variant=ButtonVariant::Ghost
                                                    size=ButtonSize::Icon
                                                    class="h-8 w-8 text-destructive"
                                                    attr:title="Excluir"
                                                    attr:disabled=is_busy
                                                    on:click=move |_| on_delete(id.clone())
                                                >
                                                    <Trash2 />
                                                </Button>
                                            </div>
                                        </CardContent>
                                    </Card>
                                }
                            })
                            .collect_view()}
                    </div>
                }
                .into_any()
            }}

            <Modal open=create_open title="Novo hábito">
                <form class="space-y-2" on:submit=on_create>
                    <Field label="Nome" html_for="habit_name">
                        <Input id="habit_name" bind_value=name class="h-8 text-sm border-border bg-background" />
                    </Field>
                    <Field label="Descrição (opcional)" html_for="habit_description">
                        <Textarea id="habit_description" bind_value=description rows=2 class="text-sm" />
                    </Field>
                    <Field label="Frequência" html_for="habit_frequency">
                        <NativeSelect
                            id="habit_frequency"
                            options=frequency_options.get_value()
                            bind_value=frequency
                            class="h-8 text-sm"
                        />
                    </Field>

                    <FormAlert error=create_error />

                    <DialogFooter>
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=move || create_loading.get()
                            on:click=move |ev: web_sys::MouseEvent| {
                                ev.prevent_default();
                                create_open.set(false);
                            }
                        >
                            "Cancelar"
                        </Button>
                        <Button size=ButtonSize::Sm attr:disabled=move || create_loading.get()>
                            <Show when=move || create_loading.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            "Criar"
                        </Button>
                    </DialogFooter>
                </form>
            </Modal>
        </div>
    }
}
