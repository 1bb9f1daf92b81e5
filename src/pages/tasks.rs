use super::{action_failed, load_list, EmptyState, FormAlert};
use crate::components::ui::{
    Badge, Button, ButtonSize, ButtonVariant, Card, CardContent, DialogFooter, Field, Input,
    LoadingBlock, Modal, Spinner, Textarea,
};
use crate::data::tasks::{delete_task, list_tasks, set_task_status, submit};
use crate::forms::TaskForm;
use crate::models::{Task, TaskStatus};
use crate::state::AppContext;
use crate::vm::ListState;
use icons::{Plus, Trash2};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn TasksPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let time = app_state.0.time_policy();
    let tasks: RwSignal<ListState<Task>> = RwSignal::new(ListState::default());

    let create_open: RwSignal<bool> = RwSignal::new(false);
    let title: RwSignal<String> = RwSignal::new(String::new());
    let description: RwSignal<String> = RwSignal::new(String::new());
    let scheduled_at: RwSignal<String> = RwSignal::new(String::new());
    let create_error: RwSignal<Option<String>> = RwSignal::new(None);
    let create_loading: RwSignal<bool> = RwSignal::new(false);
    let busy_id: RwSignal<Option<String>> = RwSignal::new(None);

    let reload = move || {
        load_list(app_state.0, tasks, "Erro ao carregar tarefas", |client, uid| async move {
            list_tasks(&client, &uid).await
        });
    };

    let user_id = Memo::new(move |_| app_state.0.session.with(|s| s.user_id().map(str::to_string)));
    Effect::new(move |_| {
        if user_id.get().is_some() {
            reload();
        }
    });

    let on_create = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if create_loading.get_untracked() {
            return;
        }
        let Some(uid) = app_state.0.user_id_untracked() else {
            return;
        };
        let form = TaskForm {
            title: title.get_untracked(),
            description: description.get_untracked(),
            scheduled_at: scheduled_at.get_untracked(),
        };

        create_loading.set(true);
        create_error.set(None);
        let client = app_state.0.client();

        spawn_local(async move {
            match submit(&client, &uid, &form, &time).await {
                Ok(_) => {
                    title.set(String::new());
                    description.set(String::new());
                    scheduled_at.set(String::new());
                    create_open.set(false);
                    app_state.0.notify("Tarefa criada", form.title);
                    // Re-fetch to keep the schedule order.
                    reload();
                }
                Err(e) => action_failed(&app_state.0, "Erro ao criar tarefa", e, create_error),
            }
            create_loading.set(false);
        });
    };

    let on_toggle = move |id: String, current: TaskStatus| {
        busy_id.set(Some(id.clone()));
        let client = app_state.0.client();
        spawn_local(async move {
            match set_task_status(&client, &id, current.toggled()).await {
                Ok(status) => {
                    tasks.update(|s| {
                        s.patch(&id, |t| t.status = status);
                    });
                }
                Err(e) => app_state.0.report("Erro ao atualizar tarefa", &e),
            }
            busy_id.set(None);
        });
    };

    let on_delete = move |id: String| {
        busy_id.set(Some(id.clone()));
        let client = app_state.0.client();
        spawn_local(async move {
            match delete_task(&client, &id).await {
                Ok(()) => {
                    tasks.update(|s| {
                        s.remove(&id);
                    });
                }
                Err(e) => app_state.0.report("Erro ao excluir tarefa", &e),
            }
            busy_id.set(None);
        });
    };

    view! {
        <div class="space-y-4">
            <div class="flex items-center justify-between gap-2">
                <h1 class="text-lg font-semibold">"Tarefas"</h1>
                <Button size=ButtonSize::Sm on:click=move |_| create_open.set(true)>
                    <Plus />
                    "Nova tarefa"
                </Button>
            </div>

            {move || {
                let state = tasks.get();
                if state.loading && !state.loaded {
                    return view! { <LoadingBlock /> }.into_any();
                }
                if state.is_empty_state() {
                    return view! { <EmptyState message="Nenhuma tarefa agendada." /> }.into_any();
                }
                view! {
                    <Card class="py-2">
                        <CardContent class="divide-y divide-border px-4">
                            {state
                                .items
                                .into_iter()
                                .map(|task| {
                                    let id = task.id.clone();
                                    let status = task.status;
                                    let done = status.is_done();
                                    let is_busy = {
                                        let id = id.clone();
                                        move || busy_id.with(|b| b.as_deref() == Some(id.as_str()))
                                    };
                                    let toggle_id = id.clone();
                                    let title_class = if done { "text-sm line-through text-muted-foreground" } else { "text-sm" };
                                    let status_class = if done { "bg-green-100 text-green-800" } else { "bg-muted text-foreground" };
                                    view! {
                                        <div class="flex items-start gap-3 py-3">
                                            <input
                                                type="checkbox"
                                                class="mt-1 size-4"
                                                prop:checked=done
                                                disabled=is_busy.clone()
                                                on:change=move |_| on_toggle(toggle_id.clone(), status)
                                            />
                                            <div class="min-w-0 flex-1 space-y-1">
                                                <div class=title_class>
                                                    {task.title.clone()}
                                                </div>
                                                {task.description.clone().map(|d| view! {
                                                    <div class="text-xs text-muted-foreground">{d}</div>
                                                })}
                                                <div class="flex items-center gap-2 text-xs text-muted-foreground">
                                                    {time.format_date_time(task.scheduled_at)}
                                                    <Badge class=status_class>
                                                        {status.as_str()}
                                                    </Badge>
                                                </div>
                                            </div>
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
                                    }
                                })
                                .collect_view()}
                        </CardContent>
                    </Card>
                }
                .into_any()
            }}

            <Modal open=create_open title="Nova tarefa">
                <form class="space-y-2" on:submit=on_create>
                    <Field label="Título" html_for="task_title">
                        <Input id="task_title" bind_value=title class="h-8 text-sm border-border bg-background" />
                    </Field>
                    <Field label="Descrição (opcional)" html_for="task_description">
                        <Textarea id="task_description" bind_value=description rows=2 class="text-sm" />
                    </Field>
                    <Field label="Data e hora" html_for="task_scheduled_at">
                        <Input
                            id="task_scheduled_at"
                            r#type="datetime-local"
                            bind_value=scheduled_at
                            class="h-8 text-sm border-border bg-background"
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
