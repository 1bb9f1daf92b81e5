use super::{action_failed, load_list, EmptyState, FormAlert};
use crate::api::realtime::{subscribe, ChangeFeed, Subscription};
use crate::api::Filter;
use crate::components::ui::{
    Badge, Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader,
    CardTitle, DialogFooter, Field, Input, LoadingBlock, Modal, Spinner,
};
use crate::data::shopping::{
    delete_shopping_item, delete_shopping_list, list_shopping_lists, set_item_completed,
    submit_item, submit_list, ShoppingError,
};
use crate::data::Table;
use crate::forms::{ItemForm, ListForm};
use crate::models::{ShoppingItem, ShoppingListWithItems};
use crate::state::{AppContext, AppState};
use crate::toast::ToastVariant;
use crate::vm::ListState;
use icons::{Plus, Trash2};
use leptos::prelude::*;
use leptos::task::spawn_local;

type Lists = RwSignal<ListState<ShoppingListWithItems>>;

fn reload(app: AppState, lists: Lists) {
    load_list(app, lists, "Erro ao carregar listas", |client, uid| async move {
        list_shopping_lists(&client, &uid).await
    });
}

fn patch_items(lists: Lists, list_id: &str, f: impl FnOnce(&mut Vec<ShoppingItem>)) {
    lists.update(|s| {
        s.patch(list_id, |l| f(&mut l.items));
    });
}

/// One list with its items and an inline add-item form.
#[component]
fn ShoppingListCard(
    list_id: String,
    lists: Lists,
    on_delete: Callback<(String, String)>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let list_id = StoredValue::new(list_id);
    let entry = Memo::new(move |_| list_id.with_value(|id| lists.with(|s| s.get(id).cloned())));

    let item_name: RwSignal<String> = RwSignal::new(String::new());
    let item_quantity: RwSignal<String> = RwSignal::new(String::new());
    let add_error: RwSignal<Option<String>> = RwSignal::new(None);
    let adding: RwSignal<bool> = RwSignal::new(false);

    let on_add = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if adding.get_untracked() {
            return;
        }
        let id = list_id.get_value();
        let form = ItemForm {
            name: item_name.get_untracked(),
            quantity: item_quantity.get_untracked(),
        };

        adding.set(true);
        add_error.set(None);
        let client = app_state.0.client();

        spawn_local(async move {
            match submit_item(&client, &id, &form).await {
                Ok(item) => {
                    patch_items(lists, &id, |items| {
                        if !items.iter().any(|i| i.id == item.id) {
                            items.push(item);
                        }
                    });
                    item_name.set(String::new());
                    item_quantity.set(String::new());
                }
                Err(e) => action_failed(&app_state.0, "Erro ao adicionar item", e, add_error),
            }
            adding.set(false);
        });
    };

    let on_toggle = move |item_id: String, completed: bool| {
        let id = list_id.get_value();
        let client = app_state.0.client();
        spawn_local(async move {
            match set_item_completed(&client, &item_id, completed).await {
                Ok(now) => patch_items(lists, &id, |items| {
                    if let Some(i) = items.iter_mut().find(|i| i.id == item_id) {
                        i.completed = now;
                    }
                }),
                Err(e) => app_state.0.report("Erro ao atualizar item", &e),
            }
        });
    };

    let on_remove_item = move |item_id: String| {
        let id = list_id.get_value();
        let client = app_state.0.client();
        spawn_local(async move {
            match delete_shopping_item(&client, &item_id).await {
                Ok(()) => patch_items(lists, &id, |items| items.retain(|i| i.id != item_id)),
                Err(e) => app_state.0.report("Erro ao remover item", &e),
            }
        });
    };

    view! {
        {move || entry.get().map(|entry| {
            let title = entry.list.name.clone();
            let done = entry.completed_count();
            let name = entry.list.name;
            let total = entry.items.len();
            let items = entry.items;
            view! {
                <Card class="gap-3 py-4">
                    <CardHeader class="px-4">
                        <div class="flex w-full items-center justify-between gap-2">
                            <CardTitle class="text-sm">{title}</CardTitle>
                            <div class="flex items-center gap-1">
                                <Badge class="bg-muted text-foreground">{format!("{done}/{total}")}</Badge>
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Icon
                                    class="h-7 w-7 text-destructive"
                                    attr:title="Excluir lista"
                                    on:click=move |_| on_delete.run((list_id.get_value(), name.clone()))
                                >
                                    <Trash2 />
                                </Button>
                            </div>
                        </div>
                    </CardHeader>
                    <CardContent class="space-y-3 px-4">
                        {if items.is_empty() {
                            view! { <CardDescription class="text-xs">"Lista vazia."</CardDescription> }.into_any()
                        } else {
                            view! {
                                <ul class="space-y-1">
                                    {items.into_iter().map(|item| {
                                        let toggle_id = item.id.clone();
                                        let remove_id = item.id.clone();
                                        let completed = item.completed;
                                        let label_class = if completed { "flex-1 text-sm line-through text-muted-foreground" } else { "flex-1 text-sm" };
                                        view! {
                                            <li class="flex items-center gap-2">
                                                <input
                                                    type="checkbox"
                                                    class="size-4"
                                                    prop:checked=completed
                                                    on:change=move |_| on_toggle(toggle_id.clone(), !completed)
                                                />
                                                <span class=label_class>{item.name}</span>
                                                <span class="text-xs tabular-nums text-muted-foreground">{format!("x{}", item.quantity)}</span>
                                                <Button
                                                    variant=ButtonVariant::Ghost
                                                    size=ButtonSize::Icon
                                                    class="h-7 w-7"
                                                    attr:title="Remover item"
                                                    on:click=move |_| on_remove_item(remove_id.clone())
                                                >
                                                    <Trash2 class="size-3.5" />
                                                </Button>
                                            </li>
                                        }
                                    }).collect_view()}
                                </ul>
                            }.into_any()
                        }}

                        <form class="flex items-end gap-2" on:submit=on_add>
                            <Input bind_value=item_name placeholder="Item" class="h-8 flex-1 text-sm" />
                            <Input bind_value=item_quantity r#type="number" min="1" placeholder="Qtd" class="h-8 w-16 text-sm" />
                            <Button size=ButtonSize::Sm attr:disabled=move || adding.get() attr:title="Adicionar item">
                                <Show when=move || adding.get() fallback=|| view! { <Plus /> }>
                                    <Spinner />
                                </Show>
                            </Button>
                        </form>
                        <FormAlert error=add_error />
                    </CardContent>
                </Card>
            }
        })}
    }
}

#[component]
pub fn ShoppingPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let lists: Lists = RwSignal::new(ListState::default());

    let create_open: RwSignal<bool> = RwSignal::new(false);
    let list_name: RwSignal<String> = RwSignal::new(String::new());
    let create_error: RwSignal<Option<String>> = RwSignal::new(None);
    let create_loading: RwSignal<bool> = RwSignal::new(false);

    let delete_open: RwSignal<bool> = RwSignal::new(false);
    let delete_target: RwSignal<Option<(String, String)>> = RwSignal::new(None);
    let delete_error: RwSignal<Option<String>> = RwSignal::new(None);
    let delete_loading: RwSignal<bool> = RwSignal::new(false);

    let lists_feed: StoredValue<Option<Subscription>> = StoredValue::new(None);
    let items_feed: StoredValue<Option<Subscription>> = StoredValue::new(None);

    let user_id = Memo::new(move |_| app_state.0.session.with(|s| s.user_id().map(str::to_string)));

    // Load, then follow the user's lists.
    Effect::new(move |_| {
        lists_feed.set_value(None);
        let Some(uid) = user_id.get() else {
            return;
        };
        reload(app_state.0, lists);

        let feed = ChangeFeed::filtered(
            Table::ShoppingLists,
            Filter::Eq {
                column: "user_id".to_string(),
                value: uid,
            },
        );
        match subscribe(&app_state.0.realtime_config(), "shopping-lists", vec![feed], move |_| {
            reload(app_state.0, lists)
        }) {
            Ok(sub) => lists_feed.set_value(Some(sub)),
            Err(e) => tracing::warn!("shopping lists feed unavailable: {e}"),
        }
    });

    // Items are followed per loaded list; the channel is rebuilt when that set changes.
    let list_ids = Memo::new(move |_| {
        let mut ids: Vec<String> = lists.with(|s| s.items.iter().map(|l| l.list.id.clone()).collect());
        ids.sort();
        ids
    });
    Effect::new(move |_| {
        items_feed.set_value(None);
        let ids = list_ids.get();
        if ids.is_empty() {
            return;
        }

        let feed = ChangeFeed::filtered(
            Table::ShoppingItems,
            Filter::In {
                column: "list_id".to_string(),
                values: ids,
            },
        );
        match subscribe(&app_state.0.realtime_config(), "shopping-items", vec![feed], move |_| {
            reload(app_state.0, lists)
        }) {
            Ok(sub) => items_feed.set_value(Some(sub)),
            Err(e) => tracing::warn!("shopping items feed unavailable: {e}"),
        }
    });

    on_cleanup(move || {
        items_feed.set_value(None);
        lists_feed.set_value(None);
    });

    let on_create = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if create_loading.get_untracked() {
            return;
        }
        let Some(uid) = app_state.0.user_id_untracked() else {
            return;
        };
        let form = ListForm {
            name: list_name.get_untracked(),
        };

        create_loading.set(true);
        create_error.set(None);
        let client = app_state.0.client();

        spawn_local(async move {
            match submit_list(&client, &uid, &form).await {
                Ok(list) => {
                    lists.update(|s| s.prepend(ShoppingListWithItems { list, items: Vec::new() }));
                    list_name.set(String::new());
                    create_open.set(false);
                }
                Err(e) => action_failed(&app_state.0, "Erro ao criar lista", e, create_error),
            }
            create_loading.set(false);
        });
    };

    let request_delete = Callback::new(move |(id, name): (String, String)| {
        delete_target.set(Some((id, name)));
        delete_error.set(None);
        delete_open.set(true);
    });

    let on_confirm_delete = move |_| {
        let Some((id, name)) = delete_target.get_untracked() else {
            return;
        };
        delete_loading.set(true);
        delete_error.set(None);
        let client = app_state.0.client();

        spawn_local(async move {
            match delete_shopping_list(&client, &id).await {
                Ok(()) => {
                    lists.update(|s| {
                        s.remove(&id);
                    });
                    delete_open.set(false);
                    app_state.0.notify("Lista excluída", name);
                }
                Err(e) => {
                    if e.api_error().is_unauthorized() {
                        app_state.0.report("Erro ao excluir lista", e.api_error());
                    } else {
                        app_state.0.toast(
                            "Erro ao excluir lista",
                            Some(e.to_string()),
                            ToastVariant::Destructive,
                        );
                    }
                    if matches!(e, ShoppingError::ListNotDeleted(_)) {
                        reload(app_state.0, lists);
                    }
                    delete_error.set(Some(e.to_string()));
                }
            }
            delete_loading.set(false);
        });
    };

    view! {
        <div class="space-y-4">
            <div class="flex items-center justify-between gap-2">
                <h1 class="text-lg font-semibold">"Listas de compras"</h1>
                <Button size=ButtonSize::Sm on:click=move |_| create_open.set(true)>
                    <Plus />
                    "Nova lista"
                </Button>
            </div>

            {move || {
                let (loading, loaded, empty) = lists.with(|s| (s.loading, s.loaded, s.is_empty_state()));
                if loading && !loaded {
                    return view! { <LoadingBlock /> }.into_any();
                }
                if empty {
                    return view! { <EmptyState message="Nenhuma lista criada." /> }.into_any();
                }
                ().into_any()
            }}

            <div class="grid gap-3 sm:grid-cols-2">
                <For
                    each=move || lists.with(|s| s.items.iter().map(|l| l.list.id.clone()).collect::<Vec<_>>())
                    key=|id| id.clone()
                    let:id
                >
                    <ShoppingListCard list_id=id lists=lists on_delete=request_delete />
                </For>
            </div>

            <Modal open=create_open title="Nova lista">
                <form class="space-y-2" on:submit=on_create>
                    <Field label="Nome da lista" html_for="list_name">
                        <Input id="list_name" bind_value=list_name class="h-8 text-sm border-border bg-background" />
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

            <Modal
                open=delete_open
                title="Excluir lista"
                description="A lista e todos os seus itens serão removidos."
            >
                <div class="space-y-2">
                    <div class="text-sm">
                        {move || delete_target.get().map(|(_, name)| name).unwrap_or_default()}
                    </div>

                    <FormAlert error=delete_error />

                    <DialogFooter>
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=move || delete_loading.get()
                            on:click=move |_| delete_open.set(false)
                        >
                            "Cancelar"
                        </Button>
                        <Button
                            variant=ButtonVariant::Destructive
                            size=ButtonSize::Sm
                            attr:disabled=move || delete_loading.get()
                            on:click=on_confirm_delete
                        >
                            <Show when=move || delete_loading.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            "Excluir"
                        </Button>
                    </DialogFooter>
                </div>
            </Modal>
        </div>
    }
}
