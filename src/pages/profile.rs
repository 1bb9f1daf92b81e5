use super::{action_failed, FormAlert};
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardTitle,
    Field, Input, Spinner,
};
use crate::data::profile::{fetch_user_name, submit_name};
use crate::forms::ProfileForm;
use crate::state::AppContext;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

#[component]
pub fn ProfilePage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    // Last saved name; `None` until loaded.
    let saved_name: RwSignal<Option<String>> = RwSignal::new(None);
    let name: RwSignal<String> = RwSignal::new(String::new());
    let editing: RwSignal<bool> = RwSignal::new(false);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let saving: RwSignal<bool> = RwSignal::new(false);

    let email = Memo::new(move |_| app_state.0.user_email());

    let user_id = Memo::new(move |_| app_state.0.session.with(|s| s.user_id().map(str::to_string)));
    Effect::new(move |_| {
        let Some(uid) = user_id.get() else {
            return;
        };
        let client = app_state.0.client();
        spawn_local(async move {
            match fetch_user_name(&client, &uid).await {
                Ok(n) => {
                    let n = n.unwrap_or_default();
                    name.set(n.clone());
                    saved_name.set(Some(n));
                }
                Err(e) => app_state.0.report("Erro ao carregar perfil", &e),
            }
        });
    });

    let on_save = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let Some(uid) = app_state.0.user_id_untracked() else {
            return;
        };
        let form = ProfileForm {
            name: name.get_untracked(),
        };
        let email = email.get_untracked();

        saving.set(true);
        error.set(None);
        let client = app_state.0.client();

        spawn_local(async move {
            match submit_name(&client, &uid, email.as_deref(), &form).await {
                Ok(n) => {
                    name.set(n.clone());
                    saved_name.set(Some(n));
                    editing.set(false);
                    app_state.0.notify("Perfil atualizado", "Seu nome foi salvo.");
                }
                Err(e) => action_failed(&app_state.0, "Erro ao salvar perfil", e, error),
            }
            saving.set(false);
        });
    };

    let on_cancel = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        name.set(saved_name.get_untracked().unwrap_or_default());
        error.set(None);
        editing.set(false);
    };

    let on_logout = move |_| {
        app_state.0.sign_out();
        navigate.with_value(|nav| nav("/login", Default::default()));
    };

    view! {
        <div class="mx-auto max-w-lg space-y-4">
            <h1 class="text-lg font-semibold">"Meu Perfil"</h1>

            <Card>
                <CardHeader>
                    <CardTitle class="text-sm">"Conta"</CardTitle>
                    <CardDescription class="text-xs">
                        {move || email.get().unwrap_or_else(|| "E-mail não informado".to_string())}
                    </CardDescription>
                </CardHeader>
                <CardContent>
                    <Show
                        when=move || editing.get()
                        fallback=move || view! {
                            <div class="flex items-center justify-between gap-2">
                                <div class="space-y-1">
                                    <div class="text-xs text-muted-foreground">"Nome"</div>
                                    <div class="text-sm">
                                        {move || match saved_name.get() {
                                            None => "...".to_string(),
                                            Some(n) if n.is_empty() => "Sem nome".to_string(),
                                            Some(n) => n,
                                        }}
                                    </div>
                                </div>
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    attr:disabled=move || saved_name.get().is_none()
                                    on:click=move |_| editing.set(true)
                                >
                                    "Editar"
                                </Button>
                            </div>
                        }
                    >
                        <form class="flex flex-col gap-3" on:submit=on_save>
                            <Field label="Nome" html_for="profile_name">
                                <Input id="profile_name" bind_value=name class="h-8 text-sm" />
                            </Field>
                            <FormAlert error=error />
                            <div class="flex items-center justify-end gap-2">
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    attr:disabled=move || saving.get()
                                    on:click=on_cancel
                                >
                                    "Cancelar"
                                </Button>
                                <Button size=ButtonSize::Sm attr:disabled=move || saving.get()>
                                    <Show when=move || saving.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    "Salvar"
                                </Button>
                            </div>
                        </form>
                    </Show>
                </CardContent>
            </Card>

            <Card>
                <CardContent>
                    <Button variant=ButtonVariant::Outline size=ButtonSize::Sm class="w-full" on:click=on_logout>
                        "Sair da conta"
                    </Button>
                </CardContent>
            </Card>
        </div>
    }
}
