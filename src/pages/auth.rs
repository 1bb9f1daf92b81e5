use super::FormAlert;
use crate::api::auth::Session;
use crate::api::ApiClient;
use crate::components::ui::{
    Button, ButtonSize, Card, CardContent, CardDescription, CardHeader, CardTitle, Field, Input,
    Spinner,
};
use crate::data::profile::{register, Registration};
use crate::forms::{LoginForm, SignupForm};
use crate::session::SessionState;
use crate::state::AppContext;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use leptos_router::NavigateOptions;

/// Sends a signed-in visitor away from the auth screens.
fn redirect_when_signed_in(to: &'static str) {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());
    Effect::new(move |_| {
        if app_state.0.session.with(SessionState::is_authenticated) {
            navigate.with_value(|nav| {
                nav(
                    to,
                    NavigateOptions {
                        replace: true,
                        ..Default::default()
                    },
                )
            });
        }
    });
}

#[component]
fn AuthCard(
    #[prop(into)] title: String,
    #[prop(into)] description: String,
    children: Children,
) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <a href="/" class="text-sm font-medium text-foreground">"SleepWell"</a>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">{title}</CardTitle>
                        <CardDescription class="text-xs">{description}</CardDescription>
                    </CardHeader>
                    <CardContent>{children()}</CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();
    redirect_when_signed_in("/profile");

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let form = LoginForm {
            email: email.get_untracked(),
            password: password.get_untracked(),
        };
        let credentials = match form.validate() {
            Ok(c) => c,
            Err(e) => {
                error.set(Some(e.to_string()));
                return;
            }
        };

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            if let Err(e) = app_state.0.sign_in(&credentials).await {
                tracing::warn!("sign-in failed: {e}");
                let message = if e.is_unauthorized() {
                    "E-mail ou senha inválidos.".to_string()
                } else {
                    e.to_string()
                };
                error.set(Some(message));
            }
            // Success is picked up by `redirect_when_signed_in`.
            loading.set(false);
        });
    };

    view! {
        <AuthCard title="Entrar" description="Use seu e-mail e senha para continuar.">
            <form class="flex flex-col gap-3" on:submit=on_submit>
                <Field label="E-mail" html_for="email">
                    <Input
                        id="email"
                        r#type="email"
                        placeholder="voce@exemplo.com"
                        bind_value=email
                        required=true
                        class="h-8 text-sm"
                    />
                </Field>

                <Field label="Senha" html_for="password">
                    <Input
                        id="password"
                        r#type="password"
                        placeholder="••••••••"
                        bind_value=password
                        required=true
                        class="h-8 text-sm"
                    />
                </Field>

                <FormAlert error=error />

                <Button class="w-full" size=ButtonSize::Sm attr:disabled=move || loading.get()>
                    <span class="inline-flex items-center gap-2">
                        <Show when=move || loading.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        {move || if loading.get() { "Entrando..." } else { "Entrar" }}
                    </span>
                </Button>

                <div class="pt-1 text-xs text-muted-foreground">
                    "Não tem conta? "
                    <a class="text-primary underline underline-offset-4" href="/signup">"Cadastre-se"</a>
                </div>
            </form>
        </AuthCard>
    }
}

#[component]
pub fn SignupPage() -> impl IntoView {
    let name: RwSignal<String> = RwSignal::new(String::new());
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let confirm_password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);
    let pending_confirmation: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();
    redirect_when_signed_in("/profile/dashboard");

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let form = SignupForm {
            name: name.get_untracked(),
            email: email.get_untracked(),
            password: password.get_untracked(),
            confirm_password: confirm_password.get_untracked(),
        };
        let request = match form.validate() {
            Ok(r) => r,
            Err(e) => {
                error.set(Some(e.to_string()));
                return;
            }
        };

        loading.set(true);
        error.set(None);

        let client = app_state.0.client();
        spawn_local(async move {
            let signed_in = |s: &Session| -> ApiClient {
                client.clone().with_token(&s.access_token)
            };
            match register(&client, signed_in, &request).await {
                Ok(Registration::SignedIn(session)) => {
                    app_state.0.establish(session);
                    app_state.0.notify("Conta criada", "Bem-vindo ao SleepWell!");
                }
                Ok(Registration::ConfirmationRequired) => pending_confirmation.set(true),
                Err(e) => {
                    tracing::error!("signup failed: {e}");
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <AuthCard title="Criar conta" description="Comece a acompanhar seu sono e seus hábitos.">
            <Show
                when=move || !pending_confirmation.get()
                fallback=|| view! {
                    <div class="space-y-3 text-sm">
                        <p>"Enviamos um link de confirmação para o seu e-mail."</p>
                        <p class="text-xs text-muted-foreground">
                            "Depois de confirmar, "
                            <a class="text-primary underline underline-offset-4" href="/login">"entre na sua conta"</a>
                            "."
                        </p>
                    </div>
                }
            >
                <form class="flex flex-col gap-3" on:submit=on_submit>
                    <Field label="Nome" html_for="name">
                        <Input id="name" bind_value=name required=true class="h-8 text-sm" />
                    </Field>
                    <Field label="E-mail" html_for="email">
                        <Input id="email" r#type="email" bind_value=email required=true class="h-8 text-sm" />
                    </Field>
                    <Field label="Senha" html_for="password">
                        <Input id="password" r#type="password" bind_value=password required=true class="h-8 text-sm" />
                    </Field>
                    <Field label="Confirmar senha" html_for="confirm_password">
                        <Input
                            id="confirm_password"
                            r#type="password"
                            bind_value=confirm_password
                            required=true
                            class="h-8 text-sm"
                        />
                    </Field>

                    <FormAlert error=error />

                    <Button class="w-full" size=ButtonSize::Sm attr:disabled=move || loading.get()>
                        <span class="inline-flex items-center gap-2">
                            <Show when=move || loading.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            {move || if loading.get() { "Criando conta..." } else { "Cadastrar" }}
                        </span>
                    </Button>

                    <div class="pt-1 text-xs text-muted-foreground">
                        "Já tem conta? "
                        <a class="text-primary underline underline-offset-4" href="/login">"Entrar"</a>
                    </div>
                </form>
            </Show>
        </AuthCard>
    }
}
