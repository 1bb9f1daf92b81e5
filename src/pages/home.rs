use super::layout::MainNav;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardTitle};
use crate::session::SessionState;
use crate::state::AppContext;
use leptos::prelude::*;

const FEATURES: &[(&str, &str)] = &[
    ("Diário de sono", "Registre quando dormiu, quando acordou e como se sentiu."),
    ("Hábitos", "Acompanhe sequências diárias, semanais ou mensais."),
    ("Tarefas", "Agende o que precisa ser feito e marque ao concluir."),
    ("Compras", "Listas compartilhadas entre abas, atualizadas em tempo real."),
];

#[component]
pub fn HomePage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let authenticated = Memo::new(move |_| app_state.0.session.with(SessionState::is_authenticated));

    view! {
        <div class="min-h-screen bg-background text-foreground">
            <MainNav />
            <main class="mx-auto w-full max-w-5xl px-4 py-12">
                <section class="mb-10 space-y-3">
                    <h1 class="text-2xl font-semibold">"Durma melhor, viva melhor."</h1>
                    <p class="max-w-prose text-sm text-muted-foreground">
                        "O SleepWell reúne seu sono, seus hábitos, suas tarefas e suas compras em um só lugar."
                    </p>
                    <div class="flex gap-2 pt-2">
                        {move || if authenticated.get() {
                            view! {
                                <Button size=ButtonSize::Sm href="/profile/dashboard".to_string()>"Abrir painel"</Button>
                            }.into_any()
                        } else {
                            view! {
                                <Button size=ButtonSize::Sm href="/signup".to_string()>"Começar"</Button>
                                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm href="/login".to_string()>
                                    "Entrar"
                                </Button>
                            }.into_any()
                        }}
                    </div>
                </section>

                <section class="grid gap-4 sm:grid-cols-2">
                    {FEATURES
                        .iter()
                        .map(|(title, text)| view! {
                            <Card>
                                <CardHeader>
                                    <CardTitle class="text-sm">{*title}</CardTitle>
                                    <CardDescription class="text-xs">{*text}</CardDescription>
                                </CardHeader>
                            </Card>
                        })
                        .collect_view()}
                </section>
            </main>
        </div>
    }
}

#[component]
pub fn AboutPage() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-background text-foreground">
            <MainNav />
            <main class="mx-auto w-full max-w-3xl px-4 py-12">
                <Card>
                    <CardHeader>
                        <CardTitle>"Sobre o SleepWell"</CardTitle>
                    </CardHeader>
                    <CardContent class="space-y-3 text-sm text-muted-foreground">
                        <p>
                            "Um diário pessoal de bem-estar. Cada registro fica na sua conta e só você tem acesso a ele."
                        </p>
                        <p>
                            "A qualidade do sono é uma nota de 0 a 100 que você mesmo atribui. O painel mostra a média dos seus últimos sete registros."
                        </p>
                    </CardContent>
                </Card>
            </main>
        </div>
    }
}
