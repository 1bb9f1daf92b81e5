use crate::api::auth::Session;
use crate::api::realtime::{self, RealtimeConfig};
use crate::api::{ApiClient, ApiError, ApiResult};
use crate::config::EnvConfig;
use crate::forms::Credentials;
use crate::session::{bootstrap, recovery, Bootstrap, Recovery, SessionHub, SessionState};
use crate::storage::{clear_session, load_session, save_session};
use crate::toast::{ToastQueue, ToastVariant, TOAST_LIFETIME};
use crate::util::{now_secs, TimePolicy};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::{set_timeout, set_timeout_with_handle, TimeoutHandle};

/// Seconds before `expires_at` at which a stored session is refreshed instead of reused.
const EXPIRY_LEEWAY_SECS: i64 = 60;
/// A live session is refreshed this many seconds before it expires.
const REFRESH_LEAD_SECS: i64 = 120;

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub config: StoredValue<EnvConfig>,
    pub time: StoredValue<TimePolicy>,
    /// Carries the access token of the current session, if any.
    pub api_client: RwSignal<ApiClient>,
    pub hub: StoredValue<SessionHub>,
    /// Reactive mirror of the hub.
    pub session: RwSignal<SessionState>,
    pub toasts: RwSignal<ToastQueue>,
    /// Set while a refresh-token exchange is in flight.
    refreshing: StoredValue<bool>,
    refresh_timer: StoredValue<Option<TimeoutHandle>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(EnvConfig::new())
    }

    pub fn with_config(config: EnvConfig) -> Self {
        let api_client = RwSignal::new(ApiClient::new(&config));
        let session = RwSignal::new(SessionState::Loading);

        let hub = SessionHub::new();
        hub.subscribe(move |state| {
            let token = state.session().map(|s| s.access_token.clone());
            if let Some(t) = &token {
                realtime::set_access_token(t);
            }
            api_client.update(|c| c.set_token(token));
            session.set(state.clone());
        });

        Self {
            time: StoredValue::new(config.time_policy()),
            config: StoredValue::new(config),
            api_client,
            hub: StoredValue::new(hub),
            session,
            toasts: RwSignal::new(ToastQueue::default()),
            refreshing: StoredValue::new(false),
            refresh_timer: StoredValue::new(None),
        }
    }

    pub fn client(&self) -> ApiClient {
        self.api_client.get_untracked()
    }

    pub fn time_policy(&self) -> TimePolicy {
        self.time.get_value()
    }

    pub fn user_id_untracked(&self) -> Option<String> {
        self.session
            .with_untracked(|s| s.user_id().map(str::to_string))
    }

    pub fn user_email(&self) -> Option<String> {
        self.session.with(|s| s.session().and_then(|s| s.user.email.clone()))
    }

    pub fn realtime_config(&self) -> RealtimeConfig {
        let client = self.client();
        RealtimeConfig {
            base_url: client.base_url.clone(),
            anon_key: client.anon_key.clone(),
            access_token: client.token.clone(),
        }
    }

    /// Validate the stored session once per page load.
    ///
    /// A session close to expiry, or rejected with 401, gets one refresh attempt.
    /// Any other failure signs the user out locally.
    pub fn init_session(self) {
        if !self.hub.with_value(|h| h.begin_init()) {
            return;
        }

        match bootstrap(load_session(), now_secs(), EXPIRY_LEEWAY_SECS) {
            Bootstrap::SignedOut => self.forget(),
            Bootstrap::Refresh(refresh_token) => self.spawn_refresh(refresh_token, |_| {}),
            Bootstrap::Validate(stored) => {
                let client = self.anon_client().with_token(&stored.access_token);
                spawn_local(async move {
                    match client.get_user().await {
                        Ok(user) => {
                            let mut session = stored;
                            session.user = user;
                            self.establish(session);
                        }
                        Err(ApiError::Unauthorized) => {
                            self.spawn_refresh(stored.refresh_token, |_| {});
                        }
                        Err(e) => {
                            tracing::warn!("stored session rejected: {e}");
                            self.forget();
                        }
                    }
                });
            }
        }
    }

    fn anon_client(&self) -> ApiClient {
        let mut client = self.client();
        client.set_token(None);
        client
    }

    /// Exchange `refresh_token` in the background, then call `done` with the outcome.
    /// A failed exchange signs the user out.
    fn spawn_refresh(self, refresh_token: String, done: impl FnOnce(bool) + 'static) {
        // Set before spawning so a second 401 in the same tick sees it.
        self.refreshing.set_value(true);
        spawn_local(async move {
            let ok = match self.anon_client().refresh_session(&refresh_token).await {
                Ok(session) => {
                    tracing::info!("session refreshed");
                    self.establish(session);
                    true
                }
                Err(e) => {
                    tracing::warn!("session refresh failed: {e}");
                    self.forget();
                    false
                }
            };
            self.refreshing.set_value(false);
            done(ok);
        });
    }

    fn schedule_refresh(&self, session: &Session) {
        self.cancel_refresh();
        let Some(delay) = session.refresh_delay(now_secs(), REFRESH_LEAD_SECS) else {
            return;
        };

        let this = *self;
        let timer = set_timeout_with_handle(
            move || {
                this.refresh_timer.set_value(None);
                let state = this.hub.with_value(|h| h.state());
                if let Recovery::Refresh(token) = recovery(&state, this.refreshing.get_value()) {
                    this.spawn_refresh(token, |_| {});
                }
            },
            delay,
        );
        match timer {
            Ok(handle) => self.refresh_timer.set_value(Some(handle)),
            Err(e) => tracing::warn!("could not schedule session refresh: {e:?}"),
        }
    }

    fn cancel_refresh(&self) {
        if let Some(handle) = self.refresh_timer.try_update_value(Option::take).flatten() {
            handle.clear();
        }
    }

    /// Persist `session`, publish it and arm its refresh timer.
    pub fn establish(&self, session: Session) {
        let session = session.stamped(now_secs());
        save_session(&session);
        self.schedule_refresh(&session);
        let user_id = session.user.id.clone();
        self.hub.with_value(|h| h.set_session(session));
        tracing::info!(%user_id, "signed in");
    }

    /// Drop the local session without calling the backend.
    pub fn forget(&self) {
        self.cancel_refresh();
        clear_session();
        self.hub.with_value(|h| h.clear());
    }

    pub async fn sign_in(self, credentials: &Credentials) -> ApiResult<()> {
        let session = self
            .client()
            .sign_in_with_password(&credentials.email, &credentials.password)
            .await?;
        self.establish(session);
        Ok(())
    }

    /// Sign out locally at once and revoke the token in the background.
    pub fn sign_out(self) {
        let client = self.client();
        self.forget();
        if client.is_authenticated() {
            spawn_local(async move {
                if let Err(e) = client.sign_out().await {
                    tracing::warn!("token revocation failed: {e}");
                }
            });
        }
        tracing::info!("signed out");
    }

    pub fn toast(&self, title: impl Into<String>, description: Option<String>, variant: ToastVariant) {
        let toasts = self.toasts;
        let mut id = 0;
        toasts.update(|q| id = q.push(title, description, variant));
        set_timeout(
            move || {
                toasts.try_update(|q| q.dismiss(id));
            },
            TOAST_LIFETIME,
        );
    }

    pub fn notify(&self, title: impl Into<String>, description: impl Into<String>) {
        self.toast(title, Some(description.into()), ToastVariant::Default);
    }

    /// Surface a failed backend call.
    ///
    /// A 401 first tries one token refresh; the session ends only if that fails.
    pub fn report(&self, title: &str, err: &ApiError) {
        tracing::error!("{title}: {err}");
        if !err.is_unauthorized() {
            self.toast(title, Some(err.to_string()), ToastVariant::Destructive);
            return;
        }

        let state = self.hub.with_value(|h| h.state());
        match recovery(&state, self.refreshing.get_value()) {
            Recovery::InFlight => {}
            Recovery::Refresh(token) => {
                let this = *self;
                let title = title.to_string();
                self.spawn_refresh(token, move |ok| {
                    if ok {
                        this.toast(
                            title,
                            Some("Sessão renovada. Tente novamente.".to_string()),
                            ToastVariant::Default,
                        );
                    } else {
                        this.session_expired();
                    }
                });
            }
            Recovery::SignOut => {
                self.forget();
                self.session_expired();
            }
        }
    }

    fn session_expired(&self) {
        self.toast(
            "Sessão expirada",
            Some("Faça login novamente para continuar.".to_string()),
            ToastVariant::Destructive,
        );
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);
