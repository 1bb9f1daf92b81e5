use super::{create, fetch, ActionError, Store, Table};
use crate::api::auth::{Session, SignUpResponse};
use crate::api::{ApiClient, ApiResult, Query};
use crate::forms::{Credentials, ProfileForm, SignupRequest};
use crate::models::{Profile, UserRow};
use serde_json::json;

/// Account operations of the auth service used during registration.
pub(crate) trait Accounts {
    async fn sign_up(&self, email: &str, password: &str) -> ApiResult<SignUpResponse>;
    async fn sign_in_with_password(&self, email: &str, password: &str) -> ApiResult<Session>;
}

impl Accounts for ApiClient {
    async fn sign_up(&self, email: &str, password: &str) -> ApiResult<SignUpResponse> {
        ApiClient::sign_up(self, email, password).await
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ApiResult<Session> {
        ApiClient::sign_in_with_password(self, email, password).await
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Registration {
    SignedIn(Session),
    /// The account exists but cannot sign in until the e-mail is confirmed.
    ConfirmationRequired,
}

/// Create the account, sign in, then write the `profiles` and `users` rows.
///
/// `store_for` yields a store authorised as the new session, since the row policies
/// only accept writes from the owner.
#[tracing::instrument(skip_all, fields(email = %request.credentials.email))]
pub(crate) async fn register<A, S>(
    accounts: &A,
    store_for: impl FnOnce(&Session) -> S,
    request: &SignupRequest,
) -> ApiResult<Registration>
where
    A: Accounts,
    S: Store,
{
    let Credentials { email, password } = &request.credentials;

    let response = accounts.sign_up(email, password).await?;
    let user_id = response.user().id.clone();

    let session = match response.into_session() {
        Some(s) => s,
        None => match accounts.sign_in_with_password(email, password).await {
            Ok(s) => s,
            Err(e) => {
                tracing::info!("account {user_id} created, sign-in pending confirmation: {e}");
                return Ok(Registration::ConfirmationRequired);
            }
        },
    };

    let store = store_for(&session);
    let _: Profile = create(
        &store,
        Table::Profiles,
        &Profile {
            id: user_id.clone(),
            name: Some(request.name.clone()),
        },
    )
    .await?;
    let _: UserRow = create(
        &store,
        Table::Users,
        &UserRow {
            id: user_id.clone(),
            email: Some(email.clone()),
            name: Some(request.name.clone()),
        },
    )
    .await?;

    tracing::info!(%user_id, "account registered");
    Ok(Registration::SignedIn(session))
}

/// Display name from `users`, falling back to `profiles`.
pub(crate) async fn fetch_user_name(store: &impl Store, user_id: &str) -> ApiResult<Option<String>> {
    let users: Vec<UserRow> = fetch(
        store,
        Table::Users,
        &Query::new().select("*").eq("id", user_id).limit(1),
    )
    .await?;
    if let Some(name) = users.into_iter().find_map(|u| u.name) {
        return Ok(Some(name));
    }

    let profiles: Vec<Profile> = fetch(
        store,
        Table::Profiles,
        &Query::new().select("*").eq("id", user_id).limit(1),
    )
    .await?;
    Ok(profiles.into_iter().find_map(|p| p.name))
}

/// Write `name` to both tables, creating the rows a confirmation-pending signup never wrote.
pub(crate) async fn update_name(
    store: &impl Store,
    user_id: &str,
    email: Option<&str>,
    name: &str,
) -> ApiResult<()> {
    let by_id = Query::new().eq("id", user_id);

    let profiles = store
        .update(Table::Profiles, &by_id, json!({ "name": name }))
        .await?;
    if profiles.is_empty() {
        let _: Profile = create(
            store,
            Table::Profiles,
            &Profile {
                id: user_id.to_string(),
                name: Some(name.to_string()),
            },
        )
        .await?;
    }

    let users = store
        .update(Table::Users, &by_id, json!({ "name": name }))
        .await?;
    if users.is_empty() {
        let _: UserRow = create(
            store,
            Table::Users,
            &UserRow {
                id: user_id.to_string(),
                email: email.map(str::to_string),
                name: Some(name.to_string()),
            },
        )
        .await?;
    }

    tracing::info!(%user_id, "profile name updated");
    Ok(())
}

pub(crate) async fn submit_name(
    store: &impl Store,
    user_id: &str,
    email: Option<&str>,
    form: &ProfileForm,
) -> Result<String, ActionError> {
    let name = form.validate()?;
    update_name(store, user_id, email, &name).await?;
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::AuthUser;
    use crate::api::ApiError;
    use crate::data::memory::MemoryStore;
    use futures::executor::block_on;
    use std::cell::Cell;

    struct FakeAccounts {
        session_on_signup: bool,
        confirmed: bool,
        sign_ins: Cell<usize>,
    }

    impl FakeAccounts {
        fn new(session_on_signup: bool, confirmed: bool) -> Self {
            Self {
                session_on_signup,
                confirmed,
                sign_ins: Cell::new(0),
            }
        }
    }

    fn session(email: &str) -> Session {
        Session {
            access_token: "jwt".into(),
            refresh_token: "r".into(),
            token_type: "bearer".into(),
            expires_in: 3600,
            expires_at: None,
            user: AuthUser {
                id: "u-9".into(),
                email: Some(email.into()),
            },
        }
    }

    impl Accounts for FakeAccounts {
        async fn sign_up(&self, email: &str, _password: &str) -> ApiResult<SignUpResponse> {
            if self.session_on_signup {
                Ok(SignUpResponse::Session(session(email)))
            } else {
                Ok(SignUpResponse::User(session(email).user))
            }
        }

        async fn sign_in_with_password(&self, email: &str, _password: &str) -> ApiResult<Session> {
            self.sign_ins.set(self.sign_ins.get() + 1);
            if self.confirmed {
                Ok(session(email))
            } else {
                Err(ApiError::http(400, r#"{"msg":"Email not confirmed"}"#, "Sign in failed"))
            }
        }
    }

    fn request() -> SignupRequest {
        SignupRequest {
            name: "Ana".into(),
            credentials: Credentials {
                email: "ana@example.com".into(),
                password: "segredo".into(),
            },
        }
    }

    #[test]
    fn test_register_writes_both_rows_after_sign_in() {
        let store = MemoryStore::new();
        let accounts = FakeAccounts::new(false, true);
        let out = block_on(register(&accounts, |_| &store, &request())).unwrap();

        assert!(matches!(out, Registration::SignedIn(_)));
        assert_eq!(accounts.sign_ins.get(), 1);
        assert_eq!(store.rows(Table::Profiles)[0]["name"], "Ana");
        assert_eq!(store.rows(Table::Users)[0]["email"], "ana@example.com");
        assert_eq!(store.rows(Table::Users)[0]["id"], "u-9");
    }

    #[test]
    fn test_register_uses_signup_session_directly() {
        let store = MemoryStore::new();
        let accounts = FakeAccounts::new(true, true);
        block_on(register(&accounts, |_| &store, &request())).unwrap();
        assert_eq!(accounts.sign_ins.get(), 0);
        assert_eq!(store.rows(Table::Profiles).len(), 1);
    }

    #[test]
    fn test_register_pending_confirmation_writes_nothing() {
        let store = MemoryStore::new();
        let accounts = FakeAccounts::new(false, false);
        let out = block_on(register(&accounts, |_| &store, &request())).unwrap();
        assert_eq!(out, Registration::ConfirmationRequired);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_name_read_from_users_then_profiles() {
        let store = MemoryStore::new();
        assert_eq!(block_on(fetch_user_name(&store, "u-1")).unwrap(), None);

        store.seed(Table::Profiles, vec![json!({"id": "u-1", "name": "Bia"})]);
        assert_eq!(block_on(fetch_user_name(&store, "u-1")).unwrap().as_deref(), Some("Bia"));

        store.seed(Table::Users, vec![json!({"id": "u-1", "email": "b@x.io", "name": "Beatriz"})]);
        assert_eq!(
            block_on(fetch_user_name(&store, "u-1")).unwrap().as_deref(),
            Some("Beatriz")
        );
    }

    #[test]
    fn test_update_name_writes_both_tables() {
        let store = MemoryStore::new();
        store.seed(Table::Profiles, vec![json!({"id": "u-1", "name": "Bia"})]);
        store.seed(Table::Users, vec![json!({"id": "u-1", "email": "b@x.io", "name": "Bia"})]);

        let name = block_on(submit_name(
            &store,
            "u-1",
            Some("b@x.io"),
            &ProfileForm { name: " Beatriz ".into() },
        ))
        .unwrap();
        assert_eq!(name, "Beatriz");
        assert_eq!(store.rows(Table::Profiles)[0]["name"], "Beatriz");
        assert_eq!(store.rows(Table::Users)[0]["name"], "Beatriz");
    }

    #[test]
    fn test_update_name_creates_missing_rows() {
        let store = MemoryStore::new();
        block_on(update_name(&store, "u-1", Some("b@x.io"), "Bia")).unwrap();
        assert_eq!(store.rows(Table::Profiles).len(), 1);
        assert_eq!(store.rows(Table::Users)[0]["email"], "b@x.io");
    }

    #[test]
    fn test_blank_name_issues_no_write() {
        let store = MemoryStore::new();
        let res = block_on(submit_name(&store, "u-1", None, &ProfileForm::default()));
        assert!(matches!(res, Err(ActionError::Invalid(_))));
        assert_eq!(store.write_count(), 0);
    }
}
