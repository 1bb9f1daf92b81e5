use super::{ApiClient, ApiResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Authenticated user as reported by GoTrue.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: String,
    pub expires_in: i64,
    /// Unix seconds. Older GoTrue builds omit it.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl Session {
    /// Fill a missing `expires_at` as `now_secs + expires_in`.
    ///
    /// Call it on a freshly issued session; a stored one would get a later expiry than it has.
    pub fn stamped(mut self, now_secs: i64) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(now_secs + self.expires_in);
        }
        self
    }

    /// Expired (or within `leeway_secs` of it) at `now_secs`.
    ///
    /// Unstamped sessions are never considered expired locally;
    /// the backend answers 401 instead.
    pub fn is_expired(&self, now_secs: i64, leeway_secs: i64) -> bool {
        self.expires_at
            .map(|at| now_secs + leeway_secs >= at)
            .unwrap_or(false)
    }

    /// Time to wait before refreshing so the new token arrives `lead_secs` ahead of expiry.
    /// Zero when that point has passed, `None` for an unstamped session.
    pub fn refresh_delay(&self, now_secs: i64, lead_secs: i64) -> Option<Duration> {
        let at = self.expires_at?;
        let wait = (at - lead_secs - now_secs).max(0);
        Some(Duration::from_secs(wait as u64))
    }
}

/// `/signup` returns a full session when e-mail confirmation is off, and only the
/// user object when confirmation is pending.
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub(crate) enum SignUpResponse {
    Session(Session),
    User(AuthUser),
}

impl SignUpResponse {
    pub fn user(&self) -> &AuthUser {
        match self {
            SignUpResponse::Session(s) => &s.user,
            SignUpResponse::User(u) => u,
        }
    }

    pub fn into_session(self) -> Option<Session> {
        match self {
            SignUpResponse::Session(s) => Some(s),
            SignUpResponse::User(_) => None,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub(crate) struct PasswordCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Clone, Debug)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

impl ApiClient {
    pub async fn sign_up(&self, email: &str, password: &str) -> ApiResult<SignUpResponse> {
        let client = reqwest::Client::new();
        let req = client
            .post(self.auth_url("/signup"))
            .json(&PasswordCredentials { email, password });
        self.send_json(req, "Sign up failed").await
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> ApiResult<Session> {
        let client = reqwest::Client::new();
        let req = client
            .post(self.auth_url("/token?grant_type=password"))
            .json(&PasswordCredentials { email, password });
        self.send_json(req, "Sign in failed").await
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> ApiResult<Session> {
        let client = reqwest::Client::new();
        let req = client
            .post(self.auth_url("/token?grant_type=refresh_token"))
            .json(&RefreshRequest { refresh_token });
        self.send_json(req, "Session refresh failed").await
    }

    /// Current user for the bearer token this client carries.
    pub async fn get_user(&self) -> ApiResult<AuthUser> {
        let client = reqwest::Client::new();
        let req = client.get(self.auth_url("/user"));
        self.send_json(req, "Session check failed").await
    }

    pub async fn sign_out(&self) -> ApiResult<()> {
        let client = reqwest::Client::new();
        let req = client.post(self.auth_url("/logout"));
        self.send_empty(req, "Sign out failed").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN_RESPONSE: &str = r#"{
        "access_token": "jwt",
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1700003600,
        "refresh_token": "r1",
        "user": {"id": "u-1", "email": "ana@example.com", "aud": "authenticated", "role": "authenticated"}
    }"#;

    #[test]
    fn test_token_response_contract_deserialize() {
        let s: Session = serde_json::from_str(TOKEN_RESPONSE).expect("token response should parse");
        assert_eq!(s.access_token, "jwt");
        assert_eq!(s.refresh_token, "r1");
        assert_eq!(s.user.id, "u-1");
        assert_eq!(s.user.email.as_deref(), Some("ana@example.com"));
        assert_eq!(s.expires_at, Some(1_700_003_600));
    }

    #[test]
    fn test_session_expiry_uses_leeway() {
        let s: Session = serde_json::from_str(TOKEN_RESPONSE).unwrap();
        assert!(!s.is_expired(1_700_000_000, 60));
        assert!(s.is_expired(1_700_003_550, 60));
        assert!(s.is_expired(1_700_009_999, 0));

        let mut no_expiry = s.clone();
        no_expiry.expires_at = None;
        assert!(!no_expiry.is_expired(i64::MAX - 100, 0));
    }

    #[test]
    fn test_stamped_derives_expiry_from_expires_in() {
        let mut s: Session = serde_json::from_str(TOKEN_RESPONSE).unwrap();
        s.expires_at = None;
        let s = s.stamped(1_700_000_000);
        assert_eq!(s.expires_at, Some(1_700_003_600));
        assert!(s.is_expired(1_700_003_600, 0));

        // An existing expiry is kept.
        let s = s.stamped(1_800_000_000);
        assert_eq!(s.expires_at, Some(1_700_003_600));
    }

    #[test]
    fn test_refresh_delay_leads_expiry() {
        let s: Session = serde_json::from_str(TOKEN_RESPONSE).unwrap();
        assert_eq!(
            s.refresh_delay(1_700_000_000, 60),
            Some(Duration::from_secs(3540))
        );
        assert_eq!(s.refresh_delay(1_700_003_590, 60), Some(Duration::ZERO));
        assert_eq!(s.refresh_delay(1_700_009_999, 60), Some(Duration::ZERO));

        let mut unstamped = s.clone();
        unstamped.expires_at = None;
        assert_eq!(unstamped.refresh_delay(1_700_000_000, 60), None);
    }

    #[test]
    fn test_signup_response_with_session() {
        let parsed: SignUpResponse = serde_json::from_str(TOKEN_RESPONSE).unwrap();
        assert_eq!(parsed.user().id, "u-1");
        assert!(parsed.into_session().is_some());
    }

    #[test]
    fn test_signup_response_pending_confirmation() {
        let json = r#"{"id": "u-2", "email": "bia@example.com", "confirmation_sent_at": "2024-03-01T10:00:00Z"}"#;
        let parsed: SignUpResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.user().id, "u-2");
        assert!(parsed.into_session().is_none());
    }

    #[test]
    fn test_password_credentials_serialization() {
        let v = serde_json::to_value(PasswordCredentials {
            email: "a@b.c",
            password: "secret",
        })
        .unwrap();
        assert_eq!(v["email"], "a@b.c");
        assert_eq!(v["password"], "secret");
    }
}
