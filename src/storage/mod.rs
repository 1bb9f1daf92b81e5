use crate::api::auth::Session;
use serde::{Deserialize, Serialize};

pub(crate) const SESSION_KEY: &str = "sleepwell_session";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = local_storage()?;
    let json = storage.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn remove_from_storage(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

pub(crate) fn save_session(session: &Session) {
    save_json_to_storage(SESSION_KEY, session);
}

/// Stored session, if any. A corrupt entry is discarded.
pub(crate) fn load_session() -> Option<Session> {
    let raw_present = local_storage()
        .and_then(|s| s.get_item(SESSION_KEY).ok().flatten())
        .is_some();
    let session = load_json_from_storage::<Session>(SESSION_KEY);
    if raw_present && session.is_none() {
        tracing::warn!("discarding unreadable stored session");
        clear_session();
    }
    session
}

pub(crate) fn clear_session() {
    remove_from_storage(SESSION_KEY);
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::api::auth::AuthUser;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn session() -> Session {
        Session {
            access_token: "jwt".into(),
            refresh_token: "r1".into(),
            token_type: "bearer".into(),
            expires_in: 3600,
            expires_at: Some(1_700_003_600),
            user: AuthUser {
                id: "u-1".into(),
                email: Some("ana@example.com".into()),
            },
        }
    }

    #[wasm_bindgen_test]
    fn session_survives_reload() {
        clear_session();
        assert!(load_session().is_none());

        save_session(&session());
        assert_eq!(load_session(), Some(session()));

        clear_session();
        assert!(load_session().is_none());
    }

    #[wasm_bindgen_test]
    fn corrupt_session_is_discarded() {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(SESSION_KEY, "{not json");
        }
        assert!(load_session().is_none());
        let raw = local_storage().and_then(|s| s.get_item(SESSION_KEY).ok().flatten());
        assert!(raw.is_none());
    }
}
