use thiserror::Error;

/// Failure of a single backend call.
///
/// Every variant is scoped to the user action that triggered it; nothing here is retried.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub(crate) enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Network(String),

    #[error("{context} ({status}): {message}")]
    Http {
        status: u16,
        message: String,
        context: String,
    },

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub(crate) fn network(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }

    pub(crate) fn parse(e: impl std::fmt::Display) -> Self {
        Self::Parse(e.to_string())
    }

    pub(crate) fn http(status: u16, body: &str, context: &str) -> Self {
        Self::Http {
            status,
            message: extract_message(body),
            context: context.to_string(),
        }
    }

    pub(crate) fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Pull the human-readable part out of a GoTrue or PostgREST error body.
///
/// PostgREST answers `{"message": ..}`, GoTrue uses `msg` or `error_description`.
/// Anything else is passed through verbatim.
pub(crate) fn extract_message(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(s) = v.get(key).and_then(|m| m.as_str()) {
                if !s.trim().is_empty() {
                    return s.to_string();
                }
            }
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_postgrest_body() {
        let body = r#"{"code":"42501","details":null,"hint":null,"message":"new row violates row-level security policy"}"#;
        assert_eq!(
            extract_message(body),
            "new row violates row-level security policy"
        );
    }

    #[test]
    fn test_extract_message_gotrue_bodies() {
        assert_eq!(
            extract_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(
            extract_message(r#"{"code":422,"msg":"User already registered"}"#),
            "User already registered"
        );
    }

    #[test]
    fn test_extract_message_plain_text_passthrough() {
        assert_eq!(extract_message("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn test_http_error_display_includes_context_and_message() {
        let e = ApiError::http(409, r#"{"message":"duplicate key"}"#, "Insert into tasks failed");
        assert_eq!(e.to_string(), "Insert into tasks failed (409): duplicate key");
        assert!(!e.is_unauthorized());
        assert!(ApiError::Unauthorized.is_unauthorized());
    }
}
