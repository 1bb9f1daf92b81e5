pub(crate) mod auth;
pub(crate) mod error;
pub(crate) mod query;
pub(crate) mod realtime;

pub(crate) use error::{ApiError, ApiResult};
pub(crate) use query::{Filter, Query};

use crate::config::EnvConfig;
use crate::data::{Store, Table};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Thin client for the hosted backend: GoTrue under `/auth/v1`, PostgREST under `/rest/v1`.
///
/// Holds no connection state; every call builds a fresh request. The access token is
/// mirrored from the session hub and falls back to the anon key when signed out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) anon_key: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &EnvConfig) -> Self {
        Self {
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub(crate) fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    pub(crate) fn rest_url(&self, table: Table, query: &Query) -> String {
        let qs = query.to_query_string();
        if qs.is_empty() {
            format!("{}/rest/v1/{}", self.base_url, table)
        } else {
            format!("{}/rest/v1/{}?{}", self.base_url, table, qs)
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token.as_deref().unwrap_or(&self.anon_key))
    }

    pub(crate) fn with_auth_headers(
        &self,
        req: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder {
        req.header("apikey", &self.anon_key)
            .header("Authorization", self.bearer())
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
        context: &str,
    ) -> ApiResult<T> {
        let res = self
            .with_auth_headers(req)
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = res.status();
        if status.is_success() {
            res.json().await.map_err(ApiError::parse)
        } else if status.as_u16() == 401 {
            Err(ApiError::Unauthorized)
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status.as_u16(), &body, context))
        }
    }

    pub(crate) async fn send_empty(
        &self,
        req: reqwest::RequestBuilder,
        context: &str,
    ) -> ApiResult<()> {
        let res = self
            .with_auth_headers(req)
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = res.status();
        if status.is_success() {
            Ok(())
        } else if status.as_u16() == 401 {
            Err(ApiError::Unauthorized)
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status.as_u16(), &body, context))
        }
    }
}

fn require_filter(table: Table, filter: &Query, op: &str) -> ApiResult<()> {
    if filter.filters().is_empty() {
        return Err(ApiError::Config(format!(
            "refusing {op} on {table} without a row filter"
        )));
    }
    Ok(())
}

impl Store for ApiClient {
    async fn select(&self, table: Table, query: &Query) -> ApiResult<Vec<Value>> {
        let client = reqwest::Client::new();
        let req = client.get(self.rest_url(table, query));
        self.send_json(req, &format!("Select from {table} failed"))
            .await
    }

    async fn insert(&self, table: Table, row: Value) -> ApiResult<Vec<Value>> {
        let client = reqwest::Client::new();
        let req = client
            .post(self.rest_url(table, &Query::new()))
            .header("Prefer", "return=representation")
            .json(&row);
        self.send_json(req, &format!("Insert into {table} failed"))
            .await
    }

    async fn update(&self, table: Table, filter: &Query, patch: Value) -> ApiResult<Vec<Value>> {
        require_filter(table, filter, "update")?;
        let client = reqwest::Client::new();
        let req = client
            .patch(self.rest_url(table, filter))
            .header("Prefer", "return=representation")
            .json(&patch);
        self.send_json(req, &format!("Update of {table} failed"))
            .await
    }

    async fn delete(&self, table: Table, filter: &Query) -> ApiResult<()> {
        require_filter(table, filter, "delete")?;
        let client = reqwest::Client::new();
        let req = client.delete(self.rest_url(table, filter));
        self.send_empty(req, &format!("Delete from {table} failed"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(&EnvConfig::for_project("https://demo.supabase.co/", "anon-key"))
    }

    #[test]
    fn test_api_client_new_trims_trailing_slash() {
        let c = client();
        assert_eq!(c.base_url, "https://demo.supabase.co");
        assert_eq!(c.anon_key, "anon-key");
        assert!(c.token.is_none());
        assert!(!c.is_authenticated());
    }

    #[test]
    fn test_bearer_falls_back_to_anon_key() {
        let c = client();
        assert_eq!(c.bearer(), "Bearer anon-key");

        let c = c.with_token("jwt");
        assert_eq!(c.bearer(), "Bearer jwt");
        assert!(c.is_authenticated());
    }

    #[test]
    fn test_set_token_none_signs_out() {
        let mut c = client().with_token("jwt");
        c.set_token(None);
        assert!(!c.is_authenticated());
    }

    #[test]
    fn test_rest_url_with_and_without_query() {
        let c = client();
        assert_eq!(
            c.rest_url(Table::ShoppingItems, &Query::new()),
            "https://demo.supabase.co/rest/v1/shopping_items"
        );
        assert_eq!(
            c.rest_url(Table::Tasks, &Query::new().eq("id", "t1")),
            "https://demo.supabase.co/rest/v1/tasks?id=eq.t1"
        );
    }

    #[test]
    fn test_auth_url() {
        assert_eq!(
            client().auth_url("/token?grant_type=password"),
            "https://demo.supabase.co/auth/v1/token?grant_type=password"
        );
    }

    #[test]
    fn test_unfiltered_writes_are_refused() {
        let err = require_filter(Table::ShoppingLists, &Query::new(), "delete").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
        assert!(require_filter(Table::ShoppingLists, &Query::new().eq("id", 1), "delete").is_ok());
    }
}
