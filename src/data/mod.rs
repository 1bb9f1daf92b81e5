//! Per-entity data access over a small table store abstraction.
//!
//! Pages talk to `ApiClient`; tests talk to `memory::MemoryStore`. Both implement `Store`,
//! so every flow in the submodules runs unchanged against either.

pub(crate) mod habits;
#[cfg(test)]
pub(crate) mod memory;
pub(crate) mod profile;
pub(crate) mod shopping;
pub(crate) mod sleep;
pub(crate) mod tasks;

use crate::api::{ApiError, ApiResult, Query};
use crate::forms::FormError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum Table {
    Profiles,
    Users,
    SleepLogs,
    Habits,
    Tasks,
    ShoppingLists,
    ShoppingItems,
}

/// Row-level access to the relational backend. Rows travel as JSON objects.
pub(crate) trait Store {
    async fn select(&self, table: Table, query: &Query) -> ApiResult<Vec<Value>>;
    async fn insert(&self, table: Table, row: Value) -> ApiResult<Vec<Value>>;
    /// `filter` must carry at least one predicate.
    async fn update(&self, table: Table, filter: &Query, patch: Value) -> ApiResult<Vec<Value>>;
    /// `filter` must carry at least one predicate.
    async fn delete(&self, table: Table, filter: &Query) -> ApiResult<()>;
}

impl<T: Store> Store for &T {
    async fn select(&self, table: Table, query: &Query) -> ApiResult<Vec<Value>> {
        (**self).select(table, query).await
    }

    async fn insert(&self, table: Table, row: Value) -> ApiResult<Vec<Value>> {
        (**self).insert(table, row).await
    }

    async fn update(&self, table: Table, filter: &Query, patch: Value) -> ApiResult<Vec<Value>> {
        (**self).update(table, filter, patch).await
    }

    async fn delete(&self, table: Table, filter: &Query) -> ApiResult<()> {
        (**self).delete(table, filter).await
    }
}

/// Error of a user action that validates a form before writing.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub(crate) enum ActionError {
    #[error(transparent)]
    Invalid(#[from] FormError),

    #[error(transparent)]
    Backend(#[from] ApiError),
}

pub(crate) async fn fetch<T: DeserializeOwned>(
    store: &impl Store,
    table: Table,
    query: &Query,
) -> ApiResult<Vec<T>> {
    let rows = store.select(table, query).await?;
    rows.into_iter()
        .map(|r| serde_json::from_value(r).map_err(ApiError::parse))
        .collect()
}

/// Insert one row and decode the representation the store sends back.
pub(crate) async fn create<T: DeserializeOwned>(
    store: &impl Store,
    table: Table,
    row: &impl Serialize,
) -> ApiResult<T> {
    let row = serde_json::to_value(row).map_err(ApiError::parse)?;
    let mut rows = store.insert(table, row).await?;
    if rows.is_empty() {
        return Err(ApiError::Parse(format!("insert into {table} returned no row")));
    }
    serde_json::from_value(rows.swap_remove(0)).map_err(ApiError::parse)
}

/// Update the row with `id`; `None` when the store reports nothing changed.
pub(crate) async fn patch<T: DeserializeOwned>(
    store: &impl Store,
    table: Table,
    id: &str,
    changes: Value,
) -> ApiResult<Option<T>> {
    let rows = store
        .update(table, &Query::new().eq("id", id), changes)
        .await?;
    rows.into_iter()
        .next()
        .map(|r| serde_json::from_value(r).map_err(ApiError::parse))
        .transpose()
}

pub(crate) async fn remove(store: &impl Store, table: Table, id: &str) -> ApiResult<()> {
    store.delete(table, &Query::new().eq("id", id)).await
}

/// Rows that carry an opaque store-assigned id.
pub(crate) trait Keyed {
    fn key(&self) -> &str;
}

/// Ids come back as uuid strings or bigint numbers depending on the table definition.
pub(crate) fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::memory::{MemoryStore, Op};
    use super::*;
    use futures::executor::block_on;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, Debug)]
    struct Row {
        #[serde(deserialize_with = "opaque_id")]
        id: String,
        name: String,
    }

    #[test]
    fn test_table_names() {
        assert_eq!(Table::SleepLogs.to_string(), "sleep_logs");
        assert_eq!(Table::ShoppingItems.as_ref(), "shopping_items");
        assert_eq!(Table::Profiles.to_string(), "profiles");
    }

    #[test]
    fn test_opaque_id_accepts_numbers_and_strings() {
        let a: Row = serde_json::from_value(json!({"id": 42, "name": "a"})).unwrap();
        let b: Row = serde_json::from_value(json!({"id": "9f1c", "name": "b"})).unwrap();
        assert_eq!(a.id, "42");
        assert_eq!(b.id, "9f1c");
        assert!(serde_json::from_value::<Row>(json!({"id": null, "name": "c"})).is_err());
    }

    #[test]
    fn test_create_then_fetch_then_remove() {
        let store = MemoryStore::new();
        block_on(async {
            let row: Row = create(&store, Table::Habits, &json!({"name": "Ler"}))
                .await
                .unwrap();
            assert_eq!(row.name, "Ler");

            let rows: Vec<Row> = fetch(&store, Table::Habits, &Query::new()).await.unwrap();
            assert_eq!(rows.len(), 1);

            remove(&store, Table::Habits, &row.id).await.unwrap();
            let rows: Vec<Row> = fetch(&store, Table::Habits, &Query::new()).await.unwrap();
            assert!(rows.is_empty());
        });
    }

    #[test]
    fn test_patch_returns_updated_row() {
        let store = MemoryStore::new();
        store.seed(Table::Habits, vec![json!({"id": "h1", "name": "Ler"})]);
        let updated: Option<Row> = block_on(patch(
            &store,
            Table::Habits,
            "h1",
            json!({"name": "Ler 20 páginas"}),
        ))
        .unwrap();
        assert_eq!(updated.unwrap().name, "Ler 20 páginas");

        let missing: Option<Row> =
            block_on(patch(&store, Table::Habits, "nope", json!({"name": "x"}))).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_fetch_propagates_store_failure() {
        let store = MemoryStore::new();
        store.fail_on(Op::Select, Table::Tasks);
        let res: ApiResult<Vec<Row>> = block_on(fetch(&store, Table::Tasks, &Query::new()));
        assert!(matches!(res, Err(ApiError::Http { status: 500, .. })));
    }
}
