use super::{create, fetch, patch, remove, ActionError, Store, Table};
use crate::api::{ApiError, ApiResult, Query};
use crate::forms::{ItemForm, ListForm};
use crate::models::{
    NewShoppingItem, NewShoppingList, ShoppingItem, ShoppingList, ShoppingListWithItems,
};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub(crate) enum ShoppingError {
    /// Nothing was deleted; the list and its items are intact.
    #[error("Não foi possível remover os itens; a lista foi mantida. {0}")]
    ItemsNotDeleted(ApiError),

    /// Items are gone, the empty list row remains.
    #[error("Os itens foram removidos, mas a lista não pôde ser excluída. {0}")]
    ListNotDeleted(ApiError),
}

impl ShoppingError {
    pub fn api_error(&self) -> &ApiError {
        match self {
            ShoppingError::ItemsNotDeleted(e) | ShoppingError::ListNotDeleted(e) => e,
        }
    }
}

/// Lists newest first, each with its items in insertion order.
pub(crate) async fn list_shopping_lists(
    store: &impl Store,
    user_id: &str,
) -> ApiResult<Vec<ShoppingListWithItems>> {
    let lists: Vec<ShoppingList> = fetch(
        store,
        Table::ShoppingLists,
        &Query::new()
            .select("*")
            .eq("user_id", user_id)
            .order("created_at", true),
    )
    .await?;

    if lists.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<&str> = lists.iter().map(|l| l.id.as_str()).collect();
    let items: Vec<ShoppingItem> = fetch(
        store,
        Table::ShoppingItems,
        &Query::new()
            .select("*")
            .in_list("list_id", ids)
            .order("created_at", false),
    )
    .await?;

    let mut by_list: HashMap<String, Vec<ShoppingItem>> = HashMap::new();
    for item in items {
        by_list.entry(item.list_id.clone()).or_default().push(item);
    }

    Ok(lists
        .into_iter()
        .map(|list| {
            let items = by_list.remove(&list.id).unwrap_or_default();
            ShoppingListWithItems { list, items }
        })
        .collect())
}

pub(crate) async fn add_shopping_list(
    store: &impl Store,
    new: &NewShoppingList,
) -> ApiResult<ShoppingList> {
    create(store, Table::ShoppingLists, new).await
}

pub(crate) async fn add_shopping_item(
    store: &impl Store,
    new: &NewShoppingItem,
) -> ApiResult<ShoppingItem> {
    create(store, Table::ShoppingItems, new).await
}

/// Write an absolute completion value, so repeating the call changes nothing.
pub(crate) async fn set_item_completed(
    store: &impl Store,
    id: &str,
    completed: bool,
) -> ApiResult<bool> {
    let updated: Option<ShoppingItem> = patch(
        store,
        Table::ShoppingItems,
        id,
        json!({ "completed": completed }),
    )
    .await?;
    Ok(updated.map(|i| i.completed).unwrap_or(completed))
}

pub(crate) async fn delete_shopping_item(store: &impl Store, id: &str) -> ApiResult<()> {
    remove(store, Table::ShoppingItems, id).await
}

/// Delete a list and everything in it.
///
/// Items go first; if that fails the list row is left alone.
#[tracing::instrument(skip(store))]
pub(crate) async fn delete_shopping_list(
    store: &impl Store,
    list_id: &str,
) -> Result<(), ShoppingError> {
    store
        .delete(Table::ShoppingItems, &Query::new().eq("list_id", list_id))
        .await
        .map_err(|e| {
            tracing::error!("items of list {list_id} not deleted: {e}");
            ShoppingError::ItemsNotDeleted(e)
        })?;

    remove(store, Table::ShoppingLists, list_id)
        .await
        .map_err(|e| {
            tracing::error!("list {list_id} not deleted after its items: {e}");
            ShoppingError::ListNotDeleted(e)
        })?;

    tracing::info!("shopping list deleted");
    Ok(())
}

pub(crate) async fn submit_list(
    store: &impl Store,
    user_id: &str,
    form: &ListForm,
) -> Result<ShoppingList, ActionError> {
    let new = form.validate(user_id).inspect_err(|e| {
        tracing::warn!("shopping list rejected: {e}");
    })?;
    let list = add_shopping_list(store, &new).await?;
    tracing::info!(id = %list.id, "shopping list created");
    Ok(list)
}

pub(crate) async fn submit_item(
    store: &impl Store,
    list_id: &str,
    form: &ItemForm,
) -> Result<ShoppingItem, ActionError> {
    let new = form.validate(list_id).inspect_err(|e| {
        tracing::warn!("shopping item rejected: {e}");
    })?;
    let item = add_shopping_item(store, &new).await?;
    tracing::info!(id = %item.id, list_id, "shopping item added");
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::{MemoryStore, Op};
    use futures::executor::block_on;

    fn list(store: &MemoryStore, user: &str, name: &str) -> ShoppingList {
        block_on(submit_list(store, user, &ListForm { name: name.into() })).unwrap()
    }

    fn item(store: &MemoryStore, list_id: &str, name: &str) -> ShoppingItem {
        let form = ItemForm {
            name: name.into(),
            quantity: "1".into(),
        };
        block_on(submit_item(store, list_id, &form)).unwrap()
    }

    #[test]
    fn test_no_lists_skips_item_query() {
        let store = MemoryStore::new();
        let lists = block_on(list_shopping_lists(&store, "u-1")).unwrap();
        assert!(lists.is_empty());
        assert_eq!(store.calls(), vec![(Op::Select, Table::ShoppingLists)]);
    }

    #[test]
    fn test_items_grouped_under_their_lists() {
        let store = MemoryStore::new();
        let feira = list(&store, "u-1", "Feira");
        let farmacia = list(&store, "u-1", "Farmácia");
        let _other = list(&store, "u-2", "Outro usuário");
        item(&store, &feira.id, "Banana");
        item(&store, &feira.id, "Alface");
        item(&store, &farmacia.id, "Protetor solar");

        let lists = block_on(list_shopping_lists(&store, "u-1")).unwrap();
        let names: Vec<&str> = lists.iter().map(|l| l.list.name.as_str()).collect();
        assert_eq!(names, ["Farmácia", "Feira"]);

        let feira_items: Vec<&str> = lists[1].items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(feira_items, ["Banana", "Alface"]);
        assert_eq!(lists[0].items.len(), 1);
    }

    #[test]
    fn test_blank_item_issues_no_write() {
        let store = MemoryStore::new();
        let feira = list(&store, "u-1", "Feira");
        let before = store.write_count();
        let res = block_on(submit_item(&store, &feira.id, &ItemForm::default()));
        assert!(matches!(res, Err(ActionError::Invalid(_))));
        assert_eq!(store.write_count(), before);
    }

    #[test]
    fn test_item_completion_is_idempotent() {
        let store = MemoryStore::new();
        let feira = list(&store, "u-1", "Feira");
        let banana = item(&store, &feira.id, "Banana");

        let first = block_on(set_item_completed(&store, &banana.id, !banana.completed)).unwrap();
        let reread = block_on(list_shopping_lists(&store, "u-1")).unwrap()[0].items[0].completed;
        let second = block_on(set_item_completed(&store, &banana.id, reread)).unwrap();

        assert!(first);
        assert_eq!(first, second);
        assert_eq!(store.rows(Table::ShoppingItems)[0]["completed"], true);
    }

    #[test]
    fn test_delete_list_removes_items_then_list() {
        let store = MemoryStore::new();
        let feira = list(&store, "u-1", "Feira");
        let keep = list(&store, "u-1", "Farmácia");
        item(&store, &feira.id, "Banana");
        item(&store, &keep.id, "Curativo");

        block_on(delete_shopping_list(&store, &feira.id)).unwrap();

        let lists = block_on(list_shopping_lists(&store, "u-1")).unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].list.id, keep.id);
        assert_eq!(store.rows(Table::ShoppingItems).len(), 1);
    }

    #[test]
    fn test_failed_item_delete_keeps_list() {
        let store = MemoryStore::new();
        let feira = list(&store, "u-1", "Feira");
        item(&store, &feira.id, "Banana");
        item(&store, &feira.id, "Alface");
        store.fail_on(Op::Delete, Table::ShoppingItems);

        let err = block_on(delete_shopping_list(&store, &feira.id)).unwrap_err();
        assert!(matches!(err, ShoppingError::ItemsNotDeleted(_)));
        assert_eq!(store.rows(Table::ShoppingLists).len(), 1);
        assert_eq!(store.rows(Table::ShoppingItems).len(), 2);
        assert!(!store.calls().contains(&(Op::Delete, Table::ShoppingLists)));
    }

    #[test]
    fn test_failed_parent_delete_is_distinct() {
        let store = MemoryStore::new();
        let feira = list(&store, "u-1", "Feira");
        item(&store, &feira.id, "Banana");
        store.fail_on(Op::Delete, Table::ShoppingLists);

        let err = block_on(delete_shopping_list(&store, &feira.id)).unwrap_err();
        assert!(matches!(err, ShoppingError::ListNotDeleted(_)));
        assert!(err.api_error().to_string().contains("injected failure"));
    }

    #[test]
    fn test_delete_single_item() {
        let store = MemoryStore::new();
        let feira = list(&store, "u-1", "Feira");
        let banana = item(&store, &feira.id, "Banana");
        block_on(delete_shopping_item(&store, &banana.id)).unwrap();
        assert!(block_on(list_shopping_lists(&store, "u-1")).unwrap()[0].items.is_empty());
    }
}
