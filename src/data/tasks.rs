use super::{create, fetch, patch, remove, ActionError, Store, Table};
use crate::api::{ApiResult, Query};
use crate::forms::TaskForm;
use crate::models::{NewTask, Task, TaskStatus};
use crate::util::TimePolicy;
use serde_json::json;

/// Tasks in due order.
pub(crate) async fn list_tasks(store: &impl Store, user_id: &str) -> ApiResult<Vec<Task>> {
    let q = Query::new()
        .select("*")
        .eq("user_id", user_id)
        .order("scheduled_at", false);
    fetch(store, Table::Tasks, &q).await
}

pub(crate) async fn add_task(store: &impl Store, new: &NewTask) -> ApiResult<Task> {
    create(store, Table::Tasks, new).await
}

/// Persist `status` and return what the store now holds.
///
/// Falls back to `status` when the store answers without a representation.
pub(crate) async fn set_task_status(
    store: &impl Store,
    id: &str,
    status: TaskStatus,
) -> ApiResult<TaskStatus> {
    let updated: Option<Task> =
        patch(store, Table::Tasks, id, json!({ "status": status })).await?;
    let stored = updated.map(|t| t.status).unwrap_or(status);
    tracing::info!(%id, status = stored.as_str(), "task status updated");
    Ok(stored)
}

pub(crate) async fn delete_task(store: &impl Store, id: &str) -> ApiResult<()> {
    remove(store, Table::Tasks, id).await?;
    tracing::info!(%id, "task deleted");
    Ok(())
}

pub(crate) async fn submit(
    store: &impl Store,
    user_id: &str,
    form: &TaskForm,
    time: &TimePolicy,
) -> Result<Task, ActionError> {
    let new = form.validate(user_id, time).inspect_err(|e| {
        tracing::warn!("task rejected: {e}");
    })?;
    let task = add_task(store, &new).await?;
    tracing::info!(id = %task.id, "task created");
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;
    use futures::executor::block_on;

    fn form(title: &str, when: &str) -> TaskForm {
        TaskForm {
            title: title.into(),
            description: String::new(),
            scheduled_at: when.into(),
        }
    }

    #[test]
    fn test_missing_schedule_issues_no_write() {
        let store = MemoryStore::new();
        let res = block_on(submit(&store, "u-1", &form("Mercado", ""), &TimePolicy::utc()));
        assert!(matches!(res, Err(ActionError::Invalid(_))));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_tasks_listed_in_due_order() {
        let store = MemoryStore::new();
        let t = TimePolicy::utc();
        block_on(submit(&store, "u-1", &form("Depois", "2024-05-02T10:00"), &t)).unwrap();
        block_on(submit(&store, "u-1", &form("Antes", "2024-05-01T10:00"), &t)).unwrap();

        let titles: Vec<String> = block_on(list_tasks(&store, "u-1"))
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["Antes", "Depois"]);
    }

    #[test]
    fn test_toggle_twice_restores_status_string() {
        let store = MemoryStore::new();
        let task =
            block_on(submit(&store, "u-1", &form("Ligar", "2024-05-01T10:00"), &TimePolicy::utc()))
                .unwrap();
        assert_eq!(task.status.as_str(), "pendente");

        let first = block_on(set_task_status(&store, &task.id, task.status.toggled())).unwrap();
        assert_eq!(first.as_str(), "concluído");
        assert_eq!(store.rows(Table::Tasks)[0]["status"], "concluído");

        let second = block_on(set_task_status(&store, &task.id, first.toggled())).unwrap();
        assert_eq!(second.as_str(), "pendente");
        assert_eq!(store.rows(Table::Tasks)[0]["status"], "pendente");
    }

    #[test]
    fn test_delete_task() {
        let store = MemoryStore::new();
        let task =
            block_on(submit(&store, "u-1", &form("Ligar", "2024-05-01T10:00"), &TimePolicy::utc()))
                .unwrap();
        block_on(delete_task(&store, &task.id)).unwrap();
        assert!(block_on(list_tasks(&store, "u-1")).unwrap().is_empty());
    }
}
