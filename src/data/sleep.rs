use super::{create, fetch, ActionError, Store, Table};
use crate::api::{ApiResult, Query};
use crate::forms::SleepForm;
use crate::models::{NewSleepLog, SleepLog};
use crate::util::TimePolicy;

/// Dashboard window.
pub(crate) const RECENT_LOGS: usize = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SleepOrder {
    /// Most recently logged first.
    CreatedAt,
    /// Most recent night first.
    Bedtime,
}

impl SleepOrder {
    fn column(self) -> &'static str {
        match self {
            SleepOrder::CreatedAt => "created_at",
            SleepOrder::Bedtime => "bedtime",
        }
    }
}

pub(crate) async fn list_sleep_logs(
    store: &impl Store,
    user_id: &str,
    order: SleepOrder,
    limit: Option<usize>,
) -> ApiResult<Vec<SleepLog>> {
    let mut q = Query::new()
        .select("*")
        .eq("user_id", user_id)
        .order(order.column(), true);
    if let Some(n) = limit {
        q = q.limit(n);
    }
    fetch(store, Table::SleepLogs, &q).await
}

/// Dashboard feed: the last `RECENT_LOGS` entries in the order they were logged.
pub(crate) async fn recent_sleep_logs(store: &impl Store, user_id: &str) -> ApiResult<Vec<SleepLog>> {
    list_sleep_logs(store, user_id, SleepOrder::CreatedAt, Some(RECENT_LOGS)).await
}

/// History feed: every night, latest bedtime first, back-filled entries included.
pub(crate) async fn sleep_history(store: &impl Store, user_id: &str) -> ApiResult<Vec<SleepLog>> {
    list_sleep_logs(store, user_id, SleepOrder::Bedtime, None).await
}

pub(crate) async fn add_sleep_log(store: &impl Store, new: &NewSleepLog) -> ApiResult<SleepLog> {
    create(store, Table::SleepLogs, new).await
}

#[tracing::instrument(skip(store, form, time))]
pub(crate) async fn submit(
    store: &impl Store,
    user_id: &str,
    form: &SleepForm,
    time: &TimePolicy,
) -> Result<SleepLog, ActionError> {
    let new = form.validate(user_id, time).inspect_err(|e| {
        tracing::warn!("sleep log rejected: {e}");
    })?;
    let log = add_sleep_log(store, &new).await?;
    tracing::info!(id = %log.id, hours = log.duration_hours(), "sleep log saved");
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::{MemoryStore, Op};
    use crate::forms::FormError;
    use futures::executor::block_on;
    use serde_json::json;

    fn form() -> SleepForm {
        SleepForm {
            bedtime: "2024-01-01T23:00".into(),
            wake_time: "2024-01-02T07:30".into(),
            quality: 75,
            mood: "neutral".into(),
            notes: "acordei uma vez".into(),
        }
    }

    fn log_row(id: &str, user: &str, bedtime: &str, created_at: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user,
            "bedtime": bedtime,
            "wake_time": "2024-01-10T07:00:00Z",
            "quality": 60,
            "created_at": created_at,
        })
    }

    #[test]
    fn test_empty_field_issues_no_write() {
        let store = MemoryStore::new();
        let mut f = form();
        f.bedtime.clear();

        let res = block_on(submit(&store, "u-1", &f, &TimePolicy::utc()));
        assert_eq!(res, Err(ActionError::Invalid(FormError::Required("Horário que Dormiu"))));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_submit_stores_one_log() {
        let store = MemoryStore::new();
        let log = block_on(submit(&store, "u-1", &form(), &TimePolicy::new(-180))).unwrap();
        assert_eq!(log.duration_hours(), 8.5);
        assert_eq!(log.user_id, "u-1");

        let logs = block_on(list_sleep_logs(&store, "u-1", SleepOrder::CreatedAt, None)).unwrap();
        assert_eq!(logs.iter().filter(|l| l.id == log.id).count(), 1);
    }

    #[test]
    fn test_list_is_scoped_ordered_and_limited() {
        let store = MemoryStore::new();
        store.seed(
            Table::SleepLogs,
            vec![
                log_row("a", "u-1", "2024-01-03T02:00:00Z", "2024-01-09T00:00:00Z"),
                log_row("b", "u-1", "2024-01-05T02:00:00Z", "2024-01-08T00:00:00Z"),
                log_row("c", "u-2", "2024-01-06T02:00:00Z", "2024-01-07T00:00:00Z"),
                log_row("d", "u-1", "2024-01-01T02:00:00Z", "2024-01-06T00:00:00Z"),
            ],
        );

        let by_created =
            block_on(list_sleep_logs(&store, "u-1", SleepOrder::CreatedAt, Some(2))).unwrap();
        let ids: Vec<&str> = by_created.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);

        let by_bedtime =
            block_on(list_sleep_logs(&store, "u-1", SleepOrder::Bedtime, None)).unwrap();
        let ids: Vec<&str> = by_bedtime.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "d"]);
    }

    #[test]
    fn test_dashboard_and_history_feeds_use_their_own_order() {
        let store = MemoryStore::new();
        // "late" is last week's night, entered after everything else.
        let mut rows = vec![log_row("late", "u-1", "2024-01-01T02:00:00Z", "2024-01-20T00:00:00Z")];
        for day in 2..=9 {
            rows.push(log_row(
                &format!("n{day}"),
                "u-1",
                &format!("2024-01-{day:02}T02:00:00Z"),
                &format!("2024-01-{day:02}T08:00:00Z"),
            ));
        }
        store.seed(Table::SleepLogs, rows);

        let recent = block_on(recent_sleep_logs(&store, "u-1")).unwrap();
        let ids: Vec<&str> = recent.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["late", "n9", "n8", "n7", "n6", "n5", "n4"]);

        let history = block_on(sleep_history(&store, "u-1")).unwrap();
        assert_eq!(history.len(), 9);
        assert_eq!(history[0].id, "n9");
        assert_eq!(history[8].id, "late");
    }

    #[test]
    fn test_zero_rows_is_not_an_error() {
        let store = MemoryStore::new();
        let logs = block_on(list_sleep_logs(&store, "u-1", SleepOrder::Bedtime, None)).unwrap();
        assert!(logs.is_empty());
    }

    #[test]
    fn test_backend_failure_is_reported() {
        let store = MemoryStore::new();
        store.fail_on(Op::Insert, Table::SleepLogs);
        let res = block_on(submit(&store, "u-1", &form(), &TimePolicy::utc()));
        assert!(matches!(res, Err(ActionError::Backend(_))));
        assert!(store.rows(Table::SleepLogs).is_empty());
    }
}
