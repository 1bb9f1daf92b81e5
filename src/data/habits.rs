use super::{create, fetch, patch, remove, ActionError, Store, Table};
use crate::api::{ApiError, ApiResult, Query};
use crate::forms::HabitForm;
use crate::models::{Habit, NewHabit};
use serde_json::json;

pub(crate) async fn list_habits(store: &impl Store, user_id: &str) -> ApiResult<Vec<Habit>> {
    let q = Query::new()
        .select("*")
        .eq("user_id", user_id)
        .order("created_at", true);
    fetch(store, Table::Habits, &q).await
}

pub(crate) async fn add_habit(store: &impl Store, new: &NewHabit) -> ApiResult<Habit> {
    create(store, Table::Habits, new).await
}

/// Write `streak + 1` for `habit` and return the stored value.
pub(crate) async fn increment_streak(store: &impl Store, habit: &Habit) -> ApiResult<i32> {
    let next = habit.streak.saturating_add(1);
    let updated: Option<Habit> =
        patch(store, Table::Habits, &habit.id, json!({ "streak": next })).await?;
    match updated {
        Some(h) => {
            tracing::info!(id = %h.id, streak = h.streak, "habit streak incremented");
            Ok(h.streak)
        }
        None => Err(ApiError::Parse(format!("habit {} not found", habit.id))),
    }
}

pub(crate) async fn delete_habit(store: &impl Store, id: &str) -> ApiResult<()> {
    remove(store, Table::Habits, id).await?;
    tracing::info!(%id, "habit deleted");
    Ok(())
}

pub(crate) async fn submit(
    store: &impl Store,
    user_id: &str,
    form: &HabitForm,
) -> Result<Habit, ActionError> {
    let new = form.validate(user_id).inspect_err(|e| {
        tracing::warn!("habit rejected: {e}");
    })?;
    let habit = add_habit(store, &new).await?;
    tracing::info!(id = %habit.id, "habit created");
    Ok(habit)
}
