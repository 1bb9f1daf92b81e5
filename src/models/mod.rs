use crate::data::{opaque_id, Keyed};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct SleepLog {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub user_id: String,
    pub bedtime: DateTime<Utc>,
    pub wake_time: DateTime<Utc>,
    pub quality: i32,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SleepLog {
    /// Fractional hours between bedtime and wake time.
    pub fn duration_hours(&self) -> f64 {
        crate::util::duration_hours(self.bedtime, self.wake_time)
    }

    pub fn mood(&self) -> Option<Mood> {
        self.mood.as_deref().and_then(Mood::from_stored)
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub(crate) struct NewSleepLog {
    pub user_id: String,
    pub bedtime: DateTime<Utc>,
    pub wake_time: DateTime<Utc>,
    pub quality: i32,
    pub mood: Option<String>,
    pub notes: Option<String>,
}

/// How the user felt on waking.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Mood {
    Energized,
    Refreshed,
    Neutral,
    Tired,
    Exhausted,
}

impl Mood {
    /// Accepts the current values plus the Portuguese words older rows were saved with.
    pub fn from_stored(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_lowercase();
        if let Ok(m) = raw.parse::<Mood>() {
            return Some(m);
        }
        match raw.as_str() {
            "ótimo" | "otimo" | "excelente" | "energizado" => Some(Mood::Energized),
            "bom" | "revigorado" => Some(Mood::Refreshed),
            "regular" | "neutro" => Some(Mood::Neutral),
            "ruim" | "cansado" => Some(Mood::Tired),
            "péssimo" | "pessimo" | "exausto" => Some(Mood::Exhausted),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Energized => "Energizado",
            Mood::Refreshed => "Revigorado",
            Mood::Neutral => "Neutro",
            Mood::Tired => "Cansado",
            Mood::Exhausted => "Exausto",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Mood::Energized => "😁",
            Mood::Refreshed => "🙂",
            Mood::Neutral => "😐",
            Mood::Tired => "😔",
            Mood::Exhausted => "😫",
        }
    }
}

/// Icon for a stored mood value; unknown or missing moods get a generic smile.
pub(crate) fn mood_icon(raw: Option<&str>) -> &'static str {
    raw.and_then(Mood::from_stored)
        .map(Mood::icon)
        .unwrap_or("😊")
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Habit {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub streak: i32,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn frequency_label(&self) -> String {
        match self.frequency.as_deref() {
            Some(raw) => raw
                .parse::<Frequency>()
                .map(|f| f.label().to_string())
                .unwrap_or_else(|_| raw.to_string()),
            None => String::new(),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub(crate) struct NewHabit {
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub streak: i32,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Frequency {
    #[default]
    Diario,
    Semanal,
    Mensal,
}

impl Frequency {
    pub fn label(self) -> &'static str {
        match self {
            Frequency::Diario => "Diário",
            Frequency::Semanal => "Semanal",
            Frequency::Mensal => "Mensal",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum TaskStatus {
    #[default]
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "concluído")]
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pendente",
            TaskStatus::Done => "concluído",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Pending,
        }
    }

    pub fn is_done(self) -> bool {
        self == TaskStatus::Done
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Task {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub(crate) struct NewTask {
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub status: TaskStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct ShoppingList {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub(crate) struct NewShoppingList {
    pub user_id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct ShoppingItem {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(deserialize_with = "opaque_id")]
    pub list_id: String,
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub(crate) struct NewShoppingItem {
    pub list_id: String,
    pub name: String,
    pub quantity: i32,
    pub completed: bool,
}

/// A list with its items, as rendered on the shopping page.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ShoppingListWithItems {
    pub list: ShoppingList,
    pub items: Vec<ShoppingItem>,
}

impl ShoppingListWithItems {
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|i| i.completed).count()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Profile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Row of the `users` table mirrored at signup.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct UserRow {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Keyed for SleepLog {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Habit {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Task {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for ShoppingItem {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for ShoppingListWithItems {
    fn key(&self) -> &str {
        &self.list.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_status_wire_strings() {
        assert_eq!(serde_json::to_value(TaskStatus::Pending).unwrap(), json!("pendente"));
        assert_eq!(serde_json::to_value(TaskStatus::Done).unwrap(), json!("concluído"));
        let parsed: TaskStatus = serde_json::from_value(json!("concluído")).unwrap();
        assert!(parsed.is_done());
    }

    #[test]
    fn test_task_status_toggle_twice_restores() {
        let s = TaskStatus::Pending;
        assert_eq!(s.toggled().as_str(), "concluído");
        assert_eq!(s.toggled().toggled().as_str(), "pendente");
    }

    #[test]
    fn test_sleep_log_contract_deserialize() {
        let log: SleepLog = serde_json::from_value(json!({
            "id": 17,
            "user_id": "u-1",
            "bedtime": "2024-01-02T02:00:00+00:00",
            "wake_time": "2024-01-02T10:30:00+00:00",
            "quality": 82,
            "mood": "refreshed",
            "notes": null,
            "created_at": "2024-01-02T10:35:12.123456+00:00"
        }))
        .expect("sleep log should parse");
        assert_eq!(log.id, "17");
        assert_eq!(log.duration_hours(), 8.5);
        assert_eq!(log.mood(), Some(Mood::Refreshed));
        assert!(log.notes.is_none());
    }

    #[test]
    fn test_mood_accepts_legacy_values() {
        assert_eq!(Mood::from_stored("Ótimo"), Some(Mood::Energized));
        assert_eq!(Mood::from_stored("pessimo"), Some(Mood::Exhausted));
        assert_eq!(Mood::from_stored("neutral"), Some(Mood::Neutral));
        assert_eq!(Mood::from_stored("???"), None);
        assert_eq!(mood_icon(Some("bom")), "🙂");
        assert_eq!(mood_icon(None), "😊");
    }

    #[test]
    fn test_habit_frequency_label() {
        let mut h: Habit = serde_json::from_value(json!({
            "id": "h1",
            "user_id": "u-1",
            "name": "Meditar",
            "frequency": "diario",
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(h.streak, 0);
        assert_eq!(h.frequency_label(), "Diário");

        h.frequency = Some("quinzenal".into());
        assert_eq!(h.frequency_label(), "quinzenal");
    }

    #[test]
    fn test_shopping_item_defaults() {
        let item: ShoppingItem = serde_json::from_value(json!({
            "id": 3,
            "list_id": 1,
            "name": "Leite",
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(item.list_id, "1");
        assert_eq!(item.quantity, 1);
        assert!(!item.completed);
    }
}
