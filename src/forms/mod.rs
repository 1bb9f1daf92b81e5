//! Local validation for every create/edit form.
//!
//! Each form holds the raw field strings bound to its inputs and turns them into the insert
//! payload. A form that fails validation never reaches the store.

use crate::models::{
    Frequency, NewHabit, NewShoppingItem, NewShoppingList, NewSleepLog, NewTask, TaskStatus,
};
use crate::util::TimePolicy;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub(crate) enum FormError {
    #[error("Preencha o campo \"{0}\".")]
    Required(&'static str),

    #[error("Data e hora inválidas em \"{0}\".")]
    InvalidDateTime(&'static str),

    #[error("O horário de acordar deve ser depois do horário de dormir.")]
    WakeBeforeBedtime,

    #[error("A qualidade deve estar entre 0 e 100.")]
    QualityOutOfRange,

    #[error("A quantidade deve ser um número inteiro maior que zero.")]
    InvalidQuantity,

    #[error("Informe um e-mail válido.")]
    InvalidEmail,

    #[error("A senha deve ter pelo menos {0} caracteres.")]
    PasswordTooShort(usize),

    #[error("As senhas não coincidem.")]
    PasswordMismatch,
}

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

fn required(value: &str, field: &'static str) -> Result<String, FormError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(FormError::Required(field));
    }
    Ok(v.to_string())
}

fn optional(value: &str) -> Option<String> {
    let v = value.trim();
    (!v.is_empty()).then(|| v.to_string())
}

fn email(value: &str) -> Result<String, FormError> {
    let v = required(value, "E-mail")?;
    match v.split_once('@') {
        Some((user, host)) if !user.is_empty() && host.contains('.') => Ok(v),
        _ => Err(FormError::InvalidEmail),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SleepForm {
    pub bedtime: String,
    pub wake_time: String,
    pub quality: i32,
    pub mood: String,
    pub notes: String,
}

impl Default for SleepForm {
    fn default() -> Self {
        Self {
            bedtime: String::new(),
            wake_time: String::new(),
            quality: 50,
            mood: String::new(),
            notes: String::new(),
        }
    }
}

impl SleepForm {
    pub fn validate(&self, user_id: &str, time: &TimePolicy) -> Result<NewSleepLog, FormError> {
        let bed_raw = required(&self.bedtime, "Horário que Dormiu")?;
        let wake_raw = required(&self.wake_time, "Horário que Acordou")?;
        let bedtime = time
            .parse_local_input(&bed_raw)
            .ok_or(FormError::InvalidDateTime("Horário que Dormiu"))?;
        let wake_time = time
            .parse_local_input(&wake_raw)
            .ok_or(FormError::InvalidDateTime("Horário que Acordou"))?;

        if wake_time <= bedtime {
            return Err(FormError::WakeBeforeBedtime);
        }
        if !(0..=100).contains(&self.quality) {
            return Err(FormError::QualityOutOfRange);
        }

        Ok(NewSleepLog {
            user_id: user_id.to_string(),
            bedtime,
            wake_time,
            quality: self.quality,
            mood: optional(&self.mood),
            notes: optional(&self.notes),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct HabitForm {
    pub name: String,
    pub description: String,
    pub frequency: String,
}

impl HabitForm {
    pub fn validate(&self, user_id: &str) -> Result<NewHabit, FormError> {
        let name = required(&self.name, "Nome do Hábito")?;
        let frequency = optional(&self.frequency)
            .unwrap_or_else(|| Frequency::default().to_string());

        Ok(NewHabit {
            user_id: user_id.to_string(),
            name,
            description: optional(&self.description),
            frequency,
            streak: 0,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TaskForm {
    pub title: String,
    pub description: String,
    pub scheduled_at: String,
}

impl TaskForm {
    pub fn validate(&self, user_id: &str, time: &TimePolicy) -> Result<NewTask, FormError> {
        let title = required(&self.title, "Título da Tarefa")?;
        let raw = required(&self.scheduled_at, "Data de Entrega")?;
        let scheduled_at = time
            .parse_local_input(&raw)
            .ok_or(FormError::InvalidDateTime("Data de Entrega"))?;

        Ok(NewTask {
            user_id: user_id.to_string(),
            title,
            description: optional(&self.description),
            scheduled_at,
            status: TaskStatus::Pending,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ListForm {
    pub name: String,
}

impl ListForm {
    pub fn validate(&self, user_id: &str) -> Result<NewShoppingList, FormError> {
        Ok(NewShoppingList {
            user_id: user_id.to_string(),
            name: required(&self.name, "Nome da Lista")?,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ItemForm {
    pub name: String,
    pub quantity: String,
}

impl ItemForm {
    /// Empty quantity means one unit.
    pub fn validate(&self, list_id: &str) -> Result<NewShoppingItem, FormError> {
        let name = required(&self.name, "Nome do Item")?;
        let quantity = match optional(&self.quantity) {
            None => 1,
            Some(q) => q
                .parse::<i32>()
                .ok()
                .filter(|q| *q > 0)
                .ok_or(FormError::InvalidQuantity)?,
        };

        Ok(NewShoppingItem {
            list_id: list_id.to_string(),
            name,
            quantity,
            completed: false,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, FormError> {
        let email = email(&self.email)?;
        if self.password.is_empty() {
            return Err(FormError::Required("Senha"));
        }
        Ok(Credentials {
            email,
            password: self.password.clone(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SignupRequest {
    pub name: String,
    pub credentials: Credentials,
}

impl SignupForm {
    pub fn validate(&self) -> Result<SignupRequest, FormError> {
        let name = required(&self.name, "Nome")?;
        let email = email(&self.email)?;
        if self.password.is_empty() {
            return Err(FormError::Required("Senha"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FormError::PasswordTooShort(MIN_PASSWORD_LEN));
        }
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }

        Ok(SignupRequest {
            name,
            credentials: Credentials {
                email,
                password: self.password.clone(),
            },
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ProfileForm {
    pub name: String,
}

impl ProfileForm {
    pub fn validate(&self) -> Result<String, FormError> {
        required(&self.name, "Nome")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sleep_form() -> SleepForm {
        SleepForm {
            bedtime: "2024-01-01T23:00".into(),
            wake_time: "2024-01-02T07:30".into(),
            quality: 80,
            mood: "refreshed".into(),
            notes: "  ".into(),
        }
    }

    #[test]
    fn test_sleep_form_builds_utc_payload() {
        let new = sleep_form().validate("u-1", &TimePolicy::new(-180)).unwrap();
        assert_eq!(new.bedtime.to_rfc3339(), "2024-01-02T02:00:00+00:00");
        assert_eq!(new.wake_time.to_rfc3339(), "2024-01-02T10:30:00+00:00");
        assert_eq!(new.mood.as_deref(), Some("refreshed"));
        assert!(new.notes.is_none());
    }

    #[test]
    fn test_sleep_form_requires_both_times() {
        let mut f = sleep_form();
        f.wake_time.clear();
        assert_eq!(
            f.validate("u-1", &TimePolicy::utc()),
            Err(FormError::Required("Horário que Acordou"))
        );

        let mut f = sleep_form();
        f.bedtime = "ontem".into();
        assert_eq!(
            f.validate("u-1", &TimePolicy::utc()),
            Err(FormError::InvalidDateTime("Horário que Dormiu"))
        );
    }

    #[test]
    fn test_sleep_form_rejects_inverted_times_and_bad_quality() {
        let mut f = sleep_form();
        std::mem::swap(&mut f.bedtime, &mut f.wake_time);
        assert_eq!(
            f.validate("u-1", &TimePolicy::utc()),
            Err(FormError::WakeBeforeBedtime)
        );

        let mut f = sleep_form();
        f.quality = 101;
        assert_eq!(
            f.validate("u-1", &TimePolicy::utc()),
            Err(FormError::QualityOutOfRange)
        );
    }

    #[test]
    fn test_habit_form_defaults_frequency() {
        let new = HabitForm {
            name: " Beber água ".into(),
            ..Default::default()
        }
        .validate("u-1")
        .unwrap();
        assert_eq!(new.name, "Beber água");
        assert_eq!(new.frequency, "diario");
        assert_eq!(new.streak, 0);
        assert!(HabitForm::default().validate("u-1").is_err());
    }

    #[test]
    fn test_task_form_requires_schedule() {
        let f = TaskForm {
            title: "Pagar contas".into(),
            ..Default::default()
        };
        assert_eq!(
            f.validate("u-1", &TimePolicy::utc()),
            Err(FormError::Required("Data de Entrega"))
        );
    }

    #[test]
    fn test_item_form_quantity() {
        let base = ItemForm {
            name: "Leite".into(),
            quantity: String::new(),
        };
        assert_eq!(base.validate("l1").unwrap().quantity, 1);

        let two = ItemForm { quantity: "2".into(), ..base.clone() };
        assert_eq!(two.validate("l1").unwrap().quantity, 2);

        let zero = ItemForm { quantity: "0".into(), ..base.clone() };
        assert_eq!(zero.validate("l1"), Err(FormError::InvalidQuantity));

        let junk = ItemForm { quantity: "dois".into(), ..base };
        assert_eq!(junk.validate("l1"), Err(FormError::InvalidQuantity));
    }

    #[test]
    fn test_signup_form_rules() {
        let ok = SignupForm {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password: "segredo".into(),
            confirm_password: "segredo".into(),
        };
        assert_eq!(ok.validate().unwrap().name, "Ana");

        let short = SignupForm { password: "abc".into(), confirm_password: "abc".into(), ..ok.clone() };
        assert_eq!(short.validate(), Err(FormError::PasswordTooShort(6)));

        let mismatch = SignupForm { confirm_password: "outra".into(), ..ok.clone() };
        assert_eq!(mismatch.validate(), Err(FormError::PasswordMismatch));

        let bad_email = SignupForm { email: "ana".into(), ..ok };
        assert_eq!(bad_email.validate(), Err(FormError::InvalidEmail));
    }

    #[test]
    fn test_error_messages_name_the_field() {
        assert_eq!(
            FormError::Required("Nome da Lista").to_string(),
            "Preencha o campo \"Nome da Lista\"."
        );
        assert!(LoginForm::default().validate().is_err());
        assert!(ProfileForm { name: "  ".into() }.validate().is_err());
    }
}
