use std::time::Duration;

pub(crate) const TOAST_LIFETIME: Duration = Duration::from_secs(5);
pub(crate) const MAX_VISIBLE: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Toast {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub variant: ToastVariant,
}

/// Visible notifications, oldest first. Pushing past `MAX_VISIBLE` evicts the oldest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ToastQueue {
    items: Vec<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn push(
        &mut self,
        title: impl Into<String>,
        description: Option<String>,
        variant: ToastVariant,
    ) -> u64 {
        self.next_id += 1;
        self.items.push(Toast {
            id: self.next_id,
            title: title.into(),
            description,
            variant,
        });
        if self.items.len() > MAX_VISIBLE {
            let overflow = self.items.len() - MAX_VISIBLE;
            self.items.drain(..overflow);
        }
        self.next_id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        self.items.len() != before
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_dismiss() {
        let mut q = ToastQueue::default();
        let a = q.push("Registro salvo", None, ToastVariant::Default);
        let b = q.push("Erro", Some("offline".into()), ToastVariant::Destructive);
        assert_ne!(a, b);
        assert_eq!(q.items().len(), 2);

        assert!(q.dismiss(a));
        assert!(!q.dismiss(a));
        assert_eq!(q.items()[0].variant, ToastVariant::Destructive);
    }

    #[test]
    fn test_oldest_evicted_past_limit() {
        let mut q = ToastQueue::default();
        for i in 0..5 {
            q.push(format!("t{i}"), None, ToastVariant::Default);
        }
        let titles: Vec<&str> = q.items().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["t2", "t3", "t4"]);
    }
}
