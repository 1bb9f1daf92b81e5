//! Page-local list state shared by every list-and-mutate page.

pub(crate) mod stats;

use crate::api::{ApiError, ApiResult};
use crate::data::Keyed;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ListState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    /// At least one load finished successfully.
    pub loaded: bool,
    request_id: u64,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            loaded: false,
            request_id: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum LoadOutcome {
    Applied,
    /// A newer load started after this one; its result was dropped.
    Stale,
    /// Prior items were kept.
    Failed(ApiError),
}

impl<T: Keyed> ListState<T> {
    /// Start a load and return its ticket.
    pub fn begin_load(&mut self) -> u64 {
        self.request_id += 1;
        self.loading = true;
        self.request_id
    }

    pub fn finish_load(&mut self, ticket: u64, result: ApiResult<Vec<T>>) -> LoadOutcome {
        if ticket != self.request_id {
            return LoadOutcome::Stale;
        }
        self.loading = false;
        match result {
            Ok(items) => {
                self.items = items;
                self.loaded = true;
                LoadOutcome::Applied
            }
            Err(e) => LoadOutcome::Failed(e),
        }
    }

    /// Zero rows after a successful load.
    pub fn is_empty_state(&self) -> bool {
        self.loaded && !self.loading && self.items.is_empty()
    }

    /// Put `item` first, replacing any row with the same key.
    pub fn prepend(&mut self, item: T) {
        self.items.retain(|i| i.key() != item.key());
        self.items.insert(0, item);
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.key() != key);
        self.items.len() != before
    }

    pub fn patch(&mut self, key: &str, f: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().find(|i| i.key() == key) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.iter().find(|i| i.key() == key)
    }
}
