//! In-memory `Store` used by the data-flow tests.

use super::{Store, Table};
use crate::api::query::value_as_text;
use crate::api::{ApiError, ApiResult, Query};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    Select,
    Insert,
    Update,
    Delete,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    tables: RefCell<HashMap<Table, Vec<Value>>>,
    next_id: Cell<u64>,
    writes: Cell<usize>,
    failures: RefCell<HashSet<(Op, Table)>>,
    calls: RefCell<Vec<(Op, Table)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, table: Table, rows: Vec<Value>) {
        self.tables.borrow_mut().entry(table).or_default().extend(rows);
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.tables
            .borrow()
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    /// Every later `op` on `table` answers with a 500.
    pub fn fail_on(&self, op: Op, table: Table) {
        self.failures.borrow_mut().insert((op, table));
    }

    /// Insert, update and delete calls issued so far, failed ones included.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn calls(&self) -> Vec<(Op, Table)> {
        self.calls.borrow().clone()
    }

    fn record(&self, op: Op, table: Table) -> ApiResult<()> {
        self.calls.borrow_mut().push((op, table));
        if op != Op::Select {
            self.writes.set(self.writes.get() + 1);
        }
        if self.failures.borrow().contains(&(op, table)) {
            return Err(ApiError::Http {
                status: 500,
                message: "injected failure".to_string(),
                context: format!("{op:?} on {table} failed"),
            });
        }
        Ok(())
    }

    fn assign_defaults(&self, table: Table, row: &mut Map<String, Value>) {
        let n = self.next_id.get() + 1;
        self.next_id.set(n);

        row.entry("id")
            .or_insert_with(|| Value::String(format!("{table}-{n}")));

        let base = DateTime::<Utc>::from_timestamp(1_704_067_200, 0).unwrap_or_default();
        let created = base + Duration::seconds(n as i64);
        row.entry("created_at").or_insert_with(|| {
            Value::String(created.to_rfc3339_opts(SecondsFormat::Secs, true))
        });
    }
}

fn matches_all(query: &Query, row: &Value) -> bool {
    query.filters().iter().all(|f| f.matches(row))
}

impl Store for MemoryStore {
    async fn select(&self, table: Table, query: &Query) -> ApiResult<Vec<Value>> {
        self.record(Op::Select, table)?;

        let mut rows: Vec<Value> = self
            .rows(table)
            .into_iter()
            .filter(|r| matches_all(query, r))
            .collect();

        if let Some((column, descending)) = query.ordering() {
            rows.sort_by_key(|r| r.get(column).map(value_as_text).unwrap_or_default());
            if descending {
                rows.reverse();
            }
        }
        if let Some(n) = query.row_limit() {
            rows.truncate(n);
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Value) -> ApiResult<Vec<Value>> {
        self.record(Op::Insert, table)?;

        let Value::Object(mut map) = row else {
            return Err(ApiError::Parse("row must be an object".to_string()));
        };
        self.assign_defaults(table, &mut map);
        let stored = Value::Object(map);
        self.tables
            .borrow_mut()
            .entry(table)
            .or_default()
            .push(stored.clone());
        Ok(vec![stored])
    }

    async fn update(&self, table: Table, filter: &Query, patch: Value) -> ApiResult<Vec<Value>> {
        self.record(Op::Update, table)?;

        let Value::Object(changes) = patch else {
            return Err(ApiError::Parse("patch must be an object".to_string()));
        };
        let mut tables = self.tables.borrow_mut();
        let mut updated = Vec::new();
        for row in tables.entry(table).or_default().iter_mut() {
            if !matches_all(filter, row) {
                continue;
            }
            if let Value::Object(map) = row {
                for (k, v) in &changes {
                    map.insert(k.clone(), v.clone());
                }
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: Table, filter: &Query) -> ApiResult<()> {
        self.record(Op::Delete, table)?;

        self.tables
            .borrow_mut()
            .entry(table)
            .or_default()
            .retain(|r| !matches_all(filter, r));
        Ok(())
    }
}
