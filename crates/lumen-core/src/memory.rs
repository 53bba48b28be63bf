//! In-memory record store.
//!
//! Holds tables as plain vectors of rows behind a lock. Meant for tests
//! and for wiring the dashboard up without any backend; it behaves like
//! the hosted store for everything lumen relies on (missing tables,
//! generated ids, single-row writes).

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::StoreError;
use crate::query::SelectQuery;
use crate::record::Row;
use crate::store::{RemoteStore, StoreResult};
use crate::types::TableName;

/// A [`RemoteStore`] kept entirely in process memory.
///
/// Cloning is cheap and clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryTables>>,
}

#[derive(Debug, Default)]
struct MemoryTables {
    tables: BTreeMap<TableName, Vec<Row>>,
    failures: VecDeque<StoreError>,
    calls: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryTables> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create an empty table. Existing tables are left alone.
    pub fn create_table(&self, table: &TableName) {
        self.lock().tables.entry(table.clone()).or_default();
    }

    /// Remove a table and all its rows.
    pub fn drop_table(&self, table: &TableName) {
        self.lock().tables.remove(table);
    }

    /// Append rows to a table, creating it if needed.
    pub fn seed(&self, table: &TableName, rows: impl IntoIterator<Item = Row>) {
        self.lock()
            .tables
            .entry(table.clone())
            .or_default()
            .extend(rows);
    }

    /// Snapshot of a table's rows, or `None` if the table does not exist.
    pub fn rows(&self, table: &TableName) -> Option<Vec<Row>> {
        self.lock().tables.get(table).cloned()
    }

    /// Make the next store call fail with `error`.
    ///
    /// Failures queue up; each call consumes one.
    pub fn fail_next(&self, error: StoreError) {
        self.lock().failures.push_back(error);
    }

    /// Number of store calls served so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    fn begin(&self) -> StoreResult<MutexGuard<'_, MemoryTables>> {
        let mut guard = self.lock();
        guard.calls += 1;
        let failure = guard.failures.pop_front();
        match failure {
            Some(error) => Err(error),
            None => Ok(guard),
        }
    }
}

fn table_rows<'a>(
    tables: &'a mut BTreeMap<TableName, Vec<Row>>,
    table: &TableName,
) -> StoreResult<&'a mut Vec<Row>> {
    tables
        .get_mut(table)
        .ok_or_else(|| StoreError::undefined_table(table.as_str()))
}

fn matches(row: &Row, column: &str, value: &Value) -> bool {
    row.get(column).unwrap_or(&Value::Null) == value
}

#[async_trait]
impl RemoteStore for MemoryStore {
    #[instrument(skip(self), fields(table = %query.table()))]
    async fn select(&self, query: &SelectQuery) -> StoreResult<Vec<Row>> {
        let mut guard = self.begin()?;
        let rows = table_rows(&mut guard.tables, query.table())?;
        let result = query.apply(rows.iter().cloned());
        debug!(count = result.len(), "Selected rows");
        Ok(result)
    }

    #[instrument(skip(self, row))]
    async fn insert(&self, table: &TableName, row: &Row) -> StoreResult<Option<Row>> {
        let mut guard = self.begin()?;
        let rows = table_rows(&mut guard.tables, table)?;

        let mut row = row.clone();
        if !row.contains_key("id") {
            row.insert("id".to_string(), Value::from(Uuid::new_v4().to_string()));
        }

        if rows.iter().any(|existing| existing.get("id") == row.get("id")) {
            return Err(StoreError::new(format!(
                "duplicate key value violates unique constraint \"{}_pkey\"",
                table
            ))
            .with_status(409)
            .with_code("23505"));
        }

        rows.push(row.clone());
        debug!("Inserted row");
        Ok(Some(row))
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        table: &TableName,
        column: &str,
        value: &Value,
        patch: &Row,
    ) -> StoreResult<Option<Row>> {
        let mut guard = self.begin()?;
        let rows = table_rows(&mut guard.tables, table)?;

        let matched = rows.iter().filter(|row| matches(row, column, value)).count();
        if matched > 1 {
            return Err(StoreError::multiple_rows(matched));
        }

        let Some(row) = rows.iter_mut().find(|row| matches(row, column, value)) else {
            debug!("No row matched");
            return Ok(None);
        };

        for (field, new_value) in patch {
            row.insert(field.clone(), new_value.clone());
        }
        debug!("Updated row");
        Ok(Some(row.clone()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, table: &TableName, column: &str, value: &Value) -> StoreResult<()> {
        let mut guard = self.begin()?;
        let rows = table_rows(&mut guard.tables, table)?;
        let before = rows.len();
        rows.retain(|row| !matches(row, column, value));
        debug!(count = before - rows.len(), "Deleted rows");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().unwrap().clone()
    }

    fn issues() -> TableName {
        TableName::new("issues").unwrap()
    }

    #[tokio::test]
    async fn missing_table_is_an_error() {
        let store = MemoryStore::new();
        let err = store
            .select(&SelectQuery::new(issues()))
            .await
            .unwrap_err();
        assert!(err.is_missing_table());
    }

    #[tokio::test]
    async fn insert_generates_id() {
        let store = MemoryStore::new();
        store.create_table(&issues());

        let written = store
            .insert(&issues(), &row(json!({ "title": "Lamp out" })))
            .await
            .unwrap()
            .unwrap();

        assert!(written["id"].is_string());
        assert_eq!(store.rows(&issues()).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_id_rejected() {
        let store = MemoryStore::new();
        store.seed(&issues(), [row(json!({ "id": "ISS-1" }))]);

        let err = store
            .insert(&issues(), &row(json!({ "id": "ISS-1" })))
            .await
            .unwrap_err();
        assert_eq!(err.code.as_deref(), Some("23505"));
    }

    #[tokio::test]
    async fn queued_failure_consumed_once() {
        let store = MemoryStore::new();
        store.create_table(&issues());
        store.fail_next(StoreError::transport("connection reset"));

        let query = SelectQuery::new(issues());
        assert!(store.select(&query).await.is_err());
        assert!(store.select(&query).await.is_ok());
        assert_eq!(store.calls(), 2);
    }
}
