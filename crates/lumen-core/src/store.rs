//! Remote store capability.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::query::SelectQuery;
use crate::record::Row;
use crate::types::TableName;

/// Outcome of a single store call.
///
/// The store reports failure as a value; it never panics and never retries.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A structured record store reachable by table name.
///
/// This is the only boundary lumen depends on. Implementations exist for
/// the hosted REST backend, the local filesystem and process memory, and
/// the [`RecordService`](crate::RecordService) takes one explicitly so
/// tests can hand it a fake.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Run a select and return every matching row.
    async fn select(&self, query: &SelectQuery) -> StoreResult<Vec<Row>>;

    /// Insert one row and return it as written, if the store echoes it.
    async fn insert(&self, table: &TableName, row: &Row) -> StoreResult<Option<Row>>;

    /// Apply `patch` to the single row where `column = value`.
    ///
    /// Returns the row as written, or `None` when nothing matched. When
    /// more than one row matches, nothing is written and the store reports
    /// [`StoreError::multiple_rows`].
    async fn update(
        &self,
        table: &TableName,
        column: &str,
        value: &Value,
        patch: &Row,
    ) -> StoreResult<Option<Row>>;

    /// Delete every row where `column = value`.
    async fn delete(&self, table: &TableName, column: &str, value: &Value) -> StoreResult<()>;
}

#[async_trait]
impl<S: RemoteStore + ?Sized> RemoteStore for Arc<S> {
    async fn select(&self, query: &SelectQuery) -> StoreResult<Vec<Row>> {
        (**self).select(query).await
    }

    async fn insert(&self, table: &TableName, row: &Row) -> StoreResult<Option<Row>> {
        (**self).insert(table, row).await
    }

    async fn update(
        &self,
        table: &TableName,
        column: &str,
        value: &Value,
        patch: &Row,
    ) -> StoreResult<Option<Row>> {
        (**self).update(table, column, value, patch).await
    }

    async fn delete(&self, table: &TableName, column: &str, value: &Value) -> StoreResult<()> {
        (**self).delete(table, column, value).await
    }
}

#[async_trait]
impl<S: RemoteStore + ?Sized> RemoteStore for Box<S> {
    async fn select(&self, query: &SelectQuery) -> StoreResult<Vec<Row>> {
        (**self).select(query).await
    }

    async fn insert(&self, table: &TableName, row: &Row) -> StoreResult<Option<Row>> {
        (**self).insert(table, row).await
    }

    async fn update(
        &self,
        table: &TableName,
        column: &str,
        value: &Value,
        patch: &Row,
    ) -> StoreResult<Option<Row>> {
        (**self).update(table, column, value, patch).await
    }

    async fn delete(&self, table: &TableName, column: &str, value: &Value) -> StoreResult<()> {
        (**self).delete(table, column, value).await
    }
}
