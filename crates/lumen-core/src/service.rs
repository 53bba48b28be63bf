//! Generic record service.
//!
//! Every table goes through the same five calls. The service owns no
//! schema: the caller's type parameter decides how rows are decoded, and a
//! wrong type parameter shows up as [`Error::Decode`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

use crate::error::{Error, RemoteQueryError, RemoteWriteError, StoreError, WriteOp};
use crate::query::{QuerySpec, SelectQuery};
use crate::record::{Payload, Row, decode_row, decode_rows};
use crate::store::RemoteStore;
use crate::types::{RecordId, TableName, validate_column};
use crate::Result;

/// Column records are looked up by unless the caller says otherwise.
pub const DEFAULT_ID_COLUMN: &str = "id";

/// Table-agnostic CRUD over a [`RemoteStore`].
///
/// Failures are logged with the table and operation, then returned. They
/// are never swallowed and never retried.
///
/// # Example
///
/// ```
/// use lumen_core::{MemoryStore, QuerySpec, RecordService, Row, TableName};
///
/// # async fn example() -> Result<(), lumen_core::Error> {
/// let store = MemoryStore::new();
/// let issues = TableName::new("issues")?;
/// store.create_table(&issues);
///
/// let service = RecordService::new(store);
/// let open: Vec<Row> = service
///     .fetch_many(&issues, Some(&QuerySpec::new().filter("status", "open")))
///     .await?;
/// assert!(open.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RecordService<S> {
    store: Arc<S>,
}

impl<S> Clone for RecordService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RemoteStore> RecordService<S> {
    /// Create a service over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Create a service over a store that is already shared.
    pub fn from_shared(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch every row of `table` matching `spec`.
    ///
    /// Returns an empty vector, not an error, when nothing matches.
    #[instrument(skip(self, spec), fields(%table))]
    pub async fn fetch_many<T: DeserializeOwned>(
        &self,
        table: &TableName,
        spec: Option<&QuerySpec>,
    ) -> Result<Vec<T>> {
        self.select_rows(table, spec)
            .await
            .and_then(|rows| decode_rows(table, rows))
            .inspect_err(|e| log_failure("fetch_many", table, e))
    }

    /// Fetch the record whose `id` column equals `id`.
    pub async fn fetch_by_id<T: DeserializeOwned>(
        &self,
        table: &TableName,
        id: &RecordId,
    ) -> Result<Option<T>> {
        self.fetch_by(table, DEFAULT_ID_COLUMN, id).await
    }

    /// Fetch the first record whose `id_column` equals `id`.
    #[instrument(skip(self), fields(%table, %id))]
    pub async fn fetch_by<T: DeserializeOwned>(
        &self,
        table: &TableName,
        id_column: &str,
        id: &RecordId,
    ) -> Result<Option<T>> {
        let spec = QuerySpec::new().filter(id_column, id.to_value());
        self.select_rows(table, Some(&spec))
            .await
            .and_then(|rows| {
                rows.into_iter()
                    .next()
                    .map(|row| decode_row(table, row))
                    .transpose()
            })
            .inspect_err(|e| log_failure("fetch_by_id", table, e))
    }

    /// Insert one record and return it as the store wrote it.
    ///
    /// Returns `None` if the store does not echo the written row.
    #[instrument(skip(self, payload), fields(%table))]
    pub async fn insert<T: DeserializeOwned>(
        &self,
        table: &TableName,
        payload: &Payload,
    ) -> Result<Option<T>> {
        debug!(fields = payload.as_row().len(), "Inserting record");
        self.store
            .insert(table, payload.as_row())
            .await
            .map_err(|source| write_error(table, WriteOp::Insert, source))
            .and_then(|row| row.map(|row| decode_row(table, row)).transpose())
            .inspect_err(|e| log_failure("insert", table, e))
    }

    /// Apply `payload` to the record whose `id` column equals `id`.
    pub async fn update<T: DeserializeOwned>(
        &self,
        table: &TableName,
        id: &RecordId,
        payload: &Payload,
    ) -> Result<Option<T>> {
        self.update_by(table, DEFAULT_ID_COLUMN, id, payload).await
    }

    /// Apply `payload` to the single record whose `id_column` equals `id`.
    ///
    /// Only the fields in `payload` change. Returns `None` when no record
    /// matched, and a write error when more than one did.
    #[instrument(skip(self, payload), fields(%table, %id))]
    pub async fn update_by<T: DeserializeOwned>(
        &self,
        table: &TableName,
        id_column: &str,
        id: &RecordId,
        payload: &Payload,
    ) -> Result<Option<T>> {
        self.update_rows(table, id_column, id, payload)
            .await
            .and_then(|row| row.map(|row| decode_row(table, row)).transpose())
            .inspect_err(|e| log_failure("update", table, e))
    }

    /// Delete the record whose `id` column equals `id`.
    pub async fn remove(&self, table: &TableName, id: &RecordId) -> Result<()> {
        self.remove_by(table, DEFAULT_ID_COLUMN, id).await
    }

    /// Delete the record whose `id_column` equals `id`.
    #[instrument(skip(self), fields(%table, %id))]
    pub async fn remove_by(&self, table: &TableName, id_column: &str, id: &RecordId) -> Result<()> {
        debug!("Deleting record");
        let outcome = match validate_column(id_column) {
            Ok(()) => self
                .store
                .delete(table, id_column, &id.to_value())
                .await
                .map_err(|source| write_error(table, WriteOp::Delete, source)),
            Err(e) => Err(e),
        };
        outcome.inspect_err(|e| log_failure("remove", table, e))
    }

    async fn select_rows(&self, table: &TableName, spec: Option<&QuerySpec>) -> Result<Vec<Row>> {
        let query = match spec {
            Some(spec) => {
                spec.validate()?;
                SelectQuery::from_spec(table.clone(), spec)
            }
            None => SelectQuery::new(table.clone()),
        };

        debug!(filters = query.filters().len(), "Fetching records");

        self.store.select(&query).await.map_err(|source| {
            RemoteQueryError {
                table: table.to_string(),
                source,
            }
            .into()
        })
    }

    async fn update_rows(
        &self,
        table: &TableName,
        id_column: &str,
        id: &RecordId,
        payload: &Payload,
    ) -> Result<Option<Row>> {
        validate_column(id_column)?;
        debug!(fields = payload.as_row().len(), "Updating record");

        self.store
            .update(table, id_column, &id.to_value(), payload.as_row())
            .await
            .map_err(|source| write_error(table, WriteOp::Update, source))
    }
}

fn write_error(table: &TableName, op: WriteOp, source: StoreError) -> Error {
    RemoteWriteError {
        table: table.to_string(),
        op,
        source,
    }
    .into()
}

fn log_failure(op: &'static str, table: &TableName, err: &Error) {
    error!(%table, op, error = %err, "Record service call failed");
}
