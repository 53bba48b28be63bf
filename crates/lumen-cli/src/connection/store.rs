//! Store wrapper for CLI use.

use async_trait::async_trait;
use serde_json::Value;

use lumen_core::{RemoteStore, Row, SelectQuery, StoreResult, TableName};
use lumen_file::FileStore;
use lumen_rest::RestStore;

/// Either of the stores the CLI can open.
#[derive(Debug)]
pub enum CliStore {
    File(FileStore),
    Rest(RestStore),
}

impl CliStore {
    pub fn as_file(&self) -> Option<&FileStore> {
        match self {
            CliStore::File(store) => Some(store),
            CliStore::Rest(_) => None,
        }
    }
}

#[async_trait]
impl RemoteStore for CliStore {
    async fn select(&self, query: &SelectQuery) -> StoreResult<Vec<Row>> {
        match self {
            CliStore::File(store) => store.select(query).await,
            CliStore::Rest(store) => store.select(query).await,
        }
    }

    async fn insert(&self, table: &TableName, row: &Row) -> StoreResult<Option<Row>> {
        match self {
            CliStore::File(store) => store.insert(table, row).await,
            CliStore::Rest(store) => store.insert(table, row).await,
        }
    }

    async fn update(
        &self,
        table: &TableName,
        column: &str,
        value: &Value,
        patch: &Row,
    ) -> StoreResult<Option<Row>> {
        match self {
            CliStore::File(store) => store.update(table, column, value, patch).await,
            CliStore::Rest(store) => store.update(table, column, value, patch).await,
        }
    }

    async fn delete(&self, table: &TableName, column: &str, value: &Value) -> StoreResult<()> {
        match self {
            CliStore::File(store) => store.delete(table, column, value).await,
            CliStore::Rest(store) => store.delete(table, column, value).await,
        }
    }
}
