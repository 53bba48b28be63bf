//! Filesystem storage for the file-backed record store.
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/store.lock
//! <root>/tables/<table>/<id>.json
//! ```
//!
//! A table exists exactly when its directory does. Every write happens
//! under an exclusive lock on `store.lock` and lands through a temp file
//! and a rename.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use lumen_core::error::StoreError;
use lumen_core::query::SelectQuery;
use lumen_core::record::Row;
use lumen_core::store::{RemoteStore, StoreResult};
use lumen_core::types::{StoreUrl, TableName};

/// Column each record's file is named after.
const KEY_COLUMN: &str = "id";

fn map_io(err: std::io::Error) -> StoreError {
    StoreError::transport(format!("IO error: {}", err))
}

fn corrupt(path: &Path, err: serde_json::Error) -> StoreError {
    StoreError::new(format!("corrupt record file {}: {}", path.display(), err)).with_code("XX001")
}

fn duplicate_key(table: &TableName) -> StoreError {
    StoreError::new(format!(
        "duplicate key value violates unique constraint \"{}_pkey\"",
        table
    ))
    .with_status(409)
    .with_code("23505")
}

/// A [`RemoteStore`] that keeps one JSON file per record.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new file store at the given root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Create a file store for a `file://` store URL.
    ///
    /// Returns `None` for network URLs.
    pub fn from_url(url: &StoreUrl) -> Option<Self> {
        url.to_file_path().map(Self::new)
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn tables_dir(&self) -> PathBuf {
        self.root.join("tables")
    }

    fn table_dir(&self, table: &TableName) -> PathBuf {
        self.tables_dir().join(table.as_str())
    }

    fn lock_path(&self) -> PathBuf {
        self.root.join("store.lock")
    }

    fn record_path(&self, table: &TableName, key: &str) -> PathBuf {
        self.table_dir(table).join(format!("{}.json", key))
    }

    /// Create an empty table. Existing tables are left alone.
    #[instrument(skip(self))]
    pub fn create_table(&self, table: &TableName) -> StoreResult<()> {
        fs::create_dir_all(self.table_dir(table)).map_err(map_io)?;
        debug!("Created table");
        Ok(())
    }

    /// Remove a table and every record in it.
    #[instrument(skip(self))]
    pub fn drop_table(&self, table: &TableName) -> StoreResult<()> {
        self.with_lock(|| {
            let dir = self.existing_table_dir(table)?;
            fs::remove_dir_all(dir).map_err(map_io)?;
            debug!("Dropped table");
            Ok(())
        })
    }

    /// Names of every table in the store.
    pub fn list_tables(&self) -> StoreResult<Vec<TableName>> {
        let dir = self.tables_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut tables = Vec::new();
        for entry in fs::read_dir(&dir).map_err(map_io)? {
            let entry = entry.map_err(map_io)?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match TableName::new(&name) {
                Ok(table) => tables.push(table),
                Err(_) => warn!(name = %name, "Skipping directory with invalid table name"),
            }
        }
        tables.sort();
        Ok(tables)
    }

    pub fn table_exists(&self, table: &TableName) -> bool {
        self.table_dir(table).is_dir()
    }

    fn existing_table_dir(&self, table: &TableName) -> StoreResult<PathBuf> {
        let dir = self.table_dir(table);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(StoreError::undefined_table(table.as_str()))
        }
    }

    /// Run `f` while holding the store's exclusive write lock.
    fn with_lock<R>(&self, f: impl FnOnce() -> StoreResult<R>) -> StoreResult<R> {
        fs::create_dir_all(&self.root).map_err(map_io)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(map_io)?;

        lock_file.lock_exclusive().map_err(map_io)?;
        let result = f();
        lock_file.unlock().map_err(map_io)?;

        result
    }

    /// Read every row of a table, in file-name order.
    fn read_rows(&self, table: &TableName) -> StoreResult<Vec<(PathBuf, Row)>> {
        let dir = self.existing_table_dir(table)?;

        let mut entries: Vec<_> = fs::read_dir(&dir)
            .map_err(map_io)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .collect();

        entries.sort_by_key(|e| e.file_name());

        let mut rows = Vec::with_capacity(entries.len());
        for entry in entries {
            let path = entry.path();
            let content = fs::read_to_string(&path).map_err(map_io)?;
            let row: Row = serde_json::from_str(&content).map_err(|e| corrupt(&path, e))?;
            rows.push((path, row));
        }
        Ok(rows)
    }

    fn write_row(&self, path: &Path, row: &Row) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(row)
            .map_err(|e| StoreError::new(e.to_string()).with_code("22P02"))?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content).map_err(map_io)?;
        fs::rename(&temp_path, path).map_err(map_io)?;
        Ok(())
    }
}

/// The file name a key value maps to.
///
/// Keys become file names, so only a conservative character set is
/// accepted: ASCII alphanumerics and `.`, `-`, `_`, `~`.
fn file_key(value: Option<&Value>) -> StoreResult<String> {
    let key = match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
        other => {
            return Err(StoreError::new(format!(
                "invalid value for column \"{}\": {}",
                KEY_COLUMN,
                other.unwrap_or(&Value::Null)
            ))
            .with_status(400)
            .with_code("22P02"));
        }
    };

    let valid = !key.is_empty()
        && key.len() <= 512
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '~'));

    if !valid {
        return Err(StoreError::new(format!(
            "invalid value for column \"{}\": {:?}",
            KEY_COLUMN, key
        ))
        .with_status(400)
        .with_code("22P02"));
    }

    Ok(key)
}

fn matches(row: &Row, column: &str, value: &Value) -> bool {
    row.get(column).unwrap_or(&Value::Null) == value
}

#[async_trait]
impl RemoteStore for FileStore {
    #[instrument(skip(self), fields(table = %query.table()))]
    async fn select(&self, query: &SelectQuery) -> StoreResult<Vec<Row>> {
        let rows = self.read_rows(query.table())?;
        let result = query.apply(rows.into_iter().map(|(_, row)| row));
        debug!(count = result.len(), "Selected rows");
        Ok(result)
    }

    #[instrument(skip(self, row))]
    async fn insert(&self, table: &TableName, row: &Row) -> StoreResult<Option<Row>> {
        self.with_lock(|| {
            self.existing_table_dir(table)?;

            let mut row = row.clone();
            if !row.contains_key(KEY_COLUMN) {
                row.insert(
                    KEY_COLUMN.to_string(),
                    Value::from(Uuid::new_v4().to_string()),
                );
            }

            let key = file_key(row.get(KEY_COLUMN))?;
            let path = self.record_path(table, &key);
            if path.exists() {
                return Err(duplicate_key(table));
            }

            self.write_row(&path, &row)?;
            debug!(key = %key, "Inserted row");
            Ok(Some(row))
        })
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        table: &TableName,
        column: &str,
        value: &Value,
        patch: &Row,
    ) -> StoreResult<Option<Row>> {
        self.with_lock(|| {
            let mut matched: Vec<_> = self
                .read_rows(table)?
                .into_iter()
                .filter(|(_, row)| matches(row, column, value))
                .collect();

            if matched.len() > 1 {
                return Err(StoreError::multiple_rows(matched.len()));
            }
            let Some((path, mut row)) = matched.pop() else {
                debug!("No row matched");
                return Ok(None);
            };

            for (field, new_value) in patch {
                row.insert(field.clone(), new_value.clone());
            }

            // Validate the new key before anything touches the disk.
            let key = file_key(row.get(KEY_COLUMN))?;
            let target = self.record_path(table, &key);
            if target != path && target.exists() {
                return Err(duplicate_key(table));
            }

            self.write_row(&target, &row)?;
            if target != path {
                fs::remove_file(&path).map_err(map_io)?;
            }

            debug!(key = %key, "Updated row");
            Ok(Some(row))
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, table: &TableName, column: &str, value: &Value) -> StoreResult<()> {
        self.with_lock(|| {
            let mut deleted = 0;
            for (path, row) in self.read_rows(table)? {
                if matches(&row, column, value) {
                    fs::remove_file(&path).map_err(map_io)?;
                    deleted += 1;
                }
            }
            debug!(count = deleted, "Deleted rows");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_and_text_keys() {
        assert_eq!(file_key(Some(&json!("ISS-1001"))).unwrap(), "ISS-1001");
        assert_eq!(file_key(Some(&json!(42))).unwrap(), "42");
    }

    #[test]
    fn unsafe_keys_rejected() {
        assert!(file_key(Some(&json!("../escape"))).is_err());
        assert!(file_key(Some(&json!(".."))).is_err());
        assert!(file_key(Some(&json!(1.5))).is_err());
        assert!(file_key(None).is_err());
    }
}
