//! Persisted connection settings.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Connection data written by `lumen connect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedConnection {
    pub store: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Get the connection file path.
pub fn connection_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "lumen").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("connection.json"))
}

/// Save a connection to disk.
pub fn save_connection(connection: &SavedConnection) -> Result<()> {
    let path = connection_path()?;
    let json = serde_json::to_string_pretty(connection)?;

    fs::write(&path, &json).context("Failed to write connection file")?;

    // The file may hold an API key.
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(())
}

/// Load the saved connection, if any.
pub fn load_connection() -> Result<Option<SavedConnection>> {
    let path = connection_path()?;

    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&path).context("Failed to read connection file")?;
    let saved = serde_json::from_str(&json).context("Invalid connection file")?;
    Ok(Some(saved))
}

/// Remove the saved connection. Returns whether there was one.
pub fn clear_connection() -> Result<bool> {
    let path = connection_path()?;

    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(&path).context("Failed to remove connection file")?;
    Ok(true)
}
