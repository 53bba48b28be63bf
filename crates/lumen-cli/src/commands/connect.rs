//! Connect command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::StoreArgs;
use crate::connection::storage::{self, SavedConnection};
use crate::connection::{Connection, STORE_URL_ENV};
use crate::output;

/// Takes the store from the global --store and --api-key options.
#[derive(Args, Debug)]
pub struct ConnectArgs {}

pub async fn run(_args: ConnectArgs, store: &StoreArgs) -> Result<()> {
    let connection = Connection::resolve_unsaved(store)?.context(format!(
        "Nothing to connect to. Pass --store or set {}.",
        STORE_URL_ENV
    ))?;

    let opened = connection.open()?;
    if let Some(file_store) = opened.as_file() {
        std::fs::create_dir_all(file_store.root())
            .context("Failed to create store directory")?;
    }

    storage::save_connection(&SavedConnection {
        store: connection.url.as_str().to_string(),
        api_key: connection.api_key.clone(),
    })
    .context("Failed to save connection")?;

    output::success("Connection saved");
    println!();
    output::field("Store", connection.url.as_str());
    output::field("Kind", &connection.kind().to_string());
    if connection.api_key.is_some() {
        output::field("API key", "set");
    }

    Ok(())
}
