//! Status command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::StoreArgs;
use crate::connection::Connection;
use crate::output;

#[derive(Args, Debug)]
pub struct StatusArgs {}

pub async fn run(_args: StatusArgs, store: &StoreArgs) -> Result<()> {
    let Some(connection) = Connection::resolve(store)? else {
        output::note("Not connected. Pass --store or run 'lumen connect'.");
        return Ok(());
    };

    output::field("Store", connection.url.as_str());
    output::field("Kind", &connection.kind().to_string());
    output::field("Source", &connection.source.to_string());
    output::field(
        "API key",
        if connection.api_key.is_some() { "set" } else { "not set" },
    );

    if connection.url.is_local() {
        let opened = connection.open()?;
        if let Some(file_store) = opened.as_file() {
            let tables = file_store.list_tables().context("Failed to list tables")?;
            let names: Vec<String> = tables.iter().map(|t| t.to_string()).collect();
            output::field("Tables", &names.join(", "));
        }
    }

    Ok(())
}
