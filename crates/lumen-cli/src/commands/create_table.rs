//! Create table command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use super::parse;
use crate::cli::StoreArgs;
use crate::connection::Connection;
use crate::output;

#[derive(Args, Debug)]
pub struct CreateTableArgs {
    /// Table name
    pub table: String,
}

pub async fn run(args: CreateTableArgs, store: &StoreArgs) -> Result<()> {
    let table = parse::table(&args.table)?;
    let store = Connection::require(store)?.open()?;

    let Some(file_store) = store.as_file() else {
        bail!("create-table only works with a file:// store; hosted tables are managed by the backend");
    };

    file_store
        .create_table(&table)
        .context("Failed to create table")?;

    output::success(&format!("Created table {}", table));

    Ok(())
}
