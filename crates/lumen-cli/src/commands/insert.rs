//! Insert record command implementation.

use anyhow::{Context, Result};
use clap::Args;

use lumen_core::Row;

use super::parse;
use crate::cli::StoreArgs;
use crate::connection::Connection;
use crate::output;

#[derive(Args, Debug)]
pub struct InsertArgs {
    /// Table name
    pub table: String,

    /// JSON file with the record (use - for stdin)
    #[arg(long)]
    pub json: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: InsertArgs, store: &StoreArgs) -> Result<()> {
    let table = parse::table(&args.table)?;
    let payload = parse::payload(&args.json)?;
    let service = Connection::require(store)?.service()?;

    let written: Option<Row> = service
        .insert(&table, &payload)
        .await
        .context("Failed to insert record")?;

    if let Some(row) = written {
        output::json(&row, args.pretty)?;
    }
    output::success(&format!("Inserted record into {}", table));

    Ok(())
}
