//! Update record command implementation.

use anyhow::{Context, Result};
use clap::Args;

use lumen_core::{DEFAULT_ID_COLUMN, Row};

use super::parse;
use crate::cli::StoreArgs;
use crate::connection::Connection;
use crate::output;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Table name
    pub table: String,

    /// Record identifier
    pub id: String,

    /// JSON file with the fields to change (use - for stdin)
    #[arg(long)]
    pub json: String,

    /// Column the identifier is matched against
    #[arg(long, default_value = DEFAULT_ID_COLUMN)]
    pub id_column: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: UpdateArgs, store: &StoreArgs) -> Result<()> {
    let table = parse::table(&args.table)?;
    let id = parse::record_id(&args.id);
    let payload = parse::payload(&args.json)?;
    let service = Connection::require(store)?.service()?;

    let written: Option<Row> = service
        .update_by(&table, &args.id_column, &id, &payload)
        .await
        .context("Failed to update record")?;

    match written {
        Some(row) => {
            output::json(&row, args.pretty)?;
            output::success(&format!("Updated {} {}", table, id));
        }
        None => output::note(&format!("No record in {} with {} = {}.", table, args.id_column, id)),
    }

    Ok(())
}
