//! Get record command implementation.

use anyhow::{Context, Result};
use clap::Args;

use lumen_core::{DEFAULT_ID_COLUMN, Row};

use super::parse;
use crate::cli::StoreArgs;
use crate::connection::Connection;
use crate::output;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Table name
    pub table: String,

    /// Record identifier
    pub id: String,

    /// Column the identifier is matched against
    #[arg(long, default_value = DEFAULT_ID_COLUMN)]
    pub id_column: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: GetArgs, store: &StoreArgs) -> Result<()> {
    let table = parse::table(&args.table)?;
    let id = parse::record_id(&args.id);
    let service = Connection::require(store)?.service()?;

    let record: Option<Row> = service
        .fetch_by(&table, &args.id_column, &id)
        .await
        .context("Failed to get record")?;

    match record {
        Some(row) => output::json(&row, args.pretty),
        None => {
            output::note(&format!("No record in {} with {} = {}.", table, args.id_column, id));
            Ok(())
        }
    }
}
