//! Delete record command implementation.

use anyhow::{Context, Result};
use clap::Args;

use lumen_core::DEFAULT_ID_COLUMN;

use super::parse;
use crate::cli::StoreArgs;
use crate::connection::Connection;
use crate::output;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Table name
    pub table: String,

    /// Record identifier
    pub id: String,

    /// Column the identifier is matched against
    #[arg(long, default_value = DEFAULT_ID_COLUMN)]
    pub id_column: String,
}

pub async fn run(args: DeleteArgs, store: &StoreArgs) -> Result<()> {
    let table = parse::table(&args.table)?;
    let id = parse::record_id(&args.id);
    let service = Connection::require(store)?.service()?;

    service
        .remove_by(&table, &args.id_column, &id)
        .await
        .context("Failed to delete record")?;

    output::success(&format!("Deleted {} {}", table, id));

    Ok(())
}
