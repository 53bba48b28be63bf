//! List records command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use lumen_core::{Order, QuerySpec, Range, Row};

use super::parse;
use crate::cli::StoreArgs;
use crate::connection::Connection;
use crate::output;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Table name
    pub table: String,

    /// Equality filter, repeatable (e.g. --filter status=open)
    #[arg(long = "filter", short = 'f', value_parser = parse::filter)]
    pub filters: Vec<(String, Value)>,

    /// Sort column, optionally with direction (e.g. reported_at:desc)
    #[arg(long, value_parser = parse::order)]
    pub order: Option<Order>,

    /// Inclusive window of result offsets (e.g. 0..24)
    #[arg(long, value_parser = parse::range)]
    pub range: Option<Range>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: ListArgs, store: &StoreArgs) -> Result<()> {
    let table = parse::table(&args.table)?;
    let service = Connection::require(store)?.service()?;

    let mut spec = args
        .filters
        .into_iter()
        .fold(QuerySpec::new(), |spec, (column, value)| {
            spec.filter(column, value)
        });
    if let Some(order) = args.order {
        spec = spec.order_by(order.column, order.ascending);
    }
    if let Some(range) = args.range {
        spec = spec.range(range);
    }

    let rows: Vec<Row> = service
        .fetch_many(&table, Some(&spec))
        .await
        .context("Failed to list records")?;

    if rows.is_empty() {
        output::note("No records found.");
        return Ok(());
    }

    for row in &rows {
        output::json(row, args.pretty)?;
    }

    Ok(())
}
