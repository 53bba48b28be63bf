//! Disconnect command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::connection::storage;
use crate::output;

#[derive(Args, Debug)]
pub struct DisconnectArgs {}

pub async fn run(_args: DisconnectArgs) -> Result<()> {
    if storage::clear_connection().context("Failed to clear connection")? {
        output::success("Disconnected");
    } else {
        output::note("No saved connection.");
    }

    Ok(())
}
