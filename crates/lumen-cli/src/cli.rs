//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use crate::commands::{
    connect, create_table, delete, disconnect, get, insert, list, status, update,
};

/// Inspect and edit the streetlight-outage dashboard's tables.
#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(author, version = env!("LUMEN_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to find the store. Falls back to the environment, then to the
/// saved connection.
#[derive(Args, Debug, Default, Clone)]
pub struct StoreArgs {
    /// Store URL (https://project.example.org or file:///path/to/store)
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// API key for a hosted store
    #[arg(long, global = true)]
    pub api_key: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List records in a table
    List(list::ListArgs),

    /// Fetch a single record
    Get(get::GetArgs),

    /// Insert a record
    Insert(insert::InsertArgs),

    /// Update a record
    Update(update::UpdateArgs),

    /// Delete a record
    Delete(delete::DeleteArgs),

    /// Create an empty table (local stores only)
    CreateTable(create_table::CreateTableArgs),

    /// Save the store connection for later commands
    Connect(connect::ConnectArgs),

    /// Forget the saved connection
    Disconnect(disconnect::DisconnectArgs),

    /// Show which store commands will use
    Status(status::StatusArgs),
}
