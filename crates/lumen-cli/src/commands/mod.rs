//! Subcommand implementations.

pub mod connect;
pub mod create_table;
pub mod delete;
pub mod disconnect;
pub mod get;
pub mod insert;
pub mod list;
mod parse;
pub mod status;
pub mod update;

use anyhow::Result;

use crate::cli::{Commands, StoreArgs};

pub async fn handle(command: Commands, store: &StoreArgs) -> Result<()> {
    match command {
        Commands::List(args) => list::run(args, store).await,
        Commands::Get(args) => get::run(args, store).await,
        Commands::Insert(args) => insert::run(args, store).await,
        Commands::Update(args) => update::run(args, store).await,
        Commands::Delete(args) => delete::run(args, store).await,
        Commands::CreateTable(args) => create_table::run(args, store).await,
        Commands::Connect(args) => connect::run(args, store).await,
        Commands::Disconnect(args) => disconnect::run(args).await,
        Commands::Status(args) => status::run(args, store).await,
    }
}
