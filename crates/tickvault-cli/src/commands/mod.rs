//! Command dispatch.
//!
//! Each subcommand lives in its own module and exposes a `run` function.
//! The store is opened once here and shared with whichever command runs.

mod ingest;
mod query;
mod stats;

use tickvault_store::{Store, StoreConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let mut config = StoreConfig::default();
    if let Some(db_path) = &cli.db {
        config.db_path = db_path.clone();
    }

    let store = Store::open(config)?;

    match &cli.command {
        Command::Ingest(args) => ingest::run(args, &store, cli.pretty).await,
        Command::Query(args) => query::run(args, &store, cli.pretty),
        Command::Stats(args) => stats::run(args, &store, cli.pretty),
    }
}
