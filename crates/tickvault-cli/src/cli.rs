//! Command-line interface definition for tickvault.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ingest` | Fetch daily series from Alpha Vantage and upsert them |
//! | `query` | Page through stored rows for a symbol and date range |
//! | `stats` | Average open, close, and volume over a date range |
//!
//! # Global options
//!
//! | Option | Description |
//! |--------|-------------|
//! | `--db <PATH>` | Database file (default `<home>/financial.duckdb`) |
//! | `--pretty` | Indented JSON output |
//!
//! # Examples
//!
//! ```bash
//! # Ingest the two default symbols, keeping the 14 most recent days each
//! tickvault ingest --days 14 --api-key demo
//!
//! # Ingest a custom list of symbols
//! tickvault ingest MSFT GOOG --days 14
//!
//! # Page through stored rows
//! tickvault query IBM --start-date 2024-01-01 --end-date 2024-01-31 --limit 3 --page 2
//!
//! # Range statistics
//! tickvault stats IBM --start-date 2024-01-01 --end-date 2024-01-31 --pretty
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "tickvault",
    author,
    version,
    about = "Daily stock price ingestion and range analytics",
    long_about = "Fetches daily price series from Alpha Vantage, stores them in a local \
                  DuckDB file keyed by (symbol, date), and answers paginated range queries \
                  and range statistics over the stored rows. All command output is JSON on \
                  stdout; logs go to stderr."
)]
pub struct Cli {
    /// Path to the DuckDB database file.
    ///
    /// Defaults to `<home>/financial.duckdb`, where `<home>` is
    /// `$TICKVAULT_HOME` when set and `$HOME/.tickvault` otherwise.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 📥 Fetch daily series for the given symbols and upsert them
    ///
    /// Each symbol is fetched concurrently; a symbol whose fetch or payload
    /// fails is logged and skipped without aborting the run. The surviving
    /// rows are written in a single transaction, replacing any row that
    /// already exists for the same symbol and date.
    ///
    /// # Examples
    ///
    /// ```bash
    /// tickvault ingest --days 14 --api-key demo
    /// tickvault ingest MSFT GOOG --days 14
    /// TICKVAULT_API_KEY=demo tickvault ingest IBM
    /// ```
    Ingest(IngestArgs),

    /// 🔍 Page through stored rows for a symbol and date range
    ///
    /// Rows are returned oldest first together with a pagination block
    /// giving the total row count and page count for the range. A page
    /// past the end of the range reports not found.
    ///
    /// # Examples
    ///
    /// ```bash
    /// tickvault query IBM --start-date 2024-01-01 --end-date 2024-01-31
    /// tickvault query IBM --start-date 2024-01-01 --end-date 2024-01-31 --limit 3 --page 2
    /// ```
    Query(QueryArgs),

    /// 📈 Average open, close, and volume over a date range
    ///
    /// Aggregates every stored row in the range regardless of pagination.
    /// Average prices are rounded to two decimals; average volume is
    /// truncated to a whole number.
    ///
    /// # Examples
    ///
    /// ```bash
    /// tickvault stats IBM --start-date 2024-01-01 --end-date 2024-01-31
    /// ```
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Ticker symbols to ingest.
    #[arg(num_args = 1.., default_values_t = ["IBM".to_owned(), "AAPL".to_owned()])]
    pub symbols: Vec<String>,

    /// Keep only the N most recent trading days per symbol.
    ///
    /// Zero or a negative value keeps the provider's full history.
    #[arg(long)]
    pub days: Option<i64>,

    /// Alpha Vantage API key.
    ///
    /// Falls back to `$TICKVAULT_API_KEY`, then to the first line of
    /// `<home>/api-key`.
    #[arg(long)]
    pub api_key: Option<String>,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Ticker symbol to query (case-sensitive).
    pub symbol: String,

    /// Range start, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub start_date: String,

    /// Range end, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub end_date: String,

    /// Rows per page (default 5). A negative value counts as its absolute value.
    #[arg(long)]
    pub limit: Option<i64>,

    /// Page number, 1-indexed (default 1). A negative value counts as its absolute value.
    #[arg(long)]
    pub page: Option<i64>,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Ticker symbol to aggregate (case-sensitive).
    pub symbol: String,

    /// Range start, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub start_date: String,

    /// Range end, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub end_date: String,
}
