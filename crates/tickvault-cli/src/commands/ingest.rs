use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tickvault_core::{fetch_all, normalize, AlphaVantageClient, ReqwestHttpClient, Symbol};
use tickvault_store::Store;
use uuid::Uuid;

use crate::cli::IngestArgs;
use crate::error::CliError;
use crate::output;

const API_KEY_ENV: &str = "TICKVAULT_API_KEY";
const API_KEY_FILE: &str = "api-key";

/// Summary of one ingestion run, printed as the command's JSON output.
#[derive(Debug, Serialize)]
struct IngestSummary {
    run_id: String,
    symbols_requested: usize,
    symbols_fetched: usize,
    entries: usize,
    inserted: u64,
    updated: u64,
}

pub async fn run(args: &IngestArgs, store: &Store, pretty: bool) -> Result<(), CliError> {
    let symbols = parse_symbols(&args.symbols)?;
    let api_key = resolve_api_key(
        args.api_key.as_deref(),
        std::env::var(API_KEY_ENV).ok(),
        &store.config().tickvault_home,
    )?;

    let client = AlphaVantageClient::new(Arc::new(ReqwestHttpClient::new()), api_key);
    let run_id = Uuid::new_v4().to_string();
    tracing::info!(run_id = %run_id, symbols = symbols.len(), "starting ingestion run");

    let batch = fetch_all(&client, &symbols).await;
    let entries = normalize(&batch, args.days);
    let report = store.upsert_entries(&run_id, &entries)?;

    let summary = IngestSummary {
        run_id,
        symbols_requested: symbols.len(),
        symbols_fetched: batch.len(),
        entries: entries.len(),
        inserted: report.inserted,
        updated: report.updated,
    };
    output::render(&summary, pretty)
}

fn parse_symbols(raw: &[String]) -> Result<Vec<Symbol>, CliError> {
    raw.iter()
        .map(|value| Symbol::new(value.clone()).map_err(CliError::from))
        .collect()
}

/// Resolution order: `--api-key` flag, then the environment, then the
/// first line of `<home>/api-key`.
fn resolve_api_key(
    flag: Option<&str>,
    env_key: Option<String>,
    home: &Path,
) -> Result<String, CliError> {
    if let Some(key) = flag {
        if !key.is_empty() {
            return Ok(key.to_owned());
        }
    }

    if let Some(key) = env_key {
        if !key.is_empty() {
            return Ok(key);
        }
    }

    let key_path = home.join(API_KEY_FILE);
    if key_path.exists() {
        let contents = fs::read_to_string(&key_path)?;
        if let Some(line) = contents.lines().next() {
            let key = line.trim();
            if !key.is_empty() {
                return Ok(key.to_owned());
            }
        }
    }

    Err(CliError::Config(format!(
        "no API key: pass --api-key, set {API_KEY_ENV}, or write {}",
        key_path.display()
    )))
}
