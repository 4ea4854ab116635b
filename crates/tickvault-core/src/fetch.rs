//! Concurrent per-symbol fetch, joined into one ordered batch.

use crate::alphavantage::{AlphaVantageClient, DailySeriesResponse};
use crate::domain::Symbol;

/// Provider payloads in request order. A symbol whose fetch failed is
/// simply absent; downstream stages never see partial or poisoned entries.
#[derive(Debug, Clone, Default)]
pub struct FetchBatch {
    payloads: Vec<(Symbol, DailySeriesResponse)>,
}

impl FetchBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, symbol: Symbol, payload: DailySeriesResponse) {
        self.payloads.push((symbol, payload));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (Symbol, DailySeriesResponse)> {
        self.payloads.iter()
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

/// Fetches every symbol concurrently (one task per symbol) and joins the
/// results into a [`FetchBatch`] ordered like `symbols`.
///
/// Each task is independent: a failed or panicked fetch is logged and its
/// symbol left out of the batch, without cancelling or delaying the others.
pub async fn fetch_all(client: &AlphaVantageClient, symbols: &[Symbol]) -> FetchBatch {
    let mut handles = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let client = client.clone();
        let task_symbol = symbol.clone();
        let handle =
            tokio::spawn(async move { client.fetch_daily_series(&task_symbol).await });
        handles.push((symbol.clone(), handle));
    }

    let mut batch = FetchBatch::new();
    for (symbol, handle) in handles {
        match handle.await {
            Ok(Ok(payload)) => batch.push(symbol, payload),
            Ok(Err(error)) => {
                tracing::warn!(symbol = %symbol, error = %error, "skipping symbol: fetch failed");
            }
            Err(error) => {
                tracing::warn!(symbol = %symbol, error = %error, "skipping symbol: fetch task failed");
            }
        }
    }

    batch
}
