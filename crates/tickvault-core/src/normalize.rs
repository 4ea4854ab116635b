//! Flattens provider payloads into validated [`DataEntry`] records.

use crate::alphavantage::DailyBar;
use crate::domain::{DataEntry, TradeDate};
use crate::fetch::FetchBatch;

/// Flattens a fetch batch into entries, newest day first per symbol.
///
/// Symbols appear in the batch's order; within a symbol, days are sorted by
/// parsed calendar date descending. With `recent_days = Some(n)`, n > 0,
/// only the n most recent well-formed days per symbol survive; `None` or a
/// non-positive n emits every day.
///
/// Degraded input never aborts the batch: a symbol without the daily-series
/// container is skipped whole, a malformed day (unparseable date key,
/// missing bar fields, non-numeric values) is skipped alone. Both are
/// logged. A symbol left with zero days simply contributes zero entries.
///
/// Pure apart from logging: no network, no storage.
pub fn normalize(batch: &FetchBatch, recent_days: Option<i64>) -> Vec<DataEntry> {
    let cutoff = recent_days.filter(|days| *days > 0);

    let mut entries = Vec::new();
    for (symbol, payload) in batch.iter() {
        let Some(series) = payload.time_series() else {
            tracing::warn!(symbol = %symbol, "skipping symbol: daily series container missing");
            continue;
        };

        let mut days: Vec<DataEntry> = Vec::with_capacity(series.len());
        for (day, value) in series {
            let date = match TradeDate::parse("date", day) {
                Ok(date) => date,
                Err(error) => {
                    tracing::warn!(symbol = %symbol, day = %day, error = %error, "skipping day: bad date key");
                    continue;
                }
            };

            let bar: DailyBar = match serde_json::from_value(value.clone()) {
                Ok(bar) => bar,
                Err(error) => {
                    tracing::warn!(symbol = %symbol, day = %day, error = %error, "skipping day: bad bar shape");
                    continue;
                }
            };

            match DataEntry::new(symbol.clone(), date, bar.open, bar.close, bar.volume) {
                Ok(entry) => days.push(entry),
                Err(error) => {
                    tracing::warn!(symbol = %symbol, day = %day, error = %error, "skipping day: invalid values");
                }
            }
        }

        days.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = cutoff {
            days.truncate(limit as usize);
        }

        entries.extend(days);
    }

    entries
}
