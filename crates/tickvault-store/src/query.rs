//! Range queries and statistics over `financial_data`.
//!
//! Both operations validate their inputs first, then filter on
//! `symbol = ? AND date >= ? AND date <= ?` with every value bound as a
//! parameter. Dates are stored as ISO text, so lexicographic `>=`/`<=`
//! is exactly chronological comparison.

use ::duckdb::{Row, ToSql};
use serde::Serialize;
use thiserror::Error;
use tickvault_core::{DataEntry, Symbol, TradeDate, ValidationError};

use crate::duckdb::{AccessMode, DuckDbConnectionManager};
use crate::StorageError;

const DEFAULT_LIMIT: u64 = 5;
const DEFAULT_PAGE: u64 = 1;

/// Range query parameters as received from the caller, untrusted.
///
/// `limit` and `page` default to 5 and 1 when absent; negative values are
/// coerced to their absolute value, zero is rejected.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub symbol: String,
    pub start_date: String,
    pub end_date: String,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

/// Statistics parameters: same scope as a query, no pagination.
#[derive(Debug, Clone, Default)]
pub struct StatisticsRequest {
    pub symbol: String,
    pub start_date: String,
    pub end_date: String,
}

/// Pagination metadata. `count` is the full match count irrespective of
/// the requested page; `pages` is `ceil(count / limit)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub count: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

/// One page of query results, date ascending.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub data: Vec<DataEntry>,
    pub pagination: Pagination,
}

/// Aggregate statistics over every row in the requested range.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub symbol: Symbol,
    pub start_date: TradeDate,
    pub end_date: TradeDate,
    pub average_daily_open_price: f64,
    pub average_daily_close_price: f64,
    pub average_daily_volume: u64,
}

/// Errors surfaced by the read operations.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No row matched the scope, or the requested page lies past the last
    /// page. The two cases are deliberately indistinguishable.
    #[error("no data found for symbol '{symbol}' between {start_date} and {end_date}")]
    NotFound {
        symbol: String,
        start_date: String,
        end_date: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Validated query scope.
struct Scope {
    symbol: Symbol,
    start: TradeDate,
    end: TradeDate,
}

impl Scope {
    fn not_found(&self) -> QueryError {
        QueryError::NotFound {
            symbol: self.symbol.to_string(),
            start_date: self.start.format_iso(),
            end_date: self.end.format_iso(),
        }
    }
}

fn validate_scope(
    symbol: &str,
    start_date: &str,
    end_date: &str,
) -> Result<Scope, ValidationError> {
    Ok(Scope {
        symbol: Symbol::new(symbol)?,
        start: TradeDate::parse("start_date", start_date)?,
        end: TradeDate::parse("end_date", end_date)?,
    })
}

fn resolve_limit(limit: Option<i64>) -> Result<u64, ValidationError> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(value) => match value.unsigned_abs() {
            0 => Err(ValidationError::InvalidLimit { value }),
            resolved => Ok(resolved),
        },
    }
}

fn resolve_page(page: Option<i64>) -> Result<u64, ValidationError> {
    match page {
        None => Ok(DEFAULT_PAGE),
        Some(value) => match value.unsigned_abs() {
            0 => Err(ValidationError::InvalidPage { value }),
            resolved => Ok(resolved),
        },
    }
}

pub(crate) fn run_query(
    manager: &DuckDbConnectionManager,
    request: &QueryRequest,
) -> Result<Page, QueryError> {
    let scope = validate_scope(&request.symbol, &request.start_date, &request.end_date)?;
    let limit = resolve_limit(request.limit)?;
    let page = resolve_page(request.page)?;

    let (count, data) = fetch_page(manager, &scope, limit, page)?;

    // Zero matches and a page beyond the last both yield not-found.
    if data.is_empty() {
        return Err(scope.not_found());
    }

    Ok(Page {
        data,
        pagination: Pagination {
            count,
            page,
            limit,
            pages: count.div_ceil(limit),
        },
    })
}

pub(crate) fn run_statistics(
    manager: &DuckDbConnectionManager,
    request: &StatisticsRequest,
) -> Result<Statistics, QueryError> {
    let scope = validate_scope(&request.symbol, &request.start_date, &request.end_date)?;

    let totals = accumulate_range(manager, &scope)?;
    if totals.rows == 0 {
        return Err(scope.not_found());
    }

    let rows = totals.rows as f64;
    Ok(Statistics {
        average_daily_open_price: round_to_two_decimals(totals.open_sum / rows),
        average_daily_close_price: round_to_two_decimals(totals.close_sum / rows),
        average_daily_volume: totals.volume_sum / totals.rows,
        symbol: scope.symbol,
        start_date: scope.start,
        end_date: scope.end,
    })
}

fn fetch_page(
    manager: &DuckDbConnectionManager,
    scope: &Scope,
    limit: u64,
    page: u64,
) -> Result<(u64, Vec<DataEntry>), StorageError> {
    let symbol = scope.symbol.to_string();
    let start = scope.start.format_iso();
    let end = scope.end.format_iso();

    let connection = manager.acquire(AccessMode::ReadOnly)?;

    let scope_params: [&dyn ToSql; 3] = [&symbol, &start, &end];
    let count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM financial_data WHERE symbol = ? AND date >= ? AND date <= ?",
        scope_params.as_slice(),
        |row| row.get(0),
    )?;
    let count = u64::try_from(count).unwrap_or(0);
    if count == 0 {
        return Ok((0, Vec::new()));
    }

    let offset = (page - 1) * limit;
    let mut statement = connection.prepare(
        "SELECT symbol, date, open_price, close_price, volume \
         FROM financial_data \
         WHERE symbol = ? AND date >= ? AND date <= ? \
         ORDER BY date \
         LIMIT ? OFFSET ?",
    )?;
    let params: [&dyn ToSql; 5] = [&symbol, &start, &end, &limit, &offset];
    let mut rows = statement.query(params.as_slice())?;

    let mut data = Vec::new();
    while let Some(row) = rows.next()? {
        data.push(read_entry(row)?);
    }

    Ok((count, data))
}

struct RangeTotals {
    open_sum: f64,
    close_sum: f64,
    volume_sum: u64,
    rows: u64,
}

fn accumulate_range(
    manager: &DuckDbConnectionManager,
    scope: &Scope,
) -> Result<RangeTotals, StorageError> {
    let symbol = scope.symbol.to_string();
    let start = scope.start.format_iso();
    let end = scope.end.format_iso();

    let connection = manager.acquire(AccessMode::ReadOnly)?;

    let mut statement = connection.prepare(
        "SELECT open_price, close_price, volume \
         FROM financial_data \
         WHERE symbol = ? AND date >= ? AND date <= ?",
    )?;
    let params: [&dyn ToSql; 3] = [&symbol, &start, &end];
    let mut rows = statement.query(params.as_slice())?;

    let mut totals = RangeTotals {
        open_sum: 0.0,
        close_sum: 0.0,
        volume_sum: 0,
        rows: 0,
    };
    while let Some(row) = rows.next()? {
        let open: String = row.get(0)?;
        let close: String = row.get(1)?;
        let volume: String = row.get(2)?;

        totals.open_sum += parse_stored_price("open_price", open)?;
        totals.close_sum += parse_stored_price("close_price", close)?;
        totals.volume_sum += parse_stored_volume(volume)?;
        totals.rows += 1;
    }

    Ok(totals)
}

fn read_entry(row: &Row<'_>) -> Result<DataEntry, StorageError> {
    let symbol: String = row.get(0)?;
    let date: String = row.get(1)?;
    let open_price: String = row.get(2)?;
    let close_price: String = row.get(3)?;
    let volume: String = row.get(4)?;

    let symbol = Symbol::new(symbol)?;
    let date = TradeDate::parse("date", &date)?;
    Ok(DataEntry::new(symbol, date, open_price, close_price, volume)?)
}

fn parse_stored_price(field: &'static str, value: String) -> Result<f64, StorageError> {
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(StorageError::MalformedRow(ValidationError::InvalidPrice {
            field,
            value,
        })),
    }
}

fn parse_stored_volume(value: String) -> Result<u64, StorageError> {
    value
        .parse::<u64>()
        .map_err(|_| StorageError::MalformedRow(ValidationError::InvalidVolume { value }))
}

fn round_to_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
