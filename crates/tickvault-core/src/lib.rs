//! Core contracts for tickvault.
//!
//! This crate contains:
//! - Validated domain types (symbol, trade date, daily entry)
//! - Alpha Vantage payload shapes and the daily-series fetch client
//! - The concurrent per-symbol fetch fan-out
//! - The pure normalizer that flattens payloads into entries

pub mod alphavantage;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod http_client;
pub mod normalize;

pub use alphavantage::{AlphaVantageClient, DailyBar, DailySeriesResponse};
pub use domain::{DataEntry, Symbol, TradeDate};
pub use error::{FetchError, ValidationError};
pub use fetch::{fetch_all, FetchBatch};
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use normalize::normalize;
