//! # Domain Models
//!
//! Strongly-typed domain values for daily price records.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Non-empty, case-sensitive ticker key |
//! | [`TradeDate`] | Strict ISO-8601 calendar date |
//! | [`DataEntry`] | One daily record (symbol, date, open, close, volume) |
//!
//! All three validate at construction time; invalid values never enter the
//! pipeline. Prices and volume stay textual end to end so stored values are
//! byte-identical to what the provider sent.

mod date;
mod entry;
mod symbol;

pub use date::TradeDate;
pub use entry::DataEntry;
pub use symbol::Symbol;
