use serde::Serialize;

use crate::domain::{Symbol, TradeDate};
use crate::error::ValidationError;

/// One flattened daily record, the atomic unit of ingestion and querying.
///
/// Prices and volume are carried as the provider's exact text. Validation
/// only proves the text is numeric; no parse-and-reformat happens on the
/// write path, so `"101.50"` is stored as `"101.50"`, not `"101.5"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataEntry {
    pub symbol: Symbol,
    pub date: TradeDate,
    pub open_price: String,
    pub close_price: String,
    pub volume: String,
}

impl DataEntry {
    pub fn new(
        symbol: Symbol,
        date: TradeDate,
        open_price: impl Into<String>,
        close_price: impl Into<String>,
        volume: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let open_price = validate_price("open_price", open_price.into())?;
        let close_price = validate_price("close_price", close_price.into())?;
        let volume = validate_volume(volume.into())?;

        Ok(Self {
            symbol,
            date,
            open_price,
            close_price,
            volume,
        })
    }
}

fn validate_price(field: &'static str, value: String) -> Result<String, ValidationError> {
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(value),
        _ => Err(ValidationError::InvalidPrice { field, value }),
    }
}

fn validate_volume(value: String) -> Result<String, ValidationError> {
    if value.parse::<u64>().is_err() {
        return Err(ValidationError::InvalidVolume { value });
    }
    Ok(value)
}
