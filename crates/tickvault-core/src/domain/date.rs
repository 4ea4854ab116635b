use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use crate::error::ValidationError;

const ISO_DATE: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Calendar date of one trading day, carried as strict ISO-8601 `YYYY-MM-DD`.
///
/// Ordering is chronological, so a descending sort of `TradeDate`s yields
/// most-recent-first regardless of how the provider keyed its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradeDate(Date);

impl TradeDate {
    /// Parses `YYYY-MM-DD`, threading the originating field name into the
    /// error so boundary validation can report which input was malformed.
    pub fn parse(field: &'static str, value: &str) -> Result<Self, ValidationError> {
        let parsed = Date::parse(value, ISO_DATE).map_err(|_| ValidationError::InvalidDate {
            field,
            value: value.to_owned(),
        })?;

        Ok(Self(parsed))
    }

    pub fn into_inner(self) -> Date {
        self.0
    }

    pub fn format_iso(self) -> String {
        self.0
            .format(ISO_DATE)
            .expect("TradeDate must be ISO formattable")
    }
}

impl Display for TradeDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_iso())
    }
}

impl Serialize for TradeDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_iso())
    }
}

impl<'de> Deserialize<'de> for TradeDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse("date", &value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        let parsed = TradeDate::parse("date", "2024-01-01").expect("must parse");
        assert_eq!(parsed.format_iso(), "2024-01-01");
    }

    #[test]
    fn rejects_malformed_date() {
        let err = TradeDate::parse("start_date", "01/02/2024").expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::InvalidDate {
                field: "start_date",
                value: "01/02/2024".to_owned(),
            }
        );
    }

    #[test]
    fn rejects_impossible_calendar_date() {
        assert!(TradeDate::parse("date", "2024-02-30").is_err());
        assert!(TradeDate::parse("date", "2024-13-01").is_err());
    }

    #[test]
    fn orders_chronologically() {
        let older = TradeDate::parse("date", "2024-01-31").unwrap();
        let newer = TradeDate::parse("date", "2024-02-01").unwrap();
        assert!(older < newer);
    }

    #[test]
    fn zero_pads_when_formatting() {
        let date = TradeDate::parse("date", "2024-03-05").unwrap();
        assert_eq!(date.to_string(), "2024-03-05");
    }
}
