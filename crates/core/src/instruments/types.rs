//! Strong types for instrument identity.
//!
//! These types keep exchange-local codes and canonical identifiers apart:
//! - `ScripCode` - exchange-local code, not portable across exchanges
//! - `Isin` - canonical identifier, validated on construction
//! - `Exchange` - the reporting exchange, ordered by price authority
//! - `Day` - trading date bucket

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};

// =============================================================================
// Exchange
// =============================================================================

/// Exchange that published a bhavcopy.
///
/// NSE is the authoritative price source whenever both exchanges report the
/// same instrument on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    Nse,
    Bse,
}

impl Exchange {
    /// Preference rank for tie-breaking. Lower wins.
    pub fn preference_rank(&self) -> u8 {
        match self {
            Exchange::Nse => 0,
            Exchange::Bse => 1,
        }
    }

    /// Returns true if `self` wins a tie-break against `other`.
    pub fn is_preferred_over(&self, other: &Exchange) -> bool {
        self.preference_rank() < other.preference_rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Nse => "NSE",
            Exchange::Bse => "BSE",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NSE" => Ok(Exchange::Nse),
            "BSE" => Ok(Exchange::Bse),
            other => Err(ValidationError::InvalidInput(format!("Unknown exchange: {}", other)).into()),
        }
    }
}

// =============================================================================
// Isin
// =============================================================================

/// International Securities Identification Number.
///
/// Format: two-letter country prefix, nine alphanumerics, one check digit.
/// The check digit itself is not verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Isin(String);

impl Isin {
    pub const LEN: usize = 12;

    /// Parses an ISIN, normalizing surrounding whitespace and case.
    /// Returns None for blank or malformed input.
    pub fn parse(raw: &str) -> Option<Self> {
        let candidate = raw.trim().to_ascii_uppercase();
        if Self::is_well_formed(&candidate) {
            Some(Self(candidate))
        } else {
            None
        }
    }

    fn is_well_formed(s: &str) -> bool {
        let bytes = s.as_bytes();
        bytes.len() == Self::LEN
            && bytes[..2].iter().all(u8::is_ascii_uppercase)
            && bytes[2..11].iter().all(u8::is_ascii_alphanumeric)
            && bytes[11].is_ascii_digit()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Isin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Isin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// ScripCode
// =============================================================================

/// Exchange-local instrument code (e.g. BSE "500325").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScripCode(String);

impl ScripCode {
    /// Creates a scrip code from raw text. Returns None when blank.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScripCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Day
// =============================================================================

/// A single trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Day(pub NaiveDate);

impl Day {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Creates a Day from year, month, day components.
    /// Returns None if the date is invalid.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Parses a day from "YYYY-MM-DD" format.
    pub fn parse(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok().map(Self)
    }

    /// Parses a day from compact "YYYYMMDD" format, as used in bhavcopy file names.
    pub fn parse_compact(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y%m%d").ok().map(Self)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for Day {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nse_preferred_over_bse() {
        assert!(Exchange::Nse.is_preferred_over(&Exchange::Bse));
        assert!(!Exchange::Bse.is_preferred_over(&Exchange::Nse));
        assert!(!Exchange::Nse.is_preferred_over(&Exchange::Nse));
    }

    #[test]
    fn test_exchange_from_str() {
        assert_eq!("nse".parse::<Exchange>().unwrap(), Exchange::Nse);
        assert_eq!(" BSE ".parse::<Exchange>().unwrap(), Exchange::Bse);
        assert!("MCX".parse::<Exchange>().is_err());
    }

    #[test]
    fn test_isin_parse() {
        let isin = Isin::parse(" ine002a01018 ").unwrap();
        assert_eq!(isin.as_str(), "INE002A01018");

        assert!(Isin::parse("").is_none());
        assert!(Isin::parse("INE002A0101").is_none()); // too short
        assert!(Isin::parse("1NE002A01018").is_none()); // numeric country
        assert!(Isin::parse("INE002A0101X").is_none()); // non-digit check
    }

    #[test]
    fn test_scrip_code_blank() {
        assert!(ScripCode::new("   ").is_none());
        assert_eq!(ScripCode::new(" 500325 ").unwrap().as_str(), "500325");
    }

    #[test]
    fn test_day_parsing() {
        let day = Day::parse_compact("20250903").unwrap();
        assert_eq!(day.to_string(), "2025-09-03");
        assert_eq!(Day::parse("2025-09-03"), Some(day));
        assert!(Day::parse_compact("20251340").is_none());
    }

    #[test]
    fn test_day_ordering() {
        let a = Day::from_ymd(2025, 9, 1).unwrap();
        let b = Day::from_ymd(2025, 9, 2).unwrap();
        assert!(a < b);
    }
}
