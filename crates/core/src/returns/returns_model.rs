use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{ConfigError, Error};
use crate::instruments::{Day, Exchange, Isin};

/// How a change between two closes is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeMode {
    /// `close[i] - close[i-1]`
    #[default]
    Absolute,
    /// `(close[i] - close[i-1]) / close[i-1] * 100`
    Percent,
}

impl fmt::Display for ChangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeMode::Absolute => f.write_str("absolute"),
            ChangeMode::Percent => f.write_str("percent"),
        }
    }
}

impl FromStr for ChangeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absolute" | "abs" => Ok(ChangeMode::Absolute),
            "percent" | "pct" | "%" => Ok(ChangeMode::Percent),
            other => Err(ConfigError::InvalidValue {
                key: "change mode".to_string(),
                value: other.to_string(),
            }
            .into()),
        }
    }
}

/// Sign of a change, for presenters that colour gains and losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeDirection {
    Up,
    Down,
    Flat,
    /// The change has no defined value.
    Unknown,
}

impl ChangeDirection {
    pub fn of(change: Option<Decimal>) -> Self {
        match change {
            None => ChangeDirection::Unknown,
            Some(v) if v > Decimal::ZERO => ChangeDirection::Up,
            Some(v) if v < Decimal::ZERO => ChangeDirection::Down,
            Some(_) => ChangeDirection::Flat,
        }
    }
}

/// Change at one observed date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChange {
    pub date: Day,
    pub close_price: Decimal,
    pub volume: u64,
    pub source_exchange: Exchange,
    /// Zero on the first date; None when undefined (zero prior close in
    /// percent mode).
    pub change: Option<Decimal>,
}

impl DailyChange {
    pub fn direction(&self) -> ChangeDirection {
        ChangeDirection::of(self.change)
    }
}

/// Returns for one instrument over the loaded window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnsRow {
    pub canonical_id: Option<Isin>,
    pub display_name: String,
    pub mode: ChangeMode,
    pub changes: Vec<DailyChange>,
    /// First to last observed close. None when undefined.
    pub total_change: Option<Decimal>,
}

impl ReturnsRow {
    pub fn total_direction(&self) -> ChangeDirection {
        ChangeDirection::of(self.total_change)
    }

    pub fn change_on(&self, date: Day) -> Option<&DailyChange> {
        self.changes.iter().find(|c| c.date == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_change_mode_from_str() {
        assert_eq!("Percent".parse::<ChangeMode>().unwrap(), ChangeMode::Percent);
        assert_eq!("abs".parse::<ChangeMode>().unwrap(), ChangeMode::Absolute);
        let err = "relative".parse::<ChangeMode>().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_change_direction() {
        assert_eq!(ChangeDirection::of(Some(dec!(0.01))), ChangeDirection::Up);
        assert_eq!(ChangeDirection::of(Some(dec!(-3))), ChangeDirection::Down);
        assert_eq!(ChangeDirection::of(Some(Decimal::ZERO)), ChangeDirection::Flat);
        assert_eq!(ChangeDirection::of(None), ChangeDirection::Unknown);
    }
}
