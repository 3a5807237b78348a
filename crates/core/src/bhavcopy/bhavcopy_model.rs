use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{
    BSE_CLOSE, BSE_SCRIP_CODE, BSE_SCRIP_NAME, BSE_VOLUME, NSE_CLOSE, NSE_ISIN, NSE_SERIES,
    NSE_SYMBOL, NSE_VOLUME,
};
use crate::csv_parser::RawTable;
use crate::instruments::{Day, Exchange, Isin, ScripCode};

// =============================================================================
// Input
// =============================================================================

/// One exchange's bhavcopy for one trading day, not yet typed.
///
/// The trading date is attached by the data source; it is never inferred here.
#[derive(Debug, Clone)]
pub struct RawBatch {
    pub exchange: Exchange,
    pub trading_date: Day,
    pub table: RawTable,
}

impl RawBatch {
    pub fn new(exchange: Exchange, trading_date: Day, table: RawTable) -> Self {
        Self {
            exchange,
            trading_date,
            table,
        }
    }
}

/// Where a row's canonical identifier comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "column")]
pub enum IdentityColumn {
    /// The row carries its ISIN directly.
    NativeIsin(String),
    /// The row carries an exchange-local code that must go through the mapper.
    ScripCode(String),
}

/// Native column names of one exchange's bhavcopy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConvention {
    pub name: String,
    pub close: String,
    pub volume: String,
    pub identity: IdentityColumn,
    /// Segment marker column. Rows are filtered only when it is configured
    /// and present in the batch header.
    #[serde(default)]
    pub series: Option<String>,
}

impl ColumnConvention {
    /// Legacy NSE equity bhavcopy (`cmDDMONYYYYbhav.csv`).
    pub fn nse_legacy() -> Self {
        Self {
            name: NSE_SYMBOL.to_string(),
            close: NSE_CLOSE.to_string(),
            volume: NSE_VOLUME.to_string(),
            identity: IdentityColumn::NativeIsin(NSE_ISIN.to_string()),
            series: Some(NSE_SERIES.to_string()),
        }
    }

    /// Legacy BSE equity bhavcopy (`EQDDMMYY.CSV`).
    pub fn bse_legacy() -> Self {
        Self {
            name: BSE_SCRIP_NAME.to_string(),
            close: BSE_CLOSE.to_string(),
            volume: BSE_VOLUME.to_string(),
            identity: IdentityColumn::ScripCode(BSE_SCRIP_CODE.to_string()),
            series: None,
        }
    }

    pub fn legacy_for(exchange: Exchange) -> Self {
        match exchange {
            Exchange::Nse => Self::nse_legacy(),
            Exchange::Bse => Self::bse_legacy(),
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// One instrument's close and volume on one exchange for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    /// None when the identity could not be resolved.
    pub canonical_id: Option<Isin>,
    pub display_name: String,
    pub exchange: Exchange,
    /// Exchange-local code, kept for reporting unresolved instruments.
    pub exchange_code: Option<ScripCode>,
    pub close_price: Decimal,
    pub volume: u64,
    pub trading_date: Day,
}

impl DailyRecord {
    pub fn is_resolved(&self) -> bool {
        self.canonical_id.is_some()
    }
}

/// Why a row was dropped during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum RejectionReason {
    /// The batch header lacks a required column.
    MissingColumn(String),
    /// A required cell is blank.
    MissingField(String),
    InvalidPrice(String),
    InvalidVolume(String),
}

impl RejectionReason {
    /// Stable key used when counting rejections.
    pub fn kind(&self) -> &'static str {
        match self {
            RejectionReason::MissingColumn(_) => "missing_column",
            RejectionReason::MissingField(_) => "missing_field",
            RejectionReason::InvalidPrice(_) => "invalid_price",
            RejectionReason::InvalidVolume(_) => "invalid_volume",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::MissingColumn(col) => write!(f, "column '{}' is missing", col),
            RejectionReason::MissingField(col) => write!(f, "'{}' is blank", col),
            RejectionReason::InvalidPrice(raw) => write!(f, "invalid close price '{}'", raw),
            RejectionReason::InvalidVolume(raw) => write!(f, "invalid volume '{}'", raw),
        }
    }
}

/// A dropped row and the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRejection {
    pub exchange: Exchange,
    pub trading_date: Day,
    /// Zero-based data row index within the batch.
    pub row_index: usize,
    pub reason: RejectionReason,
}

/// Result of normalizing one batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBatch {
    pub records: Vec<DailyRecord>,
    pub rejections: Vec<RowRejection>,
    pub rows_read: usize,
    /// Rows outside the equity segment, discarded without error.
    pub filtered_non_equity: usize,
    /// Scrip-code records the resolver had no ISIN for.
    pub unresolved: usize,
    /// Native-ISIN records whose ISIN cell was blank or malformed.
    pub missing_isin: usize,
}

impl NormalizedBatch {
    /// Rejection counts keyed by [`RejectionReason::kind`].
    pub fn rejection_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for rejection in &self.rejections {
            *counts.entry(rejection.reason.kind()).or_insert(0) += 1;
        }
        counts
    }
}
