use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::bhavcopy::{ColumnConvention, NormalizedBatch};
use crate::constants::EQUITY_SERIES;
use crate::errors::{ConfigError, Error, Result};
use crate::identity::{MappingColumns, MappingLoadReport};
use crate::returns::{ChangeMode, ReturnsRow};

// =============================================================================
// Configuration
// =============================================================================

/// What happens to series that could not be given an ISIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Report them in a separate table, keyed by display name.
    #[default]
    Keep,
    /// Discard them; only the count is reported.
    Drop,
}

impl fmt::Display for UnmatchedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedPolicy::Keep => f.write_str("keep"),
            UnmatchedPolicy::Drop => f.write_str("drop"),
        }
    }
}

impl FromStr for UnmatchedPolicy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(UnmatchedPolicy::Keep),
            "drop" => Ok(UnmatchedPolicy::Drop),
            other => Err(ConfigError::InvalidValue {
                key: "unmatched policy".to_string(),
                value: other.to_string(),
            }
            .into()),
        }
    }
}

/// Settings of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub change_mode: ChangeMode,
    pub unmatched_policy: UnmatchedPolicy,
    /// NSE series marker of equity rows.
    pub equity_series: String,
    pub nse_columns: ColumnConvention,
    pub bse_columns: ColumnConvention,
    pub mapping_columns: MappingColumns,
    /// Field delimiter of input and exported files.
    pub delimiter: char,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            change_mode: ChangeMode::default(),
            unmatched_policy: UnmatchedPolicy::default(),
            equity_series: EQUITY_SERIES.to_string(),
            nse_columns: ColumnConvention::nse_legacy(),
            bse_columns: ColumnConvention::bse_legacy(),
            mapping_columns: MappingColumns::default(),
            delimiter: ',',
        }
    }
}

impl PipelineConfig {
    /// Parses a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.equity_series.trim().is_empty() {
            return Err(invalid("equitySeries", &self.equity_series));
        }
        if !self.delimiter.is_ascii() || self.delimiter == '"' || self.delimiter == '\n' {
            return Err(invalid("delimiter", &self.delimiter.to_string()));
        }
        for columns in [&self.nse_columns, &self.bse_columns] {
            let names = [&columns.name, &columns.close, &columns.volume];
            if let Some(blank) = names.iter().find(|n| n.trim().is_empty()) {
                return Err(invalid("columns", blank));
            }
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}

fn invalid(key: &str, value: &str) -> Error {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}

// =============================================================================
// Output
// =============================================================================

/// Counters collected over one run. Nothing here aborts the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDiagnostics {
    pub batches: usize,
    pub rows_read: usize,
    pub filtered_non_equity: usize,
    /// Dropped rows keyed by rejection kind.
    pub dropped_rows: BTreeMap<String, usize>,
    /// BSE scrip codes with no ISIN in the mapping table.
    pub unresolved: usize,
    /// NSE rows whose ISIN was blank or malformed.
    pub missing_isin: usize,
    pub superseded: usize,
    pub duplicates: usize,
    /// Unmatched series discarded under [`UnmatchedPolicy::Drop`].
    pub unmatched_dropped: usize,
    pub mapping_malformed: usize,
    pub mapping_duplicates: usize,
    pub mapping_conflicting: usize,
}

impl PipelineDiagnostics {
    pub(crate) fn record_batch(&mut self, batch: &NormalizedBatch) {
        self.batches += 1;
        self.rows_read += batch.rows_read;
        self.filtered_non_equity += batch.filtered_non_equity;
        self.unresolved += batch.unresolved;
        self.missing_isin += batch.missing_isin;
        for (kind, count) in batch.rejection_counts() {
            *self.dropped_rows.entry(kind.to_string()).or_insert(0) += count;
        }
    }

    pub(crate) fn record_mapping(&mut self, report: &MappingLoadReport) {
        self.mapping_malformed = report.malformed;
        self.mapping_duplicates = report.duplicates;
        self.mapping_conflicting = report.conflicting;
    }

    pub fn total_dropped(&self) -> usize {
        self.dropped_rows.values().sum()
    }

    /// Human-readable lines for every non-zero problem counter.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (kind, count) in &self.dropped_rows {
            out.push(format!("{} rows dropped: {}", count, kind));
        }
        let counters = [
            (self.unresolved, "records with an unresolved scrip code"),
            (self.missing_isin, "records without a valid native ISIN"),
            (self.unmatched_dropped, "unmatched series discarded"),
            (self.mapping_malformed, "malformed mapping rows skipped"),
            (self.mapping_duplicates, "duplicate mapping rows ignored"),
            (self.mapping_conflicting, "conflicting mapping rows ignored"),
            (self.duplicates, "same-exchange duplicate records discarded"),
        ];
        for (count, label) in counters {
            if count > 0 {
                out.push(format!("{} {}", count, label));
            }
        }
        out
    }
}

/// Result of a run, handed to a [`ReturnsSink`](super::ReturnsSink).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub change_mode: ChangeMode,
    /// ISIN-keyed rows, ordered by ISIN.
    pub rows: Vec<ReturnsRow>,
    /// Rows with no canonical id, ordered by display name.
    pub unmatched_rows: Vec<ReturnsRow>,
    pub diagnostics: PipelineDiagnostics,
}

impl PipelineOutput {
    /// Matched rows followed by unmatched rows.
    pub fn all_rows(&self) -> impl Iterator<Item = &ReturnsRow> {
        self.rows.iter().chain(self.unmatched_rows.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.unmatched_rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config = PipelineConfig::from_json("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.delimiter_byte(), b',');
    }

    #[test]
    fn test_config_from_json() {
        let config = PipelineConfig::from_json(
            r#"{
                "changeMode": "percent",
                "unmatchedPolicy": "drop",
                "delimiter": ";",
                "mappingColumns": { "code": "SCRIP_CD" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.change_mode, ChangeMode::Percent);
        assert_eq!(config.unmatched_policy, UnmatchedPolicy::Drop);
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.mapping_columns.code, "SCRIP_CD");
        assert_eq!(config.mapping_columns.isin, "ISIN");
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let err = PipelineConfig::from_json(r#"{"changeMode": "log"}"#).unwrap_err();
        assert!(err.is_fatal());

        let err = PipelineConfig::from_json(r#"{"equitySeries": "  "}"#).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_unmatched_policy_from_str() {
        assert_eq!("DROP".parse::<UnmatchedPolicy>().unwrap(), UnmatchedPolicy::Drop);
        assert!("discard".parse::<UnmatchedPolicy>().is_err());
    }

    #[test]
    fn test_diagnostics_warnings() {
        let mut diagnostics = PipelineDiagnostics::default();
        assert!(diagnostics.warnings().is_empty());

        diagnostics.dropped_rows.insert("invalid_price".to_string(), 2);
        diagnostics.unresolved = 1;
        diagnostics.missing_isin = 3;
        let warnings = diagnostics.warnings();

        assert_eq!(diagnostics.total_dropped(), 2);
        assert_eq!(
            warnings,
            vec![
                "2 rows dropped: invalid_price".to_string(),
                "1 records with an unresolved scrip code".to_string(),
                "3 records without a valid native ISIN".to_string(),
            ]
        );
    }
}
