use log::{debug, warn};
use std::collections::HashMap;

use super::identity_model::{InstrumentIdentity, MappingColumns, MappingLoadReport};
use super::identity_traits::IdentityResolver;
use crate::csv_parser::RawTable;
use crate::errors::{ConfigError, Result};
use crate::instruments::{Exchange, Isin, ScripCode};

/// In-memory scrip code to ISIN lookup.
///
/// Lookups are exact key matches on `(exchange, code)`. Tables for several
/// exchanges may be loaded into the same mapper.
#[derive(Debug, Clone, Default)]
pub struct IdentityMapper {
    entries: HashMap<(Exchange, ScripCode), InstrumentIdentity>,
    report: MappingLoadReport,
}

impl IdentityMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapper from a single exchange's mapping table.
    pub fn from_table(table: &RawTable, exchange: Exchange, columns: &MappingColumns) -> Result<Self> {
        let mut mapper = Self::new();
        mapper.load_table(table, exchange, columns)?;
        Ok(mapper)
    }

    /// Loads a mapping table for `exchange`.
    ///
    /// A table without the code or ISIN column is a configuration error.
    /// Bad rows are skipped and counted in the returned report.
    pub fn load_table(
        &mut self,
        table: &RawTable,
        exchange: Exchange,
        columns: &MappingColumns,
    ) -> Result<MappingLoadReport> {
        let code_idx = table
            .column_index(&columns.code)
            .ok_or_else(|| ConfigError::MissingMappingColumn(columns.code.clone()))?;
        let isin_idx = table
            .column_index(&columns.isin)
            .ok_or_else(|| ConfigError::MissingMappingColumn(columns.isin.clone()))?;
        let name_idx = table.column_index(&columns.name);

        let mut report = MappingLoadReport::default();

        for row in &table.rows {
            let Some(code) = ScripCode::new(&row[code_idx]) else {
                report.malformed += 1;
                continue;
            };

            let raw_isin = row[isin_idx].trim();
            let canonical_id = if raw_isin.is_empty() {
                None
            } else {
                match Isin::parse(raw_isin) {
                    Some(isin) => Some(isin),
                    None => {
                        debug!("Skipping mapping row for {}: malformed ISIN '{}'", code, raw_isin);
                        report.malformed += 1;
                        continue;
                    }
                }
            };

            let display_name = name_idx
                .map(|idx| row[idx].trim().to_string())
                .unwrap_or_default();

            let key = (exchange, code);
            match self.entries.get(&key) {
                Some(existing) if existing.canonical_id == canonical_id => {
                    report.duplicates += 1;
                }
                Some(existing) => {
                    warn!(
                        "Conflicting mapping for {} {}: keeping {:?}, ignoring {:?}",
                        exchange,
                        key.1,
                        existing.canonical_id.as_ref().map(Isin::as_str),
                        canonical_id.as_ref().map(Isin::as_str)
                    );
                    report.conflicting += 1;
                }
                None => {
                    let identity = InstrumentIdentity {
                        exchange,
                        exchange_code: key.1.clone(),
                        canonical_id,
                        display_name,
                    };
                    self.entries.insert(key, identity);
                    report.loaded += 1;
                }
            }
        }

        if report.skipped() > 0 {
            warn!(
                "{} mapping: loaded {} entries, skipped {} (duplicates {}, conflicting {}, malformed {})",
                exchange,
                report.loaded,
                report.skipped(),
                report.duplicates,
                report.conflicting,
                report.malformed
            );
        }

        self.report.merge(&report);
        Ok(report)
    }

    /// Returns the full mapping entry for a code, if any.
    pub fn identity(&self, code: &ScripCode, exchange: Exchange) -> Option<&InstrumentIdentity> {
        self.entries.get(&(exchange, code.clone()))
    }

    /// Returns true if at least one entry was loaded for `exchange`.
    pub fn covers(&self, exchange: Exchange) -> bool {
        self.entries.keys().any(|(ex, _)| *ex == exchange)
    }

    /// Cumulative load report across all tables.
    pub fn report(&self) -> &MappingLoadReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IdentityResolver for IdentityMapper {
    fn resolve(&self, code: &ScripCode, exchange: Exchange) -> Option<&Isin> {
        self.identity(code, exchange)
            .and_then(|identity| identity.canonical_id.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    fn mapping_table(rows: Vec<Vec<&str>>) -> RawTable {
        RawTable::from_rows(["SC_CODE", "SC_NAME", "ISIN"], rows)
    }

    fn code(raw: &str) -> ScripCode {
        ScripCode::new(raw).unwrap()
    }

    #[test]
    fn test_resolve_known_code() {
        let table = mapping_table(vec![
            vec!["500325", "RELIANCE", "INE002A01018"],
            vec!["532540", "TCS", "INE467B01029"],
        ]);
        let mapper = IdentityMapper::from_table(&table, Exchange::Bse, &MappingColumns::default())
            .unwrap();

        assert_eq!(mapper.len(), 2);
        assert_eq!(
            mapper.resolve(&code("500325"), Exchange::Bse).map(Isin::as_str),
            Some("INE002A01018")
        );
        assert_eq!(
            mapper.identity(&code("532540"), Exchange::Bse).unwrap().display_name,
            "TCS"
        );
    }

    #[test]
    fn test_unknown_code_is_unresolved() {
        let table = mapping_table(vec![vec!["500325", "RELIANCE", "INE002A01018"]]);
        let mapper = IdentityMapper::from_table(&table, Exchange::Bse, &MappingColumns::default())
            .unwrap();

        assert!(mapper.resolve(&code("999999"), Exchange::Bse).is_none());
        // The table belongs to BSE only
        assert!(mapper.resolve(&code("500325"), Exchange::Nse).is_none());
    }

    #[test]
    fn test_blank_isin_is_kept_but_unresolved() {
        let table = mapping_table(vec![vec!["500001", "UNLISTED CO", " "]]);
        let mapper = IdentityMapper::from_table(&table, Exchange::Bse, &MappingColumns::default())
            .unwrap();

        assert_eq!(mapper.len(), 1);
        assert!(mapper.identity(&code("500001"), Exchange::Bse).is_some());
        assert!(mapper.resolve(&code("500001"), Exchange::Bse).is_none());
    }

    #[test]
    fn test_duplicates_and_conflicts() {
        let table = mapping_table(vec![
            vec!["500325", "RELIANCE", "INE002A01018"],
            vec!["500325", "RELIANCE", "INE002A01018"],
            vec!["500325", "RELIANCE IND", "INE002A01018"],
            vec!["500325", "OTHER", "INE467B01029"],
        ]);
        let mapper = IdentityMapper::from_table(&table, Exchange::Bse, &MappingColumns::default())
            .unwrap();

        let report = mapper.report();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.duplicates, 2);
        assert_eq!(report.conflicting, 1);
        assert_eq!(
            mapper.resolve(&code("500325"), Exchange::Bse).map(Isin::as_str),
            Some("INE002A01018")
        );
    }

    #[test]
    fn test_malformed_rows_are_counted() {
        let table = mapping_table(vec![
            vec!["", "NO CODE", "INE002A01018"],
            vec!["500325", "BAD ISIN", "NOT-AN-ISIN"],
            vec!["532540", "TCS", "INE467B01029"],
        ]);
        let mapper = IdentityMapper::from_table(&table, Exchange::Bse, &MappingColumns::default())
            .unwrap();

        assert_eq!(mapper.report().malformed, 2);
        assert_eq!(mapper.report().loaded, 1);
    }

    #[test]
    fn test_missing_code_column_is_config_error() {
        let table = RawTable::from_rows(["CODE", "ISIN"], vec![vec!["500325", "INE002A01018"]]);
        let err = IdentityMapper::from_table(&table, Exchange::Bse, &MappingColumns::default())
            .unwrap_err();

        assert!(err.is_fatal());
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingMappingColumn(ref c)) if c == "SC_CODE"
        ));
    }

    #[test]
    fn test_name_column_is_optional() {
        let table = RawTable::from_rows(["SC_CODE", "ISIN"], vec![vec!["500325", "INE002A01018"]]);
        let mapper = IdentityMapper::from_table(&table, Exchange::Bse, &MappingColumns::default())
            .unwrap();

        assert!(mapper.covers(Exchange::Bse));
        assert!(!mapper.covers(Exchange::Nse));
        assert_eq!(mapper.identity(&code("500325"), Exchange::Bse).unwrap().display_name, "");
    }
}
