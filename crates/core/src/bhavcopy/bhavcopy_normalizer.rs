use log::{debug, warn};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::bhavcopy_model::{
    ColumnConvention, DailyRecord, IdentityColumn, NormalizedBatch, RawBatch, RejectionReason,
    RowRejection,
};
use crate::constants::EQUITY_SERIES;
use crate::identity::IdentityResolver;
use crate::instruments::{Exchange, Isin, ScripCode};

/// Converts raw bhavcopy rows into typed [`DailyRecord`]s.
///
/// - NSE rows outside the equity series are discarded
/// - NSE rows carry their ISIN; BSE scrip codes go through the resolver
/// - Unresolved BSE rows are still emitted, with no canonical id
/// - Rows with a bad price or volume are dropped with a recorded reason
pub struct BhavcopyNormalizer<'a> {
    resolver: &'a dyn IdentityResolver,
    nse_columns: ColumnConvention,
    bse_columns: ColumnConvention,
    equity_series: String,
}

/// Column positions of one batch, resolved once from its header.
struct ColumnIndexes {
    name: usize,
    close: usize,
    volume: usize,
    identity: usize,
    series: Option<usize>,
}

impl<'a> BhavcopyNormalizer<'a> {
    pub fn new(resolver: &'a dyn IdentityResolver) -> Self {
        Self {
            resolver,
            nse_columns: ColumnConvention::nse_legacy(),
            bse_columns: ColumnConvention::bse_legacy(),
            equity_series: EQUITY_SERIES.to_string(),
        }
    }

    pub fn with_columns(mut self, exchange: Exchange, columns: ColumnConvention) -> Self {
        match exchange {
            Exchange::Nse => self.nse_columns = columns,
            Exchange::Bse => self.bse_columns = columns,
        }
        self
    }

    pub fn with_equity_series(mut self, series: impl Into<String>) -> Self {
        self.equity_series = series.into();
        self
    }

    pub fn columns_for(&self, exchange: Exchange) -> &ColumnConvention {
        match exchange {
            Exchange::Nse => &self.nse_columns,
            Exchange::Bse => &self.bse_columns,
        }
    }

    /// Normalizes one batch. Never fails as a whole; bad rows are reported
    /// in the returned batch.
    pub fn normalize(&self, batch: &RawBatch) -> NormalizedBatch {
        let columns = self.columns_for(batch.exchange);
        let table = &batch.table;
        let mut out = NormalizedBatch {
            rows_read: table.row_count(),
            ..Default::default()
        };

        let indexes = match self.resolve_columns(batch, columns) {
            Ok(indexes) => indexes,
            Err(missing) => {
                warn!(
                    "{} bhavcopy for {}: column '{}' not found, dropping all {} rows",
                    batch.exchange,
                    batch.trading_date,
                    missing,
                    table.row_count()
                );
                out.rejections = (0..table.row_count())
                    .map(|row_index| RowRejection {
                        exchange: batch.exchange,
                        trading_date: batch.trading_date,
                        row_index,
                        reason: RejectionReason::MissingColumn(missing.clone()),
                    })
                    .collect();
                return out;
            }
        };

        for (row_index, row) in table.rows.iter().enumerate() {
            if let Some(series_idx) = indexes.series {
                if !cell(row, series_idx).eq_ignore_ascii_case(&self.equity_series) {
                    out.filtered_non_equity += 1;
                    continue;
                }
            }

            match self.normalize_row(batch, columns, &indexes, row) {
                Ok(record) => {
                    if !record.is_resolved() {
                        match record.exchange_code {
                            Some(_) => out.unresolved += 1,
                            None => out.missing_isin += 1,
                        }
                    }
                    out.records.push(record);
                }
                Err(reason) => out.rejections.push(RowRejection {
                    exchange: batch.exchange,
                    trading_date: batch.trading_date,
                    row_index,
                    reason,
                }),
            }
        }

        if !out.rejections.is_empty() {
            warn!(
                "{} bhavcopy for {}: dropped {} of {} rows {:?}",
                batch.exchange,
                batch.trading_date,
                out.rejections.len(),
                out.rows_read,
                out.rejection_counts()
            );
        }
        debug!(
            "{} bhavcopy for {}: {} records, {} non-equity, {} unresolved, {} without ISIN",
            batch.exchange,
            batch.trading_date,
            out.records.len(),
            out.filtered_non_equity,
            out.unresolved,
            out.missing_isin
        );

        out
    }

    fn resolve_columns(
        &self,
        batch: &RawBatch,
        columns: &ColumnConvention,
    ) -> std::result::Result<ColumnIndexes, String> {
        let table = &batch.table;
        let find = |name: &str| table.column_index(name).ok_or_else(|| name.to_string());

        let identity_column = match &columns.identity {
            IdentityColumn::NativeIsin(col) | IdentityColumn::ScripCode(col) => col,
        };

        Ok(ColumnIndexes {
            name: find(&columns.name)?,
            close: find(&columns.close)?,
            volume: find(&columns.volume)?,
            identity: find(identity_column)?,
            series: columns
                .series
                .as_deref()
                .and_then(|series| table.column_index(series)),
        })
    }

    fn normalize_row(
        &self,
        batch: &RawBatch,
        columns: &ColumnConvention,
        indexes: &ColumnIndexes,
        row: &[String],
    ) -> std::result::Result<DailyRecord, RejectionReason> {
        let close_price = parse_price(cell(row, indexes.close), &columns.close)?;
        let volume = parse_volume(cell(row, indexes.volume), &columns.volume)?;

        let raw_identity = cell(row, indexes.identity);
        let (canonical_id, exchange_code) = match &columns.identity {
            IdentityColumn::NativeIsin(_) => (Isin::parse(raw_identity), None),
            IdentityColumn::ScripCode(col) => {
                let code = ScripCode::new(raw_identity)
                    .ok_or_else(|| RejectionReason::MissingField(col.clone()))?;
                let resolved = self.resolver.resolve(&code, batch.exchange).cloned();
                if resolved.is_none() {
                    debug!("{} scrip code {} is unresolved", batch.exchange, code);
                }
                (resolved, Some(code))
            }
        };

        let native_name = cell(row, indexes.name);
        let display_name = if !native_name.is_empty() {
            native_name.to_string()
        } else if let Some(code) = &exchange_code {
            code.to_string()
        } else if !raw_identity.is_empty() {
            raw_identity.to_string()
        } else {
            return Err(RejectionReason::MissingField(columns.name.clone()));
        };

        Ok(DailyRecord {
            canonical_id,
            display_name,
            exchange: batch.exchange,
            exchange_code,
            close_price,
            volume,
            trading_date: batch.trading_date,
        })
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|c| c.trim()).unwrap_or("")
}

fn parse_price(raw: &str, column: &str) -> std::result::Result<Decimal, RejectionReason> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RejectionReason::MissingField(column.to_string()));
    }
    match Decimal::from_str(trimmed) {
        Ok(price) if price >= Decimal::ZERO => Ok(price),
        _ => Err(RejectionReason::InvalidPrice(trimmed.to_string())),
    }
}

/// Volumes are whole share counts; "1200.0" is accepted, "12.5" is not.
fn parse_volume(raw: &str, column: &str) -> std::result::Result<u64, RejectionReason> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RejectionReason::MissingField(column.to_string()));
    }
    if let Ok(volume) = trimmed.parse::<u64>() {
        return Ok(volume);
    }
    Decimal::from_str(trimmed)
        .ok()
        .filter(|v| v.fract().is_zero())
        .and_then(|v| v.to_u64())
        .ok_or_else(|| RejectionReason::InvalidVolume(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(" 2450.50 ", "CLOSE"), Ok(dec!(2450.50)));
        assert_eq!(parse_price("0", "CLOSE"), Ok(Decimal::ZERO));
        assert_eq!(
            parse_price("", "CLOSE"),
            Err(RejectionReason::MissingField("CLOSE".to_string()))
        );
        assert_eq!(
            parse_price("-", "CLOSE"),
            Err(RejectionReason::InvalidPrice("-".to_string()))
        );
        assert_eq!(
            parse_price("-10", "CLOSE"),
            Err(RejectionReason::InvalidPrice("-10".to_string()))
        );
    }

    #[test]
    fn test_parse_volume() {
        assert_eq!(parse_volume("1200", "TOTTRDQTY"), Ok(1200));
        assert_eq!(parse_volume("1200.0", "TOTTRDQTY"), Ok(1200));
        assert_eq!(
            parse_volume("12.5", "TOTTRDQTY"),
            Err(RejectionReason::InvalidVolume("12.5".to_string()))
        );
        assert_eq!(
            parse_volume("-5", "TOTTRDQTY"),
            Err(RejectionReason::InvalidVolume("-5".to_string()))
        );
        assert_eq!(
            parse_volume(" ", "TOTTRDQTY"),
            Err(RejectionReason::MissingField("TOTTRDQTY".to_string()))
        );
    }
}
