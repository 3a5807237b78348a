//! Delimited-text export of returns tables.
//!
//! Wide layout: one row per instrument, one column per date in the union of
//! all observed dates. An empty cell means the instrument has no observation
//! on that date; `NA` means the change is undefined.
//!
//! Long layout: one row per (instrument, date) observation.

use csv::WriterBuilder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use super::returns_model::ReturnsRow;
use crate::constants::NO_VALUE_MARKER;
use crate::csv_parser::{parse_csv, ParseConfig};
use crate::errors::{ConfigError, Error, Result, ValidationError};
use crate::instruments::{Day, Isin};

const ISIN_HEADER: &str = "isin";
const NAME_HEADER: &str = "name";
const TOTAL_HEADER: &str = "total_change";

/// Shape of an exported returns table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportLayout {
    #[default]
    Wide,
    Long,
}

impl fmt::Display for ExportLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportLayout::Wide => f.write_str("wide"),
            ExportLayout::Long => f.write_str("long"),
        }
    }
}

impl FromStr for ExportLayout {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wide" => Ok(ExportLayout::Wide),
            "long" => Ok(ExportLayout::Long),
            other => Err(ConfigError::InvalidValue {
                key: "export layout".to_string(),
                value: other.to_string(),
            }
            .into()),
        }
    }
}

fn format_change(change: Option<Decimal>) -> String {
    match change {
        Some(value) => value.normalize().to_string(),
        None => NO_VALUE_MARKER.to_string(),
    }
}

fn parse_change(raw: &str) -> Result<Option<Decimal>> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case(NO_VALUE_MARKER) {
        return Ok(None);
    }
    Ok(Some(Decimal::from_str(trimmed)?))
}

/// Writes `rows` in the wide layout.
pub fn write_wide<W: Write>(rows: &[ReturnsRow], writer: W, delimiter: u8) -> Result<()> {
    let dates: BTreeSet<Day> = rows
        .iter()
        .flat_map(|row| row.changes.iter().map(|c| c.date))
        .collect();

    let mut out = WriterBuilder::new().delimiter(delimiter).from_writer(writer);

    let mut header = Vec::with_capacity(dates.len() + 3);
    header.push(ISIN_HEADER.to_string());
    header.push(NAME_HEADER.to_string());
    header.extend(dates.iter().map(Day::to_string));
    header.push(TOTAL_HEADER.to_string());
    out.write_record(&header)?;

    for row in rows {
        let mut record = Vec::with_capacity(header.len());
        record.push(
            row.canonical_id
                .as_ref()
                .map(Isin::to_string)
                .unwrap_or_default(),
        );
        record.push(row.display_name.clone());
        for date in &dates {
            record.push(match row.change_on(*date) {
                Some(daily) => format_change(daily.change),
                None => String::new(),
            });
        }
        record.push(format_change(row.total_change));
        out.write_record(&record)?;
    }

    out.flush()?;
    Ok(())
}

/// A row read back from a wide export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedRow {
    pub canonical_id: Option<Isin>,
    pub display_name: String,
    /// Only dates with an observation are present.
    pub changes: BTreeMap<Day, Option<Decimal>>,
    pub total_change: Option<Decimal>,
}

/// Reads a wide export back.
pub fn read_wide(content: &[u8], config: &ParseConfig) -> Result<Vec<ExportedRow>> {
    let table = parse_csv(content, config)?;
    let headers = &table.headers;

    let shape_ok = headers.len() >= 3
        && headers[0].eq_ignore_ascii_case(ISIN_HEADER)
        && headers[1].eq_ignore_ascii_case(NAME_HEADER)
        && headers[headers.len() - 1].eq_ignore_ascii_case(TOTAL_HEADER);
    if !shape_ok {
        return Err(ValidationError::InvalidInput(format!(
            "not a wide returns export: header {:?}",
            headers
        ))
        .into());
    }

    let date_columns = headers[2..headers.len() - 1]
        .iter()
        .map(|h| {
            Day::parse(h).ok_or_else(|| {
                Error::from(ValidationError::InvalidInput(format!("invalid date column '{}'", h)))
            })
        })
        .collect::<Result<Vec<Day>>>()?;

    let mut rows = Vec::with_capacity(table.row_count());
    for row in &table.rows {
        let raw_isin = row[0].trim();
        let canonical_id = if raw_isin.is_empty() {
            None
        } else {
            Some(Isin::parse(raw_isin).ok_or_else(|| {
                ValidationError::InvalidInput(format!("invalid ISIN '{}'", raw_isin))
            })?)
        };

        let mut changes = BTreeMap::new();
        for (offset, date) in date_columns.iter().enumerate() {
            let cell = row[offset + 2].trim();
            if !cell.is_empty() {
                changes.insert(*date, parse_change(cell)?);
            }
        }

        rows.push(ExportedRow {
            canonical_id,
            display_name: row[1].trim().to_string(),
            changes,
            total_change: parse_change(&row[headers.len() - 1])?,
        });
    }

    Ok(rows)
}

/// One observation in the long layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongExportRow {
    pub isin: String,
    pub name: String,
    pub date: String,
    pub exchange: String,
    pub close: String,
    pub volume: u64,
    pub daily_change: String,
    pub total_change: String,
}

impl LongExportRow {
    pub fn from_row(row: &ReturnsRow) -> Vec<LongExportRow> {
        let isin = row
            .canonical_id
            .as_ref()
            .map(Isin::to_string)
            .unwrap_or_default();
        let total = format_change(row.total_change);
        row.changes
            .iter()
            .map(|change| LongExportRow {
                isin: isin.clone(),
                name: row.display_name.clone(),
                date: change.date.to_string(),
                exchange: change.source_exchange.to_string(),
                close: change.close_price.to_string(),
                volume: change.volume,
                daily_change: format_change(change.change),
                total_change: total.clone(),
            })
            .collect()
    }
}

/// Writes `rows` in the long layout.
pub fn write_long<W: Write>(rows: &[ReturnsRow], writer: W, delimiter: u8) -> Result<()> {
    let mut out = WriterBuilder::new().delimiter(delimiter).from_writer(writer);
    for row in rows {
        for record in LongExportRow::from_row(row) {
            out.serialize(record)?;
        }
    }
    out.flush()?;
    Ok(())
}
