//! Sinks for the finished returns table.

use rust_decimal::Decimal;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use bhavcopy_core::constants::{DISPLAY_DECIMAL_PRECISION, NO_VALUE_MARKER};
use bhavcopy_core::errors::{Error, Result};
use bhavcopy_core::returns::{write_long, write_wide, ChangeDirection, ExportLayout};
use bhavcopy_core::{ChangeMode, PipelineOutput, ReturnsRow, ReturnsSink};

const HEADERS: [&str; 7] = ["ISIN", "NAME", "DATE", "EXCHANGE", "CLOSE", "DAILY_CHANGE", "TOTAL_CHANGE"];

fn marker(direction: ChangeDirection) -> &'static str {
    match direction {
        ChangeDirection::Up => "▲",
        ChangeDirection::Down => "▼",
        ChangeDirection::Flat => "=",
        ChangeDirection::Unknown => " ",
    }
}

/// Change rounded for display, with a direction marker.
pub fn format_change(change: Option<Decimal>, mode: ChangeMode) -> String {
    let direction = ChangeDirection::of(change);
    match change {
        None => format!("{} {}", marker(direction), NO_VALUE_MARKER),
        Some(value) => {
            let rounded = value.round_dp(DISPLAY_DECIMAL_PRECISION);
            let suffix = if mode == ChangeMode::Percent { "%" } else { "" };
            format!(
                "{} {:.prec$}{}",
                marker(direction),
                rounded,
                suffix,
                prec = DISPLAY_DECIMAL_PRECISION as usize
            )
        }
    }
}

/// Renders the table as aligned text, one line per observation.
pub struct TableSink<W: Write> {
    out: W,
}

impl<W: Write> TableSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn cells(row: &ReturnsRow, mode: ChangeMode) -> Vec<[String; 7]> {
        let isin = row
            .canonical_id
            .as_ref()
            .map(|isin| isin.to_string())
            .unwrap_or_else(|| "-".to_string());
        let total = format_change(row.total_change, mode);
        row.changes
            .iter()
            .map(|change| {
                [
                    isin.clone(),
                    row.display_name.clone(),
                    change.date.to_string(),
                    change.source_exchange.to_string(),
                    change.close_price.to_string(),
                    format_change(change.change, mode),
                    total.clone(),
                ]
            })
            .collect()
    }

    fn write_section(&mut self, title: &str, rows: &[ReturnsRow], mode: ChangeMode) -> std::io::Result<()> {
        writeln!(self.out, "{} ({} instruments, {} change)", title, rows.len(), mode)?;
        let lines: Vec<[String; 7]> = rows.iter().flat_map(|row| Self::cells(row, mode)).collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for line in &lines {
            for (width, cell) in widths.iter_mut().zip(line.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header = HEADERS.map(str::to_string);
        for line in std::iter::once(&header).chain(lines.iter()) {
            let padded: Vec<String> = line
                .iter()
                .zip(widths.iter())
                .map(|(cell, width)| {
                    let pad = width.saturating_sub(cell.chars().count());
                    format!("{}{}", cell, " ".repeat(pad))
                })
                .collect();
            writeln!(self.out, "{}", padded.join("  ").trim_end())?;
        }
        writeln!(self.out)
    }
}

impl<W: Write> ReturnsSink for TableSink<W> {
    fn present(&mut self, output: &PipelineOutput) -> Result<()> {
        if output.is_empty() {
            writeln!(self.out, "No records to show")?;
            return Ok(());
        }
        self.write_section("Stock returns", &output.rows, output.change_mode)?;
        if !output.unmatched_rows.is_empty() {
            self.write_section("Unmatched instruments", &output.unmatched_rows, output.change_mode)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Writes every row, matched and unmatched, to a CSV file.
pub struct CsvSink {
    path: PathBuf,
    layout: ExportLayout,
    delimiter: u8,
}

impl CsvSink {
    pub fn new(path: PathBuf, layout: ExportLayout, delimiter: u8) -> Self {
        Self {
            path,
            layout,
            delimiter,
        }
    }
}

impl ReturnsSink for CsvSink {
    fn present(&mut self, output: &PipelineOutput) -> Result<()> {
        let file = File::create(&self.path)
            .map_err(|e| Error::Export(format!("{}: {}", self.path.display(), e)))?;
        let writer = BufWriter::new(file);
        let rows: Vec<ReturnsRow> = output.all_rows().cloned().collect();

        match self.layout {
            ExportLayout::Wide => write_wide(&rows, writer, self.delimiter)?,
            ExportLayout::Long => write_long(&rows, writer, self.delimiter)?,
        }
        tracing::info!(
            "Wrote {} rows ({} layout) to {}",
            rows.len(),
            self.layout,
            self.path.display()
        );
        Ok(())
    }
}
