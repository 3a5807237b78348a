//! File-system data source: mapping discovery, batch loading and trading
//! dates taken from file names.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use bhavcopy_core::constants::MAPPING_FILE_PREFIX;
use bhavcopy_core::csv_parser::{parse_csv, ParseConfig};
use bhavcopy_core::errors::{ConfigError, Result};
use bhavcopy_core::identity::MappingColumns;
use bhavcopy_core::{Day, Exchange, IdentityMapper, RawBatch};

use crate::config::{InputFile, MappingSource};

/// Exchange named in a file name, NSE checked first.
pub fn detect_exchange(path: &Path) -> Option<Exchange> {
    let name = path.file_name()?.to_string_lossy().to_uppercase();
    if name.contains("NSE") {
        Some(Exchange::Nse)
    } else if name.contains("BSE") {
        Some(Exchange::Bse)
    } else {
        None
    }
}

/// Trading date from the first eight characters of the file name (`YYYYMMDD`).
pub fn trading_date_from_name(path: &Path) -> Option<Day> {
    let name = path.file_name()?.to_str()?;
    Day::parse_compact(name.get(..8)?)
}

/// Latest `EQ_MAP_CC_*.csv` in `dir`, by file name.
pub fn discover_mapping(dir: &Path) -> Result<PathBuf> {
    let missing = || ConfigError::MappingTableMissing(format!("{}/{}*.csv", dir.display(), MAPPING_FILE_PREFIX));

    let entries = fs::read_dir(dir).map_err(|_| missing())?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(MAPPING_FILE_PREFIX) && n.to_ascii_lowercase().ends_with(".csv"))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    candidates.pop().ok_or_else(|| missing().into())
}

pub fn resolve_mapping(source: &MappingSource) -> Result<PathBuf> {
    match source {
        MappingSource::File(path) if path.is_file() => Ok(path.clone()),
        MappingSource::File(path) => {
            Err(ConfigError::MappingTableMissing(path.display().to_string()).into())
        }
        MappingSource::Discover(dir) => discover_mapping(dir),
    }
}

/// Loads the BSE mapping table. Any failure here is fatal.
pub fn load_mapping(path: &Path, columns: &MappingColumns, parse: &ParseConfig) -> Result<IdentityMapper> {
    let unreadable = |reason: String| ConfigError::MappingTableUnreadable(format!("{}: {}", path.display(), reason));

    let content = fs::read(path).map_err(|e| unreadable(e.to_string()))?;
    let table = parse_csv(&content, parse).map_err(|e| unreadable(e.to_string()))?;
    let mapper = IdentityMapper::from_table(&table, Exchange::Bse, columns)?;

    info!(
        "Using mapping file {} ({} entries)",
        path.display(),
        mapper.len()
    );
    Ok(mapper)
}

/// Reads every input file into a batch.
///
/// Files without a trading date, unreadable files and empty files are
/// skipped with a warning; the remaining batches still run.
pub fn load_batches(inputs: &[InputFile], date_override: Option<Day>, parse: &ParseConfig) -> Vec<RawBatch> {
    let mut batches = Vec::with_capacity(inputs.len());

    for input in inputs {
        let path = &input.path;
        let Some(trading_date) = date_override.or_else(|| trading_date_from_name(path)) else {
            warn!(
                "Skipping {}: no YYYYMMDD date at the start of the file name",
                path.display()
            );
            continue;
        };

        let content = match fs::read(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        match parse_csv(&content, parse) {
            Ok(table) => {
                for issue in &table.errors {
                    warn!("{}: {}", path.display(), issue.message);
                }
                info!(
                    "Loaded {} {} bhavcopy for {} ({} rows)",
                    path.display(),
                    input.exchange,
                    trading_date,
                    table.row_count()
                );
                batches.push(RawBatch::new(input.exchange, trading_date, table));
            }
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    batches
}
