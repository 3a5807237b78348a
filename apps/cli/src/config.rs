use std::fs;
use std::path::PathBuf;
use tracing::warn;

use bhavcopy_core::errors::{ConfigError, Result};
use bhavcopy_core::returns::ExportLayout;
use bhavcopy_core::{Day, Exchange, PipelineConfig};

use crate::cli::Cli;
use crate::source::detect_exchange;

/// A bhavcopy file and the exchange that published it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub exchange: Exchange,
}

/// Where the mapping table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingSource {
    File(PathBuf),
    /// Latest `EQ_MAP_CC_*.csv` in this directory.
    Discover(PathBuf),
}

/// Fully resolved settings of one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub inputs: Vec<InputFile>,
    pub mapping: MappingSource,
    pub pipeline: PipelineConfig,
    pub output: Option<PathBuf>,
    pub layout: ExportLayout,
    pub date_override: Option<Day>,
    pub show_table: bool,
}

impl Config {
    /// Resolves arguments, which already include environment fallbacks.
    ///
    /// Pipeline settings start from defaults, are replaced by the JSON
    /// config file when one is given, then by individual flags.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let mut pipeline = match &cli.config {
            Some(path) => {
                let json = fs::read_to_string(path).map_err(|e| ConfigError::InvalidValue {
                    key: "config file".to_string(),
                    value: format!("{}: {}", path.display(), e),
                })?;
                PipelineConfig::from_json(&json)?
            }
            None => PipelineConfig::default(),
        };
        if let Some(mode) = &cli.mode {
            pipeline.change_mode = mode.parse()?;
        }
        if let Some(policy) = &cli.unmatched {
            pipeline.unmatched_policy = policy.parse()?;
        }

        let date_override = cli.date.as_deref().map(parse_date).transpose()?;

        let mut inputs: Vec<InputFile> = Vec::new();
        for path in cli.files {
            match detect_exchange(&path) {
                Some(exchange) => inputs.push(InputFile { path, exchange }),
                None => warn!("Skipping {} (cannot detect exchange)", path.display()),
            }
        }
        inputs.extend(cli.nse.into_iter().map(|path| InputFile {
            path,
            exchange: Exchange::Nse,
        }));
        inputs.extend(cli.bse.into_iter().map(|path| InputFile {
            path,
            exchange: Exchange::Bse,
        }));

        let mapping = match cli.mapping {
            Some(path) => MappingSource::File(path),
            None => MappingSource::Discover(cli.mapping_dir),
        };

        Ok(Self {
            inputs,
            mapping,
            pipeline,
            output: cli.output,
            layout: cli.layout.parse()?,
            date_override,
            show_table: !cli.no_table,
        })
    }
}

fn parse_date(raw: &str) -> Result<Day> {
    let trimmed = raw.trim();
    Day::parse(trimmed)
        .or_else(|| Day::parse_compact(trimmed))
        .ok_or_else(|| {
            ConfigError::InvalidValue {
                key: "date".to_string(),
                value: trimmed.to_string(),
            }
            .into()
        })
}
