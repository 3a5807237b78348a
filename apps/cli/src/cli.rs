//! Command-line arguments.
//!
//! Every option with an `env` name can also be set in the environment or a
//! `.env` file; a flag on the command line wins over both.

use clap::Parser;
use std::path::PathBuf;

/// NSE/BSE bhavcopy returns
#[derive(Parser, Debug)]
#[command(name = "bhavcopy")]
#[command(about = "Reconcile NSE and BSE bhavcopies and compute daily returns")]
#[command(version)]
pub struct Cli {
    /// Bhavcopy files named like 20250903_NSE.csv; the exchange is read from the name
    pub files: Vec<PathBuf>,

    /// NSE bhavcopy file (repeatable)
    #[arg(long, value_name = "FILE")]
    pub nse: Vec<PathBuf>,

    /// BSE bhavcopy file (repeatable)
    #[arg(long, value_name = "FILE")]
    pub bse: Vec<PathBuf>,

    /// BSE scrip code to ISIN mapping file
    #[arg(long, env = "BHAV_MAPPING_PATH")]
    pub mapping: Option<PathBuf>,

    /// Directory searched for the latest EQ_MAP_CC_*.csv when no mapping file is given
    #[arg(long, env = "BHAV_MAPPING_DIR", default_value = ".")]
    pub mapping_dir: PathBuf,

    /// Change mode: absolute or percent
    #[arg(long, env = "BHAV_CHANGE_MODE")]
    pub mode: Option<String>,

    /// Unmatched instruments: keep or drop
    #[arg(long, env = "BHAV_UNMATCHED")]
    pub unmatched: Option<String>,

    /// Write the returns table to this CSV file
    #[arg(long, short, env = "BHAV_OUTPUT")]
    pub output: Option<PathBuf>,

    /// CSV layout: wide or long
    #[arg(long, default_value = "wide")]
    pub layout: String,

    /// JSON file with pipeline settings
    #[arg(long, env = "BHAV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Trading date for every file, as YYYY-MM-DD or YYYYMMDD
    #[arg(long)]
    pub date: Option<String>,

    /// Do not print the table to the terminal
    #[arg(long)]
    pub no_table: bool,
}
