use clap::Parser;

use bhavcopy_cli::cli::Cli;
use bhavcopy_cli::config::Config;
use bhavcopy_cli::{init_tracing, run};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let config = Config::from_cli(cli)?;
    let output = run(&config)?;
    tracing::info!(
        "Done: {} instruments, {} unmatched",
        output.rows.len(),
        output.unmatched_rows.len()
    );
    Ok(())
}
