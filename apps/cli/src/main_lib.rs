use std::io;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bhavcopy_core::csv_parser::ParseConfig;
use bhavcopy_core::{PipelineOutput, ReturnsPipeline, ReturnsSink};

use crate::config::Config;
use crate::presenter::{CsvSink, TableSink};
use crate::source::{load_batches, load_mapping, resolve_mapping};

pub fn init_tracing() {
    let log_format = std::env::var("BHAV_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(io::stderr),
            )
            .init();
    }
}

/// Loads the mapping and batches, runs the pipeline and presents the result.
pub fn run(config: &Config) -> anyhow::Result<PipelineOutput> {
    let parse = ParseConfig::with_delimiter(config.pipeline.delimiter);

    let mapping_path = resolve_mapping(&config.mapping)?;
    let mapper = load_mapping(&mapping_path, &config.pipeline.mapping_columns, &parse)?;

    if config.inputs.is_empty() {
        warn!("No bhavcopy files given");
    }
    let batches = load_batches(&config.inputs, config.date_override, &parse);

    let pipeline = ReturnsPipeline::new(config.pipeline.clone(), &mapper);
    let output = pipeline.run(batches)?;

    for warning in output.diagnostics.warnings() {
        warn!("{}", warning);
    }
    if output.diagnostics.superseded > 0 {
        info!(
            "{} BSE records superseded by NSE closes",
            output.diagnostics.superseded
        );
    }

    let mut sinks: Vec<Box<dyn ReturnsSink>> = Vec::new();
    if config.show_table {
        sinks.push(Box::new(TableSink::new(io::stdout())));
    }
    if let Some(path) = &config.output {
        sinks.push(Box::new(CsvSink::new(
            path.clone(),
            config.layout,
            config.pipeline.delimiter_byte(),
        )));
    }
    for sink in sinks.iter_mut() {
        sink.present(&output)?;
    }

    Ok(output)
}
