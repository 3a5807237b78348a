use log::{debug, info, warn};

use super::pipeline_model::{PipelineConfig, PipelineDiagnostics, PipelineOutput, UnmatchedPolicy};
use super::pipeline_traits::ReturnsSink;
use crate::bhavcopy::{BhavcopyNormalizer, RawBatch};
use crate::errors::Result;
use crate::identity::IdentityMapper;
use crate::instruments::Exchange;
use crate::reconciliation::Reconciler;
use crate::returns::ReturnsCalculator;

/// Runs normalization, reconciliation and returns over a set of batches.
///
/// The mapper is loaded once by the caller and borrowed for the run; the
/// pipeline never mutates it.
pub struct ReturnsPipeline<'a> {
    config: PipelineConfig,
    mapper: &'a IdentityMapper,
}

impl<'a> ReturnsPipeline<'a> {
    pub fn new(config: PipelineConfig, mapper: &'a IdentityMapper) -> Self {
        Self { config, mapper }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes every batch and returns the returns table.
    ///
    /// Only an invalid configuration fails the run. Row-level problems end
    /// up in [`PipelineDiagnostics`].
    pub fn run(&self, batches: Vec<RawBatch>) -> Result<PipelineOutput> {
        self.config.validate()?;

        let mut diagnostics = PipelineDiagnostics::default();
        diagnostics.record_mapping(self.mapper.report());

        if batches.iter().any(|b| b.exchange == Exchange::Bse) && !self.mapper.covers(Exchange::Bse) {
            warn!("No BSE mapping entries loaded; every BSE record will be unmatched");
        }

        let normalizer = BhavcopyNormalizer::new(self.mapper)
            .with_columns(Exchange::Nse, self.config.nse_columns.clone())
            .with_columns(Exchange::Bse, self.config.bse_columns.clone())
            .with_equity_series(self.config.equity_series.clone());

        let mut records = Vec::new();
        for batch in &batches {
            let normalized = normalizer.normalize(batch);
            diagnostics.record_batch(&normalized);
            records.extend(normalized.records);
        }
        debug!(
            "Normalized {} batches into {} records",
            diagnostics.batches,
            records.len()
        );

        let reconciliation = Reconciler::new().reconcile(records);
        diagnostics.superseded = reconciliation.superseded;
        diagnostics.duplicates = reconciliation.duplicates;

        let calculator = ReturnsCalculator::new(self.config.change_mode);
        let rows = reconciliation
            .matched
            .values()
            .map(|series| calculator.compute(series))
            .collect::<Vec<_>>();

        let unmatched_rows = match self.config.unmatched_policy {
            UnmatchedPolicy::Keep => reconciliation
                .unmatched
                .values()
                .map(|series| calculator.compute(series))
                .collect(),
            UnmatchedPolicy::Drop => {
                diagnostics.unmatched_dropped = reconciliation.unmatched.len();
                Vec::new()
            }
        };

        info!(
            "Computed {} returns rows ({} unmatched) from {} rows in {} batches",
            rows.len() + unmatched_rows.len(),
            unmatched_rows.len(),
            diagnostics.rows_read,
            diagnostics.batches
        );
        if diagnostics.total_dropped() > 0 {
            warn!(
                "{} rows dropped across all batches {:?}",
                diagnostics.total_dropped(),
                diagnostics.dropped_rows
            );
        }

        Ok(PipelineOutput {
            change_mode: self.config.change_mode,
            rows,
            unmatched_rows,
            diagnostics,
        })
    }

    /// Runs the pipeline and hands the result to `sink`.
    pub fn run_into(&self, batches: Vec<RawBatch>, sink: &mut dyn ReturnsSink) -> Result<PipelineOutput> {
        let output = self.run(batches)?;
        sink.present(&output)?;
        Ok(output)
    }
}
