//! Bhavcopy Core - reconciliation and returns over NSE and BSE daily files.
//!
//! This crate holds the pure computation: typed normalization of raw
//! bhavcopy rows, ISIN resolution for BSE scrip codes, cross-exchange
//! reconciliation and day-over-day returns. It does no file discovery or
//! rendering; those belong to the binary.

pub mod bhavcopy;
pub mod constants;
pub mod csv_parser;
pub mod errors;
pub mod identity;
pub mod instruments;
pub mod pipeline;
pub mod reconciliation;
pub mod returns;

// Re-export the types most callers need
pub use bhavcopy::{BhavcopyNormalizer, DailyRecord, RawBatch};
pub use identity::{IdentityMapper, IdentityResolver};
pub use instruments::{Day, Exchange, Isin, ScripCode};
pub use pipeline::{PipelineConfig, PipelineOutput, ReturnsPipeline, ReturnsSink, UnmatchedPolicy};
pub use reconciliation::{Reconciler, ReconciledSeries};
pub use returns::{ChangeMode, ReturnsCalculator, ReturnsRow};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
