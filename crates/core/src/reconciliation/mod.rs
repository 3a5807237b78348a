//! Reconciler: merges every exchange's records into one series per instrument.
//!
//! Records are grouped by ISIN, or by exchange and display name when the
//! ISIN is unknown. The two namespaces never merge. Within a group each date keeps exactly
//! one record, chosen by exchange preference (NSE over BSE).

mod reconciler;
mod reconciliation_model;


pub use reconciler::Reconciler;
pub use reconciliation_model::{Reconciliation, ReconciledSeries, SeriesKey, SeriesPoint, UnmatchedKey};
