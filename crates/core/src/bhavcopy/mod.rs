//! Record Normalizer: one exchange's raw daily rows to typed records.

mod bhavcopy_model;
mod bhavcopy_normalizer;


pub use bhavcopy_model::{
    ColumnConvention, DailyRecord, IdentityColumn, NormalizedBatch, RawBatch, RejectionReason,
    RowRejection,
};
pub use bhavcopy_normalizer::BhavcopyNormalizer;
