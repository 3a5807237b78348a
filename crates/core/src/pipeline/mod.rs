//! Pipeline module - normalization, reconciliation and returns in one pass.

mod pipeline_model;
mod pipeline_service;
mod pipeline_traits;


pub use pipeline_model::{PipelineConfig, PipelineDiagnostics, PipelineOutput, UnmatchedPolicy};
pub use pipeline_service::ReturnsPipeline;
pub use pipeline_traits::ReturnsSink;
