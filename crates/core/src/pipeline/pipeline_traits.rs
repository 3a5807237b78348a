//! Presenter seam.

use super::pipeline_model::PipelineOutput;
use crate::errors::Result;

/// Consumer of a finished returns table.
///
/// Implementations render it to a terminal, write it to a file, or collect
/// it in memory. A sink never alters the output it is given.
pub trait ReturnsSink {
    fn present(&mut self, output: &PipelineOutput) -> Result<()>;
}

impl<S: ReturnsSink + ?Sized> ReturnsSink for Box<S> {
    fn present(&mut self, output: &PipelineOutput) -> Result<()> {
        (**self).present(output)
    }
}
