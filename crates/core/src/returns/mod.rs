//! Returns Engine: day-over-day and whole-window changes per series, plus
//! delimited-text export of the resulting table.

mod returns_calculator;
mod returns_export;
mod returns_model;

pub use returns_calculator::ReturnsCalculator;
pub use returns_export::{read_wide, write_long, write_wide, ExportLayout, ExportedRow, LongExportRow};
pub use returns_model::{ChangeDirection, ChangeMode, DailyChange, ReturnsRow};
