pub mod cli;
pub mod config;
pub mod main_lib;
pub mod presenter;
pub mod source;

pub use main_lib::{init_tracing, run};
