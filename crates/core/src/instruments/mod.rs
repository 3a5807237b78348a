//! Instrument identity types shared by every pipeline stage.
//!
//! - [`Exchange`] - which exchange reported a record, with its preference rank
//! - [`Isin`] - the canonical cross-exchange identifier
//! - [`ScripCode`] - an exchange-local instrument code
//! - [`Day`] - a trading date

mod types;

pub use types::{Day, Exchange, Isin, ScripCode};
