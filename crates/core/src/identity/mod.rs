//! Identity Mapper: exchange-local scrip codes to ISINs.
//!
//! The mapping table is loaded once per session and is read-only afterwards.
//! A code without an entry is not an error; callers decide whether to drop
//! the record or carry it into the unmatched namespace.

mod identity_mapper;
mod identity_model;
mod identity_traits;

pub use identity_mapper::IdentityMapper;
pub use identity_model::{InstrumentIdentity, MappingColumns, MappingLoadReport};
pub use identity_traits::IdentityResolver;
