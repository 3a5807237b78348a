use crate::instruments::{Exchange, Isin, ScripCode};

/// Resolves exchange-local codes to canonical identifiers.
///
/// Implementations must be immutable for the duration of a pipeline run.
pub trait IdentityResolver {
    /// Returns the ISIN for `code` on `exchange`, or None when unresolved.
    fn resolve(&self, code: &ScripCode, exchange: Exchange) -> Option<&Isin>;
}
