use serde::{Deserialize, Serialize};

use crate::constants::{MAP_ISIN, MAP_SCRIP_CODE, MAP_SCRIP_NAME};
use crate::instruments::{Exchange, Isin, ScripCode};

/// One entry of an exchange's mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentIdentity {
    pub exchange: Exchange,
    pub exchange_code: ScripCode,
    /// None when the table carries a blank ISIN for this code.
    pub canonical_id: Option<Isin>,
    pub display_name: String,
}

/// Column names of a mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MappingColumns {
    pub code: String,
    pub name: String,
    pub isin: String,
}

impl Default for MappingColumns {
    fn default() -> Self {
        Self {
            code: MAP_SCRIP_CODE.to_string(),
            name: MAP_SCRIP_NAME.to_string(),
            isin: MAP_ISIN.to_string(),
        }
    }
}

/// Counts collected while loading a mapping table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingLoadReport {
    /// Entries accepted into the mapper.
    pub loaded: usize,
    /// Rows repeating an already loaded code and ISIN.
    pub duplicates: usize,
    /// Rows repeating a loaded code with a different ISIN. The first row wins.
    pub conflicting: usize,
    /// Rows with a blank code or a malformed ISIN.
    pub malformed: usize,
}

impl MappingLoadReport {
    pub fn skipped(&self) -> usize {
        self.duplicates + self.conflicting + self.malformed
    }

    pub(crate) fn merge(&mut self, other: &MappingLoadReport) {
        self.loaded += other.loaded;
        self.duplicates += other.duplicates;
        self.conflicting += other.conflicting;
        self.malformed += other.malformed;
    }
}
