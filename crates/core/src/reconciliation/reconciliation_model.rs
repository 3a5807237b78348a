use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::instruments::{Day, Exchange, Isin};

/// Identity of a series that has no canonical id.
///
/// The reporting exchange is part of the key: without an ISIN there is no
/// evidence that an NSE symbol and a BSE name are the same instrument, so
/// exchange preference never applies here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedKey {
    pub name: String,
    pub exchange: Exchange,
}

impl UnmatchedKey {
    pub fn new(exchange: Exchange, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exchange,
        }
    }
}

/// Key of a reconciled series.
///
/// Ordering puts every ISIN-keyed series before the unmatched ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum SeriesKey {
    Isin(Isin),
    /// Records with no canonical id, keyed by exchange and display name.
    Unmatched(UnmatchedKey),
}

impl SeriesKey {
    pub fn canonical_id(&self) -> Option<&Isin> {
        match self {
            SeriesKey::Isin(isin) => Some(isin),
            SeriesKey::Unmatched(_) => None,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKey::Isin(isin) => write!(f, "{}", isin),
            SeriesKey::Unmatched(key) => write!(f, "unmatched:{}:{}", key.exchange, key.name),
        }
    }
}

/// The single authoritative observation for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: Day,
    pub close_price: Decimal,
    pub volume: u64,
    pub source_exchange: Exchange,
}

/// One instrument's observations, strictly increasing by date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledSeries {
    pub key: SeriesKey,
    /// Name carried by the most recent observation.
    pub display_name: String,
    points: Vec<SeriesPoint>,
}

impl ReconciledSeries {
    /// Builds a series, sorting points by date. Returns None when `points`
    /// is empty or contains a repeated date.
    pub fn new(key: SeriesKey, display_name: impl Into<String>, mut points: Vec<SeriesPoint>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        points.sort_by_key(|p| p.date);
        if points.windows(2).any(|w| w[0].date == w[1].date) {
            return None;
        }
        Some(Self {
            key,
            display_name: display_name.into(),
            points,
        })
    }

    pub fn canonical_id(&self) -> Option<&Isin> {
        self.key.canonical_id()
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn first(&self) -> &SeriesPoint {
        &self.points[0]
    }

    pub fn last(&self) -> &SeriesPoint {
        &self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; empty series are never constructed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = Day> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn point_on(&self, date: Day) -> Option<&SeriesPoint> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| &self.points[idx])
    }
}

/// Output of a reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Series keyed by ISIN.
    pub matched: BTreeMap<Isin, ReconciledSeries>,
    /// Series with no canonical id, ordered by name then exchange.
    pub unmatched: BTreeMap<UnmatchedKey, ReconciledSeries>,
    /// Records that lost a cross-exchange tie-break.
    pub superseded: usize,
    /// Records repeating an exchange's own (key, date) observation.
    pub duplicates: usize,
}

impl Reconciliation {
    pub fn get(&self, key: &SeriesKey) -> Option<&ReconciledSeries> {
        match key {
            SeriesKey::Isin(isin) => self.matched.get(isin),
            SeriesKey::Unmatched(key) => self.unmatched.get(key),
        }
    }

    /// All series, ISIN-keyed first, each namespace in key order.
    pub fn iter(&self) -> impl Iterator<Item = &ReconciledSeries> {
        self.matched.values().chain(self.unmatched.values())
    }

    pub fn len(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matched.is_empty() && self.unmatched.is_empty()
    }
}
