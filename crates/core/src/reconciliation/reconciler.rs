use log::debug;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use super::reconciliation_model::{Reconciliation, ReconciledSeries, SeriesKey, SeriesPoint, UnmatchedKey};
use crate::bhavcopy::DailyRecord;
use crate::instruments::Day;

/// Merges normalized records across exchanges and dates.
///
/// For each (key, date) the record from the preferred exchange wins outright;
/// values are never averaged. Repeats from the same exchange keep the first
/// record seen.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler;

impl Reconciler {
    pub fn new() -> Self {
        Self
    }

    pub fn reconcile<I>(&self, records: I) -> Reconciliation
    where
        I: IntoIterator<Item = DailyRecord>,
    {
        let mut groups: BTreeMap<SeriesKey, BTreeMap<Day, DailyRecord>> = BTreeMap::new();
        let mut superseded = 0usize;
        let mut duplicates = 0usize;

        for record in records {
            let key = match &record.canonical_id {
                Some(isin) => SeriesKey::Isin(isin.clone()),
                None => SeriesKey::Unmatched(UnmatchedKey::new(record.exchange, record.display_name.clone())),
            };
            let by_date = groups.entry(key).or_default();

            match by_date.entry(record.trading_date) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(mut slot) => {
                    let current = slot.get();
                    if record.exchange == current.exchange {
                        debug!(
                            "Duplicate {} record for {} on {}, keeping first",
                            record.exchange, record.display_name, record.trading_date
                        );
                        duplicates += 1;
                    } else if record.exchange.is_preferred_over(&current.exchange) {
                        debug!(
                            "{} supersedes {} for {} on {}",
                            record.exchange, current.exchange, record.display_name, record.trading_date
                        );
                        slot.insert(record);
                        superseded += 1;
                    } else {
                        superseded += 1;
                    }
                }
            }
        }

        let mut reconciliation = Reconciliation {
            superseded,
            duplicates,
            ..Default::default()
        };

        for (key, by_date) in groups {
            let display_name = by_date
                .values()
                .next_back()
                .map(|r| r.display_name.clone())
                .unwrap_or_default();
            let points = by_date
                .into_values()
                .map(|r| SeriesPoint {
                    date: r.trading_date,
                    close_price: r.close_price,
                    volume: r.volume,
                    source_exchange: r.exchange,
                })
                .collect();

            let Some(series) = ReconciledSeries::new(key, display_name, points) else {
                continue;
            };
            match series.key.clone() {
                SeriesKey::Isin(isin) => {
                    reconciliation.matched.insert(isin, series);
                }
                SeriesKey::Unmatched(key) => {
                    reconciliation.unmatched.insert(key, series);
                }
            }
        }

        reconciliation
    }
}
