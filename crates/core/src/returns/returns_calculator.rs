use rust_decimal::Decimal;

use super::returns_model::{ChangeMode, DailyChange, ReturnsRow};
use crate::reconciliation::{Reconciliation, ReconciledSeries};

/// Computes returns rows from reconciled series.
///
/// Arithmetic edge cases never fail: a zero prior close in percent mode, or
/// an overflow, yields a change of None.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnsCalculator {
    mode: ChangeMode,
}

impl ReturnsCalculator {
    pub fn new(mode: ChangeMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ChangeMode {
        self.mode
    }

    pub fn compute(&self, series: &ReconciledSeries) -> ReturnsRow {
        let points = series.points();
        let mut changes = Vec::with_capacity(points.len());
        let mut previous: Option<Decimal> = None;

        for point in points {
            let change = match previous {
                None => Some(Decimal::ZERO),
                Some(prior) => self.change(prior, point.close_price),
            };
            changes.push(DailyChange {
                date: point.date,
                close_price: point.close_price,
                volume: point.volume,
                source_exchange: point.source_exchange,
                change,
            });
            previous = Some(point.close_price);
        }

        // First and last present observations, whatever lies between them
        let total_change = if points.len() < 2 {
            Some(Decimal::ZERO)
        } else {
            self.change(series.first().close_price, series.last().close_price)
        };

        ReturnsRow {
            canonical_id: series.canonical_id().cloned(),
            display_name: series.display_name.clone(),
            mode: self.mode,
            changes,
            total_change,
        }
    }

    /// Rows for every series, ISIN-keyed first.
    pub fn compute_all(&self, reconciliation: &Reconciliation) -> Vec<ReturnsRow> {
        reconciliation.iter().map(|s| self.compute(s)).collect()
    }

    /// Change from `from` to `to` under the configured mode.
    pub fn change(&self, from: Decimal, to: Decimal) -> Option<Decimal> {
        let diff = to.checked_sub(from)?;
        match self.mode {
            ChangeMode::Absolute => Some(diff),
            ChangeMode::Percent => {
                if from.is_zero() {
                    return None;
                }
                diff.checked_div(from)?.checked_mul(Decimal::ONE_HUNDRED)
            }
        }
    }
}
