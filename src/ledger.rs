use crate::normalize::{normalize_month_text, normalize_name};
use crate::schema::{BonusEntry, Month};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What an `add` call did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerChange {
    /// A new (representative, month) row was created.
    Inserted,
    /// Counters were added onto an existing row.
    Merged,
    /// Representative or month was empty; nothing changed.
    Ignored,
}

/// Summed bonus counters for one representative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusTotals {
    pub action_points: u64,
    pub promo_points: u64,
    pub delinquency_points: u64,
}

impl BonusTotals {
    pub fn total(&self) -> u64 {
        self.action_points + self.promo_points + self.delinquency_points
    }
}

/// Manually entered bonus points, at most one row per (representative, month).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BonusLedger {
    entries: Vec<BonusEntry>,
}

impl BonusLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from loaded rows, merging duplicate pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = BonusEntry>) -> Self {
        let mut ledger = Self::new();
        for entry in entries {
            ledger.add(
                &entry.representative,
                &entry.month,
                entry.action_points,
                entry.promo_points,
                entry.delinquency_points,
            );
        }
        ledger
    }

    pub fn add(
        &mut self,
        representative: &str,
        month: &str,
        action: u32,
        promo: u32,
        delinquency: u32,
    ) -> LedgerChange {
        let representative = normalize_name(representative);
        let month = normalize_month_text(month);
        if representative.is_empty() || month.is_empty() {
            return LedgerChange::Ignored;
        }

        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.matches(&representative, &month))
        {
            entry.action_points = entry.action_points.saturating_add(action);
            entry.promo_points = entry.promo_points.saturating_add(promo);
            entry.delinquency_points = entry.delinquency_points.saturating_add(delinquency);
            debug!("Merged bonus points for {} in {}", representative, month);
            return LedgerChange::Merged;
        }

        debug!("Inserted bonus points for {} in {}", representative, month);
        self.entries.push(BonusEntry {
            representative,
            month,
            action_points: action,
            promo_points: promo,
            delinquency_points: delinquency,
        });
        LedgerChange::Inserted
    }

    /// Deletes the whole row for the pair. Returns whether a row existed.
    pub fn remove(&mut self, representative: &str, month: &str) -> bool {
        let representative = normalize_name(representative);
        let month = normalize_month_text(month);
        let before = self.entries.len();
        self.entries.retain(|e| !e.matches(&representative, &month));

        let removed = self.entries.len() != before;
        if removed {
            debug!("Removed bonus points for {} in {}", representative, month);
        }
        removed
    }

    /// Full ledger in insertion order, ready for spreadsheet export.
    pub fn export(&self) -> Vec<BonusEntry> {
        self.entries.clone()
    }

    /// Entries whose month falls in `months`. An empty set means no filter.
    /// Months resolve the same way as sales months (`Month::from_label`).
    pub fn filtered_by_months(&self, months: &BTreeSet<Month>) -> Vec<&BonusEntry> {
        self.entries
            .iter()
            .filter(|e| {
                months.is_empty()
                    || Month::from_label(&e.month).is_some_and(|m| months.contains(&m))
            })
            .collect()
    }

    pub fn totals_for(&self, representative: &str, months: &BTreeSet<Month>) -> BonusTotals {
        self.filtered_by_months(months)
            .into_iter()
            .filter(|e| e.representative == representative)
            .fold(BonusTotals::default(), |mut acc, e| {
                acc.action_points += e.action_points as u64;
                acc.promo_points += e.promo_points as u64;
                acc.delinquency_points += e.delinquency_points as u64;
                acc
            })
    }

    pub fn entries(&self) -> &[BonusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
