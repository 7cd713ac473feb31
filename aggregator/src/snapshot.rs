//! Read model over the counter store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use turnstile_ledger::{EntryType, PrCode, TicketType};

use crate::keys;

/// Gender counts of checked-in guests, re-assembled from the flat
/// `gender_ratio.*` counter keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderRatio {
    /// Male guests checked in
    pub male: u64,
    /// Female guests checked in
    pub female: u64,
    /// Guests checked in identifying otherwise
    pub other: u64,
}

/// Point-in-time copy of every counter.
///
/// Snapshots are eventually consistent with in-flight events but never
/// expose a partially-applied one: the counter store commits each event's
/// deltas as a single atomic batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    counters: BTreeMap<String, u64>,
}

impl CounterSnapshot {
    /// Read a counter by derived key. Missing keys read as zero.
    #[must_use]
    pub fn get(&self, key: &str) -> u64 {
        self.counters.get(key).copied().unwrap_or(0)
    }

    /// Total tickets issued
    #[must_use]
    pub fn total(&self) -> u64 {
        self.get(keys::TOTAL)
    }

    /// Guests currently inside
    #[must_use]
    pub fn current_occupancy(&self) -> u64 {
        self.get(keys::CURRENT_OCCUPANCY)
    }

    /// Couples checked in
    #[must_use]
    pub fn couples_count(&self) -> u64 {
        self.get(keys::COUPLES_COUNT)
    }

    /// Issuances for one ticket tier
    #[must_use]
    pub fn ticket_type(&self, ticket_type: TicketType) -> u64 {
        self.get(&keys::ticket_type(ticket_type))
    }

    /// Issuances for one entry lane
    #[must_use]
    pub fn entry_type(&self, entry_type: EntryType) -> u64 {
        self.get(&keys::entry_type(entry_type))
    }

    /// Issuances attributed to one promoter
    #[must_use]
    pub fn pr_code(&self, code: &PrCode) -> u64 {
        self.get(&keys::pr_code(code))
    }

    /// Check-ins during one hour of day
    #[must_use]
    pub fn hourly_checkins(&self, hour_of_day: u32) -> u64 {
        self.get(&keys::hourly_checkins(hour_of_day))
    }

    /// Gender counts of checked-in guests
    #[must_use]
    pub fn gender_ratio(&self) -> GenderRatio {
        GenderRatio {
            male: self.get(keys::GENDER_MALE),
            female: self.get(keys::GENDER_FEMALE),
            other: self.get(keys::GENDER_OTHER),
        }
    }

    /// All counters, keyed by derived name
    #[must_use]
    pub const fn counters(&self) -> &BTreeMap<String, u64> {
        &self.counters
    }

    /// Number of distinct counters
    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Whether no counter has been touched yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

impl From<BTreeMap<String, u64>> for CounterSnapshot {
    fn from(counters: BTreeMap<String, u64>) -> Self {
        Self { counters }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_read_derived_keys() {
        let snapshot = CounterSnapshot::from(BTreeMap::from([
            ("total".to_string(), 5),
            ("vip".to_string(), 3),
            ("express_count".to_string(), 2),
            ("pr_anna".to_string(), 1),
            ("hourly_checkins_22".to_string(), 4),
            ("gender_ratio.male".to_string(), 6),
            ("gender_ratio.female".to_string(), 5),
            ("current_occupancy".to_string(), 11),
            ("couples_count".to_string(), 2),
        ]));

        assert_eq!(snapshot.total(), 5);
        assert_eq!(snapshot.ticket_type(TicketType::Vip), 3);
        assert_eq!(snapshot.ticket_type(TicketType::Guestlist), 0);
        assert_eq!(snapshot.entry_type(EntryType::Express), 2);
        assert_eq!(snapshot.pr_code(&PrCode::new("anna")), 1);
        assert_eq!(snapshot.hourly_checkins(22), 4);
        assert_eq!(snapshot.current_occupancy(), 11);
        assert_eq!(snapshot.couples_count(), 2);
        assert_eq!(
            snapshot.gender_ratio(),
            GenderRatio {
                male: 6,
                female: 5,
                other: 0
            }
        );
    }

    #[test]
    fn empty_snapshot_reads_zero_everywhere() {
        let snapshot = CounterSnapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total(), 0);
        assert_eq!(snapshot.gender_ratio(), GenderRatio::default());
    }
}
