//! Deterministic counter-key derivation.
//!
//! Every counter key is derived from ticket/event attributes through the
//! functions here, so the write side (projection) and the read side
//! (snapshot accessors) can never disagree on spelling.

use turnstile_ledger::{EntryType, PrCode, TicketType};

/// Total tickets issued
pub const TOTAL: &str = "total";

/// Guests currently inside (sum of checked-in group sizes)
pub const CURRENT_OCCUPANCY: &str = "current_occupancy";

/// Couples checked in
pub const COUPLES_COUNT: &str = "couples_count";

/// Male guests checked in
pub const GENDER_MALE: &str = "gender_ratio.male";

/// Female guests checked in
pub const GENDER_FEMALE: &str = "gender_ratio.female";

/// Guests checked in identifying otherwise
pub const GENDER_OTHER: &str = "gender_ratio.other";

/// Per-tier issuance counter (e.g. `"vip"`)
#[must_use]
pub fn ticket_type(ticket_type: TicketType) -> String {
    ticket_type.as_str().to_string()
}

/// Per-entry-lane issuance counter (e.g. `"express_count"`)
#[must_use]
pub fn entry_type(entry_type: EntryType) -> String {
    format!("{}_count", entry_type.as_str())
}

/// Per-promoter issuance counter (e.g. `"pr_anna"`)
///
/// Tickets without a PR code get no promoter counter at all; there is no
/// catch-all key for absent attribution.
#[must_use]
pub fn pr_code(code: &PrCode) -> String {
    format!("pr_{}", code.as_str())
}

/// Check-ins bucketed by hour of day (e.g. `"hourly_checkins_22"`)
#[must_use]
pub fn hourly_checkins(hour_of_day: u32) -> String {
    format!("hourly_checkins_{hour_of_day}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_stable() {
        assert_eq!(ticket_type(TicketType::Vip), "vip");
        assert_eq!(ticket_type(TicketType::Tier1), "tier1");
        assert_eq!(entry_type(EntryType::Express), "express_count");
        assert_eq!(entry_type(EntryType::Standard), "standard_count");
        assert_eq!(pr_code(&PrCode::new("anna")), "pr_anna");
        assert_eq!(hourly_checkins(22), "hourly_checkins_22");
        assert_eq!(hourly_checkins(0), "hourly_checkins_0");
    }
}
