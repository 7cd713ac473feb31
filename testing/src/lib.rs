//! # Turnstile Testing
//!
//! Testing utilities and helpers for the Turnstile workspace.
//!
//! This crate provides:
//! - Mock implementations of environment traits (fixed clock)
//! - A fluent Given-When-Then harness for reducer tests
//! - Flaky store doubles for exercising retry paths
//!
//! ## Example
//!
//! ```ignore
//! use turnstile_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(LedgerReducer::new())
//!     .with_env(test_env())
//!     .given_state(LedgerState::new())
//!     .when_action(LedgerAction::IssueTicket { ticket_id, draft })
//!     .then_effects(|effects| assert_eq!(effects.len(), 1))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use turnstile_core::environment::Clock;

pub mod reducer_test;
pub mod store_mocks;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use turnstile_testing::mocks::FixedClock;
    /// use turnstile_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
pub use store_mocks::{FlakyCounterStore, FlakyTicketStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }
}
