//! Facility configuration.

use chrono::{Duration, NaiveTime};

use crate::money::Money;

/// Immutable configuration for the facility's reservation rules.
///
/// Passed explicitly into the validator, ledger, and workflow instead of
/// living in process-wide state, so each can be exercised with alternate
/// rule sets in tests.
#[derive(Debug, Clone)]
pub struct FacilityConfig {
    /// Time the facility opens.
    pub opening_time: NaiveTime,

    /// Time the facility closes.
    pub closing_time: NaiveTime,

    /// Minimum reservation duration.
    pub min_duration: Duration,

    /// Maximum reservation duration.
    pub max_duration: Duration,

    /// Minimum advance notice, in days.
    pub min_advance_days: i64,

    /// Maximum advance notice, in days.
    pub max_advance_days: i64,

    /// Facility capacity (maximum guest count).
    pub max_guests: u32,

    /// Fixed reservation fee.
    pub fee_amount: Money,

    /// How long a fee stays payable after creation.
    pub payment_deadline: Duration,

    /// Minimum notice before the reservation start for a cancellation.
    pub cancellation_notice: Duration,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            opening_time: NaiveTime::from_hms_opt(8, 0, 0).expect("valid opening time"),
            closing_time: NaiveTime::from_hms_opt(18, 0, 0).expect("valid closing time"),
            min_duration: Duration::hours(2),
            max_duration: Duration::hours(6),
            min_advance_days: 1,
            max_advance_days: 30,
            max_guests: 20,
            fee_amount: Money::from_reais(25),
            payment_deadline: Duration::hours(24),
            cancellation_notice: Duration::hours(24),
        }
    }
}
