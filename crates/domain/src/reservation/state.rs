//! Reservation state machine.

use serde::{Deserialize, Serialize};

/// The state of a reservation in its payment-gated lifecycle.
///
/// State transitions:
/// ```text
/// PendingPayment ──► Active ──► Completed
///        │              │
///        ├──────────────┴──► Cancelled
///        │
///        └──► Expired
/// ```
///
/// `Active` covers both "paid" and "in force"; the two are displayed
/// identically and carry the same rights, so they are one state here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Created, fee generated, waiting for payment confirmation.
    #[default]
    PendingPayment,

    /// Fee paid; the reservation holds its slot.
    Active,

    /// The reservation date has passed (terminal state).
    Completed,

    /// Cancelled by the requester (terminal state).
    Cancelled,

    /// Fee went unpaid past its deadline (terminal state).
    Expired,
}

impl ReservationStatus {
    /// Returns true if the fee can still be confirmed in this state.
    pub fn can_confirm_payment(&self) -> bool {
        matches!(self, ReservationStatus::PendingPayment)
    }

    /// Returns true if the reservation can be cancelled in this state.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            ReservationStatus::PendingPayment | ReservationStatus::Active
        )
    }

    /// Returns true if the reservation can be completed in this state.
    pub fn can_complete(&self) -> bool {
        matches!(self, ReservationStatus::Active)
    }

    /// Returns true if this reservation still holds its time slot for
    /// conflict purposes.
    pub fn blocks_slot(&self) -> bool {
        matches!(
            self,
            ReservationStatus::PendingPayment | ReservationStatus::Active
        )
    }

    /// Returns true if this is a terminal state (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Completed | ReservationStatus::Cancelled | ReservationStatus::Expired
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::PendingPayment => "pending_payment",
            ReservationStatus::Active => "active",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_payment" => Ok(ReservationStatus::PendingPayment),
            "active" => Ok(ReservationStatus::Active),
            "completed" => Ok(ReservationStatus::Completed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "expired" => Ok(ReservationStatus::Expired),
            other => Err(format!("unknown reservation status: {other}")),
        }
    }
}
