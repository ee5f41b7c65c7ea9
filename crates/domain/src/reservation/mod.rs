//! Reservations: entity, lifecycle state, time slots, and rule checking.

mod slot;
mod state;
mod validator;

pub use slot::{InvalidSlot, TimeSlot};
pub use state::ReservationStatus;
pub use validator::{RejectReason, ReservationCandidate, ReservationValidator};

use chrono::{DateTime, NaiveDate, Utc};
use common::{Cpf, ReservationId};
use serde::{Deserialize, Serialize};

/// A facility reservation.
///
/// Created in [`ReservationStatus::PendingPayment`] and activated only when
/// its usage fee is confirmed. Contact details are snapshotted at creation
/// time so later member edits do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique reservation identifier.
    pub id: ReservationId,

    /// CPF of the member who holds the reservation.
    pub member_cpf: Cpf,

    /// Member name at creation time.
    pub name: String,

    /// Contact email at creation time.
    pub email: String,

    /// Contact phone at creation time, if given.
    pub phone: Option<String>,

    /// Date of use.
    pub date: NaiveDate,

    /// Reserved time slot.
    pub slot: TimeSlot,

    /// Number of guests, including the member.
    pub guests: u32,

    /// Free-form notes from the member.
    pub notes: Option<String>,

    /// Lifecycle state.
    pub status: ReservationStatus,

    /// When the reservation was created.
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Creates a pending reservation for an already-validated candidate.
    pub fn new(
        member: &crate::member::Member,
        candidate: &ReservationCandidate,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ReservationId::new(),
            member_cpf: member.cpf.clone(),
            name: member.name.clone(),
            email: member.email.clone(),
            phone: member.phone.clone(),
            date: candidate.date,
            slot: candidate.slot,
            guests: candidate.guests,
            notes,
            status: ReservationStatus::PendingPayment,
            created_at,
        }
    }

    /// Whether this reservation keeps its slot unavailable to others.
    pub fn blocks_slot(&self) -> bool {
        self.status.blocks_slot()
    }
}
