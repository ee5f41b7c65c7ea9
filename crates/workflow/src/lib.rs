//! Orchestration layer for the reservation system.
//!
//! Each service here is generic over the store and only coordinates:
//! domain rules live in the `domain` crate, persistence in `store`.
//!
//! - [`MemberDirectory`] — member registration and standing management
//! - [`ReservationWorkflow`] — the payment-gated reservation lifecycle
//! - [`FeeLedger`] — fee issuance and payment confirmation
//! - [`BulletinBoard`] — announcements targeted by member standing

mod bulletins;
mod clock;
mod directory;
mod error;
mod ledger;
mod reservations;

pub use bulletins::{BulletinBoard, BulletinStats, NewBulletin};
pub use clock::{Clock, FixedClock, SystemClock};
pub use directory::{MemberDirectory, NewMember};
pub use error::{Result, WorkflowError};
pub use ledger::{FeeLedger, PaymentOutcome};
pub use reservations::{
    Availability, NewReservation, PaymentConfirmation, ReservationWorkflow,
};
