//! Domain layer for the barbecue facility reservation system.
//!
//! This crate provides the core domain types:
//! - Member records with dues standing
//! - Reservation entity with its payment-gated state machine
//! - The pure reservation validator and its rejection reasons
//! - Fee and Bulletin entities
//! - The immutable facility configuration
//!
//! Everything here is pure computation; persistence and orchestration live in
//! the `store` and `workflow` crates.

pub mod bulletin;
pub mod config;
pub mod fee;
pub mod member;
pub mod money;
pub mod reservation;

pub use bulletin::{Audience, Bulletin, BulletinKind, Priority};
pub use config::FacilityConfig;
pub use fee::{Fee, FeeStatus, PaymentCode, PaymentMethod};
pub use member::{Member, Standing};
pub use money::Money;
pub use reservation::{
    RejectReason, Reservation, ReservationCandidate, ReservationStatus, ReservationValidator,
    TimeSlot,
};
