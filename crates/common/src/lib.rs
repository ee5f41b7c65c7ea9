//! Shared types for the reservation system.
//!
//! Typed identifiers for the core entities and the validated CPF member
//! identifier. Kept dependency-light so every other crate can use them.

pub mod cpf;
pub mod types;

pub use cpf::{Cpf, CpfError};
pub use types::{BulletinId, FeeId, ReservationId};
