//! Persistence layer for the reservation system.
//!
//! Storage is behind per-entity repository traits so the workflow layer
//! stays backend-agnostic. Two backends implement all of them:
//! [`InMemoryStore`] for tests and default dev mode, and [`PostgresStore`]
//! for production.

mod error;
mod memory;
mod postgres;
mod repository;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use repository::{
    BulletinRepository, FeeRepository, MemberRepository, ReservationRepository, Store,
};
