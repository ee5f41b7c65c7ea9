use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use common::{BulletinId, Cpf, ReservationId};
use domain::{Bulletin, Fee, Member, PaymentCode, Reservation, ReservationStatus, TimeSlot};

use crate::Result;

/// Storage for member records.
///
/// Members are keyed by CPF. Records are never deleted; deactivation flips
/// the `active` flag through [`MemberRepository::update_member`].
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Inserts a new member.
    ///
    /// Fails with `DuplicateCpf` or `DuplicateEmail` if either identifier
    /// is already registered.
    async fn insert_member(&self, member: &Member) -> Result<()>;

    /// Looks a member up by CPF.
    async fn get_member(&self, cpf: &Cpf) -> Result<Option<Member>>;

    /// Replaces an existing member record.
    async fn update_member(&self, member: &Member) -> Result<()>;

    /// All active members currently delinquent.
    async fn list_delinquent_members(&self) -> Result<Vec<Member>>;
}

/// Storage for reservations.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Inserts a reservation if its slot is still free on its date.
    ///
    /// The conflict check against blocking reservations and the insert are
    /// one atomic unit; concurrent requests for overlapping slots cannot
    /// both succeed. Fails with `SlotTaken` on overlap.
    async fn insert_reservation_if_free(&self, reservation: &Reservation) -> Result<()>;

    /// Looks a reservation up by id.
    async fn get_reservation(&self, id: ReservationId) -> Result<Option<Reservation>>;

    /// Replaces an existing reservation record.
    async fn update_reservation(&self, reservation: &Reservation) -> Result<()>;

    /// Slots of blocking (pending or active) reservations on a date.
    async fn blocking_slots_on(&self, date: NaiveDate) -> Result<Vec<TimeSlot>>;

    /// Non-terminal reservations on or after a date, soonest first.
    async fn list_upcoming(&self, from: NaiveDate) -> Result<Vec<Reservation>>;

    /// Active reservations whose date is strictly before the given date.
    async fn list_active_before(&self, date: NaiveDate) -> Result<Vec<Reservation>>;

    /// How many reservations exist in each status. Absent statuses have no
    /// entry.
    async fn count_reservations_by_status(&self) -> Result<HashMap<ReservationStatus, u64>>;
}

/// Storage for usage fees.
#[async_trait]
pub trait FeeRepository: Send + Sync {
    /// Inserts a new fee.
    ///
    /// Fails with `DuplicatePaymentCode` if another fee already carries the
    /// same code; the caller regenerates and retries.
    async fn insert_fee(&self, fee: &Fee) -> Result<()>;

    /// Looks a fee up by its payment code.
    async fn get_fee_by_code(&self, code: &PaymentCode) -> Result<Option<Fee>>;

    /// The fee issued for a reservation.
    async fn get_fee_for_reservation(&self, id: ReservationId) -> Result<Option<Fee>>;

    /// Replaces an existing fee record.
    async fn update_fee(&self, fee: &Fee) -> Result<()>;

    /// Pending fees whose deadline has passed at `now`.
    async fn list_pending_past_due(&self, now: DateTime<Utc>) -> Result<Vec<Fee>>;
}

/// Storage for bulletins.
#[async_trait]
pub trait BulletinRepository: Send + Sync {
    /// Inserts a new bulletin.
    async fn insert_bulletin(&self, bulletin: &Bulletin) -> Result<()>;

    /// Looks a bulletin up by id.
    async fn get_bulletin(&self, id: BulletinId) -> Result<Option<Bulletin>>;

    /// Replaces an existing bulletin record.
    async fn update_bulletin(&self, bulletin: &Bulletin) -> Result<()>;

    /// All stored bulletins, newest first.
    async fn list_bulletins(&self) -> Result<Vec<Bulletin>>;
}

/// Everything the workflow layer needs from a backend.
pub trait Store:
    MemberRepository + ReservationRepository + FeeRepository + BulletinRepository + 'static
{
}

impl<T> Store for T where
    T: MemberRepository + ReservationRepository + FeeRepository + BulletinRepository + 'static
{
}
