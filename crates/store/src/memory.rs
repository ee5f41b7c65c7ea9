use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use common::{BulletinId, Cpf, ReservationId};
use domain::{Bulletin, Fee, Member, PaymentCode, Reservation, TimeSlot};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    repository::{BulletinRepository, FeeRepository, MemberRepository, ReservationRepository},
};

/// In-memory store backend.
///
/// Used by tests and as the default backend when no database is configured.
/// Provides the same interface and the same atomicity as the PostgreSQL
/// backend: the slot-conflict check and the reservation insert happen under
/// a single write lock.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    members: Arc<RwLock<HashMap<Cpf, Member>>>,
    reservations: Arc<RwLock<HashMap<ReservationId, Reservation>>>,
    fees: Arc<RwLock<HashMap<common::FeeId, Fee>>>,
    bulletins: Arc<RwLock<HashMap<BulletinId, Bulletin>>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored reservations, any status.
    pub async fn reservation_count(&self) -> usize {
        self.reservations.read().await.len()
    }

    /// Clears all stored data.
    pub async fn clear(&self) {
        self.members.write().await.clear();
        self.reservations.write().await.clear();
        self.fees.write().await.clear();
        self.bulletins.write().await.clear();
    }
}

#[async_trait]
impl MemberRepository for InMemoryStore {
    async fn insert_member(&self, member: &Member) -> Result<()> {
        let mut members = self.members.write().await;
        if members.contains_key(&member.cpf) {
            return Err(StoreError::DuplicateCpf(member.cpf.clone()));
        }
        if members
            .values()
            .any(|m| m.email.eq_ignore_ascii_case(&member.email))
        {
            return Err(StoreError::DuplicateEmail(member.email.clone()));
        }
        members.insert(member.cpf.clone(), member.clone());
        Ok(())
    }

    async fn get_member(&self, cpf: &Cpf) -> Result<Option<Member>> {
        Ok(self.members.read().await.get(cpf).cloned())
    }

    async fn update_member(&self, member: &Member) -> Result<()> {
        let mut members = self.members.write().await;
        match members.get_mut(&member.cpf) {
            Some(existing) => {
                *existing = member.clone();
                Ok(())
            }
            None => Err(StoreError::MemberNotFound(member.cpf.clone())),
        }
    }

    async fn list_delinquent_members(&self) -> Result<Vec<Member>> {
        let members = self.members.read().await;
        let mut delinquent: Vec<_> = members
            .values()
            .filter(|m| m.active && !m.in_good_standing())
            .cloned()
            .collect();
        delinquent.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(delinquent)
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn insert_reservation_if_free(&self, reservation: &Reservation) -> Result<()> {
        // Write lock held across check and insert: no interleaving request
        // can grab the same slot.
        let mut reservations = self.reservations.write().await;
        let conflict = reservations
            .values()
            .filter(|r| r.date == reservation.date && r.blocks_slot())
            .find(|r| r.slot.overlaps(&reservation.slot));
        if let Some(existing) = conflict {
            return Err(StoreError::SlotTaken {
                existing: existing.slot,
            });
        }
        reservations.insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn get_reservation(&self, id: ReservationId) -> Result<Option<Reservation>> {
        Ok(self.reservations.read().await.get(&id).cloned())
    }

    async fn update_reservation(&self, reservation: &Reservation) -> Result<()> {
        let mut reservations = self.reservations.write().await;
        match reservations.get_mut(&reservation.id) {
            Some(existing) => {
                *existing = reservation.clone();
                Ok(())
            }
            None => Err(StoreError::ReservationNotFound(reservation.id)),
        }
    }

    async fn blocking_slots_on(&self, date: NaiveDate) -> Result<Vec<TimeSlot>> {
        let reservations = self.reservations.read().await;
        let mut slots: Vec<_> = reservations
            .values()
            .filter(|r| r.date == date && r.blocks_slot())
            .map(|r| r.slot)
            .collect();
        slots.sort_by_key(|s| s.start());
        Ok(slots)
    }

    async fn list_upcoming(&self, from: NaiveDate) -> Result<Vec<Reservation>> {
        let reservations = self.reservations.read().await;
        let mut upcoming: Vec<_> = reservations
            .values()
            .filter(|r| r.date >= from && !r.status.is_terminal())
            .cloned()
            .collect();
        upcoming.sort_by_key(|r| (r.date, r.slot.start()));
        Ok(upcoming)
    }

    async fn list_active_before(&self, date: NaiveDate) -> Result<Vec<Reservation>> {
        let reservations = self.reservations.read().await;
        Ok(reservations
            .values()
            .filter(|r| r.date < date && r.status == domain::ReservationStatus::Active)
            .cloned()
            .collect())
    }

    async fn count_reservations_by_status(
        &self,
    ) -> Result<HashMap<domain::ReservationStatus, u64>> {
        let reservations = self.reservations.read().await;
        let mut counts = HashMap::new();
        for reservation in reservations.values() {
            *counts.entry(reservation.status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[async_trait]
impl FeeRepository for InMemoryStore {
    async fn insert_fee(&self, fee: &Fee) -> Result<()> {
        let mut fees = self.fees.write().await;
        if fees.values().any(|f| f.code == fee.code) {
            return Err(StoreError::DuplicatePaymentCode(fee.code.clone()));
        }
        fees.insert(fee.id, fee.clone());
        Ok(())
    }

    async fn get_fee_by_code(&self, code: &PaymentCode) -> Result<Option<Fee>> {
        let fees = self.fees.read().await;
        Ok(fees.values().find(|f| &f.code == code).cloned())
    }

    async fn get_fee_for_reservation(&self, id: ReservationId) -> Result<Option<Fee>> {
        let fees = self.fees.read().await;
        Ok(fees.values().find(|f| f.reservation_id == id).cloned())
    }

    async fn update_fee(&self, fee: &Fee) -> Result<()> {
        let mut fees = self.fees.write().await;
        match fees.get_mut(&fee.id) {
            Some(existing) => {
                *existing = fee.clone();
                Ok(())
            }
            None => Err(StoreError::FeeNotFound(fee.id)),
        }
    }

    async fn list_pending_past_due(&self, now: DateTime<Utc>) -> Result<Vec<Fee>> {
        let fees = self.fees.read().await;
        Ok(fees.values().filter(|f| f.is_past_due(now)).cloned().collect())
    }
}

#[async_trait]
impl BulletinRepository for InMemoryStore {
    async fn insert_bulletin(&self, bulletin: &Bulletin) -> Result<()> {
        self.bulletins
            .write()
            .await
            .insert(bulletin.id, bulletin.clone());
        Ok(())
    }

    async fn get_bulletin(&self, id: BulletinId) -> Result<Option<Bulletin>> {
        Ok(self.bulletins.read().await.get(&id).cloned())
    }

    async fn update_bulletin(&self, bulletin: &Bulletin) -> Result<()> {
        let mut bulletins = self.bulletins.write().await;
        match bulletins.get_mut(&bulletin.id) {
            Some(existing) => {
                *existing = bulletin.clone();
                Ok(())
            }
            None => Err(StoreError::BulletinNotFound(bulletin.id)),
        }
    }

    async fn list_bulletins(&self) -> Result<Vec<Bulletin>> {
        let bulletins = self.bulletins.read().await;
        let mut all: Vec<_> = bulletins.values().cloned().collect();
        all.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(all)
    }
}
