use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use common::{BulletinId, Cpf, FeeId, ReservationId};
use domain::{
    Audience, Bulletin, BulletinKind, Fee, FeeStatus, Member, Money, PaymentCode, PaymentMethod,
    Priority, Reservation, ReservationStatus, Standing, TimeSlot,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    repository::{BulletinRepository, FeeRepository, MemberRepository, ReservationRepository},
};

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        tracing::info!("running database migrations");
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn decode<T: std::str::FromStr<Err = String>>(value: &str) -> Result<T> {
        value.parse().map_err(StoreError::Decode)
    }

    fn row_to_member(row: PgRow) -> Result<Member> {
        Ok(Member {
            cpf: Cpf::parse(row.try_get::<String, _>("cpf")?.as_str())
                .map_err(|e| StoreError::Decode(e.to_string()))?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            standing: Self::decode::<Standing>(&row.try_get::<String, _>("standing")?)?,
            last_dues_payment: row.try_get("last_dues_payment")?,
            joined_at: row.try_get("joined_at")?,
            active: row.try_get("active")?,
        })
    }

    fn row_to_reservation(row: PgRow) -> Result<Reservation> {
        let start: NaiveTime = row.try_get("start_time")?;
        let end: NaiveTime = row.try_get("end_time")?;
        let slot = TimeSlot::new(start, end).map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(Reservation {
            id: ReservationId::from_uuid(row.try_get::<Uuid, _>("id")?),
            member_cpf: Cpf::parse(row.try_get::<String, _>("member_cpf")?.as_str())
                .map_err(|e| StoreError::Decode(e.to_string()))?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            date: row.try_get("date")?,
            slot,
            guests: row.try_get::<i32, _>("guests")? as u32,
            notes: row.try_get("notes")?,
            status: Self::decode::<ReservationStatus>(&row.try_get::<String, _>("status")?)?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_fee(row: PgRow) -> Result<Fee> {
        let method: Option<String> = row.try_get("method")?;
        let method = method
            .map(|m| Self::decode::<PaymentMethod>(&m))
            .transpose()?;

        Ok(Fee {
            id: FeeId::from_uuid(row.try_get::<Uuid, _>("id")?),
            reservation_id: ReservationId::from_uuid(row.try_get::<Uuid, _>("reservation_id")?),
            member_cpf: Cpf::parse(row.try_get::<String, _>("member_cpf")?.as_str())
                .map_err(|e| StoreError::Decode(e.to_string()))?,
            amount: Money::from_cents(row.try_get("amount_cents")?),
            code: PaymentCode::from(row.try_get::<String, _>("payment_code")?),
            status: Self::decode::<FeeStatus>(&row.try_get::<String, _>("status")?)?,
            method,
            created_at: row.try_get("created_at")?,
            due_by: row.try_get("due_by")?,
            paid_at: row.try_get("paid_at")?,
        })
    }

    fn row_to_bulletin(row: PgRow) -> Result<Bulletin> {
        Ok(Bulletin {
            id: BulletinId::from_uuid(row.try_get::<Uuid, _>("id")?),
            title: row.try_get("title")?,
            body: row.try_get("body")?,
            kind: Self::decode::<BulletinKind>(&row.try_get::<String, _>("kind")?)?,
            priority: Self::decode::<Priority>(&row.try_get::<String, _>("priority")?)?,
            audience: Self::decode::<Audience>(&row.try_get::<String, _>("audience")?)?,
            published_at: row.try_get("published_at")?,
            expires_at: row.try_get("expires_at")?,
            active: row.try_get("active")?,
            author: row.try_get("author")?,
        })
    }
}

#[async_trait]
impl MemberRepository for PostgresStore {
    async fn insert_member(&self, member: &Member) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO members (cpf, name, email, phone, standing, last_dues_payment, joined_at, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(member.cpf.as_ref())
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(member.standing.as_str())
        .bind(member.last_dues_payment)
        .bind(member.joined_at)
        .bind(member.active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                match db_err.constraint() {
                    Some("members_pkey") => {
                        return StoreError::DuplicateCpf(member.cpf.clone());
                    }
                    Some("members_email_key") => {
                        return StoreError::DuplicateEmail(member.email.clone());
                    }
                    _ => {}
                }
            }
            StoreError::Database(e)
        })?;
        Ok(())
    }

    async fn get_member(&self, cpf: &Cpf) -> Result<Option<Member>> {
        let row = sqlx::query("SELECT * FROM members WHERE cpf = $1")
            .bind(cpf.as_ref())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_member).transpose()
    }

    async fn update_member(&self, member: &Member) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET name = $2, email = $3, phone = $4, standing = $5,
                last_dues_payment = $6, active = $7
            WHERE cpf = $1
            "#,
        )
        .bind(member.cpf.as_ref())
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(member.standing.as_str())
        .bind(member.last_dues_payment)
        .bind(member.active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::MemberNotFound(member.cpf.clone()));
        }
        Ok(())
    }

    async fn list_delinquent_members(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query(
            "SELECT * FROM members WHERE active AND standing = 'delinquent' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_member).collect()
    }
}

#[async_trait]
impl ReservationRepository for PostgresStore {
    async fn insert_reservation_if_free(&self, reservation: &Reservation) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Serialize all inserts for the same date so concurrent requests
        // cannot both pass the conflict check.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(reservation.date.to_string())
            .execute(&mut *tx)
            .await?;

        let rows = sqlx::query(
            r#"
            SELECT start_time, end_time FROM reservations
            WHERE date = $1 AND status IN ('pending_payment', 'active')
            "#,
        )
        .bind(reservation.date)
        .fetch_all(&mut *tx)
        .await?;

        for row in rows {
            let start: NaiveTime = row.try_get("start_time")?;
            let end: NaiveTime = row.try_get("end_time")?;
            let existing =
                TimeSlot::new(start, end).map_err(|e| StoreError::Decode(e.to_string()))?;
            if reservation.slot.overlaps(&existing) {
                tracing::debug!(
                    date = %reservation.date,
                    slot = %reservation.slot,
                    %existing,
                    "slot conflict detected during insert"
                );
                return Err(StoreError::SlotTaken { existing });
            }
        }

        sqlx::query(
            r#"
            INSERT INTO reservations
                (id, member_cpf, name, email, phone, date, start_time, end_time,
                 guests, notes, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(reservation.id.as_uuid())
        .bind(reservation.member_cpf.as_ref())
        .bind(&reservation.name)
        .bind(&reservation.email)
        .bind(&reservation.phone)
        .bind(reservation.date)
        .bind(reservation.slot.start())
        .bind(reservation.slot.end())
        .bind(reservation.guests as i32)
        .bind(&reservation.notes)
        .bind(reservation.status.as_str())
        .bind(reservation.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_reservation(&self, id: ReservationId) -> Result<Option<Reservation>> {
        let row = sqlx::query("SELECT * FROM reservations WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_reservation).transpose()
    }

    async fn update_reservation(&self, reservation: &Reservation) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET status = $2, notes = $3
            WHERE id = $1
            "#,
        )
        .bind(reservation.id.as_uuid())
        .bind(reservation.status.as_str())
        .bind(&reservation.notes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ReservationNotFound(reservation.id));
        }
        Ok(())
    }

    async fn blocking_slots_on(&self, date: NaiveDate) -> Result<Vec<TimeSlot>> {
        let rows = sqlx::query(
            r#"
            SELECT start_time, end_time FROM reservations
            WHERE date = $1 AND status IN ('pending_payment', 'active')
            ORDER BY start_time
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let start: NaiveTime = row.try_get("start_time")?;
                let end: NaiveTime = row.try_get("end_time")?;
                TimeSlot::new(start, end).map_err(|e| StoreError::Decode(e.to_string()))
            })
            .collect()
    }

    async fn list_upcoming(&self, from: NaiveDate) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM reservations
            WHERE date >= $1 AND status IN ('pending_payment', 'active')
            ORDER BY date, start_time
            "#,
        )
        .bind(from)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_reservation).collect()
    }

    async fn list_active_before(&self, date: NaiveDate) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(
            "SELECT * FROM reservations WHERE date < $1 AND status = 'active'",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_reservation).collect()
    }

    async fn count_reservations_by_status(&self) -> Result<HashMap<ReservationStatus, u64>> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS total FROM reservations GROUP BY status")
            .fetch_all(&self.pool)
            .await?;
        let mut counts = HashMap::new();
        for row in rows {
            let status: ReservationStatus = Self::decode(row.try_get::<String, _>("status")?.as_str())?;
            let total: i64 = row.try_get("total")?;
            counts.insert(status, total as u64);
        }
        Ok(counts)
    }
}

#[async_trait]
impl FeeRepository for PostgresStore {
    async fn insert_fee(&self, fee: &Fee) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO fees
                (id, reservation_id, member_cpf, amount_cents, payment_code,
                 status, method, created_at, due_by, paid_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(fee.id.as_uuid())
        .bind(fee.reservation_id.as_uuid())
        .bind(fee.member_cpf.as_ref())
        .bind(fee.amount.cents())
        .bind(fee.code.as_str())
        .bind(fee.status.as_str())
        .bind(fee.method.map(|m| m.as_str()))
        .bind(fee.created_at)
        .bind(fee.due_by)
        .bind(fee.paid_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_payment_code")
            {
                return StoreError::DuplicatePaymentCode(fee.code.clone());
            }
            StoreError::Database(e)
        })?;
        Ok(())
    }

    async fn get_fee_by_code(&self, code: &PaymentCode) -> Result<Option<Fee>> {
        let row = sqlx::query("SELECT * FROM fees WHERE payment_code = $1")
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_fee).transpose()
    }

    async fn get_fee_for_reservation(&self, id: ReservationId) -> Result<Option<Fee>> {
        let row = sqlx::query("SELECT * FROM fees WHERE reservation_id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_fee).transpose()
    }

    async fn update_fee(&self, fee: &Fee) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE fees
            SET status = $2, method = $3, paid_at = $4
            WHERE id = $1
            "#,
        )
        .bind(fee.id.as_uuid())
        .bind(fee.status.as_str())
        .bind(fee.method.map(|m| m.as_str()))
        .bind(fee.paid_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::FeeNotFound(fee.id));
        }
        Ok(())
    }

    async fn list_pending_past_due(&self, now: DateTime<Utc>) -> Result<Vec<Fee>> {
        let rows = sqlx::query("SELECT * FROM fees WHERE status = 'pending' AND due_by < $1")
            .bind(now)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_fee).collect()
    }
}

#[async_trait]
impl BulletinRepository for PostgresStore {
    async fn insert_bulletin(&self, bulletin: &Bulletin) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bulletins
                (id, title, body, kind, priority, audience, published_at,
                 expires_at, active, author)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(bulletin.id.as_uuid())
        .bind(&bulletin.title)
        .bind(&bulletin.body)
        .bind(bulletin.kind.as_str())
        .bind(bulletin.priority.as_str())
        .bind(bulletin.audience.as_str())
        .bind(bulletin.published_at)
        .bind(bulletin.expires_at)
        .bind(bulletin.active)
        .bind(&bulletin.author)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_bulletin(&self, id: BulletinId) -> Result<Option<Bulletin>> {
        let row = sqlx::query("SELECT * FROM bulletins WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_bulletin).transpose()
    }

    async fn update_bulletin(&self, bulletin: &Bulletin) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE bulletins
            SET title = $2, body = $3, kind = $4, priority = $5, audience = $6,
                expires_at = $7, active = $8, author = $9
            WHERE id = $1
            "#,
        )
        .bind(bulletin.id.as_uuid())
        .bind(&bulletin.title)
        .bind(&bulletin.body)
        .bind(bulletin.kind.as_str())
        .bind(bulletin.priority.as_str())
        .bind(bulletin.audience.as_str())
        .bind(bulletin.expires_at)
        .bind(bulletin.active)
        .bind(&bulletin.author)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::BulletinNotFound(bulletin.id));
        }
        Ok(())
    }

    async fn list_bulletins(&self) -> Result<Vec<Bulletin>> {
        let rows = sqlx::query("SELECT * FROM bulletins ORDER BY published_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_bulletin).collect()
    }
}
