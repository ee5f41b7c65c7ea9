//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use common::{Cpf, ReservationId};
use domain::{
    Audience, Bulletin, BulletinKind, Fee, FeeStatus, Member, Money, PaymentMethod, Priority,
    Reservation, ReservationCandidate, ReservationStatus, Standing, TimeSlot,
};
use sqlx::PgPool;
use store::{
    BulletinRepository, FeeRepository, MemberRepository, PostgresStore, ReservationRepository,
    StoreError,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    // Clear tables for test isolation
    sqlx::query("TRUNCATE TABLE fees, reservations, bulletins, members")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

fn member() -> Member {
    Member::new(
        Cpf::parse("52998224725").unwrap(),
        "Maria Silva",
        "maria@example.com",
    )
}

fn slot(start: u32, end: u32) -> TimeSlot {
    TimeSlot::new(
        NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
    )
    .unwrap()
}

fn reservation(date: NaiveDate, slot: TimeSlot) -> Reservation {
    Reservation::new(
        &member(),
        &ReservationCandidate {
            date,
            slot,
            guests: 4,
        },
        Some("churrasco de aniversário".into()),
        Utc::now(),
    )
}

#[tokio::test]
async fn test_member_round_trip() {
    let store = get_test_store().await;
    let mut m = member();
    m.phone = Some("62999990000".into());

    store.insert_member(&m).await.unwrap();
    let loaded = store.get_member(&m.cpf).await.unwrap().unwrap();

    assert_eq!(loaded.name, m.name);
    assert_eq!(loaded.email, m.email);
    assert_eq!(loaded.phone, m.phone);
    assert_eq!(loaded.standing, Standing::Current);
    assert!(loaded.active);
}

#[tokio::test]
async fn test_duplicate_member_cpf_rejected() {
    let store = get_test_store().await;
    store.insert_member(&member()).await.unwrap();

    let mut dup = member();
    dup.email = "outra@example.com".into();
    assert!(matches!(
        store.insert_member(&dup).await,
        Err(StoreError::DuplicateCpf(_))
    ));
}

#[tokio::test]
async fn test_duplicate_member_email_rejected() {
    let store = get_test_store().await;
    store.insert_member(&member()).await.unwrap();

    let mut dup = member();
    dup.cpf = Cpf::parse("11144477735").unwrap();
    assert!(matches!(
        store.insert_member(&dup).await,
        Err(StoreError::DuplicateEmail(_))
    ));
}

#[tokio::test]
async fn test_member_standing_update() {
    let store = get_test_store().await;
    let mut m = member();
    store.insert_member(&m).await.unwrap();

    m.mark_delinquent();
    store.update_member(&m).await.unwrap();

    let delinquent = store.list_delinquent_members().await.unwrap();
    assert_eq!(delinquent.len(), 1);
    assert_eq!(delinquent[0].cpf, m.cpf);
}

#[tokio::test]
async fn test_reservation_round_trip() {
    let store = get_test_store().await;
    store.insert_member(&member()).await.unwrap();

    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let r = reservation(date, slot(9, 11));
    store.insert_reservation_if_free(&r).await.unwrap();

    let loaded = store.get_reservation(r.id).await.unwrap().unwrap();
    assert_eq!(loaded.date, date);
    assert_eq!(loaded.slot, slot(9, 11));
    assert_eq!(loaded.guests, 4);
    assert_eq!(loaded.status, ReservationStatus::PendingPayment);
    assert_eq!(loaded.notes.as_deref(), Some("churrasco de aniversário"));
}

#[tokio::test]
async fn test_overlapping_reservation_rejected() {
    let store = get_test_store().await;
    store.insert_member(&member()).await.unwrap();

    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    store
        .insert_reservation_if_free(&reservation(date, slot(9, 12)))
        .await
        .unwrap();

    let result = store
        .insert_reservation_if_free(&reservation(date, slot(11, 14)))
        .await;
    assert!(matches!(result, Err(StoreError::SlotTaken { .. })));
}

#[tokio::test]
async fn test_cancelled_reservation_frees_slot() {
    let store = get_test_store().await;
    store.insert_member(&member()).await.unwrap();

    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let mut r = reservation(date, slot(9, 12));
    store.insert_reservation_if_free(&r).await.unwrap();

    r.status = ReservationStatus::Cancelled;
    store.update_reservation(&r).await.unwrap();

    store
        .insert_reservation_if_free(&reservation(date, slot(10, 13)))
        .await
        .unwrap();

    let slots = store.blocking_slots_on(date).await.unwrap();
    assert_eq!(slots, vec![slot(10, 13)]);
}

#[tokio::test]
async fn test_fee_round_trip_and_code_lookup() {
    let store = get_test_store().await;
    store.insert_member(&member()).await.unwrap();

    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let r = reservation(date, slot(9, 11));
    store.insert_reservation_if_free(&r).await.unwrap();

    let mut fee = Fee::new(
        r.id,
        member().cpf,
        Money::from_reais(25),
        Utc::now(),
        Duration::hours(24),
    );
    store.insert_fee(&fee).await.unwrap();

    let loaded = store.get_fee_by_code(&fee.code).await.unwrap().unwrap();
    assert_eq!(loaded.id, fee.id);
    assert_eq!(loaded.amount, Money::from_reais(25));
    assert_eq!(loaded.status, FeeStatus::Pending);

    fee.mark_paid(PaymentMethod::Pix, Utc::now());
    store.update_fee(&fee).await.unwrap();

    let loaded = store.get_fee_for_reservation(r.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, FeeStatus::Paid);
    assert_eq!(loaded.method, Some(PaymentMethod::Pix));
}

#[tokio::test]
async fn test_pending_past_due_query() {
    let store = get_test_store().await;
    store.insert_member(&member()).await.unwrap();

    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let r = reservation(date, slot(9, 11));
    store.insert_reservation_if_free(&r).await.unwrap();

    let fee = Fee::new(
        r.id,
        member().cpf,
        Money::from_reais(25),
        Utc::now() - Duration::hours(30),
        Duration::hours(24),
    );
    store.insert_fee(&fee).await.unwrap();

    let due = store.list_pending_past_due(Utc::now()).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, fee.id);

    let due = store
        .list_pending_past_due(Utc::now() - Duration::hours(12))
        .await
        .unwrap();
    assert!(due.is_empty());
}

#[tokio::test]
async fn test_unknown_reservation_update_fails() {
    let store = get_test_store().await;
    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let r = reservation(date, slot(9, 11));

    assert!(matches!(
        store.update_reservation(&r).await,
        Err(StoreError::ReservationNotFound(id)) if id == r.id
    ));
    assert!(store.get_reservation(ReservationId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_status_counts_grouped() {
    let store = get_test_store().await;
    store.insert_member(&member()).await.unwrap();

    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let mut cancelled = reservation(date, slot(9, 11));
    store.insert_reservation_if_free(&cancelled).await.unwrap();
    cancelled.status = ReservationStatus::Cancelled;
    store.update_reservation(&cancelled).await.unwrap();

    store
        .insert_reservation_if_free(&reservation(date, slot(14, 16)))
        .await
        .unwrap();

    let counts = store.count_reservations_by_status().await.unwrap();
    assert_eq!(counts.get(&ReservationStatus::Cancelled), Some(&1));
    assert_eq!(counts.get(&ReservationStatus::PendingPayment), Some(&1));
    assert_eq!(counts.get(&ReservationStatus::Active), None);
}

#[tokio::test]
async fn test_bulletin_round_trip() {
    let store = get_test_store().await;

    let mut b = Bulletin::new(
        "Taxa sindical em atraso",
        "Regularize sua situação até o fim do mês.",
        BulletinKind::Notice,
        Priority::High,
        Audience::Delinquent,
        Utc::now(),
    );
    b.author = Some("Diretoria".into());
    store.insert_bulletin(&b).await.unwrap();

    let loaded = store.get_bulletin(b.id).await.unwrap().unwrap();
    assert_eq!(loaded.kind, BulletinKind::Notice);
    assert_eq!(loaded.priority, Priority::High);
    assert_eq!(loaded.audience, Audience::Delinquent);
    assert_eq!(loaded.author.as_deref(), Some("Diretoria"));

    b.deactivate();
    store.update_bulletin(&b).await.unwrap();
    let loaded = store.get_bulletin(b.id).await.unwrap().unwrap();
    assert!(!loaded.active);
}
