//! End-to-end checks of the reservation rule set.

use chrono::{NaiveDate, NaiveTime, Utc};
use common::Cpf;
use domain::{
    FacilityConfig, Member, Money, RejectReason, Reservation, ReservationCandidate,
    ReservationStatus, ReservationValidator, TimeSlot,
};

fn member() -> Member {
    Member::new(
        Cpf::parse("52998224725").unwrap(),
        "Maria Silva",
        "maria@example.com",
    )
}

fn slot(start: (u32, u32), end: (u32, u32)) -> TimeSlot {
    TimeSlot::new(
        NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
    )
    .unwrap()
}

#[test]
fn reference_scenario_is_accepted() {
    // 2025-03-10, 09:00-11:00, 4 guests, member in good standing, empty
    // calendar: must pass every check.
    let validator = ReservationValidator::default();
    let candidate = ReservationCandidate {
        date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        slot: slot((9, 0), (11, 0)),
        guests: 4,
    };
    let today = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();

    assert_eq!(validator.validate(&candidate, &member(), today, &[]), Ok(()));

    let reservation = Reservation::new(&member(), &candidate, None, Utc::now());
    assert_eq!(reservation.status, ReservationStatus::PendingPayment);
    assert_eq!(
        FacilityConfig::default().fee_amount,
        Money::from_reais(25)
    );
}

#[test]
fn second_request_for_same_slot_conflicts() {
    let validator = ReservationValidator::default();
    let today = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
    let candidate = ReservationCandidate {
        date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        slot: slot((9, 0), (11, 0)),
        guests: 4,
    };

    // First request accepted; while it stays unpaid its slot still blocks.
    assert_eq!(validator.validate(&candidate, &member(), today, &[]), Ok(()));
    let taken = vec![candidate.slot];
    assert!(matches!(
        validator.validate(&candidate, &member(), today, &taken),
        Err(RejectReason::TimeConflict { .. })
    ));
}

#[test]
fn check_order_is_standing_hours_duration_advance_guests_conflict() {
    let validator = ReservationValidator::default();
    let today = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();

    // A candidate wrong in every way fails on the earliest check first.
    let mut m = member();
    m.mark_delinquent();
    let bad = ReservationCandidate {
        date: today,
        slot: slot((6, 0), (7, 0)),
        guests: 50,
    };
    assert_eq!(
        validator.validate(&bad, &m, today, &[]),
        Err(RejectReason::MemberDelinquent)
    );

    // Fix standing: hours fail next.
    assert!(matches!(
        validator.validate(&bad, &member(), today, &[]),
        Err(RejectReason::OutsideOperatingHours { .. })
    ));

    // Fix hours: duration fails next.
    let bad = ReservationCandidate {
        slot: slot((9, 0), (10, 0)),
        ..bad
    };
    assert!(matches!(
        validator.validate(&bad, &member(), today, &[]),
        Err(RejectReason::InvalidDuration { .. })
    ));

    // Fix duration: advance notice fails next.
    let bad = ReservationCandidate {
        slot: slot((9, 0), (12, 0)),
        ..bad
    };
    assert!(matches!(
        validator.validate(&bad, &member(), today, &[]),
        Err(RejectReason::InvalidAdvanceNotice { .. })
    ));

    // Fix date: guest count fails last before conflicts.
    let bad = ReservationCandidate {
        date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        ..bad
    };
    assert!(matches!(
        validator.validate(&bad, &member(), today, &[]),
        Err(RejectReason::GuestCountExceeded { .. })
    ));
}
