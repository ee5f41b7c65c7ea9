//! Pure reservation rule checking.

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::FacilityConfig;
use crate::member::Member;

use super::slot::TimeSlot;

/// Why a candidate reservation was rejected.
///
/// Each variant is a hard rejection; the first failed check wins and no
/// partial acceptance exists. [`RejectReason::code`] gives the stable
/// machine-readable code surfaced to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// The member is delinquent with union dues (or inactive).
    #[error("associado inadimplente com a taxa sindical; regularize sua situação para reservar")]
    MemberDelinquent,

    /// The slot falls outside the facility's operating hours.
    #[error(
        "horário de funcionamento: {} às {}",
        opening.format("%H:%M"),
        closing.format("%H:%M")
    )]
    OutsideOperatingHours {
        opening: chrono::NaiveTime,
        closing: chrono::NaiveTime,
    },

    /// The slot is shorter or longer than allowed.
    #[error("duração deve ser de {min_hours}h a {max_hours}h")]
    InvalidDuration { min_hours: i64, max_hours: i64 },

    /// The date is too soon or too far out.
    #[error("reserva deve ser feita com {min_days} a {max_days} dias de antecedência")]
    InvalidAdvanceNotice { min_days: i64, max_days: i64 },

    /// Guest count outside 1..=capacity.
    #[error("número de convidados deve ser de 1 a {max_guests}")]
    GuestCountExceeded { max_guests: u32 },

    /// The slot overlaps an existing reservation on the same date.
    #[error("conflito com reserva existente: {existing}")]
    TimeConflict { existing: TimeSlot },
}

impl RejectReason {
    /// The stable machine-readable code for this rejection.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::MemberDelinquent => "MemberDelinquent",
            RejectReason::OutsideOperatingHours { .. } => "OutsideOperatingHours",
            RejectReason::InvalidDuration { .. } => "InvalidDuration",
            RejectReason::InvalidAdvanceNotice { .. } => "InvalidAdvanceNotice",
            RejectReason::GuestCountExceeded { .. } => "GuestCountExceeded",
            RejectReason::TimeConflict { .. } => "TimeConflict",
        }
    }
}

/// A proposed reservation, before any record exists.
#[derive(Debug, Clone, Copy)]
pub struct ReservationCandidate {
    /// Requested date.
    pub date: NaiveDate,

    /// Requested time slot.
    pub slot: TimeSlot,

    /// Number of guests, including the member.
    pub guests: u32,
}

/// Checks a candidate reservation against the facility rules.
///
/// This component only computes: it is handed the member's record and the
/// slots of existing non-terminal reservations for the candidate date, and
/// never touches storage itself.
#[derive(Debug, Clone)]
pub struct ReservationValidator {
    config: FacilityConfig,
}

impl ReservationValidator {
    /// Creates a validator for the given facility rules.
    pub fn new(config: FacilityConfig) -> Self {
        Self { config }
    }

    /// Returns the facility rules this validator applies.
    pub fn config(&self) -> &FacilityConfig {
        &self.config
    }

    /// Runs all checks in order, returning the first failure.
    pub fn validate(
        &self,
        candidate: &ReservationCandidate,
        member: &Member,
        today: NaiveDate,
        existing: &[TimeSlot],
    ) -> Result<(), RejectReason> {
        self.check_standing(member)?;
        self.check_operating_hours(&candidate.slot)?;
        self.check_duration(&candidate.slot)?;
        self.check_advance_notice(candidate.date, today)?;
        self.check_guest_count(candidate.guests)?;
        self.check_conflicts(&candidate.slot, existing)?;
        Ok(())
    }

    fn check_standing(&self, member: &Member) -> Result<(), RejectReason> {
        if !member.in_good_standing() {
            return Err(RejectReason::MemberDelinquent);
        }
        Ok(())
    }

    fn check_operating_hours(&self, slot: &TimeSlot) -> Result<(), RejectReason> {
        if slot.start() < self.config.opening_time || slot.end() > self.config.closing_time {
            return Err(RejectReason::OutsideOperatingHours {
                opening: self.config.opening_time,
                closing: self.config.closing_time,
            });
        }
        Ok(())
    }

    fn check_duration(&self, slot: &TimeSlot) -> Result<(), RejectReason> {
        let duration = slot.duration();
        if duration < self.config.min_duration || duration > self.config.max_duration {
            return Err(RejectReason::InvalidDuration {
                min_hours: self.config.min_duration.num_hours(),
                max_hours: self.config.max_duration.num_hours(),
            });
        }
        Ok(())
    }

    fn check_advance_notice(&self, date: NaiveDate, today: NaiveDate) -> Result<(), RejectReason> {
        let days_ahead = (date - today).num_days();
        if days_ahead < self.config.min_advance_days || days_ahead > self.config.max_advance_days {
            return Err(RejectReason::InvalidAdvanceNotice {
                min_days: self.config.min_advance_days,
                max_days: self.config.max_advance_days,
            });
        }
        Ok(())
    }

    fn check_guest_count(&self, guests: u32) -> Result<(), RejectReason> {
        if guests < 1 || guests > self.config.max_guests {
            return Err(RejectReason::GuestCountExceeded {
                max_guests: self.config.max_guests,
            });
        }
        Ok(())
    }

    fn check_conflicts(&self, slot: &TimeSlot, existing: &[TimeSlot]) -> Result<(), RejectReason> {
        for other in existing {
            if slot.overlaps(other) {
                return Err(RejectReason::TimeConflict { existing: *other });
            }
        }
        Ok(())
    }
}

impl Default for ReservationValidator {
    fn default() -> Self {
        Self::new(FacilityConfig::default())
    }
}
