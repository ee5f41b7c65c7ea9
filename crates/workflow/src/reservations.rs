use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use common::{Cpf, ReservationId};
use domain::{
    FacilityConfig, Fee, PaymentCode, PaymentMethod, RejectReason, Reservation,
    ReservationCandidate, ReservationStatus, ReservationValidator, TimeSlot,
};
use store::{Store, StoreError};

use crate::clock::Clock;
use crate::ledger::{FeeLedger, PaymentOutcome};
use crate::{Result, WorkflowError};

/// Input for creating a reservation.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub cpf: Cpf,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub guests: u32,
    pub notes: Option<String>,
    /// Contact details for this reservation; the member record fills in
    /// whatever is omitted.
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

/// Result of a payment confirmation.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub fee: Fee,
    pub reservation: Reservation,
    /// True when the fee had already been paid before this call.
    pub already_paid: bool,
}

/// Answer to an availability query.
#[derive(Debug, Clone)]
pub struct Availability {
    pub available: bool,
    /// Why the query is unavailable, when a rule pre-check fails.
    pub reason: Option<RejectReason>,
    /// Blocking slots already held on the date.
    pub occupied: Vec<TimeSlot>,
}

/// Drives the payment-gated reservation lifecycle.
///
/// `pending_payment → active → completed`, with `cancelled` and `expired`
/// as terminal alternates. Every transition is persisted through the store;
/// a rejected request persists nothing.
pub struct ReservationWorkflow<S> {
    store: Arc<S>,
    validator: ReservationValidator,
    ledger: FeeLedger<S>,
    clock: Arc<dyn Clock>,
}

impl<S: Store> ReservationWorkflow<S> {
    /// Creates a workflow over the given store, rules, and clock.
    pub fn new(store: Arc<S>, config: FacilityConfig, clock: Arc<dyn Clock>) -> Self {
        let ledger = FeeLedger::new(store.clone(), config.clone());
        Self {
            store,
            validator: ReservationValidator::new(config),
            ledger,
            clock,
        }
    }

    /// The facility rules in force.
    pub fn config(&self) -> &FacilityConfig {
        self.validator.config()
    }

    /// Creates a reservation and issues its fee.
    ///
    /// The member must exist and pass every reservation rule. The conflict
    /// check and the insert are atomic in the store, so a concurrent
    /// request for an overlapping slot surfaces as `TimeConflict` here too.
    #[tracing::instrument(skip(self, request), fields(cpf = %request.cpf, date = %request.date))]
    pub async fn create(&self, request: NewReservation) -> Result<(Reservation, Fee)> {
        let member = self
            .store
            .get_member(&request.cpf)
            .await?
            .ok_or_else(|| WorkflowError::MemberNotFound(request.cpf.clone()))?;

        let candidate = ReservationCandidate {
            date: request.date,
            slot: request.slot,
            guests: request.guests,
        };
        let occupied = self.store.blocking_slots_on(request.date).await?;

        if let Err(reason) =
            self.validator
                .validate(&candidate, &member, self.clock.today(), &occupied)
        {
            metrics::counter!("reservations_rejected_total", "reason" => reason.code())
                .increment(1);
            tracing::info!(code = reason.code(), "reservation rejected");
            return Err(reason.into());
        }

        let mut reservation = Reservation::new(&member, &candidate, request.notes, self.clock.now());
        if let Some(name) = request.contact_name {
            reservation.name = name;
        }
        if let Some(email) = request.contact_email {
            reservation.email = email;
        }
        if let Some(phone) = request.contact_phone {
            reservation.phone = Some(phone);
        }
        match self.store.insert_reservation_if_free(&reservation).await {
            Ok(()) => {}
            Err(StoreError::SlotTaken { existing }) => {
                // Lost the race to a concurrent request.
                let reason = RejectReason::TimeConflict { existing };
                metrics::counter!("reservations_rejected_total", "reason" => reason.code())
                    .increment(1);
                return Err(reason.into());
            }
            Err(e) => return Err(e.into()),
        }

        let fee = self.ledger.issue(&reservation, self.clock.now()).await?;
        metrics::counter!("reservations_created_total").increment(1);
        tracing::info!(id = %reservation.id, code = %fee.code, "reservation created");
        Ok((reservation, fee))
    }

    /// Confirms payment of the fee quoted by `code`.
    ///
    /// On success the reservation becomes active. Confirming twice is an
    /// idempotent success; a fee past its deadline expires the pair.
    /// A cancelled or completed reservation refuses the payment outright,
    /// leaving its fee untouched.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_payment(
        &self,
        code: &PaymentCode,
        method: PaymentMethod,
    ) -> Result<PaymentConfirmation> {
        let fee = self
            .store
            .get_fee_by_code(code)
            .await?
            .ok_or(WorkflowError::FeeNotFound)?;
        let status = self.load_reservation(fee.reservation_id).await?.status;
        if matches!(
            status,
            ReservationStatus::Cancelled | ReservationStatus::Completed
        ) {
            return Err(WorkflowError::InvalidState { status });
        }

        let outcome = self.ledger.confirm(code, method, self.clock.now()).await?;

        match outcome {
            PaymentOutcome::Confirmed(fee) => {
                let mut reservation = self.load_reservation(fee.reservation_id).await?;
                if reservation.status.can_confirm_payment() {
                    reservation.status = ReservationStatus::Active;
                    self.store.update_reservation(&reservation).await?;
                }
                metrics::counter!("reservations_activated_total").increment(1);
                tracing::info!(id = %reservation.id, "reservation activated");
                Ok(PaymentConfirmation {
                    fee,
                    reservation,
                    already_paid: false,
                })
            }
            PaymentOutcome::AlreadyPaid(fee) => {
                let reservation = self.load_reservation(fee.reservation_id).await?;
                Ok(PaymentConfirmation {
                    fee,
                    reservation,
                    already_paid: true,
                })
            }
            PaymentOutcome::Expired(fee) => {
                self.expire_reservation(fee.reservation_id).await?;
                Err(WorkflowError::FeeExpired)
            }
        }
    }

    /// Expires every unpaid fee past its deadline, with its reservation.
    ///
    /// Idempotent: re-running over the same data changes nothing. Returns
    /// how many pairs were expired.
    #[tracing::instrument(skip(self))]
    pub async fn expire_unpaid(&self) -> Result<usize> {
        let now = self.clock.now();
        let overdue = self.ledger.find_overdue(now).await?;
        let count = overdue.len();

        for mut fee in overdue {
            self.ledger.expire(&mut fee).await?;
            self.expire_reservation(fee.reservation_id).await?;
        }

        if count > 0 {
            metrics::counter!("reservations_expired_total").increment(count as u64);
            tracing::info!(count, "expired unpaid reservations");
        }
        Ok(count)
    }

    /// Cancels a reservation.
    ///
    /// Allowed while pending or active, more than the notice window before
    /// the start. When a confirmation email is given it must match the
    /// reservation's. A pending fee already past due wins over the
    /// cancellation: the pair is expired and `FeeExpired` returned.
    #[tracing::instrument(skip(self, email))]
    pub async fn cancel(&self, id: ReservationId, email: Option<&str>) -> Result<Reservation> {
        let mut reservation = self.load_reservation(id).await?;

        if !reservation.status.can_cancel() {
            return Err(WorkflowError::InvalidState {
                status: reservation.status,
            });
        }
        if let Some(email) = email
            && !reservation.email.eq_ignore_ascii_case(email.trim())
        {
            return Err(WorkflowError::EmailMismatch);
        }

        let now = self.clock.now();
        if let Some(mut fee) = self.store.get_fee_for_reservation(id).await?
            && fee.is_past_due(now)
        {
            self.ledger.expire(&mut fee).await?;
            self.expire_reservation(id).await?;
            return Err(WorkflowError::FeeExpired);
        }

        let notice = self.config().cancellation_notice;
        let start = reservation.date.and_time(reservation.slot.start()).and_utc();
        if start - now < notice {
            return Err(WorkflowError::CancelWindowClosed {
                notice_hours: notice.num_hours(),
            });
        }

        reservation.status = ReservationStatus::Cancelled;
        self.store.update_reservation(&reservation).await?;
        metrics::counter!("reservations_cancelled_total").increment(1);
        tracing::info!(%id, "reservation cancelled");
        Ok(reservation)
    }

    /// Maintenance sweep: completes active reservations whose date passed.
    #[tracing::instrument(skip(self))]
    pub async fn complete_past(&self) -> Result<usize> {
        let past = self.store.list_active_before(self.clock.today()).await?;
        let count = past.len();
        for mut reservation in past {
            reservation.status = ReservationStatus::Completed;
            self.store.update_reservation(&reservation).await?;
        }
        Ok(count)
    }

    /// Checks whether a slot is free on a date, with rule pre-checks.
    pub async fn availability(
        &self,
        date: NaiveDate,
        slot: Option<TimeSlot>,
    ) -> Result<Availability> {
        let occupied = self.store.blocking_slots_on(date).await?;
        let config = self.config();

        let days_ahead = (date - self.clock.today()).num_days();
        if days_ahead < config.min_advance_days || days_ahead > config.max_advance_days {
            return Ok(Availability {
                available: false,
                reason: Some(RejectReason::InvalidAdvanceNotice {
                    min_days: config.min_advance_days,
                    max_days: config.max_advance_days,
                }),
                occupied,
            });
        }

        if let Some(slot) = slot {
            if slot.start() < config.opening_time || slot.end() > config.closing_time {
                return Ok(Availability {
                    available: false,
                    reason: Some(RejectReason::OutsideOperatingHours {
                        opening: config.opening_time,
                        closing: config.closing_time,
                    }),
                    occupied,
                });
            }
            if let Some(existing) = occupied.iter().find(|o| slot.overlaps(o)) {
                return Ok(Availability {
                    available: false,
                    reason: Some(RejectReason::TimeConflict {
                        existing: *existing,
                    }),
                    occupied,
                });
            }
        }

        Ok(Availability {
            available: true,
            reason: None,
            occupied,
        })
    }

    /// A reservation with its fee, if one was issued.
    pub async fn get(&self, id: ReservationId) -> Result<(Reservation, Option<Fee>)> {
        let reservation = self.load_reservation(id).await?;
        let fee = self.store.get_fee_for_reservation(id).await?;
        Ok((reservation, fee))
    }

    /// Upcoming non-terminal reservations, soonest first.
    pub async fn list_upcoming(&self) -> Result<Vec<Reservation>> {
        Ok(self.store.list_upcoming(self.clock.today()).await?)
    }

    /// Reservation counts per status, for the statistics endpoint.
    pub async fn count_by_status(&self) -> Result<HashMap<ReservationStatus, u64>> {
        Ok(self.store.count_reservations_by_status().await?)
    }

    async fn load_reservation(&self, id: ReservationId) -> Result<Reservation> {
        self.store
            .get_reservation(id)
            .await?
            .ok_or(WorkflowError::ReservationNotFound(id))
    }

    async fn expire_reservation(&self, id: ReservationId) -> Result<()> {
        let mut reservation = self.load_reservation(id).await?;
        if !reservation.status.is_terminal() {
            reservation.status = ReservationStatus::Expired;
            self.store.update_reservation(&reservation).await?;
            tracing::info!(%id, "reservation expired");
        }
        Ok(())
    }
}
