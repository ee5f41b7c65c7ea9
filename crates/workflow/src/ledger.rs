use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::{FacilityConfig, Fee, FeeStatus, PaymentCode, PaymentMethod, Reservation};
use store::{FeeRepository, StoreError};

use crate::{Result, WorkflowError};

/// How many fresh payment codes to try before giving up on a collision.
const CODE_RETRY_LIMIT: usize = 5;

/// Outcome of a payment confirmation attempt.
#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    /// The fee was pending and is now paid.
    Confirmed(Fee),

    /// The fee was already paid; nothing changed.
    AlreadyPaid(Fee),

    /// The deadline had passed; the fee is now expired.
    Expired(Fee),
}

/// Issues fees and settles payment codes.
pub struct FeeLedger<S> {
    store: Arc<S>,
    config: FacilityConfig,
}

impl<S: FeeRepository> FeeLedger<S> {
    /// Creates a ledger over the given store.
    pub fn new(store: Arc<S>, config: FacilityConfig) -> Self {
        Self { store, config }
    }

    /// Issues the fee for an accepted reservation.
    ///
    /// Payment codes are random; on the rare collision with a stored code
    /// the fee is regenerated with a fresh one.
    #[tracing::instrument(skip(self, reservation), fields(reservation_id = %reservation.id))]
    pub async fn issue(&self, reservation: &Reservation, now: DateTime<Utc>) -> Result<Fee> {
        for _ in 0..CODE_RETRY_LIMIT {
            let fee = Fee::new(
                reservation.id,
                reservation.member_cpf.clone(),
                self.config.fee_amount,
                now,
                self.config.payment_deadline,
            );
            match self.store.insert_fee(&fee).await {
                Ok(()) => {
                    metrics::counter!("fees_issued_total").increment(1);
                    tracing::info!(code = %fee.code, "fee issued");
                    return Ok(fee);
                }
                Err(StoreError::DuplicatePaymentCode(code)) => {
                    tracing::warn!(%code, "payment code collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(WorkflowError::Store(StoreError::DuplicatePaymentCode(
            PaymentCode::generate(),
        )))
    }

    /// Settles the fee quoted by a payment code.
    ///
    /// Confirming an already-paid fee is an idempotent no-op. A pending fee
    /// past its deadline is marked expired instead; the caller expires the
    /// matching reservation.
    #[tracing::instrument(skip(self))]
    pub async fn confirm(
        &self,
        code: &PaymentCode,
        method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Result<PaymentOutcome> {
        let mut fee = self
            .store
            .get_fee_by_code(code)
            .await?
            .ok_or(WorkflowError::FeeNotFound)?;

        match fee.status {
            FeeStatus::Paid => Ok(PaymentOutcome::AlreadyPaid(fee)),
            FeeStatus::Expired => Ok(PaymentOutcome::Expired(fee)),
            FeeStatus::Pending if fee.is_past_due(now) => {
                fee.mark_expired();
                self.store.update_fee(&fee).await?;
                metrics::counter!("fees_expired_total").increment(1);
                Ok(PaymentOutcome::Expired(fee))
            }
            FeeStatus::Pending => {
                fee.mark_paid(method, now);
                self.store.update_fee(&fee).await?;
                metrics::counter!("fees_paid_total").increment(1);
                tracing::info!(code = %fee.code, %method, "fee paid");
                Ok(PaymentOutcome::Confirmed(fee))
            }
        }
    }

    /// Pending fees past their deadline at `now`.
    pub async fn find_overdue(&self, now: DateTime<Utc>) -> Result<Vec<Fee>> {
        Ok(self.store.list_pending_past_due(now).await?)
    }

    /// Marks a fee expired and persists it.
    pub async fn expire(&self, fee: &mut Fee) -> Result<()> {
        fee.mark_expired();
        self.store.update_fee(fee).await?;
        metrics::counter!("fees_expired_total").increment(1);
        Ok(())
    }
}
