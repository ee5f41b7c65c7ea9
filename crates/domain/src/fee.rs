//! Usage fees and payment codes.

use chrono::{DateTime, Duration, Utc};
use common::{Cpf, FeeId, ReservationId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

/// Lifecycle of a usage fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeeStatus {
    /// Awaiting payment confirmation.
    #[default]
    Pending,

    /// Payment confirmed.
    Paid,

    /// Deadline passed without confirmation.
    Expired,
}

impl FeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeStatus::Pending => "pending",
            FeeStatus::Paid => "paid",
            FeeStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FeeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FeeStatus::Pending),
            "paid" => Ok(FeeStatus::Paid),
            "expired" => Ok(FeeStatus::Expired),
            other => Err(format!("situação de taxa desconhecida: {other}")),
        }
    }
}

/// How a fee was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Pix,
    Transfer,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "pix",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Cash => "cash",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pix" => Ok(PaymentMethod::Pix),
            "transfer" => Ok(PaymentMethod::Transfer),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(format!("método de pagamento desconhecido: {other}")),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Human-quotable payment reference: `SINT` plus eight uppercase hex digits.
///
/// The member quotes this code when confirming payment, so it must be unique
/// among live fees; callers regenerate on collision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentCode(String);

impl PaymentCode {
    /// Generates a fresh random code.
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("SINT{}", hex[..8].to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PaymentCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A usage fee tied to exactly one reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    /// Unique fee identifier.
    pub id: FeeId,

    /// Reservation this fee pays for.
    pub reservation_id: ReservationId,

    /// CPF of the member who owes the fee.
    pub member_cpf: Cpf,

    /// Amount due.
    pub amount: Money,

    /// Code the member quotes when paying.
    pub code: PaymentCode,

    /// Lifecycle state.
    pub status: FeeStatus,

    /// How the fee was settled, once paid.
    pub method: Option<PaymentMethod>,

    /// When the fee was issued.
    pub created_at: DateTime<Utc>,

    /// Payment must be confirmed before this instant.
    pub due_by: DateTime<Utc>,

    /// When payment was confirmed.
    pub paid_at: Option<DateTime<Utc>>,
}

impl Fee {
    /// Issues a pending fee with a fresh payment code.
    pub fn new(
        reservation_id: ReservationId,
        member_cpf: Cpf,
        amount: Money,
        created_at: DateTime<Utc>,
        deadline: Duration,
    ) -> Self {
        Self {
            id: FeeId::new(),
            reservation_id,
            member_cpf,
            amount,
            code: PaymentCode::generate(),
            status: FeeStatus::Pending,
            method: None,
            created_at,
            due_by: created_at + deadline,
            paid_at: None,
        }
    }

    /// True when the fee is still pending past its deadline.
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        self.status == FeeStatus::Pending && now > self.due_by
    }

    /// Records a confirmed payment. Only valid while pending.
    pub fn mark_paid(&mut self, method: PaymentMethod, paid_at: DateTime<Utc>) {
        self.status = FeeStatus::Paid;
        self.method = Some(method);
        self.paid_at = Some(paid_at);
    }

    /// Marks the fee expired.
    pub fn mark_expired(&mut self) {
        self.status = FeeStatus::Expired;
    }
}
