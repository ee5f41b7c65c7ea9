use common::{Cpf, CpfError, ReservationId};
use domain::{RejectReason, ReservationStatus};
use store::StoreError;
use thiserror::Error;

/// Errors from the orchestration layer.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The candidate failed a reservation rule.
    #[error("reserva recusada: {0}")]
    Rejected(#[from] RejectReason),

    /// The CPF failed validation.
    #[error("{0}")]
    InvalidCpf(#[from] CpfError),

    /// No member with this CPF exists.
    #[error("associado {0} não encontrado")]
    MemberNotFound(Cpf),

    /// No reservation with this id exists.
    #[error("reserva {0} não encontrada")]
    ReservationNotFound(ReservationId),

    /// No fee matches the quoted payment code.
    #[error("código de pagamento não encontrado")]
    FeeNotFound,

    /// The payment deadline has passed; the reservation is expired.
    #[error("taxa vencida; a reserva foi expirada")]
    FeeExpired,

    /// Cancellation requested too close to the reservation start.
    #[error("cancelamento requer {notice_hours}h de antecedência")]
    CancelWindowClosed { notice_hours: i64 },

    /// The confirmation email does not match the reservation.
    #[error("email não corresponde à reserva")]
    EmailMismatch,

    /// The operation is not valid in the reservation's current state.
    #[error("operação inválida para reserva em estado {status}")]
    InvalidState { status: ReservationStatus },

    /// A required field was empty.
    #[error("campo obrigatório: {0}")]
    MissingField(&'static str),

    /// A persistence error occurred.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;
