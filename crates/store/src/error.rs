use common::{BulletinId, Cpf, FeeId, ReservationId};
use domain::{PaymentCode, TimeSlot};
use thiserror::Error;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A member with this CPF is already registered.
    #[error("associado com CPF {0} já cadastrado")]
    DuplicateCpf(Cpf),

    /// A member with this email is already registered.
    #[error("associado com email {0} já cadastrado")]
    DuplicateEmail(String),

    /// No member with this CPF exists.
    #[error("associado {0} não encontrado")]
    MemberNotFound(Cpf),

    /// No reservation with this id exists.
    #[error("reserva {0} não encontrada")]
    ReservationNotFound(ReservationId),

    /// No fee with this id exists.
    #[error("taxa {0} não encontrada")]
    FeeNotFound(FeeId),

    /// No bulletin with this id exists.
    #[error("boletim {0} não encontrado")]
    BulletinNotFound(BulletinId),

    /// The requested slot overlaps an existing blocking reservation.
    #[error("horário indisponível: conflito com {existing}")]
    SlotTaken { existing: TimeSlot },

    /// Another fee already carries this payment code.
    #[error("código de pagamento {0} já em uso")]
    DuplicatePaymentCode(PaymentCode),

    /// A stored row could not be mapped back to a domain value.
    #[error("registro armazenado inválido: {0}")]
    Decode(String),

    /// A database error occurred.
    #[error("erro de banco de dados: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("erro de migração: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
