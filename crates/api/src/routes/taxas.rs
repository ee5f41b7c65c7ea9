//! Fee payment endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::{PaymentCode, PaymentMethod};
use serde::{Deserialize, Serialize};
use store::Store;

use super::AppState;
use super::reservas::ReservaResponse;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct ConfirmarPagamentoRequest {
    pub codigo_pagamento: String,
    /// `pix`, `transfer`, or `cash`; defaults to `pix`.
    pub forma_pagamento: Option<String>,
}

#[derive(Serialize)]
pub struct PagamentoConfirmadoResponse {
    pub sucesso: bool,
    pub mensagem: String,
    pub reserva: ReservaResponse,
    pub valor_pago: String,
    pub forma_pagamento: Option<String>,
}

/// POST /api/taxa/confirmar-pagamento — settle a fee by its payment code.
#[tracing::instrument(skip(state, req))]
pub async fn confirmar<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<ConfirmarPagamentoRequest>,
) -> Result<Json<PagamentoConfirmadoResponse>, ApiError> {
    let method = match req.forma_pagamento.as_deref() {
        Some(value) => value
            .parse::<PaymentMethod>()
            .map_err(ApiError::BadRequest)?,
        None => PaymentMethod::Pix,
    };

    let code = PaymentCode::from(req.codigo_pagamento.trim().to_uppercase());
    let confirmation = state.workflow.confirm_payment(&code, method).await?;

    let mensagem = if confirmation.already_paid {
        "Pagamento já havia sido confirmado.".to_string()
    } else {
        "Pagamento confirmado! Sua reserva está ativa.".to_string()
    };

    Ok(Json(PagamentoConfirmadoResponse {
        sucesso: true,
        mensagem,
        reserva: ReservaResponse::from(&confirmation.reservation),
        valor_pago: confirmation.fee.amount.to_string(),
        forma_pagamento: confirmation.fee.method.map(|m| m.to_string()),
    }))
}
