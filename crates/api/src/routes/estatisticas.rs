//! Read-only usage statistics endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use store::Store;

use super::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct EstatisticasResponse {
    pub sucesso: bool,
    pub estatisticas: Estatisticas,
}

#[derive(Serialize)]
pub struct Estatisticas {
    pub reservas: ReservaStats,
    pub boletins: BoletimStats,
}

#[derive(Serialize)]
pub struct ReservaStats {
    pub total: u64,
    pub por_status: BTreeMap<&'static str, u64>,
}

#[derive(Serialize)]
pub struct BoletimStats {
    pub total_boletins: usize,
    pub boletins_ativos: usize,
    pub boletins_urgentes: usize,
    pub boletins_inativos: usize,
}

/// GET /api/estatisticas — reservation counts by status and bulletin totals.
#[tracing::instrument(skip(state))]
pub async fn obter<S: Store>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<EstatisticasResponse>, ApiError> {
    let counts = state.workflow.count_by_status().await?;
    let por_status: BTreeMap<_, _> = counts
        .iter()
        .map(|(status, count)| (status.as_str(), *count))
        .collect();
    let total = counts.values().sum();

    let board = state.board.statistics().await?;

    Ok(Json(EstatisticasResponse {
        sucesso: true,
        estatisticas: Estatisticas {
            reservas: ReservaStats { total, por_status },
            boletins: BoletimStats {
                total_boletins: board.total,
                boletins_ativos: board.active,
                boletins_urgentes: board.urgent,
                boletins_inativos: board.inactive,
            },
        },
    }))
}
