//! Member directory endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use domain::Member;
use serde::{Deserialize, Serialize};
use store::Store;
use workflow::NewMember;

use super::AppState;
use super::reservas::parse_cpf;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CriarAssociadoRequest {
    pub cpf: String,
    pub nome: String,
    pub email: String,
    pub telefone: Option<String>,
}

#[derive(Serialize)]
pub struct AssociadoResponse {
    pub cpf: String,
    pub nome: String,
    pub email: String,
    pub telefone: Option<String>,
    pub situacao: String,
    pub ativo: bool,
}

impl From<&Member> for AssociadoResponse {
    fn from(m: &Member) -> Self {
        Self {
            cpf: m.cpf.formatted(),
            nome: m.name.clone(),
            email: m.email.clone(),
            telefone: m.phone.clone(),
            situacao: m.standing.to_string(),
            ativo: m.active,
        }
    }
}

#[derive(Serialize)]
pub struct AssociadoCriadoResponse {
    pub sucesso: bool,
    pub mensagem: String,
    pub associado: AssociadoResponse,
}

#[derive(Serialize)]
pub struct VerificacaoResponse {
    pub sucesso: bool,
    pub mensagem: String,
    pub associado: AssociadoResponse,
    /// Whether the member may create reservations.
    pub em_dia: bool,
}

/// POST /api/associado/criar — register a member.
#[tracing::instrument(skip(state, req))]
pub async fn criar<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CriarAssociadoRequest>,
) -> Result<(axum::http::StatusCode, Json<AssociadoCriadoResponse>), ApiError> {
    let member = state
        .directory
        .register(NewMember {
            cpf: req.cpf,
            name: req.nome,
            email: req.email,
            phone: req.telefone,
        })
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(AssociadoCriadoResponse {
            sucesso: true,
            mensagem: "Associado cadastrado com sucesso.".into(),
            associado: AssociadoResponse::from(&member),
        }),
    ))
}

/// GET /api/associado/verificar/{cpf} — standing check.
#[tracing::instrument(skip(state))]
pub async fn verificar<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(cpf): Path<String>,
) -> Result<Json<VerificacaoResponse>, ApiError> {
    let cpf = parse_cpf(&cpf)?;
    let member = state.directory.get(&cpf).await?;

    let em_dia = member.in_good_standing();
    let mensagem = if em_dia {
        "Associado em dia com a taxa sindical.".to_string()
    } else {
        "Associado inadimplente ou inativo; reservas bloqueadas.".to_string()
    };

    Ok(Json(VerificacaoResponse {
        sucesso: true,
        mensagem,
        associado: AssociadoResponse::from(&member),
        em_dia,
    }))
}
