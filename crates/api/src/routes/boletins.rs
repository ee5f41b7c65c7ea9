//! Bulletin board endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use chrono::DateTime;
use domain::{Audience, Bulletin, BulletinKind, Priority};
use serde::{Deserialize, Serialize};
use store::Store;
use workflow::NewBulletin;

use super::AppState;
use super::reservas::parse_cpf;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CriarBoletimRequest {
    pub titulo: String,
    pub texto: String,
    /// `general`, `urgent`, `notice`, or `event`; defaults to `general`.
    pub tipo: Option<String>,
    /// `low`, `normal`, `high`, or `critical`; defaults to `normal`.
    pub prioridade: Option<String>,
    /// `all`, `current`, or `delinquent`; defaults to `all`.
    pub publico: Option<String>,
    /// RFC 3339 expiry instant.
    pub expira_em: Option<String>,
    pub autor: Option<String>,
}

#[derive(Deserialize)]
pub struct ListarBoletinsQuery {
    /// CPF of the reading member; targets the listing by their standing.
    pub cpf: Option<String>,
}

#[derive(Serialize)]
pub struct BoletimResponse {
    pub id: String,
    pub titulo: String,
    pub texto: String,
    pub tipo: String,
    pub prioridade: String,
    pub publico: String,
    pub publicado_em: String,
    pub expira_em: Option<String>,
    pub autor: Option<String>,
}

impl From<&Bulletin> for BoletimResponse {
    fn from(b: &Bulletin) -> Self {
        Self {
            id: b.id.to_string(),
            titulo: b.title.clone(),
            texto: b.body.clone(),
            tipo: b.kind.as_str().to_string(),
            prioridade: b.priority.as_str().to_string(),
            publico: b.audience.as_str().to_string(),
            publicado_em: b.published_at.to_rfc3339(),
            expira_em: b.expires_at.map(|e| e.to_rfc3339()),
            autor: b.author.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct BoletimCriadoResponse {
    pub sucesso: bool,
    pub mensagem: String,
    pub boletim: BoletimResponse,
}

#[derive(Serialize)]
pub struct ListaBoletinsResponse {
    pub sucesso: bool,
    pub boletins: Vec<BoletimResponse>,
}

/// POST /api/boletim/criar — post a bulletin.
#[tracing::instrument(skip(state, req))]
pub async fn criar<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CriarBoletimRequest>,
) -> Result<(axum::http::StatusCode, Json<BoletimCriadoResponse>), ApiError> {
    let kind = match req.tipo.as_deref() {
        Some(value) => value.parse::<BulletinKind>().map_err(ApiError::BadRequest)?,
        None => BulletinKind::General,
    };
    let priority = match req.prioridade.as_deref() {
        Some(value) => value.parse::<Priority>().map_err(ApiError::BadRequest)?,
        None => Priority::Normal,
    };
    let audience = match req.publico.as_deref() {
        Some(value) => value.parse::<Audience>().map_err(ApiError::BadRequest)?,
        None => Audience::All,
    };
    let expires_at = req
        .expira_em
        .as_deref()
        .map(|value| {
            DateTime::parse_from_rfc3339(value)
                .map(|dt| dt.to_utc())
                .map_err(|_| ApiError::BadRequest(format!("data de expiração inválida: {value}")))
        })
        .transpose()?;

    let bulletin = state
        .board
        .post(NewBulletin {
            title: req.titulo,
            body: req.texto,
            kind,
            priority,
            audience,
            expires_at,
            author: req.autor,
        })
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(BoletimCriadoResponse {
            sucesso: true,
            mensagem: "Boletim publicado com sucesso.".into(),
            boletim: BoletimResponse::from(&bulletin),
        }),
    ))
}

/// GET /api/boletins — live bulletins, targeted by the reader's standing.
#[tracing::instrument(skip(state, query))]
pub async fn listar<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListarBoletinsQuery>,
) -> Result<Json<ListaBoletinsResponse>, ApiError> {
    let standing = match query.cpf.as_deref() {
        Some(value) => {
            let cpf = parse_cpf(value)?;
            Some(state.directory.get(&cpf).await?.standing)
        }
        None => None,
    };

    let bulletins = state.board.list_for(standing).await?;
    Ok(Json(ListaBoletinsResponse {
        sucesso: true,
        boletins: bulletins.iter().map(BoletimResponse::from).collect(),
    }))
}
