//! Reservation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{NaiveDate, NaiveTime};
use common::{Cpf, ReservationId};
use domain::{Reservation, TimeSlot};
use serde::{Deserialize, Serialize};
use store::Store;
use workflow::NewReservation;

use super::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CriarReservaRequest {
    pub cpf_associado: String,
    pub nome: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub data_reserva: String,
    pub horario_inicio: String,
    pub horario_fim: String,
    pub numero_convidados: u32,
    pub observacoes: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct CancelarReservaRequest {
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct DisponibilidadeQuery {
    pub data: String,
    pub horario_inicio: Option<String>,
    pub horario_fim: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ReservaResponse {
    pub id: String,
    pub cpf_associado: String,
    pub nome: String,
    pub email: String,
    pub telefone: Option<String>,
    pub data_reserva: String,
    pub horario_inicio: String,
    pub horario_fim: String,
    pub numero_convidados: u32,
    pub observacoes: Option<String>,
    pub status: String,
    pub criado_em: String,
}

impl From<&Reservation> for ReservaResponse {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id.to_string(),
            cpf_associado: r.member_cpf.formatted(),
            nome: r.name.clone(),
            email: r.email.clone(),
            telefone: r.phone.clone(),
            data_reserva: r.date.format("%Y-%m-%d").to_string(),
            horario_inicio: r.slot.start().format("%H:%M").to_string(),
            horario_fim: r.slot.end().format("%H:%M").to_string(),
            numero_convidados: r.guests,
            observacoes: r.notes.clone(),
            status: r.status.to_string(),
            criado_em: r.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct ReservaCriadaResponse {
    pub sucesso: bool,
    pub mensagem: String,
    pub reserva: ReservaResponse,
    pub codigo_pagamento: String,
    pub taxa_valor: String,
    pub vencimento: String,
}

#[derive(Serialize)]
pub struct ListaReservasResponse {
    pub sucesso: bool,
    pub reservas: Vec<ReservaResponse>,
}

#[derive(Serialize)]
pub struct DisponibilidadeResponse {
    pub sucesso: bool,
    pub disponivel: bool,
    pub mensagem: String,
    pub horarios_ocupados: Vec<HorarioOcupado>,
}

#[derive(Serialize)]
pub struct HorarioOcupado {
    pub horario_inicio: String,
    pub horario_fim: String,
}

#[derive(Serialize)]
pub struct ReservaCanceladaResponse {
    pub sucesso: bool,
    pub mensagem: String,
    pub reserva: ReservaResponse,
}

// -- Parsing helpers --

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("data inválida: {value} (use AAAA-MM-DD)")))
}

pub(crate) fn parse_time(value: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| ApiError::BadRequest(format!("horário inválido: {value} (use HH:MM)")))
}

pub(crate) fn parse_slot(start: &str, end: &str) -> Result<TimeSlot, ApiError> {
    TimeSlot::new(parse_time(start)?, parse_time(end)?)
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

pub(crate) fn parse_cpf(value: &str) -> Result<Cpf, ApiError> {
    Cpf::parse(value).map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn parse_reservation_id(value: &str) -> Result<ReservationId, ApiError> {
    uuid::Uuid::parse_str(value)
        .map(ReservationId::from_uuid)
        .map_err(|_| ApiError::BadRequest(format!("id de reserva inválido: {value}")))
}

// -- Handlers --

/// POST /api/criar-reserva — create a reservation and issue its fee.
#[tracing::instrument(skip(state, req))]
pub async fn criar<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CriarReservaRequest>,
) -> Result<(axum::http::StatusCode, Json<ReservaCriadaResponse>), ApiError> {
    let request = NewReservation {
        cpf: parse_cpf(&req.cpf_associado)?,
        date: parse_date(&req.data_reserva)?,
        slot: parse_slot(&req.horario_inicio, &req.horario_fim)?,
        guests: req.numero_convidados,
        notes: req.observacoes,
        contact_name: req.nome,
        contact_email: req.email,
        contact_phone: req.telefone,
    };

    let (reservation, fee) = state.workflow.create(request).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(ReservaCriadaResponse {
            sucesso: true,
            mensagem:
                "Reserva criada com sucesso! Efetue o pagamento da taxa para confirmar.".into(),
            reserva: ReservaResponse::from(&reservation),
            codigo_pagamento: fee.code.to_string(),
            taxa_valor: fee.amount.to_string(),
            vencimento: fee.due_by.to_rfc3339(),
        }),
    ))
}

/// GET /api/listar-reservas — upcoming non-terminal reservations.
#[tracing::instrument(skip(state))]
pub async fn listar<S: Store>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<ListaReservasResponse>, ApiError> {
    let reservations = state.workflow.list_upcoming().await?;
    Ok(Json(ListaReservasResponse {
        sucesso: true,
        reservas: reservations.iter().map(ReservaResponse::from).collect(),
    }))
}

/// GET /api/verificar-disponibilidade — check a date (and optionally a slot).
#[tracing::instrument(skip(state, query))]
pub async fn disponibilidade<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<DisponibilidadeQuery>,
) -> Result<Json<DisponibilidadeResponse>, ApiError> {
    let date = parse_date(&query.data)?;
    let slot = match (&query.horario_inicio, &query.horario_fim) {
        (Some(start), Some(end)) => Some(parse_slot(start, end)?),
        _ => None,
    };

    let answer = state.workflow.availability(date, slot).await?;
    let mensagem = match &answer.reason {
        Some(reason) => reason.to_string(),
        None => "Horário disponível".into(),
    };

    Ok(Json(DisponibilidadeResponse {
        sucesso: true,
        disponivel: answer.available,
        mensagem,
        horarios_ocupados: answer
            .occupied
            .iter()
            .map(|slot| HorarioOcupado {
                horario_inicio: slot.start().format("%H:%M").to_string(),
                horario_fim: slot.end().format("%H:%M").to_string(),
            })
            .collect(),
    }))
}

/// POST /api/cancelar-reserva/{id} — cancel with optional email confirmation.
#[tracing::instrument(skip(state, req))]
pub async fn cancelar<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    req: Option<Json<CancelarReservaRequest>>,
) -> Result<Json<ReservaCanceladaResponse>, ApiError> {
    let id = parse_reservation_id(&id)?;
    let email = req.as_ref().and_then(|r| r.email.as_deref());

    let reservation = state.workflow.cancel(id, email).await?;
    Ok(Json(ReservaCanceladaResponse {
        sucesso: true,
        mensagem: "Reserva cancelada com sucesso.".into(),
        reserva: ReservaResponse::from(&reservation),
    }))
}
