//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Datelike, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use store::InMemoryStore;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> Router {
    let state = api::create_default_state(InMemoryStore::new());
    api::create_app(state, get_metrics_handle())
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// A reservation date comfortably inside the 1..=30 day advance window.
fn valid_date() -> String {
    (Utc::now().date_naive() + Duration::days(7))
        .format("%Y-%m-%d")
        .to_string()
}

async fn register_member(app: &Router) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/associado/criar",
            serde_json::json!({
                "cpf": "529.982.247-25",
                "nome": "Maria Silva",
                "email": "maria@example.com",
                "telefone": "62999990000"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

async fn create_reservation(app: &Router) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/criar-reserva",
            serde_json::json!({
                "cpf_associado": "52998224725",
                "data_reserva": valid_date(),
                "horario_inicio": "09:00",
                "horario_fim": "11:00",
                "numero_convidados": 4,
                "observacoes": "aniversário"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_member_and_verify() {
    let app = setup();
    register_member(&app).await;

    let response = app
        .oneshot(get("/api/associado/verificar/52998224725"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["sucesso"], true);
    assert_eq!(json["em_dia"], true);
    assert_eq!(json["associado"]["cpf"], "529.982.247-25");
}

#[tokio::test]
async fn test_register_member_with_invalid_cpf() {
    let app = setup();
    let response = app
        .oneshot(post_json(
            "/api/associado/criar",
            serde_json::json!({
                "cpf": "11111111111",
                "nome": "Maria Silva",
                "email": "maria@example.com"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["sucesso"], false);
}

#[tokio::test]
async fn test_duplicate_member_conflict() {
    let app = setup();
    register_member(&app).await;

    let response = app
        .oneshot(post_json(
            "/api/associado/criar",
            serde_json::json!({
                "cpf": "52998224725",
                "nome": "Maria Silva",
                "email": "outra@example.com"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_reservation_returns_payment_code() {
    let app = setup();
    register_member(&app).await;

    let json = create_reservation(&app).await;
    assert_eq!(json["sucesso"], true);
    assert_eq!(json["taxa_valor"], "R$ 25,00");
    assert_eq!(json["reserva"]["status"], "pending_payment");
    assert!(
        json["codigo_pagamento"]
            .as_str()
            .unwrap()
            .starts_with("SINT")
    );
}

#[tokio::test]
async fn test_create_reservation_for_unknown_member() {
    let app = setup();
    let response = app
        .oneshot(post_json(
            "/api/criar-reserva",
            serde_json::json!({
                "cpf_associado": "52998224725",
                "data_reserva": valid_date(),
                "horario_inicio": "09:00",
                "horario_fim": "11:00",
                "numero_convidados": 4
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_reservation_outside_hours() {
    let app = setup();
    register_member(&app).await;

    let response = app
        .oneshot(post_json(
            "/api/criar-reserva",
            serde_json::json!({
                "cpf_associado": "52998224725",
                "data_reserva": valid_date(),
                "horario_inicio": "06:00",
                "horario_fim": "09:00",
                "numero_convidados": 4
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["sucesso"], false);
    assert!(
        json["mensagem"]
            .as_str()
            .unwrap()
            .contains("horário de funcionamento")
    );
}

#[tokio::test]
async fn test_create_reservation_with_malformed_date() {
    let app = setup();
    register_member(&app).await;

    let response = app
        .oneshot(post_json(
            "/api/criar-reserva",
            serde_json::json!({
                "cpf_associado": "52998224725",
                "data_reserva": "10/03/2025",
                "horario_inicio": "09:00",
                "horario_fim": "11:00",
                "numero_convidados": 4
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_conflicting_reservation_rejected() {
    let app = setup();
    register_member(&app).await;
    create_reservation(&app).await;

    let response = app
        .oneshot(post_json(
            "/api/criar-reserva",
            serde_json::json!({
                "cpf_associado": "52998224725",
                "data_reserva": valid_date(),
                "horario_inicio": "10:00",
                "horario_fim": "12:00",
                "numero_convidados": 2
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(json["mensagem"].as_str().unwrap().contains("conflito"));
}

#[tokio::test]
async fn test_payment_confirmation_activates_reservation() {
    let app = setup();
    register_member(&app).await;
    let created = create_reservation(&app).await;
    let code = created["codigo_pagamento"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/taxa/confirmar-pagamento",
            serde_json::json!({ "codigo_pagamento": code, "forma_pagamento": "pix" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["sucesso"], true);
    assert_eq!(json["reserva"]["status"], "active");
    assert_eq!(json["forma_pagamento"], "pix");

    // Second confirmation is an idempotent success.
    let response = app
        .oneshot(post_json(
            "/api/taxa/confirmar-pagamento",
            serde_json::json!({ "codigo_pagamento": code }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_payment_code_not_found() {
    let app = setup();
    let response = app
        .oneshot(post_json(
            "/api/taxa/confirmar-pagamento",
            serde_json::json!({ "codigo_pagamento": "SINTDEADBEEF" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_reservations() {
    let app = setup();
    register_member(&app).await;
    create_reservation(&app).await;

    let response = app.oneshot(get("/api/listar-reservas")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["reservas"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_availability_lists_occupied_slots() {
    let app = setup();
    register_member(&app).await;
    create_reservation(&app).await;

    let uri = format!(
        "/api/verificar-disponibilidade?data={}&horario_inicio=10:00&horario_fim=12:00",
        valid_date()
    );
    let response = app.oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["disponivel"], false);
    assert_eq!(json["horarios_ocupados"].as_array().unwrap().len(), 1);
    assert_eq!(json["horarios_ocupados"][0]["horario_inicio"], "09:00");
}

#[tokio::test]
async fn test_cancel_reservation_with_matching_email() {
    let app = setup();
    register_member(&app).await;
    let created = create_reservation(&app).await;
    let id = created["reserva"]["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/cancelar-reserva/{id}"),
            serde_json::json!({ "email": "MARIA@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["reserva"]["status"], "cancelled");
}

#[tokio::test]
async fn test_cancel_with_wrong_email_forbidden() {
    let app = setup();
    register_member(&app).await;
    let created = create_reservation(&app).await;
    let id = created["reserva"]["id"].as_str().unwrap();

    let response = app
        .oneshot(post_json(
            &format!("/api/cancelar-reserva/{id}"),
            serde_json::json!({ "email": "intruso@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cancel_unknown_reservation() {
    let app = setup();
    let id = uuid::Uuid::new_v4();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/cancelar-reserva/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulletins_targeted_by_reader() {
    let app = setup();
    register_member(&app).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/boletim/criar",
            serde_json::json!({
                "titulo": "Taxa em atraso",
                "texto": "Regularize sua situação.",
                "tipo": "notice",
                "prioridade": "high",
                "publico": "delinquent"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Member in good standing does not see the dues reminder.
    let response = app
        .clone()
        .oneshot(get("/api/boletins?cpf=52998224725"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert!(json["boletins"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bulletin_without_title_rejected() {
    let app = setup();
    let response = app
        .oneshot(post_json(
            "/api/boletim/criar",
            serde_json::json!({ "titulo": "  ", "texto": "corpo" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_statistics_count_reservations_and_bulletins() {
    let app = setup();
    register_member(&app).await;
    create_reservation(&app).await;
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/boletim/criar",
            serde_json::json!({
                "titulo": "Manutenção",
                "texto": "Piscina fechada no sábado.",
                "prioridade": "high"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get("/api/estatisticas")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["sucesso"], true);
    let stats = &json["estatisticas"];
    assert_eq!(stats["reservas"]["total"], 1);
    assert_eq!(stats["reservas"]["por_status"]["pending_payment"], 1);
    assert_eq!(stats["boletins"]["total_boletins"], 1);
    assert_eq!(stats["boletins"]["boletins_ativos"], 1);
    assert_eq!(stats["boletins"]["boletins_urgentes"], 1);
    assert_eq!(stats["boletins"]["boletins_inativos"], 0);
}

#[tokio::test]
async fn test_valid_date_is_well_formed() {
    // Guards the helper: the reservation date must parse back.
    let date = valid_date();
    let parsed = chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap();
    assert!(parsed.year() >= 2025);
}
