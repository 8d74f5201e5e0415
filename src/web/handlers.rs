//! # Handlers HTTP — Os Endpoints da Aplicação
//!
//! Cada função pública neste módulo é um handler Axum, mapeado a uma
//! rota em [`super::create_router()`].
//!
//! ## Padrão de Resposta
//!
//! | Handler | Método | Retorno | Uso |
//! |---------|--------|---------|-----|
//! | `index` | GET | HTML | Página inicial |
//! | `about` | GET | HTML | Explicação do método |
//! | `consultation_form` | GET | HTML | Questionário |
//! | `submit_consultation` | POST | HTML | Relatório da consulta |
//! | `api_diagnose` | POST | JSON | Consulta programática |
//! | `health` | GET | JSON | Status e contagens da base |
//! | `reload_knowledge` | POST | JSON | Recarrega a base do disco |
//!
//! ## Códigos de Status
//!
//! | Situação | HTML | JSON |
//! |----------|------|------|
//! | diagnóstico ou inconclusivo | 200 | 200 |
//! | nenhum sintoma respondido | 200 (entrada insuficiente) | 200 (`insufficient_input`) |
//! | resposta não numérica | 400 | 422 (extrator `Json`) |
//! | certeza fora de `[0, 1]` | 422 | 422 |
//! | reload desabilitado | — | 403 |
//! | falha no reload | — | 500 |

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::intake;
use super::state::AppState;
use super::templates;
use crate::consultation::{ClientInfo, Consultation};
use crate::core::EvidenceSet;
use crate::inference::InferenceError;

/// Converte Maud Markup em resposta Html<String> do Axum.
fn markup_to_html(m: maud::Markup) -> Html<String> {
    Html(m.into_string())
}

/// Grava a consulta no histórico. Falhas só são registradas no log.
fn record_consultation(
    state: &AppState,
    consultation: &Consultation,
    client: ClientInfo,
    evidence: &EvidenceSet,
) {
    let record = consultation.to_record(client, evidence);
    if let Err(e) = state.log.append(&record) {
        tracing::error!(error = %e, id = %consultation.id, "Falha ao gravar histórico de consulta");
    }
}

/// GET `/` — Página inicial.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let kb = state.store().snapshot();
    markup_to_html(templates::home_page(&kb))
}

/// GET `/sobre` — Método do fator de certeza, faixas e regras em uso.
pub async fn about(State(state): State<AppState>) -> Html<String> {
    let kb = state.store().snapshot();
    markup_to_html(templates::about_page(&kb, state.consultant.classifier()))
}

/// GET `/consulta` — Questionário agrupado por categoria.
pub async fn consultation_form(State(state): State<AppState>) -> Html<String> {
    let kb = state.store().snapshot();
    markup_to_html(templates::consultation_form(&kb))
}

/// POST `/consulta` — Roda a consulta a partir do formulário.
///
/// ## Fluxo
///
/// ```text
/// 1. intake::parse_form   → EvidenceSet + ClientInfo (400 se não numérico)
/// 2. consultant.consult   → Consultation (422 se fora da faixa)
/// 3. histórico            → append (erro só é logado)
/// 4. template             → página de resultado
/// ```
///
/// O mesmo snapshot da base serve à leitura do formulário e à consulta.
pub async fn submit_consultation(
    State(state): State<AppState>,
    axum::Form(fields): axum::Form<Vec<(String, String)>>,
) -> Response {
    let kb = state.store().snapshot();
    let intake = match intake::parse_form(&kb, &fields) {
        Ok(intake) => intake,
        Err(e) => {
            tracing::warn!(error = %e, "Formulário de consulta rejeitado");
            return (
                StatusCode::BAD_REQUEST,
                markup_to_html(templates::error_page("Resposta inválida", &e.to_string())),
            )
                .into_response();
        }
    };

    match state.consultant.consult_with(kb, &intake.evidence) {
        Ok(consultation) => {
            record_consultation(&state, &consultation, intake.client, &intake.evidence);
            markup_to_html(templates::result_page(&consultation, &intake.evidence)).into_response()
        }
        Err(InferenceError::EmptyEvidence) => {
            markup_to_html(templates::insufficient_page()).into_response()
        }
        Err(e @ InferenceError::InvalidEvidence { .. }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            markup_to_html(templates::error_page("Certeza inválida", &e.to_string())),
        )
            .into_response(),
    }
}

/// Corpo do POST `/api/diagnose`.
#[derive(Deserialize)]
pub struct DiagnoseRequest {
    /// Código do sintoma → certeza do usuário.
    pub evidence: EvidenceSet,
    #[serde(default)]
    pub client: ClientInfo,
}

/// POST `/api/diagnose` — Consulta via JSON.
///
/// Resposta (200):
///
/// ```json
/// { "id": "…", "status": "diagnosed", "ranked": [...], "verdict": {...} }
/// ```
///
/// `status` é `diagnosed`, `inconclusive` ou `insufficient_input`.
pub async fn api_diagnose(
    State(state): State<AppState>,
    Json(request): Json<DiagnoseRequest>,
) -> Response {
    match state.consultant.consult(&request.evidence) {
        Ok(consultation) => {
            record_consultation(&state, &consultation, request.client, &request.evidence);
            let status = if consultation.report.is_actionable() {
                "diagnosed"
            } else {
                "inconclusive"
            };
            Json(json!({
                "id": consultation.id,
                "status": status,
                "ranked": consultation.report.ranked,
                "verdict": consultation.report.verdict,
            }))
            .into_response()
        }
        Err(e @ InferenceError::EmptyEvidence) => Json(json!({
            "status": "insufficient_input",
            "message": e.to_string(),
            "ranked": [],
        }))
        .into_response(),
        Err(e @ InferenceError::InvalidEvidence { .. }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "status": "invalid_evidence",
                "error": e.to_string(),
            })),
        )
            .into_response(),
    }
}

/// GET `/health` — Status, versão e contagens da base em uso.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let kb = state.store().snapshot();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "symptoms": kb.symptom_count(),
        "deficiencies": kb.deficiency_count(),
        "rules": kb.rule_count(),
    }))
}

/// POST `/knowledge/reload` — Recarrega a base do disco.
///
/// Rota de operação: só responde quando `HARA_RELOAD_ENABLED=true`,
/// senão devolve 403 sem tocar no arquivo. Em caso de falha o snapshot
/// anterior continua em uso e a resposta é 500 com o motivo.
pub async fn reload_knowledge(State(state): State<AppState>) -> Response {
    if !state.reload_enabled {
        tracing::warn!("Reload da base recusado: desabilitado na configuração");
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "status": "disabled", "error": "reload desabilitado" })),
        )
            .into_response();
    }
    match state.store().reload() {
        Ok(kb) => Json(json!({
            "status": "reloaded",
            "symptoms": kb.symptom_count(),
            "deficiencies": kb.deficiency_count(),
            "rules": kb.rule_count(),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Falha ao recarregar base de conhecimento");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
