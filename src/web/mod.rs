//! # Módulo Web — Interface da Consulta
//!
//! Camada web construída com **Axum** + **Maud**.
//!
//! ## Arquitetura Web
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Browser / cliente HTTP                                  │
//! ├─────────────────────────────────────────────────────────┤
//! │ Axum Router (este módulo) + TraceLayer                  │
//! │  ├── GET  /                  → página inicial           │
//! │  ├── GET  /sobre             → método CF                │
//! │  ├── GET  /consulta          → questionário             │
//! │  ├── POST /consulta          → relatório HTML           │
//! │  ├── POST /api/diagnose      → relatório JSON           │
//! │  ├── GET  /health            → JSON: status + contagens │
//! │  └── POST /knowledge/reload  → JSON: troca o snapshot   │
//! │      (só com HARA_RELOAD_ENABLED=true; senão 403)        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submódulos
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`state`] | Estado compartilhado (`AppState`) |
//! | [`intake`] | Formulário → `EvidenceSet` |
//! | [`handlers`] | Handlers Axum para cada rota |
//! | [`templates`] | Templates Maud (HTML server-side) |

pub mod handlers;
pub mod intake;
pub mod state;
pub mod templates;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Cria o router Axum com todas as rotas da aplicação.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // ── Páginas HTML ──────────────────────────────────────
        .route("/", get(handlers::index))
        .route("/sobre", get(handlers::about))
        .route(
            "/consulta",
            get(handlers::consultation_form).post(handlers::submit_consultation),
        )
        // ── API JSON ──────────────────────────────────────────
        .route("/api/diagnose", post(handlers::api_diagnose))
        .route("/health", get(handlers::health))
        .route("/knowledge/reload", post(handlers::reload_knowledge))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
