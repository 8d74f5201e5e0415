#![allow(rustdoc::broken_intra_doc_links, rustdoc::invalid_html_tags)]
//! # Diagnóstico de Deficiências Nutricionais — Sistema Especialista CF
//!
//! **Ponto de entrada principal** da aplicação.
//!
//! Carrega e valida a base de conhecimento, monta o classificador e inicia
//! o servidor web. Uma base inválida aborta a inicialização: o servidor
//! nunca sobe com uma base parcial.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging (RUST_LOG, padrão "info")
//!   ├── AppConfig::from_env()
//!   ├── KnowledgeStore::open()      ── falha → encerra com erro
//!   ├── ResultClassifier::new()     ── faixas (padrão ou configuradas) + limiar
//!   ├── Monta AppState e Router
//!   └── Inicia servidor TCP
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Executar com logs padrão (info)
//! cargo run
//!
//! # Outra base, outra porta, logs detalhados
//! HARA_KB_PATH=/srv/kb.json HARA_ADDR=127.0.0.1:8080 RUST_LOG=debug cargo run
//! ```

/// Módulo `config` — parâmetros de execução via variáveis de ambiente.
mod config;

/// Módulo `consultation` — uma consulta do início ao fim + registro de histórico.
mod consultation;

/// Módulo `core` — tipos fundamentais: CertaintyFactor, EvidenceSet, KnowledgeBase.
mod core;

/// Módulo `inference` — motor CF e classificador de resultados.
mod inference;

/// Módulo `persistence` — leitura da base e histórico append-only.
mod persistence;

/// Módulo `store` — snapshot atômico da base de conhecimento.
mod store;

/// Módulo `web` — servidor axum, handlers HTTP e templates.
mod web;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::consultation::Consultant;
use crate::inference::{ConfidenceBands, ResultClassifier};
use crate::persistence::ConsultationLog;
use crate::store::KnowledgeStore;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🌱 Diagnóstico de Deficiências — Starting...");

    let config = AppConfig::from_env().context("Configuração inválida")?;

    let store = match KnowledgeStore::open(&config.knowledge_base_path) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(
                error = %e,
                path = %config.knowledge_base_path.display(),
                "Base de conhecimento inválida, abortando"
            );
            return Err(e).context("Falha ao carregar a base de conhecimento");
        }
    };

    let bands = match config.confidence_bands.clone() {
        Some(bands) => ConfidenceBands::new(bands).context("Faixas de confiança inválidas")?,
        None => ConfidenceBands::default(),
    };
    let classifier = ResultClassifier::new(bands, config.actionable_threshold)
        .context("Limiar de ação inválido")?;

    let log = ConsultationLog::new(&config.consultation_log_path);
    tracing::info!(path = %log.path().display(), "Histórico de consultas");

    let state = AppState::new(Consultant::new(Arc::new(store), classifier), log)
        .with_reload(config.reload_enabled);
    if config.reload_enabled {
        tracing::info!("POST /knowledge/reload habilitado");
    }
    let app = web::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("Falha ao escutar em {}", config.addr))?;
    tracing::info!(addr = %config.addr, "🚀 Server running");

    axum::serve(listener, app).await?;

    Ok(())
}
