//! # Estado da Aplicação Web
//!
//! Estado compartilhado entre todos os handlers Axum.
//!
//! ```text
//! AppState (Clone, barato: só Arcs)
//!  ├── consultant ── Arc<Consultant> ── Arc<KnowledgeStore> ── RwLock<Arc<KB>>
//!  ├── log ───────── Arc<ConsultationLog>
//!  └── reload_enabled  (POST /knowledge/reload liberado?)
//! ```

use std::sync::Arc;

use crate::consultation::Consultant;
use crate::persistence::ConsultationLog;
use crate::store::KnowledgeStore;

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    /// Executa as consultas (snapshot da base + classificador).
    pub consultant: Arc<Consultant>,
    /// Histórico append-only de consultas.
    pub log: Arc<ConsultationLog>,
    /// Libera `POST /knowledge/reload`. Desligado por padrão.
    pub reload_enabled: bool,
}

impl AppState {
    pub fn new(consultant: Consultant, log: ConsultationLog) -> Self {
        Self {
            consultant: Arc::new(consultant),
            log: Arc::new(log),
            reload_enabled: false,
        }
    }

    pub fn with_reload(mut self, enabled: bool) -> Self {
        self.reload_enabled = enabled;
        self
    }

    /// Store da base de conhecimento.
    pub fn store(&self) -> &Arc<KnowledgeStore> {
        self.consultant.store()
    }
}
