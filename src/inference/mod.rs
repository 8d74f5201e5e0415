//! # Módulo Inference — Raciocínio por Fator de Certeza
//!
//! Este módulo contém o **motor de inferência** e o **classificador**
//! do sistema especialista.
//!
//! ## Pipeline
//!
//! ```text
//! KnowledgeBase + EvidenceSet
//!        │
//!        ▼
//! InferenceEngine::diagnose  ──► Vec<DiagnosisResult> (ordenado)
//!        │
//!        ▼
//! ResultClassifier::classify ──► DiagnosisReport { ranked, verdict }
//! ```
//!
//! | Etapa | Responsabilidade |
//! |-------|------------------|
//! | [`engine`] | `cf_rule`, combinação por deficiência, ordenação |
//! | [`classifier`] | rótulos qualitativos e veredito |
//!
//! Nenhuma das etapas faz I/O ou guarda estado.

/// Sub-módulo com o motor de inferência CF.
pub mod engine;

/// Sub-módulo com o classificador de resultados.
pub mod classifier;

pub use classifier::{
    ConfidenceBand, ConfidenceBands, DiagnosisReport, ResultClassifier, Verdict,
    DEFAULT_ACTIONABLE_THRESHOLD,
};
pub use engine::{InferenceEngine, InferenceError};
