//! # Módulo Core — Tipos Fundamentais do Domínio
//!
//! Tipos sobre os quais o sistema especialista inteiro é construído:
//!
//! - [`CertaintyFactor`] — fator de certeza e a regra de combinação
//! - [`KnowledgeBase`] — sintomas, deficiências e regras validados na carga
//! - [`EvidenceSet`] — respostas do usuário por sintoma
//!
//! ## Fluxo de Dados
//!
//! ```text
//! data/knowledge_base.json ──► KnowledgeDocument ──► KnowledgeBase (imutável)
//!                                                         │
//! formulário / JSON ─────────► EvidenceSet ───────────────┤
//!                                                         ▼
//!                                              InferenceEngine::diagnose
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use crate::core::{EvidenceSet, KnowledgeBase};
//!
//! let kb = KnowledgeBase::from_json_str(&json)?;
//! let evidence: EvidenceSet = [("G01", 0.8), ("G02", 0.6)].into_iter().collect();
//! ```

/// Sub-módulo com [`CertaintyFactor`] — aritmética de fatores de certeza.
pub mod certainty;

/// Sub-módulo com [`EvidenceSet`] e a escala de respostas.
pub mod evidence;

/// Sub-módulo com [`KnowledgeBase`] e sua validação.
pub mod knowledge_base;

pub use certainty::CertaintyFactor;
pub use evidence::{EvidenceSet, ANSWER_SCALE};
pub use knowledge_base::{DeficiencyCode, KnowledgeBase, KnowledgeBaseError, SymptomCode};
