//! # Consultor — Uma Consulta do Início ao Fim
//!
//! O [`Consultant`] liga o snapshot da base, o motor CF e o classificador
//! em uma única chamada.
//!
//! ## Fluxo de uma Consulta
//!
//! ```text
//! EvidenceSet
//!   │
//!   ├── 1. store.snapshot()            → Arc<KnowledgeBase> (fixo até o fim;
//!   │                                    `consult_with` recebe um pronto)
//!   ├── 2. InferenceEngine::diagnose   → Vec<DiagnosisResult>
//!   ├── 3. ResultClassifier::classify  → DiagnosisReport
//!   └── 4. Consultation { id, snapshot, report, elapsed }
//! ```
//!
//! O consultor não guarda estado entre consultas: várias requisições podem
//! usar o mesmo `Consultant` ao mesmo tempo.
//!
//! ## Histórico
//!
//! [`ConsultationRecord`] é a forma serializada de uma consulta, gravada
//! pelo histórico append-only (ver `persistence.rs`). Os CFs são
//! arredondados para 4 casas decimais.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{CertaintyFactor, DeficiencyCode, EvidenceSet, KnowledgeBase, SymptomCode};
use crate::inference::{DiagnosisReport, InferenceEngine, InferenceError, ResultClassifier, Verdict};
use crate::store::KnowledgeStore;

/// Dados opcionais de quem pediu a consulta.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub age: Option<u32>,
}

/// Resultado de uma consulta bem-sucedida.
pub struct Consultation {
    /// Identificador da consulta (também usado no histórico).
    pub id: Uuid,
    /// Snapshot da base usado na consulta, para a renderização.
    pub knowledge_base: Arc<KnowledgeBase>,
    pub report: DiagnosisReport,
    /// Tempo gasto em inferência + classificação.
    pub elapsed: Duration,
}

impl Consultation {
    /// Monta o registro de histórico desta consulta.
    pub fn to_record(&self, client: ClientInfo, evidence: &EvidenceSet) -> ConsultationRecord {
        ConsultationRecord::new(self.id, client, evidence, &self.report)
    }
}

/// Linha do ranking no histórico.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedEntry {
    pub deficiency: DeficiencyCode,
    pub cf_final: f64,
    pub label: String,
    /// `(sintoma, cf_rule)` das regras que contribuíram.
    pub rules: Vec<(SymptomCode, f64)>,
}

/// Registro de uma consulta no histórico.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConsultationRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub client: ClientInfo,
    pub evidence: EvidenceSet,
    pub ranked: Vec<RankedEntry>,
    pub verdict: Verdict,
}

impl ConsultationRecord {
    pub fn new(
        id: Uuid,
        client: ClientInfo,
        evidence: &EvidenceSet,
        report: &DiagnosisReport,
    ) -> Self {
        let ranked = report
            .ranked
            .iter()
            .map(|entry| RankedEntry {
                deficiency: entry.result.deficiency.clone(),
                cf_final: round4(entry.result.cf_final.value()),
                label: entry.label.clone(),
                rules: entry
                    .result
                    .contributing_rules()
                    .map(|(symptom, cf)| (symptom.to_string(), round4(cf.value())))
                    .collect(),
            })
            .collect();
        Self {
            id,
            timestamp: Utc::now(),
            client,
            evidence: evidence.clone(),
            ranked,
            verdict: rounded_verdict(&report.verdict),
        }
    }
}

/// Veredito com o CF arredondado, como o restante do registro.
fn rounded_verdict(verdict: &Verdict) -> Verdict {
    match verdict {
        Verdict::Diagnosed {
            deficiency,
            cf_final,
            label,
        } => Verdict::Diagnosed {
            deficiency: deficiency.clone(),
            cf_final: CertaintyFactor::new(round4(cf_final.value())),
            label: label.clone(),
        },
        Verdict::Inconclusive => Verdict::Inconclusive,
    }
}

/// Arredonda para 4 casas decimais.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Executa consultas contra o snapshot corrente da base.
pub struct Consultant {
    store: Arc<KnowledgeStore>,
    classifier: ResultClassifier,
}

impl Consultant {
    pub fn new(store: Arc<KnowledgeStore>, classifier: ResultClassifier) -> Self {
        Self { store, classifier }
    }

    /// Roda uma consulta completa sobre o snapshot corrente.
    pub fn consult(&self, evidence: &EvidenceSet) -> Result<Consultation, InferenceError> {
        self.consult_with(self.store.snapshot(), evidence)
    }

    /// Roda uma consulta completa sobre um snapshot já obtido.
    ///
    /// Quem já leu a base para interpretar a entrada (o formulário) passa o
    /// mesmo snapshot aqui: a consulta inteira vê uma única versão da base.
    ///
    /// # Erros
    ///
    /// Os de [`InferenceEngine::diagnose`]. Evidência vazia é registrada em
    /// `info` (resultado normal), evidência inválida em `warn`.
    pub fn consult_with(
        &self,
        knowledge_base: Arc<KnowledgeBase>,
        evidence: &EvidenceSet,
    ) -> Result<Consultation, InferenceError> {
        let started = Instant::now();

        let unknown = evidence
            .codes()
            .filter(|code| knowledge_base.symptom(code).is_none())
            .count();
        if unknown > 0 {
            tracing::warn!(unknown, "Sintomas desconhecidos na evidência serão ignorados");
        }

        let ranked = match InferenceEngine::diagnose(&knowledge_base, evidence) {
            Ok(ranked) => ranked,
            Err(err @ InferenceError::EmptyEvidence) => {
                tracing::info!("Consulta sem sintomas: entrada insuficiente");
                return Err(err);
            }
            Err(err) => {
                tracing::warn!(error = %err, "Consulta rejeitada");
                return Err(err);
            }
        };

        let report = self.classifier.classify(ranked);
        let consultation = Consultation {
            id: Uuid::new_v4(),
            knowledge_base,
            report,
            elapsed: started.elapsed(),
        };

        match &consultation.report.verdict {
            Verdict::Diagnosed {
                deficiency,
                cf_final,
                ..
            } => tracing::info!(
                id = %consultation.id,
                evidence = evidence.len(),
                deficiency = %deficiency,
                cf_final = cf_final.value(),
                "Consulta concluída"
            ),
            Verdict::Inconclusive => tracing::info!(
                id = %consultation.id,
                evidence = evidence.len(),
                candidates = consultation.report.ranked.len(),
                top_cf = consultation.report.top().map(|t| t.result.cf_final.value()),
                "Consulta inconclusiva"
            ),
        }

        Ok(consultation)
    }

    /// Store de onde os snapshots são lidos.
    pub fn store(&self) -> &Arc<KnowledgeStore> {
        &self.store
    }

    pub fn classifier(&self) -> &ResultClassifier {
        &self.classifier
    }
}
