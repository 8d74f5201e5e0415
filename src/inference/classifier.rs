//! # Classificador de Resultados
//!
//! Transforma a lista ordenada do [`InferenceEngine`](super::InferenceEngine)
//! em um [`DiagnosisReport`]: cada resultado ganha um rótulo qualitativo e a
//! consulta ganha um veredito.
//!
//! ## Faixas Padrão
//!
//! | cf_final | rótulo |
//! |----------|--------|
//! | `[0.8, 1.0]` | almost certain |
//! | `[0.6, 0.8)` | probable |
//! | `[0.4, 0.6)` | maybe |
//! | `[0.2, 0.4)` | uncertain |
//! | `[0.0, 0.2)` | unlikely |
//! | `< 0` | not indicated |
//!
//! As faixas são configuráveis, mas [`ConfidenceBands::new()`] exige que
//! sejam monotônicas (limites estritamente decrescentes) e que cubram todo
//! o intervalo `[-1, 1]`.
//!
//! ## Veredito
//!
//! O primeiro colocado é o diagnóstico se `cf_final ≥ actionable_threshold`
//! (padrão `0.2`). Caso contrário: "nenhuma deficiência clara identificada".
//! Em ambos os casos a lista completa continua disponível no relatório.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::engine::DiagnosisResult;
use crate::core::{CertaintyFactor, DeficiencyCode};

/// Limiar padrão a partir do qual um diagnóstico é apresentado.
pub const DEFAULT_ACTIONABLE_THRESHOLD: f64 = 0.2;

/// Configuração inválida de faixas ou limiar.
#[derive(Debug, Error, PartialEq)]
pub enum ClassifierError {
    #[error("nenhuma faixa de confiança configurada")]
    NoBands,

    #[error("limite inferior {0} inválido (esperado entre -1.0 e 1.0)")]
    BoundOutOfRange(f64),

    #[error("faixas não monotônicas: {lower} não é menor que {previous}")]
    NotMonotonic { previous: f64, lower: f64 },

    #[error("as faixas não cobrem valores a partir de -1.0 (menor limite: {0})")]
    NotExhaustive(f64),

    #[error("faixa com rótulo vazio (limite {0})")]
    BlankLabel(f64),

    #[error("limiar de ação {0} fora de [-1.0, 1.0]")]
    ThresholdOutOfRange(f64),
}

/// Uma faixa: valores `≥ lower` (e abaixo da faixa anterior) recebem `label`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub lower: f64,
    pub label: String,
}

/// Faixas validadas, ordenadas do limite mais alto para o mais baixo.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConfidenceBands {
    bands: Vec<ConfidenceBand>,
}

impl ConfidenceBands {
    /// Valida e constrói as faixas.
    ///
    /// # Erros
    ///
    /// - lista vazia, limite não finito ou fora de `[-1, 1]`
    /// - limites que não decrescem estritamente
    /// - última faixa acima de `-1.0` (valores negativos sem rótulo)
    /// - rótulo em branco
    pub fn new(bands: Vec<ConfidenceBand>) -> Result<Self, ClassifierError> {
        let last = bands.last().ok_or(ClassifierError::NoBands)?;
        if last.lower > -1.0 {
            return Err(ClassifierError::NotExhaustive(last.lower));
        }

        let mut previous: Option<f64> = None;
        for band in &bands {
            if !band.lower.is_finite() || !(-1.0..=1.0).contains(&band.lower) {
                return Err(ClassifierError::BoundOutOfRange(band.lower));
            }
            if band.label.trim().is_empty() {
                return Err(ClassifierError::BlankLabel(band.lower));
            }
            if let Some(previous) = previous {
                if band.lower >= previous {
                    return Err(ClassifierError::NotMonotonic {
                        previous,
                        lower: band.lower,
                    });
                }
            }
            previous = Some(band.lower);
        }

        Ok(Self { bands })
    }

    /// Rótulo da primeira faixa cujo limite inferior é ≤ `cf`.
    pub fn label_for(&self, cf: f64) -> &str {
        self.bands
            .iter()
            .find(|band| cf >= band.lower)
            .or(self.bands.last())
            .map(|band| band.label.as_str())
            .unwrap_or_default()
    }

    /// Faixas na ordem de avaliação.
    pub fn bands(&self) -> &[ConfidenceBand] {
        &self.bands
    }
}

impl Default for ConfidenceBands {
    fn default() -> Self {
        let bands = [
            (0.8, "almost certain"),
            (0.6, "probable"),
            (0.4, "maybe"),
            (0.2, "uncertain"),
            (0.0, "unlikely"),
            (-1.0, "not indicated"),
        ]
        .into_iter()
        .map(|(lower, label)| ConfidenceBand {
            lower,
            label: label.to_string(),
        })
        .collect();
        Self { bands }
    }
}

/// Resultado do motor acompanhado do rótulo qualitativo.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassifiedDiagnosis {
    #[serde(flatten)]
    pub result: DiagnosisResult,
    pub label: String,
}

/// Veredito da consulta.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// O primeiro colocado atingiu o limiar de ação.
    Diagnosed {
        deficiency: DeficiencyCode,
        cf_final: CertaintyFactor,
        label: String,
    },
    /// Nenhuma deficiência clara identificada.
    Inconclusive,
}

/// Relatório final entregue ao consumidor (renderização, histórico).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiagnosisReport {
    /// Lista completa, já ordenada pelo motor.
    pub ranked: Vec<ClassifiedDiagnosis>,
    pub verdict: Verdict,
}

impl DiagnosisReport {
    /// Primeiro colocado, independente do veredito.
    pub fn top(&self) -> Option<&ClassifiedDiagnosis> {
        self.ranked.first()
    }

    /// `true` quando há um diagnóstico a apresentar.
    pub fn is_actionable(&self) -> bool {
        matches!(self.verdict, Verdict::Diagnosed { .. })
    }
}

/// Classificador: faixas + limiar de ação.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultClassifier {
    bands: ConfidenceBands,
    actionable_threshold: f64,
}

impl ResultClassifier {
    /// Cria um classificador com faixas e limiar próprios.
    pub fn new(bands: ConfidenceBands, actionable_threshold: f64) -> Result<Self, ClassifierError> {
        if !actionable_threshold.is_finite() || !(-1.0..=1.0).contains(&actionable_threshold) {
            return Err(ClassifierError::ThresholdOutOfRange(actionable_threshold));
        }
        Ok(Self {
            bands,
            actionable_threshold,
        })
    }

    /// Limiar a partir do qual o primeiro colocado vira diagnóstico.
    pub fn actionable_threshold(&self) -> f64 {
        self.actionable_threshold
    }

    /// Faixas em uso.
    pub fn bands(&self) -> &ConfidenceBands {
        &self.bands
    }

    /// Rótulo para um CF.
    pub fn label_for(&self, cf: CertaintyFactor) -> &str {
        self.bands.label_for(cf.value())
    }

    /// Rotula cada resultado e decide o veredito.
    ///
    /// A ordem de `ranked` é preservada — o classificador não reordena.
    pub fn classify(&self, ranked: Vec<DiagnosisResult>) -> DiagnosisReport {
        let ranked: Vec<ClassifiedDiagnosis> = ranked
            .into_iter()
            .map(|result| {
                let label = self.label_for(result.cf_final).to_string();
                ClassifiedDiagnosis { result, label }
            })
            .collect();

        let verdict = match ranked.first() {
            Some(top) if top.result.cf_final.value() >= self.actionable_threshold => {
                Verdict::Diagnosed {
                    deficiency: top.result.deficiency.clone(),
                    cf_final: top.result.cf_final,
                    label: top.label.clone(),
                }
            }
            _ => Verdict::Inconclusive,
        };

        DiagnosisReport { ranked, verdict }
    }
}

impl Default for ResultClassifier {
    fn default() -> Self {
        Self {
            bands: ConfidenceBands::default(),
            actionable_threshold: DEFAULT_ACTIONABLE_THRESHOLD,
        }
    }
}
