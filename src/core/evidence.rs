//! # EvidenceSet — Respostas do Usuário
//!
//! O [`EvidenceSet`] guarda a certeza que o usuário declarou para cada
//! sintoma **efetivamente perguntado e respondido**.
//!
//! ## "Não avaliado" ≠ "Não"
//!
//! | Situação | Representação | Efeito no motor |
//! |----------|---------------|-----------------|
//! | Sintoma não respondido | ausente do conjunto | regra ignorada |
//! | Resposta "Não" | `0.0` | regra entra com `cf_rule = 0` |
//!
//! ## Vocabulário de Respostas
//!
//! O formulário oferece apenas os valores de [`ANSWER_SCALE`]. O motor não
//! valida o vocabulário, só o intervalo numérico `[0, 1]`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::knowledge_base::SymptomCode;

/// Uma opção de resposta do questionário.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AnswerOption {
    /// Certeza do usuário associada à opção.
    pub value: f64,
    /// Texto exibido no formulário.
    pub label: &'static str,
}

/// Escala linguística de certeza do usuário.
pub const ANSWER_SCALE: [AnswerOption; 5] = [
    AnswerOption { value: 0.0, label: "Não" },
    AnswerOption { value: 0.2, label: "Não sei" },
    AnswerOption { value: 0.6, label: "Um pouco certo" },
    AnswerOption { value: 0.8, label: "Bastante certo" },
    AnswerOption { value: 1.0, label: "Certo" },
];

/// Conjunto de evidências: código do sintoma → certeza do usuário.
///
/// Ordenado por código (`BTreeMap`) para que logs e relatórios sejam
/// determinísticos.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceSet {
    entries: BTreeMap<SymptomCode, f64>,
}

impl EvidenceSet {
    /// Cria um conjunto vazio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra (ou substitui) a resposta para um sintoma.
    ///
    /// Retorna o valor anterior, se havia.
    pub fn insert(&mut self, symptom: impl Into<SymptomCode>, cf_user: f64) -> Option<f64> {
        self.entries.insert(symptom.into(), cf_user)
    }

    /// Número de sintomas respondidos.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` se nenhum sintoma foi respondido.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Itera pelas respostas em ordem de código.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(code, &cf)| (code.as_str(), cf))
    }

    /// Códigos respondidos, em ordem.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<S: Into<SymptomCode>> FromIterator<(S, f64)> for EvidenceSet {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut set = EvidenceSet::new();
        for (symptom, cf_user) in iter {
            set.insert(symptom, cf_user);
        }
        set
    }
}
