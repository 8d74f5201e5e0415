//! # Intake — Do Formulário para o EvidenceSet
//!
//! Converte os campos do formulário de consulta em [`EvidenceSet`] +
//! [`ClientInfo`].
//!
//! | Campo | Tratamento |
//! |-------|------------|
//! | `symptoms[G01]` vazio | sintoma não avaliado (ignorado) |
//! | `symptoms[G01]=0.8` | evidência `G01 → 0.8` |
//! | `symptoms[G01]=abc` | rejeitado ([`IntakeError::NotNumeric`]) |
//! | `symptoms[G99]` desconhecido | descartado com `warn` |
//! | `name`, `age` | dados opcionais do cliente |
//!
//! A faixa `[0, 1]` **não** é checada aqui: isso é responsabilidade do
//! motor, que rejeita a consulta inteira.

use thiserror::Error;

use crate::consultation::ClientInfo;
use crate::core::{EvidenceSet, KnowledgeBase};

/// Campos do formulário rejeitados antes da consulta.
#[derive(Debug, Error, PartialEq)]
pub enum IntakeError {
    #[error("resposta não numérica para o sintoma {symptom}: {raw:?}")]
    NotNumeric { symptom: String, raw: String },

    #[error("idade inválida: {0:?}")]
    InvalidAge(String),
}

/// Resultado do parsing do formulário.
#[derive(Debug, Default, PartialEq)]
pub struct Intake {
    pub client: ClientInfo,
    pub evidence: EvidenceSet,
}

/// Extrai o código de um campo `symptoms[CODE]`.
fn symptom_code(key: &str) -> Option<&str> {
    key.strip_prefix("symptoms[")?.strip_suffix(']')
}

/// Lê os pares `(campo, valor)` do formulário.
pub fn parse_form(kb: &KnowledgeBase, fields: &[(String, String)]) -> Result<Intake, IntakeError> {
    let mut intake = Intake::default();

    for (key, raw) in fields {
        let raw = raw.trim();
        if let Some(code) = symptom_code(key) {
            if raw.is_empty() {
                continue;
            }
            let value: f64 = raw.parse().map_err(|_| IntakeError::NotNumeric {
                symptom: code.to_string(),
                raw: raw.to_string(),
            })?;
            if kb.symptom(code).is_none() {
                tracing::warn!(symptom = %code, "Sintoma desconhecido descartado");
                continue;
            }
            intake.evidence.insert(code, value);
            continue;
        }

        match key.as_str() {
            "name" if !raw.is_empty() => intake.client.name = Some(raw.to_string()),
            "age" if !raw.is_empty() => {
                let age = raw
                    .parse()
                    .map_err(|_| IntakeError::InvalidAge(raw.to_string()))?;
                intake.client.age = Some(age);
            }
            _ => {}
        }
    }

    Ok(intake)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::knowledge_base::tests::knowledge_base;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn kb() -> KnowledgeBase {
        knowledge_base(&[("D01", "G01", 0.85), ("D01", "G02", 0.7)])
    }

    #[test]
    fn test_parse_symptoms_and_client() {
        let intake = parse_form(
            &kb(),
            &fields(&[
                ("name", " Ana "),
                ("age", "41"),
                ("symptoms[G01]", "0.8"),
                ("symptoms[G02]", ""),
            ]),
        )
        .unwrap();

        assert_eq!(intake.client.name.as_deref(), Some("Ana"));
        assert_eq!(intake.client.age, Some(41));
        assert_eq!(intake.evidence, [("G01", 0.8)].into_iter().collect());
    }

    #[test]
    fn test_blank_form_is_empty_intake() {
        let intake = parse_form(&kb(), &fields(&[("name", ""), ("symptoms[G01]", " ")])).unwrap();
        assert_eq!(intake, Intake::default());
    }

    #[test]
    fn test_non_numeric_rejected() {
        let err = parse_form(&kb(), &fields(&[("symptoms[G01]", "muito")])).unwrap_err();
        assert_eq!(
            err,
            IntakeError::NotNumeric {
                symptom: "G01".to_string(),
                raw: "muito".to_string()
            }
        );
        assert!(matches!(
            parse_form(&kb(), &fields(&[("age", "quarenta")])),
            Err(IntakeError::InvalidAge(_))
        ));
    }

    #[test]
    fn test_unknown_symptom_dropped() {
        let intake = parse_form(
            &kb(),
            &fields(&[("symptoms[G99]", "1.0"), ("symptoms[G01]", "0.6")]),
        )
        .unwrap();
        assert_eq!(intake.evidence.codes().collect::<Vec<_>>(), vec!["G01"]);
    }

    #[test]
    fn test_out_of_range_passes_through() {
        // A faixa é validada pelo motor
        let intake = parse_form(&kb(), &fields(&[("symptoms[G01]", "1.5")])).unwrap();
        assert_eq!(intake.evidence, [("G01", 1.5)].into_iter().collect());
    }

    #[test]
    fn test_symptom_code() {
        assert_eq!(symptom_code("symptoms[G01]"), Some("G01"));
        assert_eq!(symptom_code("symptoms[G01"), None);
        assert_eq!(symptom_code("name"), None);
    }
}
