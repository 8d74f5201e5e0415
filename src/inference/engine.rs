//! # Motor de Inferência por Fator de Certeza
//!
//! Dado uma [`KnowledgeBase`] e um [`EvidenceSet`], o [`InferenceEngine`]
//! calcula um CF combinado para cada deficiência que recebeu ao menos uma
//! evidência e devolve a lista ordenada.
//!
//! ## Algoritmo
//!
//! ```text
//! 1. valida evidências (vazio → EmptyEvidence, fora de [0,1] → InvalidEvidence)
//! 2. para cada sintoma respondido S com certeza cf_user:
//!      para cada regra (D, S, cf_expert):
//!        contribuição de D += cf_expert × cf_user
//! 3. para cada D com contribuições: cf_final = combinação de todas
//! 4. ordena por cf_final desc, empate por código asc
//! ```
//!
//! Regras cujo sintoma não foi respondido **não participam** — nem com
//! valor 0. Deficiências sem nenhuma contribuição ficam fora do resultado.
//!
//! ## Explicação
//!
//! Cada [`DiagnosisResult`] carrega as contribuições (`cf_expert × cf_user
//! = cf_rule`) e os passos da combinação, para a página de detalhes.
//!
//! ## Exemplo
//!
//! ```text
//! Regras: D01/G01 = 0.85, D01/G02 = 0.70
//! Evidência: G01 = 0.8, G02 = 0.6
//! cf_rule(G01) = 0.68, cf_rule(G02) = 0.42
//! cf_final(D01) = 0.68 + 0.42 × (1 − 0.68) = 0.8144
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::core::{CertaintyFactor, DeficiencyCode, EvidenceSet, KnowledgeBase, SymptomCode};

/// Falhas de uma consulta. Afetam só a requisição que as produziu.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InferenceError {
    /// Nenhum sintoma informado — resultado normal ("entrada insuficiente"),
    /// não um erro do sistema.
    #[error("nenhum sintoma informado: entrada insuficiente para o diagnóstico")]
    EmptyEvidence,

    /// Certeza do usuário fora de `[0, 1]` (ou não numérica).
    #[error("certeza inválida para o sintoma {symptom}: {value} (esperado entre 0.0 e 1.0)")]
    InvalidEvidence { symptom: SymptomCode, value: f64 },
}

/// Uma regra aplicada: sintoma respondido → evidência para a deficiência.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Contribution {
    /// Sintoma que disparou a regra.
    pub symptom: SymptomCode,
    /// CF do especialista na regra.
    pub cf_expert: f64,
    /// Certeza declarada pelo usuário.
    pub cf_user: f64,
    /// `cf_expert × cf_user`.
    pub cf_rule: CertaintyFactor,
}

/// Um passo da combinação sequencial: `cf_old ⊕ cf_new = result`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CombinationStep {
    pub cf_old: CertaintyFactor,
    pub cf_new: CertaintyFactor,
    pub result: CertaintyFactor,
}

/// CF combinado de uma deficiência para uma consulta.
///
/// Criado pelo motor e nunca modificado depois.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiagnosisResult {
    /// Deficiência avaliada.
    pub deficiency: DeficiencyCode,
    /// Certeza combinada em `[-1, 1]`.
    pub cf_final: CertaintyFactor,
    /// Regras que contribuíram, na ordem em que foram combinadas.
    pub contributions: Vec<Contribution>,
    /// Passos da combinação (vazio quando há uma só contribuição).
    pub steps: Vec<CombinationStep>,
}

impl DiagnosisResult {
    /// Pares (sintoma, cf_rule) das regras que contribuíram.
    pub fn contributing_rules(&self) -> impl Iterator<Item = (&str, CertaintyFactor)> {
        self.contributions
            .iter()
            .map(|c| (c.symptom.as_str(), c.cf_rule))
    }
}

/// Motor de inferência CF — struct sem estado, totalmente funcional.
///
/// Recebe a KB por referência e devolve resultados novos a cada chamada.
/// Não faz I/O, não guarda estado, não usa locks: consultas concorrentes
/// nunca interagem.
///
/// ## Uso
///
/// ```rust
/// let ranked = InferenceEngine::diagnose(&kb, &evidence)?;
/// for result in &ranked {
///     println!("{} {}", result.deficiency, result.cf_final);
/// }
/// ```
pub struct InferenceEngine;

impl InferenceEngine {
    /// Roda uma consulta completa e devolve a lista ordenada.
    ///
    /// # Erros
    ///
    /// - [`InferenceError::EmptyEvidence`] se `evidence` estiver vazio
    /// - [`InferenceError::InvalidEvidence`] para o primeiro sintoma (em ordem
    ///   de código) cuja certeza esteja fora de `[0, 1]`
    pub fn diagnose(
        kb: &KnowledgeBase,
        evidence: &EvidenceSet,
    ) -> Result<Vec<DiagnosisResult>, InferenceError> {
        validate_evidence(evidence)?;

        // Agrupa contribuições por deficiência
        let mut by_deficiency: BTreeMap<&str, Vec<Contribution>> = BTreeMap::new();
        for (symptom, cf_user) in evidence.iter() {
            for rule in kb.rules_for_symptom(symptom) {
                by_deficiency
                    .entry(rule.deficiency.as_str())
                    .or_default()
                    .push(Contribution {
                        symptom: symptom.to_string(),
                        cf_expert: rule.cf,
                        cf_user,
                        cf_rule: CertaintyFactor::from_rule(rule.cf, cf_user),
                    });
            }
        }

        let mut ranked: Vec<DiagnosisResult> = by_deficiency
            .into_iter()
            .filter_map(|(deficiency, contributions)| {
                let (cf_final, steps) = combine_with_steps(&contributions)?;
                Some(DiagnosisResult {
                    deficiency: deficiency.to_string(),
                    cf_final,
                    contributions,
                    steps,
                })
            })
            .collect();

        ranked.sort_by(rank_order);

        tracing::debug!(
            evidence = evidence.len(),
            candidates = ranked.len(),
            "Inferência CF concluída"
        );

        Ok(ranked)
    }
}

/// Rejeita conjuntos vazios e certezas fora de `[0, 1]`.
fn validate_evidence(evidence: &EvidenceSet) -> Result<(), InferenceError> {
    if evidence.is_empty() {
        return Err(InferenceError::EmptyEvidence);
    }
    for (symptom, cf_user) in evidence.iter() {
        // NaN falha no contains
        if !(0.0..=1.0).contains(&cf_user) {
            return Err(InferenceError::InvalidEvidence {
                symptom: symptom.to_string(),
                value: cf_user,
            });
        }
    }
    Ok(())
}

/// Combina as contribuições e registra cada passo.
///
/// O valor vem de [`CertaintyFactor::combine_all`]; os passos só descrevem a
/// sequência usada, e a ordem das contribuições não afeta o valor final.
fn combine_with_steps(
    contributions: &[Contribution],
) -> Option<(CertaintyFactor, Vec<CombinationStep>)> {
    let cf_final = CertaintyFactor::combine_all(contributions.iter().map(|c| c.cf_rule))?;
    let (first, rest) = contributions.split_first()?;
    let steps = rest
        .iter()
        .scan(first.cf_rule, |acc, contribution| {
            let result = acc.combine(contribution.cf_rule);
            let step = CombinationStep {
                cf_old: *acc,
                cf_new: contribution.cf_rule,
                result,
            };
            *acc = result;
            Some(step)
        })
        .collect();
    Some((cf_final, steps))
}

/// `cf_final` decrescente; empate por código crescente.
fn rank_order(a: &DiagnosisResult, b: &DiagnosisResult) -> Ordering {
    b.cf_final
        .value()
        .partial_cmp(&a.cf_final.value())
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.deficiency.cmp(&b.deficiency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::knowledge_base::tests::knowledge_base;

    const EPS: f64 = 1e-9;

    fn evidence(entries: &[(&str, f64)]) -> EvidenceSet {
        entries.iter().map(|&(s, cf)| (s, cf)).collect()
    }

    fn find<'a>(ranked: &'a [DiagnosisResult], code: &str) -> &'a DiagnosisResult {
        ranked
            .iter()
            .find(|r| r.deficiency == code)
            .unwrap_or_else(|| panic!("{} ausente do resultado", code))
    }

    #[test]
    fn test_single_evidence_is_exact_product() {
        let kb = knowledge_base(&[("D01", "G01", 0.85)]);
        let ranked = InferenceEngine::diagnose(&kb, &evidence(&[("G01", 0.6)])).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].cf_final.value(), 0.85 * 0.6);
        assert!(ranked[0].steps.is_empty());
    }

    #[test]
    fn test_two_symptom_scenario() {
        let kb = knowledge_base(&[("D01", "G01", 0.85), ("D01", "G02", 0.70)]);
        let ranked =
            InferenceEngine::diagnose(&kb, &evidence(&[("G01", 0.8), ("G02", 0.6)])).unwrap();
        let d01 = find(&ranked, "D01");

        let rules: Vec<(&str, f64)> = d01
            .contributing_rules()
            .map(|(s, cf)| (s, cf.value()))
            .collect();
        assert_eq!(rules.len(), 2);
        assert!((rules[0].1 - 0.68).abs() < EPS);
        assert!((rules[1].1 - 0.42).abs() < EPS);
        assert!((d01.cf_final.value() - 0.8144).abs() < 1e-4);
        assert_eq!(format!("{}", d01.cf_final), "0.8144");
        assert_eq!(d01.steps.len(), 1);
        assert!((d01.steps[0].cf_old.value() - 0.68).abs() < EPS);
    }

    #[test]
    fn test_three_symptom_calcium_case() {
        let kb = knowledge_base(&[("D04", "G19", 0.85), ("D04", "G20", 0.93), ("D04", "G21", 0.70)]);
        let ranked = InferenceEngine::diagnose(
            &kb,
            &evidence(&[("G19", 0.8), ("G20", 1.0), ("G21", 0.6)]),
        )
        .unwrap();
        assert!((find(&ranked, "D04").cf_final.value() - 0.987008).abs() < EPS);
    }

    #[test]
    fn test_empty_evidence() {
        let kb = knowledge_base(&[("D01", "G01", 0.85)]);
        let err = InferenceEngine::diagnose(&kb, &EvidenceSet::new()).unwrap_err();
        assert_eq!(err, InferenceError::EmptyEvidence);
    }

    #[test]
    fn test_out_of_range_evidence_rejected() {
        let kb = knowledge_base(&[("D01", "G01", 0.85)]);
        let err = InferenceEngine::diagnose(&kb, &evidence(&[("G01", 1.5)])).unwrap_err();
        assert_eq!(
            err,
            InferenceError::InvalidEvidence {
                symptom: "G01".to_string(),
                value: 1.5
            }
        );
        assert!(InferenceEngine::diagnose(&kb, &evidence(&[("G01", -0.1)])).is_err());
        assert!(InferenceEngine::diagnose(&kb, &evidence(&[("G01", f64::NAN)])).is_err());
    }

    #[test]
    fn test_unanswered_rule_changes_nothing() {
        let evidence = evidence(&[("G01", 0.8), ("G02", 0.6)]);
        let without = knowledge_base(&[("D01", "G01", 0.85), ("D01", "G02", 0.70)]);
        let with = knowledge_base(&[
            ("D01", "G01", 0.85),
            ("D01", "G02", 0.70),
            ("D01", "G03", 0.90),
        ]);
        let a = InferenceEngine::diagnose(&without, &evidence).unwrap();
        let b = InferenceEngine::diagnose(&with, &evidence).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_deficiency_without_contribution_excluded() {
        let kb = knowledge_base(&[("D01", "G01", 0.85), ("D02", "G02", 0.5)]);
        let ranked = InferenceEngine::diagnose(&kb, &evidence(&[("G01", 1.0)])).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].deficiency, "D01");
    }

    #[test]
    fn test_unknown_symptom_contributes_nothing() {
        let kb = knowledge_base(&[("D01", "G01", 0.85)]);
        let ranked = InferenceEngine::diagnose(&kb, &evidence(&[("G77", 1.0)])).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_zero_answer_is_folded_in() {
        let kb = knowledge_base(&[("D01", "G01", 0.85), ("D01", "G02", 0.7)]);
        let ranked = InferenceEngine::diagnose(&kb, &evidence(&[("G01", 0.0)])).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].cf_final.value(), 0.0);
        assert_eq!(ranked[0].contributions.len(), 1);
    }

    #[test]
    fn test_ranking_descending_with_code_tiebreak() {
        let kb = knowledge_base(&[
            ("D03", "G01", 0.5),
            ("D01", "G02", 0.5),
            ("D02", "G03", 0.9),
            ("D04", "G04", 0.2),
        ]);
        let ranked = InferenceEngine::diagnose(
            &kb,
            &evidence(&[("G01", 1.0), ("G02", 1.0), ("G03", 1.0), ("G04", 1.0)]),
        )
        .unwrap();
        let order: Vec<&str> = ranked.iter().map(|r| r.deficiency.as_str()).collect();
        assert_eq!(order, vec!["D02", "D01", "D03", "D04"]);
    }

    #[test]
    fn test_rule_order_does_not_change_result() {
        let evidence = evidence(&[("G01", 0.8), ("G02", 0.6), ("G03", 1.0), ("G04", 0.2)]);
        let forward = knowledge_base(&[
            ("D01", "G01", 0.85),
            ("D01", "G02", -0.4),
            ("D01", "G03", 0.3),
            ("D01", "G04", -0.9),
        ]);
        let backward = knowledge_base(&[
            ("D01", "G04", -0.9),
            ("D01", "G03", 0.3),
            ("D01", "G02", -0.4),
            ("D01", "G01", 0.85),
        ]);
        let a = InferenceEngine::diagnose(&forward, &evidence).unwrap();
        let b = InferenceEngine::diagnose(&backward, &evidence).unwrap();
        assert!((a[0].cf_final.value() - b[0].cf_final.value()).abs() < EPS);

        // Reduz as mesmas contribuições em ordem inversa
        let reversed = CertaintyFactor::combine_all(
            a[0].contributions.iter().rev().map(|c| c.cf_rule),
        )
        .unwrap();
        assert!((reversed.value() - a[0].cf_final.value()).abs() < EPS);
    }

    #[test]
    fn test_values_stay_in_range() {
        let kb = knowledge_base(&[
            ("D01", "G01", 1.0),
            ("D01", "G02", 1.0),
            ("D01", "G03", 0.95),
            ("D02", "G01", 0.1),
        ]);
        let ranked = InferenceEngine::diagnose(
            &kb,
            &evidence(&[("G01", 1.0), ("G02", 1.0), ("G03", 1.0)]),
        )
        .unwrap();
        for result in &ranked {
            assert!((-1.0..=1.0).contains(&result.cf_final.value()));
            for step in &result.steps {
                assert!((-1.0..=1.0).contains(&step.result.value()));
            }
        }
        assert_eq!(find(&ranked, "D01").cf_final.value(), 1.0);
    }

    #[test]
    fn test_concurrent_consultations_are_independent() {
        use std::sync::Arc;

        let kb = Arc::new(knowledge_base(&[("D01", "G01", 0.85), ("D01", "G02", 0.70)]));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let kb = Arc::clone(&kb);
                std::thread::spawn(move || {
                    let value = if i % 2 == 0 { 1.5 } else { 0.8 };
                    let ev: EvidenceSet = [("G01", value), ("G02", 0.6)].into_iter().collect();
                    (i, InferenceEngine::diagnose(&kb, &ev))
                })
            })
            .collect();
        for handle in handles {
            let (i, outcome) = handle.join().unwrap();
            if i % 2 == 0 {
                assert!(matches!(outcome, Err(InferenceError::InvalidEvidence { .. })));
            } else {
                let ranked = outcome.unwrap();
                assert!((ranked[0].cf_final.value() - 0.8144).abs() < 1e-9);
            }
        }
    }
}
