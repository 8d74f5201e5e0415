//! # CertaintyFactor — Fator de Certeza (Shortliffe–Buchanan)
//!
//! Implementação do **fator de certeza** (CF) usado no raciocínio inexato
//! dos sistemas especialistas clássicos (MYCIN/EMYCIN).
//!
//! ## O que é um CF?
//!
//! Um CF é um escalar em `[-1, 1]` que expressa a crença em uma hipótese:
//!
//! | Valor | Significado |
//! |-------|-------------|
//! | `1.0` | Certamente verdadeira |
//! | `0.0` | Desconhecida / sem evidência |
//! | `-1.0` | Certamente falsa |
//!
//! ## CF de uma Regra
//!
//! Cada regra da base liga um sintoma a uma deficiência com a certeza do
//! especialista. A certeza do usuário sobre o sintoma atenua essa crença:
//!
//! ```text
//! cf_rule = cf_expert × cf_user
//! ```
//!
//! ## Combinação de Evidências
//!
//! Quando várias regras apoiam a mesma hipótese, os CFs são combinados
//! par a par:
//!
//! | Sinais | Fórmula |
//! |--------|---------|
//! | ambos ≥ 0 | `old + new × (1 − old)` |
//! | ambos < 0 | `old + new × (1 + old)` |
//! | opostos | `(old + new) / (1 − min(|old|, |new|))` |
//!
//! Se os sinais forem opostos e ambos tiverem magnitude 1, o denominador
//! zera e o resultado é definido como `0` (certezas conflitantes se anulam).
//!
//! A operação é comutativa e associativa: a ordem em que as regras são
//! combinadas não altera o resultado (até a tolerância de ponto flutuante).
//!
//! ## Exemplo
//!
//! ```rust
//! use crate::core::CertaintyFactor;
//!
//! let g01 = CertaintyFactor::from_rule(0.85, 0.8); // 0.68
//! let g02 = CertaintyFactor::from_rule(0.70, 0.6); // 0.42
//! let combinado = g01.combine(g02);
//! assert!((combinado.value() - 0.8144).abs() < 1e-9);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fator de certeza normalizado em `[-1, 1]`.
///
/// Construtores limitam (clamp) o valor ao intervalo válido, de modo que
/// erros de arredondamento nunca escapam de `[-1, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertaintyFactor(f64);

impl CertaintyFactor {
    /// Certeza total a favor da hipótese.
    pub const CERTAIN: CertaintyFactor = CertaintyFactor(1.0);

    /// Ausência de evidência.
    pub const UNKNOWN: CertaintyFactor = CertaintyFactor(0.0);

    /// Certeza total contra a hipótese.
    pub const REFUTED: CertaintyFactor = CertaintyFactor(-1.0);

    /// Cria um CF a partir de um valor bruto, limitado a `[-1, 1]`.
    ///
    /// `NaN` é tratado como ausência de evidência. A validação de entradas
    /// vindas do usuário acontece antes, no motor de inferência; aqui só
    /// se garante a invariante do intervalo.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::UNKNOWN;
        }
        Self(value.clamp(Self::REFUTED.0, Self::CERTAIN.0))
    }

    /// CF de uma regra aplicada: `cf_expert × cf_user`.
    pub fn from_rule(cf_expert: f64, cf_user: f64) -> Self {
        Self::new(cf_expert * cf_user)
    }

    /// Valor numérico do CF.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Valor em porcentagem (ex: `0.8144` → `81.44`).
    pub fn percentage(&self) -> f64 {
        self.0 * 100.0
    }

    /// Combina este CF (acumulado) com uma nova evidência.
    ///
    /// Aplica a regra incremental de Shortliffe–Buchanan, escolhendo o ramo
    /// pelos sinais **dos dois operandos atuais**, nunca pelos sinais das
    /// evidências originais.
    ///
    /// # Exemplo
    ///
    /// ```rust
    /// let a = CertaintyFactor::new(0.6);
    /// let b = CertaintyFactor::new(-0.4);
    /// // (0.6 − 0.4) / (1 − 0.4) = 0.3333…
    /// assert!((a.combine(b).value() - 1.0 / 3.0).abs() < 1e-12);
    /// ```
    pub fn combine(self, other: CertaintyFactor) -> CertaintyFactor {
        let old = self.0;
        let new = other.0;

        let combined = if old >= 0.0 && new >= 0.0 {
            old + new * (1.0 - old)
        } else if old < 0.0 && new < 0.0 {
            old + new * (1.0 + old)
        } else {
            let denominator = 1.0 - old.abs().min(new.abs());
            if denominator == 0.0 {
                // ±1 contra ∓1: as certezas máximas se anulam
                0.0
            } else {
                (old + new) / denominator
            }
        };

        CertaintyFactor::new(combined)
    }

    /// Reduz uma coleção de CFs a um único valor.
    ///
    /// O primeiro valor passa inalterado (identidade); os demais são
    /// combinados via [`combine()`](CertaintyFactor::combine).
    /// Retorna `None` para uma coleção vazia: sem evidência não há CF.
    pub fn combine_all<I>(factors: I) -> Option<CertaintyFactor>
    where
        I: IntoIterator<Item = CertaintyFactor>,
    {
        factors.into_iter().reduce(CertaintyFactor::combine)
    }
}

impl From<CertaintyFactor> for f64 {
    fn from(cf: CertaintyFactor) -> f64 {
        cf.0
    }
}

/// Formato com 4 casas decimais, o mesmo usado nos relatórios.
impl fmt::Display for CertaintyFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    /// Todas as permutações de um slice pequeno.
    fn permutations(values: &[f64]) -> Vec<Vec<f64>> {
        if values.len() <= 1 {
            return vec![values.to_vec()];
        }
        let mut out = Vec::new();
        for i in 0..values.len() {
            let mut rest = values.to_vec();
            let head = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, head);
                out.push(tail);
            }
        }
        out
    }

    fn fold(values: &[f64]) -> f64 {
        CertaintyFactor::combine_all(values.iter().copied().map(CertaintyFactor::new))
            .map(f64::from)
            .unwrap_or(0.0)
    }

    #[test]
    fn test_rule_cf_is_product() {
        let cf = CertaintyFactor::from_rule(0.85, 0.8);
        assert!((cf.value() - 0.68).abs() < EPS);
    }

    #[test]
    fn test_positive_combination() {
        let a = CertaintyFactor::new(0.68);
        let b = CertaintyFactor::new(0.42);
        assert!((a.combine(b).value() - 0.8144).abs() < EPS);
    }

    /// Combinar um valor consigo mesmo aumenta a crença sem passar de 1.0
    #[test]
    fn test_self_combination_grows_and_stays_bounded() {
        for v in [0.05, 0.3, 0.5, 0.77, 0.99] {
            let cf = CertaintyFactor::new(v);
            let twice = cf.combine(cf).combine(cf);
            assert!(twice.value() > v);
            assert!(twice.value() <= 1.0);
        }
    }

    #[test]
    fn test_negative_combination() {
        let a = CertaintyFactor::new(-0.5);
        let b = CertaintyFactor::new(-0.4);
        // -0.5 + -0.4 × (1 − 0.5) = -0.7
        assert!((a.combine(b).value() + 0.7).abs() < EPS);
    }

    #[test]
    fn test_opposite_signs() {
        let a = CertaintyFactor::new(0.8);
        let b = CertaintyFactor::new(-0.3);
        // (0.8 − 0.3) / (1 − 0.3)
        assert!((a.combine(b).value() - 0.5 / 0.7).abs() < EPS);
        assert!((b.combine(a).value() - 0.5 / 0.7).abs() < EPS);
    }

    #[test]
    fn test_conflicting_certainties_cancel() {
        let combined = CertaintyFactor::CERTAIN.combine(CertaintyFactor::REFUTED);
        assert_eq!(combined.value(), 0.0);
        let combined = CertaintyFactor::REFUTED.combine(CertaintyFactor::CERTAIN);
        assert_eq!(combined.value(), 0.0);
    }

    #[test]
    fn test_full_certainty_absorbs_positive_evidence() {
        let combined = CertaintyFactor::CERTAIN.combine(CertaintyFactor::new(0.3));
        assert_eq!(combined.value(), 1.0);
    }

    #[test]
    fn test_combine_all_empty_is_none() {
        assert!(CertaintyFactor::combine_all(Vec::new()).is_none());
    }

    #[test]
    fn test_combine_all_single_passes_through() {
        let cf = CertaintyFactor::combine_all([CertaintyFactor::new(0.42)]).unwrap();
        assert_eq!(cf.value(), 0.42);
    }

    #[test]
    fn test_order_independence_positive() {
        let values = [0.68, 0.93, 0.42, 0.12, 0.5];
        let reference = fold(&values);
        for perm in permutations(&values) {
            assert!((fold(&perm) - reference).abs() < EPS, "{:?}", perm);
        }
        // 0.68, 0.93, 0.42 → 0.987008
        assert!((fold(&[0.68, 0.93, 0.42]) - 0.987008).abs() < EPS);
    }

    #[test]
    fn test_order_independence_mixed_signs() {
        let sets: [&[f64]; 4] = [
            &[0.6, -0.4, 0.3],
            &[-0.2, 0.9, -0.7, 0.1],
            &[0.5, -0.5, 0.25, -0.75],
            &[-0.3, -0.6, 0.8],
        ];
        for values in sets {
            let reference = fold(values);
            for perm in permutations(values) {
                assert!((fold(&perm) - reference).abs() < EPS, "{:?}", perm);
            }
        }
    }

    #[test]
    fn test_range_preservation() {
        let grid = [0.0, 0.1, 0.2, 0.35, 0.5, 0.6, 0.8, 0.95, 1.0];
        let mut acc = CertaintyFactor::UNKNOWN;
        for &expert in &grid {
            for &user in &grid {
                let rule = CertaintyFactor::from_rule(expert, user);
                assert!((0.0..=1.0).contains(&rule.value()));
                acc = acc.combine(rule);
                assert!((-1.0..=1.0).contains(&acc.value()));
            }
        }
    }

    #[test]
    fn test_new_clamps_and_rejects_nan() {
        assert_eq!(CertaintyFactor::new(1.5).value(), 1.0);
        assert_eq!(CertaintyFactor::new(-3.0).value(), -1.0);
        assert_eq!(CertaintyFactor::new(f64::NAN).value(), 0.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(CertaintyFactor::new(0.8144).to_string(), "0.8144");
    }
}
