//! # KnowledgeBase — Tabela de Conhecimento do Especialista
//!
//! A [`KnowledgeBase`] guarda, em memória e **imutável após a carga**, os
//! três conjuntos que o especialista escreveu:
//!
//! - **Sintomas** ([`Symptom`]) — o que o agricultor observa na planta
//! - **Deficiências** ([`Deficiency`]) — as hipóteses diagnósticas, com a solução
//! - **Regras** ([`Rule`]) — ligação sintoma → deficiência com o CF do especialista
//!
//! ## Validação na Carga
//!
//! O documento bruto ([`KnowledgeDocument`]) só vira uma [`KnowledgeBase`]
//! depois de passar por [`KnowledgeBase::from_document()`]. Qualquer falha
//! impede a construção — o motor nunca recebe uma tabela parcial:
//!
//! | Verificação | Erro |
//! |-------------|------|
//! | coleção vazia | [`KnowledgeBaseError::EmptyCollection`] |
//! | campo em branco | [`KnowledgeBaseError::BlankField`] |
//! | código duplicado | [`KnowledgeBaseError::DuplicateCode`] |
//! | regra aponta para código inexistente | [`KnowledgeBaseError::DanglingReference`] |
//! | par (deficiência, sintoma) repetido | [`KnowledgeBaseError::DuplicateRule`] |
//! | CF fora de `[-1, 1]` | [`KnowledgeBaseError::CertaintyOutOfRange`] |
//!
//! ## Índices
//!
//! - `symptom_index` / `deficiency_index`: código → posição, busca O(1)
//! - `rules_by_symptom`: código do sintoma → regras que o usam
//!
//! Nenhum índice é serializado; todos são montados em `from_document()`.
//!
//! ## Compartilhamento
//!
//! Por ser imutável, a KB é compartilhada entre consultas concorrentes via
//! `Arc<KnowledgeBase>` sem nenhum lock. A troca atômica (reload) fica com
//! o [`KnowledgeStore`](crate::store::KnowledgeStore).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Código de um sintoma (ex: `"G01"`).
pub type SymptomCode = String;

/// Código de uma deficiência (ex: `"D01"`).
pub type DeficiencyCode = String;

/// Parte da planta onde o sintoma aparece.
///
/// Conjunto fixo — o questionário agrupa as perguntas nesta ordem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomCategory {
    /// Folhas (clorose, necrose, manchas).
    Leaf,
    /// Caule e ramos.
    Stem,
    /// Frutos e flores.
    Fruit,
    /// Raízes.
    Root,
    /// Planta inteira (porte, crescimento).
    WholePlant,
}

impl SymptomCategory {
    /// Label para exibição no questionário.
    pub fn label(&self) -> &'static str {
        match self {
            SymptomCategory::Leaf => "Folha",
            SymptomCategory::Stem => "Caule",
            SymptomCategory::Fruit => "Fruto",
            SymptomCategory::Root => "Raiz",
            SymptomCategory::WholePlant => "Planta inteira",
        }
    }
}

/// Sintoma observável.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    /// Código único (ex: `"G01"`).
    pub code: SymptomCode,
    /// Descrição legível.
    pub name: String,
    /// Parte da planta.
    pub category: SymptomCategory,
}

/// Hipótese diagnóstica — uma deficiência de nutriente.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deficiency {
    /// Código único (ex: `"D01"`).
    pub code: DeficiencyCode,
    /// Nome (ex: `"Deficiência de Nitrogênio (N)"`).
    pub name: String,
    /// Recomendação de manejo exibida quando a deficiência é diagnosticada.
    #[serde(alias = "solusi")]
    pub remedy: String,
}

/// Regra do especialista: "se `symptom`, então `deficiency` com certeza `cf`".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Deficiência apoiada pela regra.
    #[serde(alias = "nutrient")]
    pub deficiency: DeficiencyCode,
    /// Sintoma que dispara a regra.
    pub symptom: SymptomCode,
    /// CF do especialista, em `[-1, 1]` (na prática `[0, 1]`).
    pub cf: f64,
}

/// Representação persistida da base: três coleções nomeadas.
///
/// Aceita `nutrients` como alias de `deficiencies` para ler bases
/// exportadas no formato antigo.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub symptoms: Vec<Symptom>,
    #[serde(alias = "nutrients")]
    pub deficiencies: Vec<Deficiency>,
    pub rules: Vec<Rule>,
}

/// Erros de configuração da base de conhecimento.
///
/// São todos **fatais na carga**: o servidor não sobe (ou o reload é
/// descartado) e nenhum deles é reavaliado por requisição.
#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("arquivo da base de conhecimento não encontrado: {}", .0.display())]
    Missing(PathBuf),

    #[error("falha ao ler {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON da base de conhecimento malformado: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("a coleção '{0}' está vazia")]
    EmptyCollection(&'static str),

    #[error("{collection}[{index}]: campo '{field}' em branco")]
    BlankField {
        collection: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("código duplicado em '{collection}': {code}")]
    DuplicateCode {
        collection: &'static str,
        code: String,
    },

    #[error("rules[{index}]: {kind} '{code}' não existe na base")]
    DanglingReference {
        index: usize,
        kind: &'static str,
        code: String,
    },

    #[error("regra duplicada para ({deficiency}, {symptom})")]
    DuplicateRule {
        deficiency: DeficiencyCode,
        symptom: SymptomCode,
    },

    #[error("rules[{index}]: CF {cf} fora do intervalo [-1.0, 1.0]")]
    CertaintyOutOfRange { index: usize, cf: f64 },
}

/// Base de conhecimento validada e imutável.
///
/// Só é construída por [`from_document()`](KnowledgeBase::from_document)
/// (ou [`from_json_str()`](KnowledgeBase::from_json_str)), que garante
/// todas as invariantes listadas no topo do módulo.
#[derive(Debug)]
pub struct KnowledgeBase {
    symptoms: Vec<Symptom>,
    deficiencies: Vec<Deficiency>,
    rules: Vec<Rule>,
    symptom_index: HashMap<SymptomCode, usize>,
    deficiency_index: HashMap<DeficiencyCode, usize>,
    /// Código do sintoma → posições em `rules`, na ordem do documento.
    rules_by_symptom: HashMap<SymptomCode, Vec<usize>>,
}

impl KnowledgeBase {
    /// Valida um documento e constrói a KB com seus índices.
    ///
    /// # Erros
    ///
    /// Retorna o **primeiro** problema encontrado, na ordem: sintomas,
    /// deficiências, regras.
    pub fn from_document(doc: KnowledgeDocument) -> Result<Self, KnowledgeBaseError> {
        let KnowledgeDocument {
            symptoms,
            deficiencies,
            rules,
        } = doc;

        if symptoms.is_empty() {
            return Err(KnowledgeBaseError::EmptyCollection("symptoms"));
        }
        if deficiencies.is_empty() {
            return Err(KnowledgeBaseError::EmptyCollection("deficiencies"));
        }
        if rules.is_empty() {
            return Err(KnowledgeBaseError::EmptyCollection("rules"));
        }

        let mut symptom_index = HashMap::with_capacity(symptoms.len());
        for (index, symptom) in symptoms.iter().enumerate() {
            require("symptoms", index, "code", &symptom.code)?;
            require("symptoms", index, "name", &symptom.name)?;
            if symptom_index.insert(symptom.code.clone(), index).is_some() {
                return Err(KnowledgeBaseError::DuplicateCode {
                    collection: "symptoms",
                    code: symptom.code.clone(),
                });
            }
        }

        let mut deficiency_index = HashMap::with_capacity(deficiencies.len());
        for (index, deficiency) in deficiencies.iter().enumerate() {
            require("deficiencies", index, "code", &deficiency.code)?;
            require("deficiencies", index, "name", &deficiency.name)?;
            require("deficiencies", index, "remedy", &deficiency.remedy)?;
            if deficiency_index
                .insert(deficiency.code.clone(), index)
                .is_some()
            {
                return Err(KnowledgeBaseError::DuplicateCode {
                    collection: "deficiencies",
                    code: deficiency.code.clone(),
                });
            }
        }

        let mut seen_pairs = HashSet::with_capacity(rules.len());
        let mut rules_by_symptom: HashMap<SymptomCode, Vec<usize>> = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            if !deficiency_index.contains_key(&rule.deficiency) {
                return Err(KnowledgeBaseError::DanglingReference {
                    index,
                    kind: "deficiência",
                    code: rule.deficiency.clone(),
                });
            }
            if !symptom_index.contains_key(&rule.symptom) {
                return Err(KnowledgeBaseError::DanglingReference {
                    index,
                    kind: "sintoma",
                    code: rule.symptom.clone(),
                });
            }
            if !rule.cf.is_finite() || !(-1.0..=1.0).contains(&rule.cf) {
                return Err(KnowledgeBaseError::CertaintyOutOfRange { index, cf: rule.cf });
            }
            if !seen_pairs.insert((rule.deficiency.as_str(), rule.symptom.as_str())) {
                return Err(KnowledgeBaseError::DuplicateRule {
                    deficiency: rule.deficiency.clone(),
                    symptom: rule.symptom.clone(),
                });
            }
            rules_by_symptom
                .entry(rule.symptom.clone())
                .or_default()
                .push(index);
        }

        tracing::debug!(
            symptoms = symptoms.len(),
            deficiencies = deficiencies.len(),
            rules = rules.len(),
            "KB: validação concluída"
        );

        Ok(Self {
            symptoms,
            deficiencies,
            rules,
            symptom_index,
            deficiency_index,
            rules_by_symptom,
        })
    }

    /// Desserializa e valida uma KB a partir de JSON.
    pub fn from_json_str(json: &str) -> Result<Self, KnowledgeBaseError> {
        let doc: KnowledgeDocument = serde_json::from_str(json)?;
        Self::from_document(doc)
    }

    /// Todas as deficiências, na ordem do documento.
    pub fn deficiencies(&self) -> &[Deficiency] {
        &self.deficiencies
    }

    /// Todas as regras, na ordem do documento.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Busca um sintoma pelo código.
    pub fn symptom(&self, code: &str) -> Option<&Symptom> {
        self.symptom_index.get(code).map(|&i| &self.symptoms[i])
    }

    /// Busca uma deficiência pelo código.
    pub fn deficiency(&self, code: &str) -> Option<&Deficiency> {
        self.deficiency_index.get(code).map(|&i| &self.deficiencies[i])
    }

    /// Regras disparadas por um sintoma (vazio se nenhuma).
    pub fn rules_for_symptom<'a>(&'a self, code: &str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules_by_symptom
            .get(code)
            .map(|indices| indices.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&i| &self.rules[i])
    }

    /// Sintomas agrupados por categoria, na ordem de [`SymptomCategory`].
    ///
    /// Usado para montar o questionário: uma seção por parte da planta.
    pub fn symptoms_by_category(&self) -> Vec<(SymptomCategory, Vec<&Symptom>)> {
        let mut groups: BTreeMap<SymptomCategory, Vec<&Symptom>> = BTreeMap::new();
        for symptom in &self.symptoms {
            groups.entry(symptom.category).or_default().push(symptom);
        }
        groups.into_iter().collect()
    }

    /// Número de sintomas.
    pub fn symptom_count(&self) -> usize {
        self.symptoms.len()
    }

    /// Número de deficiências.
    pub fn deficiency_count(&self) -> usize {
        self.deficiencies.len()
    }

    /// Número de regras.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

fn require(
    collection: &'static str,
    index: usize,
    field: &'static str,
    value: &str,
) -> Result<(), KnowledgeBaseError> {
    if value.trim().is_empty() {
        return Err(KnowledgeBaseError::BlankField {
            collection,
            index,
            field,
        });
    }
    Ok(())
}
