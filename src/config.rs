//! # Configuração da Aplicação
//!
//! Parâmetros de execução lidos de variáveis de ambiente, com padrões
//! que permitem rodar com um simples `cargo run`.
//!
//! | Variável | Padrão | Uso |
//! |----------|--------|-----|
//! | `HARA_ADDR` | `0.0.0.0:3000` | endereço do servidor |
//! | `HARA_KB_PATH` | `data/knowledge_base.json` | base de conhecimento |
//! | `HARA_LOG_PATH` | `data/consultations.jsonl` | histórico de consultas |
//! | `HARA_ACTIONABLE_THRESHOLD` | `0.2` | limiar do veredito |
//! | `HARA_CONFIDENCE_BANDS` | faixas padrão | JSON `[{"lower":0.8,"label":"..."}]` |
//! | `HARA_RELOAD_ENABLED` | `false` | libera `POST /knowledge/reload` |
//!
//! O nível de log continua vindo de `RUST_LOG` (ver `main.rs`).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::inference::{ConfidenceBand, DEFAULT_ACTIONABLE_THRESHOLD};

/// Configuração de execução.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Endereço `host:porta` do servidor HTTP.
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Caminho do JSON da base de conhecimento.
    #[serde(default = "default_kb_path")]
    pub knowledge_base_path: PathBuf,

    /// Caminho do histórico append-only de consultas (JSON Lines).
    #[serde(default = "default_log_path")]
    pub consultation_log_path: PathBuf,

    /// CF mínimo do primeiro colocado para haver diagnóstico.
    #[serde(default = "default_threshold")]
    pub actionable_threshold: f64,

    /// Faixas de confiança próprias; `None` usa as padrão.
    /// A validação acontece em `ConfidenceBands::new`.
    #[serde(default)]
    pub confidence_bands: Option<Vec<ConfidenceBand>>,

    /// Libera o reload da base via HTTP (rota de operação).
    #[serde(default)]
    pub reload_enabled: bool,
}

fn default_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_kb_path() -> PathBuf {
    PathBuf::from("data/knowledge_base.json")
}

fn default_log_path() -> PathBuf {
    PathBuf::from("data/consultations.jsonl")
}

fn default_threshold() -> f64 {
    DEFAULT_ACTIONABLE_THRESHOLD
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            knowledge_base_path: default_kb_path(),
            consultation_log_path: default_log_path(),
            actionable_threshold: default_threshold(),
            confidence_bands: None,
            reload_enabled: false,
        }
    }
}

impl AppConfig {
    /// Lê a configuração das variáveis de ambiente do processo.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Lê a configuração a partir de uma função de busca de variáveis.
    ///
    /// # Erros
    ///
    /// Retorna erro se `HARA_ACTIONABLE_THRESHOLD` não for um número em
    /// `[-1, 1]`, se `HARA_ADDR` estiver em branco ou se
    /// `HARA_RELOAD_ENABLED` não for um booleano.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("HARA_ADDR") {
            if addr.trim().is_empty() {
                bail!("HARA_ADDR está em branco");
            }
            config.addr = addr.trim().to_string();
        }
        if let Some(path) = lookup("HARA_KB_PATH") {
            config.knowledge_base_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("HARA_LOG_PATH") {
            config.consultation_log_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup("HARA_ACTIONABLE_THRESHOLD") {
            let threshold: f64 = raw
                .trim()
                .parse()
                .with_context(|| format!("HARA_ACTIONABLE_THRESHOLD inválido: {:?}", raw))?;
            if !(-1.0..=1.0).contains(&threshold) {
                bail!("HARA_ACTIONABLE_THRESHOLD fora de [-1.0, 1.0]: {}", threshold);
            }
            config.actionable_threshold = threshold;
        }
        if let Some(raw) = lookup("HARA_CONFIDENCE_BANDS") {
            let bands: Vec<ConfidenceBand> = serde_json::from_str(&raw)
                .context("HARA_CONFIDENCE_BANDS deve ser uma lista JSON de {lower, label}")?;
            config.confidence_bands = Some(bands);
        }
        if let Some(raw) = lookup("HARA_RELOAD_ENABLED") {
            config.reload_enabled = match raw.trim() {
                "true" | "1" => true,
                "false" | "0" => false,
                other => bail!("HARA_RELOAD_ENABLED deve ser true ou false: {:?}", other),
            };
        }

        Ok(config)
    }
}
