//! # Persistência — Base de Conhecimento e Histórico de Consultas
//!
//! Dois arquivos em `data/`:
//!
//! | Arquivo | Formato | Acesso |
//! |---------|---------|--------|
//! | `knowledge_base.json` | JSON (3 coleções) | leitura na carga/reload |
//! | `consultations.jsonl` | JSON Lines | append-only, uma consulta por linha |
//!
//! ## Histórico Append-Only
//!
//! Cada consulta vira **uma linha** anexada ao fim do arquivo. Nada é
//! reescrito: um crash durante a escrita corrompe no máximo a última
//! linha. Escritas concorrentes são serializadas por um `Mutex`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;

use crate::consultation::ConsultationRecord;
use crate::core::{KnowledgeBase, KnowledgeBaseError};

/// Lê e valida a base de conhecimento de um arquivo JSON.
///
/// # Erros
///
/// - [`KnowledgeBaseError::Missing`] se o arquivo não existir
/// - [`KnowledgeBaseError::Read`] para falhas de I/O
/// - erros de formato e de validação de [`KnowledgeBase::from_json_str`]
pub fn load_knowledge_base(path: &Path) -> Result<KnowledgeBase, KnowledgeBaseError> {
    if !path.exists() {
        return Err(KnowledgeBaseError::Missing(path.to_path_buf()));
    }
    let json = std::fs::read_to_string(path).map_err(|source| KnowledgeBaseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let kb = KnowledgeBase::from_json_str(&json)?;
    tracing::info!(
        path = %path.display(),
        symptoms = kb.symptom_count(),
        deficiencies = kb.deficiency_count(),
        rules = kb.rule_count(),
        "Base de conhecimento carregada"
    );
    Ok(kb)
}

/// Histórico append-only de consultas.
pub struct ConsultationLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ConsultationLog {
    /// Cria o histórico apontando para `path` (o arquivo é criado na
    /// primeira escrita).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Anexa uma consulta ao fim do arquivo.
    ///
    /// Cria o diretório pai se necessário.
    ///
    /// # Erros
    ///
    /// Falhas de serialização ou de I/O. O chamador apenas registra o erro:
    /// o histórico nunca derruba uma consulta.
    pub fn append(&self, record: &ConsultationRecord) -> Result<()> {
        let mut line =
            serde_json::to_string(record).context("Falha ao serializar registro de consulta")?;
        line.push('\n');

        let _guard = self.write_lock.lock();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Falha ao criar diretório {}", parent.display()))?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Falha ao abrir {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("Falha ao escrever em {}", self.path.display()))?;

        tracing::debug!(id = %record.id, "Consulta registrada no histórico");
        Ok(())
    }

    /// Caminho do arquivo de histórico.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::consultation::ClientInfo;
    use crate::core::EvidenceSet;
    use crate::inference::ResultClassifier;

    fn record(name: &str) -> ConsultationRecord {
        let report = ResultClassifier::default().classify(Vec::new());
        let evidence: EvidenceSet = [("G01", 0.8)].into_iter().collect();
        ConsultationRecord::new(
            uuid::Uuid::new_v4(),
            ClientInfo {
                name: Some(name.to_string()),
                age: None,
            },
            &evidence,
            &report,
        )
    }

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_load_bundled_knowledge_base() {
        let kb = load_knowledge_base(Path::new("data/knowledge_base.json")).unwrap();
        assert_eq!(kb.deficiency_count(), 6);
        assert!(kb.rule_count() > kb.deficiency_count());
        // Regras do caso do cálcio
        let d04: Vec<(&str, f64)> = kb
            .rules()
            .iter()
            .filter(|r| r.deficiency == "D04")
            .map(|r| (r.symptom.as_str(), r.cf))
            .collect();
        assert!(d04.contains(&("G19", 0.85)));
        assert!(d04.contains(&("G20", 0.93)));
        assert!(d04.contains(&("G21", 0.70)));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, "não é json").unwrap();
        assert!(matches!(
            load_knowledge_base(&path),
            Err(KnowledgeBaseError::Malformed(_))
        ));
    }

    #[test]
    fn test_append_creates_directory_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let log = ConsultationLog::new(dir.path().join("nested").join("log.jsonl"));
        log.append(&record("Ana")).unwrap();
        log.append(&record("Budi")).unwrap();

        let lines = read_lines(log.path());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["client"]["name"], "Ana");
        assert_eq!(lines[1]["client"]["name"], "Budi");
        assert_eq!(lines[0]["evidence"]["G01"], 0.8);
    }

    #[test]
    fn test_concurrent_appends_keep_lines_intact() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(ConsultationLog::new(dir.path().join("log.jsonl")));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || log.append(&record(&format!("cliente-{}", i))).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(read_lines(log.path()).len(), 8);
    }
}
