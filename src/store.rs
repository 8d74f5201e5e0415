//! # KnowledgeStore — Dono do Snapshot da Base
//!
//! Mantém a [`KnowledgeBase`] corrente como `Arc<KnowledgeBase>` imutável.
//!
//! ## Troca Atômica
//!
//! ```text
//! consulta A ── snapshot() ──► Arc(KB v1) ─── usa v1 até o fim
//!                 reload() ──► valida v2 ──► swap ──► KB v2
//! consulta B ── snapshot() ──► Arc(KB v2)
//! ```
//!
//! O `RwLock` protege apenas o ponteiro: o lock de leitura dura o tempo de
//! um `Arc::clone`, e o de escrita o tempo de trocar o ponteiro. A carga e
//! a validação do arquivo acontecem **fora** do lock. Se o reload falhar,
//! o snapshot anterior continua em uso.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::{KnowledgeBase, KnowledgeBaseError};
use crate::persistence;

/// Snapshot corrente da base + caminho de onde recarregá-la.
pub struct KnowledgeStore {
    path: PathBuf,
    current: RwLock<Arc<KnowledgeBase>>,
}

impl KnowledgeStore {
    /// Carrega e valida a base do disco.
    ///
    /// # Erros
    ///
    /// Qualquer [`KnowledgeBaseError`] — o chamador deve abortar a
    /// inicialização.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, KnowledgeBaseError> {
        let path = path.into();
        let kb = persistence::load_knowledge_base(&path)?;
        Ok(Self::with_knowledge_base(path, kb))
    }

    /// Cria o store a partir de uma base já validada.
    pub fn with_knowledge_base(path: impl Into<PathBuf>, kb: KnowledgeBase) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(Arc::new(kb)),
        }
    }

    /// Snapshot atual. A consulta deve usar o mesmo snapshot do início ao fim.
    pub fn snapshot(&self) -> Arc<KnowledgeBase> {
        Arc::clone(&self.current.read())
    }

    /// Recarrega o arquivo e troca o snapshot.
    ///
    /// Em caso de erro o snapshot anterior é mantido.
    pub fn reload(&self) -> Result<Arc<KnowledgeBase>, KnowledgeBaseError> {
        let fresh = Arc::new(persistence::load_knowledge_base(&self.path)?);
        *self.current.write() = Arc::clone(&fresh);
        tracing::info!(
            symptoms = fresh.symptom_count(),
            deficiencies = fresh.deficiency_count(),
            rules = fresh.rule_count(),
            "Base de conhecimento recarregada"
        );
        Ok(fresh)
    }

    /// Caminho do arquivo da base.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::knowledge_base::tests::document;

    fn write_kb(path: &Path, rules: &[(&str, &str, f64)]) {
        let json = serde_json::to_string_pretty(&document(rules)).unwrap();
        std::fs::write(path, json).unwrap();
    }

    #[test]
    fn test_open_and_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        write_kb(&path, &[("D01", "G01", 0.85)]);

        let store = KnowledgeStore::open(&path).unwrap();
        assert_eq!(store.snapshot().rule_count(), 1);
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = KnowledgeStore::open(dir.path().join("nada.json")).err().unwrap();
        assert!(matches!(err, KnowledgeBaseError::Missing(_)));
    }

    #[test]
    fn test_reload_swaps_while_old_snapshot_survives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        write_kb(&path, &[("D01", "G01", 0.85)]);
        let store = KnowledgeStore::open(&path).unwrap();

        let in_flight = store.snapshot();
        write_kb(&path, &[("D01", "G01", 0.85), ("D01", "G02", 0.7)]);
        store.reload().unwrap();

        assert_eq!(in_flight.rule_count(), 1);
        assert_eq!(store.snapshot().rule_count(), 2);
    }

    #[test]
    fn test_failed_reload_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        write_kb(&path, &[("D01", "G01", 0.85)]);
        let store = KnowledgeStore::open(&path).unwrap();

        let mut broken = document(&[("D01", "G01", 0.85)]);
        broken.rules.push(crate::core::knowledge_base::Rule {
            deficiency: "D01".to_string(),
            symptom: "G99".to_string(),
            cf: 0.5,
        });
        std::fs::write(&path, serde_json::to_string(&broken).unwrap()).unwrap();

        assert!(matches!(
            store.reload(),
            Err(KnowledgeBaseError::DanglingReference { .. })
        ));
        assert_eq!(store.snapshot().rule_count(), 1);
    }
}
