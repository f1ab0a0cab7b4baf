// src/api/store.rs

use std::fs;
use std::path::PathBuf;

use crate::{common::error::AppError, models::auth::TokenPair};

// Espelho durável do par de tokens, para a sessão sobreviver entre
// execuções do processo. Só o SessionManager escreve aqui.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    // Arquivo ausente ou corrompido significa apenas "sem sessão": o
    // usuário faz login de novo, nunca é um erro fatal.
    pub fn load(&self) -> Option<TokenPair> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(pair) => Some(pair),
            Err(e) => {
                tracing::warn!("Arquivo de sessão ilegível ({e}); ignorando.");
                None
            }
        }
    }

    pub fn save(&self, pair: &TokenPair) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string(pair)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> TokenStore {
        let path = std::env::temp_dir().join(format!(
            "cns-admin-store-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        TokenStore::new(path)
    }

    #[test]
    fn save_load_clear_roundtrip() {
        let store = temp_store("roundtrip");
        assert!(store.load().is_none());

        let pair = TokenPair {
            access: "acc".to_string(),
            refresh: "ref".to_string(),
        };
        store.save(&pair).expect("grava o par de tokens");

        let loaded = store.load().expect("par salvo deve ser lido de volta");
        assert_eq!(loaded.access, "acc");
        assert_eq!(loaded.refresh, "ref");

        store.clear().expect("limpa a sessão");
        assert!(store.load().is_none());
        // limpar de novo não é erro
        store.clear().expect("limpar sessão ausente é no-op");
    }

    #[test]
    fn corrupt_file_means_no_session() {
        let store = temp_store("corrupt");
        fs::write(store.path.clone(), "isto não é json").unwrap();
        assert!(store.load().is_none());
        store.clear().unwrap();
    }
}
