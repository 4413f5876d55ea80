use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::{Map, Value};

use crate::utils::error::{AppError, AppResult};

/// Chave fixa onde o token fica guardado
pub const TOKEN_KEY: &str = "token";

/// Armazenamento persistente do token de sessão.
///
/// Lido na inicialização e antes de toda chamada autenticada, por isso as
/// implementações não fazem cache próprio.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> AppResult<Option<String>>;
    fn set(&self, token: &str) -> AppResult<()>;
    fn remove(&self) -> AppResult<()>;
}

/// Store em memória (testes e sessões efêmeras)
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        if let Ok(mut entries) = store.entries.write() {
            entries.insert(TOKEN_KEY.to_string(), token.to_string());
        }
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> AppResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| AppError::Storage(format!("Token store lock poisoned: {}", e)))?;
        Ok(entries.get(TOKEN_KEY).cloned())
    }

    fn set(&self, token: &str) -> AppResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| AppError::Storage(format!("Token store lock poisoned: {}", e)))?;
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        Ok(())
    }

    fn remove(&self) -> AppResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| AppError::Storage(format!("Token store lock poisoned: {}", e)))?;
        entries.remove(TOKEN_KEY);
        Ok(())
    }
}

/// Store em arquivo JSON (`{"token": "..."}`), equivalente ao localStorage do browser
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> AppResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| AppError::Storage(format!("Failed to read {}: {}", self.path.display(), e)))?;

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&raw)
            .map_err(|e| AppError::Storage(format!("Corrupted token file {}: {}", self.path.display(), e)))
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AppError::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
            }
        }

        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::Storage(format!("Failed to serialize token file: {}", e)))?;

        std::fs::write(&self.path, raw)
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", self.path.display(), e)))
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> AppResult<Option<String>> {
        Ok(self
            .read_entries()?
            .get(TOKEN_KEY)
            .and_then(|v| v.as_str())
            .map(String::from))
    }

    fn set(&self, token: &str) -> AppResult<()> {
        let mut entries = self.read_entries()?;
        entries.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write_entries(&entries)?;
        log::debug!("💾 Token saved to {}", self.path.display());
        Ok(())
    }

    fn remove(&self) -> AppResult<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(TOKEN_KEY).is_some() {
            self.write_entries(&entries)?;
            log::debug!("🗑️ Token removed from {}", self.path.display());
        }
        Ok(())
    }
}
