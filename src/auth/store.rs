//! Durable storage for the session token triple.
//!
//! The backend issues two bearer tokens (short-lived access, longer-lived
//! refresh); together with the username they are the only state this
//! application persists between runs. The store is a plain key-value record,
//! no invariants beyond presence/absence of each field.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Token file name in the state directory
const TOKENS_FILE: &str = "tokens.json";

/// The persisted record: two bearer tokens plus the username they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub username: Option<String>,
}

impl StoredTokens {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.username.is_none()
    }
}

/// Persistence seam for session tokens. The session is handed a store at
/// construction instead of reaching for a global, so tests can substitute an
/// in-memory implementation.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<StoredTokens>;
    fn save(&self, tokens: &StoredTokens) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// File-backed store, one pretty-printed JSON document in the state directory.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(state_dir: PathBuf) -> Self {
        Self {
            path: state_dir.join(TOKENS_FILE),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<StoredTokens> {
        if !self.path.exists() {
            return Ok(StoredTokens::default());
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read token file")?;
        serde_json::from_str(&contents).context("Failed to parse token file")
    }

    fn save(&self, tokens: &StoredTokens) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(tokens)?;
        std::fs::write(&self.path, contents).context("Failed to write token file")
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove token file")?;
        }
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    inner: Mutex<StoredTokens>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<StoredTokens> {
        Ok(self.inner.lock().expect("token store poisoned").clone())
    }

    fn save(&self, tokens: &StoredTokens) -> Result<()> {
        *self.inner.lock().expect("token store poisoned") = tokens.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.lock().expect("token store poisoned") = StoredTokens::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::default();
        let tokens = StoredTokens {
            access_token: Some("acc".to_string()),
            refresh_token: Some("ref".to_string()),
            username: Some("max".to_string()),
        };
        store.save(&tokens).unwrap();
        assert_eq!(store.load().unwrap(), tokens);

        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = std::env::temp_dir().join(format!("f1insight-test-{}", std::process::id()));
        let store = FileTokenStore::new(dir.clone());
        assert!(store.load().unwrap().is_empty());
        // Clearing a store that never saved is fine
        store.clear().unwrap();
        let _ = std::fs::remove_dir_all(dir);
    }
}
