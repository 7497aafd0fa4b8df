//! Backing stores for the ledger document.
//!
//! The ledger persists as one shared document; `LedgerManager` serializes
//! every read-modify-write against it, so a store only has to load and
//! save the whole document.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

use super::{errors::StoreError, models::LedgerDocument};

/// Abstract read/write interface over the ledger document.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Load the whole document. A store with no data yet reads as empty.
    async fn load(&self) -> Result<LedgerDocument, StoreError>;

    /// Persist the whole document.
    async fn save(&self, doc: &LedgerDocument) -> Result<(), StoreError>;
}

/// In-memory store for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Mutex<LedgerDocument>,
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn load(&self) -> Result<LedgerDocument, StoreError> {
        Ok(self.doc.lock().await.clone())
    }

    async fn save(&self, doc: &LedgerDocument) -> Result<(), StoreError> {
        *self.doc.lock().await = doc.clone();
        Ok(())
    }
}

/// JSON file store. A missing file reads as an empty document; saves
/// write the document pretty-printed.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl LedgerStore for JsonFileStore {
    async fn load(&self) -> Result<LedgerDocument, StoreError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LedgerDocument::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    async fn save(&self, doc: &LedgerDocument) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, raw).await?;
        Ok(())
    }
}
