use std::collections::HashMap;
use std::path::{ Path, PathBuf };

use async_trait::async_trait;
use serde::{ de::DeserializeOwned, Deserialize, Serialize };
use tokio::sync::RwLock;

use crate::error::{ AppError, Result };

mod recovery_repository;
pub use recovery_repository::RecoveryRepository;

mod transaction_repository;
pub use transaction_repository::TransactionRepository;

/// Schema version written with every persisted document.
pub const STORE_VERSION: u32 = 1;

pub const RECOVERY_KEY: &str = "swap-recovery";
pub const LEDGER_KEY: &str = "swap-transactions";

/// Durable string storage addressed by key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>>;
    async fn save(&self, key: &str, value: String) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// One JSON file per key inside a data directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs
            ::create_dir_all(&dir).await
            .map_err(|e| AppError::Storage(format!("Cannot create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("Cannot read {}: {}", key, e))),
        }
    }

    async fn save(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));

        tokio::fs
            ::write(&tmp, value).await
            .map_err(|e| AppError::Storage(format!("Cannot write {}: {}", key, e)))?;
        tokio::fs
            ::rename(&tmp, &path).await
            .map_err(|e| AppError::Storage(format!("Cannot replace {}: {}", key, e)))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Cannot remove {}: {}", key, e))),
        }
    }
}

/// Process-local store, used when nothing needs to survive a restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: String) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Versioned<T> {
    version: u32,
    state: T,
}

/// Read a versioned document. Documents from another schema version, or that
/// no longer parse, are treated as absent.
pub(crate) async fn load_versioned<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str
) -> Result<Option<T>> {
    let Some(raw) = store.load(key).await? else {
        return Ok(None);
    };

    match serde_json::from_str::<Versioned<T>>(&raw) {
        Ok(doc) if doc.version == STORE_VERSION => Ok(Some(doc.state)),
        Ok(doc) => {
            tracing::warn!("Discarding {} stored with unknown version {}", key, doc.version);
            Ok(None)
        }
        Err(e) => {
            tracing::warn!("Discarding unreadable {}: {}", key, e);
            Ok(None)
        }
    }
}

pub(crate) async fn save_versioned<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    state: &T
) -> Result<()> {
    let doc = Versioned {
        version: STORE_VERSION,
        state,
    };
    store.save(key, serde_json::to_string(&doc)?).await
}
