use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use tokio::sync::OnceCell;

use crate::error::{ AppError, Result };
use crate::models::{ ChainInfo, Token };

/// Chains and their tokens, as served by the catalog source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub chains: Vec<ChainInfo>,
    #[serde(default)]
    pub tokens: HashMap<String, Vec<Token>>,
}

#[async_trait]
pub trait TokenCatalog: Send + Sync {
    async fn load(&self) -> Result<CatalogSnapshot>;
}

/// Catalog read from a JSON file on disk.
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenCatalog for FileCatalog {
    async fn load(&self) -> Result<CatalogSnapshot> {
        let raw = tokio::fs
            ::read_to_string(&self.path).await
            .map_err(|e| {
                AppError::Config(format!("Cannot read catalog {}: {}", self.path.display(), e))
            })?;

        let snapshot: CatalogSnapshot = serde_json::from_str(&raw)?;
        tracing::info!(
            "Loaded catalog with {} chains from {}",
            snapshot.chains.len(),
            self.path.display()
        );
        Ok(snapshot)
    }
}

/// Loads the catalog once per process and serves it from memory afterwards.
pub struct CachedCatalog {
    source: Arc<dyn TokenCatalog>,
    cache: OnceCell<CatalogSnapshot>,
}

impl CachedCatalog {
    pub fn new(source: Arc<dyn TokenCatalog>) -> Self {
        Self {
            source,
            cache: OnceCell::new(),
        }
    }

    async fn snapshot(&self) -> Result<&CatalogSnapshot> {
        self.cache.get_or_try_init(|| self.source.load()).await
    }

    pub async fn chains(&self) -> Result<Vec<ChainInfo>> {
        Ok(self.snapshot().await?.chains.clone())
    }

    /// Tokens of one chain; unknown chains have none.
    pub async fn tokens(&self, chain_id: &str) -> Result<Vec<Token>> {
        Ok(self.snapshot().await?.tokens.get(chain_id).cloned().unwrap_or_default())
    }

    pub async fn find_token(&self, chain_id: &str, address: &str) -> Result<Option<Token>> {
        let snapshot = self.snapshot().await?;
        Ok(
            snapshot.tokens
                .get(chain_id)
                .and_then(|tokens| {
                    tokens.iter().find(|t| t.address.eq_ignore_ascii_case(address))
                })
                .cloned()
        )
    }
}
