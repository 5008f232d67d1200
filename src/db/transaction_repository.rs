use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::clock::Clock;
use crate::enums::TxStatus;
use crate::error::{ AppError, Result };
use crate::models::{ NewTransaction, Transaction };

use super::{ load_versioned, save_versioned, KeyValueStore, LEDGER_KEY };

/// Append-mostly ledger of swaps, newest first.
pub struct TransactionRepository {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    entries: RwLock<Vec<Transaction>>,
}

impl TransactionRepository {
    pub async fn open(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        let entries = load_versioned::<Vec<Transaction>>(store.as_ref(), LEDGER_KEY).await?;

        Ok(Self {
            store,
            clock,
            entries: RwLock::new(entries.unwrap_or_default()),
        })
    }

    async fn persist(&self, entries: &[Transaction]) -> Result<()> {
        save_versioned(self.store.as_ref(), LEDGER_KEY, &entries).await
    }

    pub async fn append(&self, new_tx: NewTransaction) -> Result<Uuid> {
        let transaction = Transaction {
            id: Uuid::new_v4(),
            from_token: new_tx.from_token,
            to_token: new_tx.to_token,
            from_amount: new_tx.from_amount,
            to_amount: new_tx.to_amount,
            status: TxStatus::Pending,
            created_at_ms: self.clock.now_ms(),
            tx_hash: None,
            error_message: None,
        };
        let id = transaction.id;

        let mut entries = self.entries.write().await;
        let mut next = Vec::with_capacity(entries.len() + 1);
        next.push(transaction);
        next.extend(entries.iter().cloned());
        self.persist(&next).await?;
        *entries = next;

        tracing::debug!("Ledger entry {} created", id);
        Ok(id)
    }

    /// Move a pending entry to its final status. Unknown ids and entries that
    /// already reached a terminal status are left untouched.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: TxStatus,
        error_message: Option<String>
    ) -> Result<()> {
        let mut entries = self.entries.write().await;
        let Some(index) = entries.iter().position(|t| t.id == id) else {
            tracing::warn!("Ignoring status update for unknown ledger entry {}", id);
            return Ok(());
        };
        if entries[index].status.is_terminal() {
            tracing::debug!("Ledger entry {} already {}", id, entries[index].status);
            return Ok(());
        }

        let mut next = entries.clone();
        next[index].status = status;
        next[index].error_message = if status == TxStatus::Failed { error_message } else { None };
        self.persist(&next).await?;
        *entries = next;

        tracing::info!("Ledger entry {} marked {}", id, status);
        Ok(())
    }

    pub async fn attach_tx_hash(&self, id: Uuid, tx_hash: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        let index = entries
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Transaction {}", id)))?;

        let mut next = entries.clone();
        next[index].tx_hash = Some(tx_hash.to_string());
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Option<Transaction> {
        self.entries
            .read().await
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub async fn find_by_tx_hash(&self, tx_hash: &str) -> Option<Transaction> {
        self.entries
            .read().await
            .iter()
            .find(|t| t.tx_hash.as_deref().is_some_and(|h| h.eq_ignore_ascii_case(tx_hash)))
            .cloned()
    }

    pub async fn list(&self, limit: Option<usize>) -> Vec<Transaction> {
        let entries = self.entries.read().await;
        let limit = limit.unwrap_or(entries.len());
        entries.iter().take(limit).cloned().collect()
    }

    pub async fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write().await;
        self.store.remove(LEDGER_KEY).await?;
        entries.clear();
        Ok(())
    }
}
