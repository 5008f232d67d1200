use std::sync::Arc;

use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::error::Result;
use crate::models::PendingSwapRecord;

use super::{ load_versioned, save_versioned, KeyValueStore, RECOVERY_KEY };

/// Single-slot log of the swap whose source transaction is not yet settled.
pub struct RecoveryRepository {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    slot: RwLock<Option<PendingSwapRecord>>,
}

impl RecoveryRepository {
    pub async fn open(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        let slot = load_versioned::<Option<PendingSwapRecord>>(store.as_ref(), RECOVERY_KEY).await?;

        Ok(Self {
            store,
            clock,
            slot: RwLock::new(slot.flatten()),
        })
    }

    pub async fn set(&self, record: PendingSwapRecord) -> Result<()> {
        let mut slot = self.slot.write().await;
        save_versioned(self.store.as_ref(), RECOVERY_KEY, &Some(&record)).await?;
        tracing::debug!("Recorded pending swap {}", record.tx_hash);
        *slot = Some(record);
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        let mut slot = self.slot.write().await;
        self.store.remove(RECOVERY_KEY).await?;
        *slot = None;
        Ok(())
    }

    /// The pending record, unless it has expired. Expired records are removed.
    pub async fn get(&self) -> Result<Option<PendingSwapRecord>> {
        let now = self.clock.now_ms();
        {
            let slot = self.slot.read().await;
            match slot.as_ref() {
                None => {
                    return Ok(None);
                }
                Some(record) if !record.is_expired(now) => {
                    return Ok(Some(record.clone()));
                }
                Some(_) => {}
            }
        }

        let mut slot = self.slot.write().await;
        if let Some(record) = slot.as_ref() {
            if record.is_expired(now) {
                tracing::info!("Discarding expired pending swap {}", record.tx_hash);
                self.store.remove(RECOVERY_KEY).await?;
                *slot = None;
            }
        }
        Ok(slot.clone())
    }

    pub async fn has(&self) -> Result<bool> {
        Ok(self.get().await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::enums::SwapStep;
    use crate::models::PENDING_SWAP_EXPIRY_MS;
    use crate::testing::{ eth_base, usdc_arbitrum, ManualClock };

    fn record(created_at_ms: i64) -> PendingSwapRecord {
        PendingSwapRecord {
            tx_hash: "0xfeed".to_string(),
            from_token: usdc_arbitrum(),
            to_token: eth_base(),
            from_amount: "10".to_string(),
            to_amount: "0.0033".to_string(),
            created_at_ms,
            step: SwapStep::ConfirmingTx,
        }
    }

    #[tokio::test]
    async fn test_record_survives_reopen() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(10_000));

        let repo = RecoveryRepository::open(store.clone(), clock.clone()).await.unwrap();
        assert!(!repo.has().await.unwrap());
        repo.set(record(10_000)).await.unwrap();

        let reopened = RecoveryRepository::open(store, clock).await.unwrap();
        assert_eq!(reopened.get().await.unwrap(), Some(record(10_000)));
    }

    #[tokio::test]
    async fn test_expired_record_is_cleared_on_read() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let now = 10 * PENDING_SWAP_EXPIRY_MS;
        let clock = Arc::new(ManualClock::new(now));
        let repo = RecoveryRepository::open(store.clone(), clock).await.unwrap();

        repo.set(record(now - 3_601_000)).await.unwrap();

        assert!(!repo.has().await.unwrap());
        assert_eq!(repo.get().await.unwrap(), None);
        assert_eq!(store.load(RECOVERY_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_record_within_the_hour_is_kept() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(PENDING_SWAP_EXPIRY_MS));
        let repo = RecoveryRepository::open(store, clock.clone()).await.unwrap();

        repo.set(record(0)).await.unwrap();
        assert!(repo.has().await.unwrap());

        clock.advance(1);
        assert!(!repo.has().await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_removes_persisted_record() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(0));
        let repo = RecoveryRepository::open(store.clone(), clock).await.unwrap();

        repo.set(record(0)).await.unwrap();
        repo.clear().await.unwrap();

        assert_eq!(repo.get().await.unwrap(), None);
        assert_eq!(store.load(RECOVERY_KEY).await.unwrap(), None);
    }
}
