use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::U256;
use serde::{ Deserialize, Serialize };

use crate::dex::BackendError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    pub value: U256,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub success: bool,
}

/// Signs and sends transactions for one account on one network.
#[async_trait]
pub trait SigningProvider: Send + Sync {
    /// Account address the provider signs for.
    fn address(&self) -> String;

    /// Numeric EVM network id the provider is bound to.
    fn network_id(&self) -> u64;

    /// Sign and broadcast, returning the transaction hash.
    async fn send_transaction(&self, request: TransactionRequest) -> Result<String, BackendError>;

    /// Block until the transaction is mined.
    async fn wait_for_transaction_receipt(
        &self,
        tx_hash: &str
    ) -> Result<TransactionReceipt, BackendError>;

    /// Hash of the most recent transaction sent through this provider.
    fn last_sent_tx_hash(&self) -> Option<String>;
}

/// The user's connected wallet.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    fn active_network(&self) -> Option<u64>;

    async fn switch_network(&self, network_id: u64) -> Result<(), BackendError>;

    fn signing_provider(&self, network_id: u64) -> Option<Arc<dyn SigningProvider>>;
}
