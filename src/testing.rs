//! Fixtures and in-memory collaborators shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{ AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering };
use std::sync::{ Arc, Mutex };
use std::time::Duration;

use async_trait::async_trait;
use ethers::types::U256;
use tokio::sync::Notify;

use crate::clock::Clock;
use crate::dex::{
    ApprovalReceipt,
    BackendError,
    DeliveryInfo,
    Intent,
    IntentParams,
    QuoteBackend,
    QuoteRequest,
    QuoteResponse,
    SolverResponse,
    SwapBackend,
    SwapSubmission,
};
use crate::db::{ KeyValueStore, MemoryStore };
use crate::error::{ AppError, Result };
use crate::models::{ ChainInfo, Quote, Token, NATIVE_TOKEN_ADDRESS };
use crate::providers::{
    CatalogSnapshot,
    SigningProvider,
    TokenCatalog,
    TransactionReceipt,
    TransactionRequest,
    WalletConnector,
};

pub const USER_ADDRESS: &str = "0x8ba1f109551bD432803012645Ac136ddd64DBA72";

// ─── Tokens and quotes ──────────────────────────────────────────────

pub fn usdc_arbitrum() -> Token {
    Token {
        symbol: "USDC".to_string(),
        name: "USD Coin".to_string(),
        address: "0xaf88d065e77c8cC2239327C5EDb3A432268e5831".to_string(),
        decimals: 6,
        chain_id: "0xa4b1.arbitrum".to_string(),
        logo_url: String::new(),
        price: Some(1.0),
    }
}

pub fn eth_base() -> Token {
    Token {
        symbol: "ETH".to_string(),
        name: "Ether".to_string(),
        address: NATIVE_TOKEN_ADDRESS.to_string(),
        decimals: 18,
        chain_id: "0x2105.base".to_string(),
        logo_url: String::new(),
        price: Some(3000.0),
    }
}

pub fn sol_solana() -> Token {
    Token {
        symbol: "SOL".to_string(),
        name: "Solana".to_string(),
        address: "So11111111111111111111111111111111111111112".to_string(),
        decimals: 9,
        chain_id: "solana".to_string(),
        logo_url: String::new(),
        price: None,
    }
}

/// 10 USDC on Arbitrum for 0.0033 ETH on Base at 0.5% slippage.
pub fn sample_quote(created_at_ms: i64) -> Quote {
    Quote {
        from_token: usdc_arbitrum(),
        to_token: eth_base(),
        from_amount: "10".to_string(),
        to_amount: "0.0033".to_string(),
        rate: 0.00033,
        price_impact: 0.1,
        estimated_gas: "0.005".to_string(),
        minimum_received: "0.0032835".to_string(),
        slippage: 0.5,
        quoted_amount: U256::from(3_300_000_000_000_000u64),
        created_at_ms,
    }
}

/// 0.01 ETH on Base for 33 USDC on Arbitrum.
pub fn native_quote(created_at_ms: i64) -> Quote {
    Quote {
        from_token: eth_base(),
        to_token: usdc_arbitrum(),
        from_amount: "0.01".to_string(),
        to_amount: "33".to_string(),
        rate: 3300.0,
        price_impact: 0.1,
        estimated_gas: "0.005".to_string(),
        minimum_received: "32.835".to_string(),
        slippage: 0.5,
        quoted_amount: U256::from(33_000_000u64),
        created_at_ms,
    }
}

// ─── Clock ──────────────────────────────────────────────────────────

pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self { now: AtomicI64::new(now_ms) }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ─── Quote backend ──────────────────────────────────────────────────

/// Quotes `amount * multiplier`, optionally delayed per input amount.
pub struct FakeQuoteBackend {
    multiplier: u64,
    price_impact: Option<f64>,
    failure: Mutex<Option<BackendError>>,
    delays: Mutex<HashMap<U256, Duration>>,
    requests: Mutex<Vec<QuoteRequest>>,
}

impl FakeQuoteBackend {
    /// 1 USDC (6 decimals) quotes 0.00033 ETH (18 decimals).
    pub fn new() -> Self {
        Self::with_multiplier(330_000_000)
    }

    pub fn with_multiplier(multiplier: u64) -> Self {
        Self {
            multiplier,
            price_impact: None,
            failure: Mutex::new(None),
            delays: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_price_impact(mut self, price_impact: f64) -> Self {
        self.price_impact = Some(price_impact);
        self
    }

    pub fn fail_with(&self, err: BackendError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn delay_for(&self, amount: U256, delay: Duration) {
        self.delays.lock().unwrap().insert(amount, delay);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<QuoteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteBackend for FakeQuoteBackend {
    async fn get_quote(&self, request: &QuoteRequest) -> std::result::Result<QuoteResponse, BackendError> {
        self.requests.lock().unwrap().push(request.clone());

        let delay = self.delays.lock().unwrap().get(&request.amount).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }

        Ok(QuoteResponse {
            quoted_amount: request.amount * U256::from(self.multiplier),
            price_impact: self.price_impact,
            estimated_gas: None,
        })
    }
}

// ─── Storage ────────────────────────────────────────────────────────

/// In-memory store whose saves can be switched to fail.
pub struct FlakyStore {
    inner: MemoryStore,
    fail_saves: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_saves: AtomicBool::new(false),
        }
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        self.inner.load(key).await
    }

    async fn save(&self, key: &str, value: String) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("disk full writing {}", key)));
        }
        self.inner.save(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key).await
    }
}

// ─── Signer and wallet ──────────────────────────────────────────────

pub struct FakeSigner {
    network_id: u64,
    counter: AtomicU64,
    sent: Mutex<Vec<TransactionRequest>>,
    last_sent: Mutex<Option<String>>,
    receipt: Mutex<std::result::Result<bool, BackendError>>,
}

impl FakeSigner {
    pub fn new(network_id: u64) -> Self {
        Self {
            network_id,
            counter: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
            last_sent: Mutex::new(None),
            receipt: Mutex::new(Ok(true)),
        }
    }

    /// Outcome of the next receipt lookups: mined with this status, or an error.
    pub fn set_receipt(&self, outcome: std::result::Result<bool, BackendError>) {
        *self.receipt.lock().unwrap() = outcome;
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl SigningProvider for FakeSigner {
    fn address(&self) -> String {
        USER_ADDRESS.to_string()
    }

    fn network_id(&self) -> u64 {
        self.network_id
    }

    async fn send_transaction(
        &self,
        request: TransactionRequest
    ) -> std::result::Result<String, BackendError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let hash = format!("0x{:064x}", n);
        self.sent.lock().unwrap().push(request);
        *self.last_sent.lock().unwrap() = Some(hash.clone());
        Ok(hash)
    }

    async fn wait_for_transaction_receipt(
        &self,
        tx_hash: &str
    ) -> std::result::Result<TransactionReceipt, BackendError> {
        let outcome = self.receipt.lock().unwrap().clone();
        outcome.map(|success| TransactionReceipt {
            tx_hash: tx_hash.to_string(),
            block_number: Some(1),
            success,
        })
    }

    fn last_sent_tx_hash(&self) -> Option<String> {
        self.last_sent.lock().unwrap().clone()
    }
}

pub struct FakeWallet {
    active: Mutex<Option<u64>>,
    switch_error: Mutex<Option<BackendError>>,
    switches: Mutex<Vec<u64>>,
    signers: HashMap<u64, Arc<FakeSigner>>,
}

impl FakeWallet {
    /// Connected on `active`, with signers for Arbitrum and Base.
    pub fn new(active: Option<u64>) -> Self {
        let signers = [42161u64, 8453]
            .into_iter()
            .map(|id| (id, Arc::new(FakeSigner::new(id))))
            .collect();
        Self {
            active: Mutex::new(active),
            switch_error: Mutex::new(None),
            switches: Mutex::new(Vec::new()),
            signers,
        }
    }

    pub fn without_signers() -> Self {
        Self {
            active: Mutex::new(None),
            switch_error: Mutex::new(None),
            switches: Mutex::new(Vec::new()),
            signers: HashMap::new(),
        }
    }

    pub fn fail_switch(&self, err: BackendError) {
        *self.switch_error.lock().unwrap() = Some(err);
    }

    pub fn switches(&self) -> Vec<u64> {
        self.switches.lock().unwrap().clone()
    }

    pub fn signer(&self, network_id: u64) -> Arc<FakeSigner> {
        self.signers[&network_id].clone()
    }
}

#[async_trait]
impl WalletConnector for FakeWallet {
    fn active_network(&self) -> Option<u64> {
        *self.active.lock().unwrap()
    }

    async fn switch_network(&self, network_id: u64) -> std::result::Result<(), BackendError> {
        self.switches.lock().unwrap().push(network_id);
        if let Some(err) = self.switch_error.lock().unwrap().clone() {
            return Err(err);
        }
        *self.active.lock().unwrap() = Some(network_id);
        Ok(())
    }

    fn signing_provider(&self, network_id: u64) -> Option<Arc<dyn SigningProvider>> {
        self.signers.get(&network_id).map(|s| s.clone() as Arc<dyn SigningProvider>)
    }
}

// ─── Swap backend ───────────────────────────────────────────────────

pub enum SwapScript {
    /// Send the source transaction and report its hash.
    Succeed,
    /// Send the source transaction but omit its hash from the response.
    OmitHash,
    /// Send the source transaction, then fail with this error.
    FailAfterSend(BackendError),
    /// Fail before anything is sent.
    Fail(BackendError),
}

pub struct FakeSwapBackend {
    approve_error: Mutex<Option<BackendError>>,
    script: Mutex<SwapScript>,
    gate: Mutex<Option<Arc<Notify>>>,
    calls: Mutex<Vec<&'static str>>,
    params: Mutex<Vec<IntentParams>>,
}

impl FakeSwapBackend {
    pub fn new() -> Self {
        Self {
            approve_error: Mutex::new(None),
            script: Mutex::new(SwapScript::Succeed),
            gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            params: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_approval(&self, err: BackendError) {
        *self.approve_error.lock().unwrap() = Some(err);
    }

    pub fn script(&self, script: SwapScript) {
        *self.script.lock().unwrap() = script;
    }

    /// Make `swap` wait until the returned handle is notified.
    pub fn hold_swaps(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_params(&self) -> Option<IntentParams> {
        self.params.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SwapBackend for FakeSwapBackend {
    async fn approve(
        &self,
        params: &IntentParams,
        signer: &dyn SigningProvider
    ) -> std::result::Result<ApprovalReceipt, BackendError> {
        self.calls.lock().unwrap().push("approve");
        if let Some(err) = self.approve_error.lock().unwrap().clone() {
            return Err(err);
        }
        let tx_hash = signer.send_transaction(TransactionRequest {
            from: signer.address(),
            to: params.input_token.clone(),
            value: U256::zero(),
            data: "0x095ea7b3".to_string(),
        }).await?;
        Ok(ApprovalReceipt { tx_hash: Some(tx_hash) })
    }

    async fn swap(
        &self,
        params: &IntentParams,
        signer: &dyn SigningProvider
    ) -> std::result::Result<SwapSubmission, BackendError> {
        self.calls.lock().unwrap().push("swap");
        self.params.lock().unwrap().push(params.clone());

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let outcome = match &*self.script.lock().unwrap() {
            SwapScript::Succeed => Ok(true),
            SwapScript::OmitHash => Ok(false),
            SwapScript::FailAfterSend(err) => Err((true, err.clone())),
            SwapScript::Fail(err) => Err((false, err.clone())),
        };

        let sends = match &outcome {
            Ok(_) => true,
            Err((sends, _)) => *sends,
        };
        let tx_hash = if sends {
            Some(
                signer.send_transaction(TransactionRequest {
                    from: signer.address(),
                    to: "0x0000000000000000000000000000000000001ce5".to_string(),
                    value: U256::zero(),
                    data: "0x".to_string(),
                }).await?
            )
        } else {
            None
        };

        match outcome {
            Ok(with_hash) =>
                Ok((
                    SolverResponse { intent_hash: "0x1a7e".to_string() },
                    Intent {
                        intent_id: Some("42".to_string()),
                        src_chain: params.src_chain.clone(),
                        dst_chain: params.dst_chain.clone(),
                    },
                    DeliveryInfo {
                        src_tx_hash: if with_hash { tx_hash } else { None },
                        src_chain_id: Some(params.src_chain.clone()),
                        dst_chain_id: Some(params.dst_chain.clone()),
                    },
                )),
            Err((_, err)) => Err(err),
        }
    }
}

// ─── Catalog ────────────────────────────────────────────────────────

pub struct StaticCatalog {
    snapshot: CatalogSnapshot,
    loads: AtomicUsize,
}

impl StaticCatalog {
    pub fn with_tokens(tokens: Vec<Token>) -> Self {
        let mut snapshot = CatalogSnapshot::default();
        for token in tokens {
            if !snapshot.chains.iter().any(|c| c.id == token.chain_id) {
                snapshot.chains.push(ChainInfo {
                    id: token.chain_id.clone(),
                    name: token.chain_id.clone(),
                    display_name: token.chain_id.clone(),
                    icon: String::new(),
                    is_hub: token.chain_id == "sonic",
                });
            }
            snapshot.tokens.entry(token.chain_id.clone()).or_default().push(token);
        }
        Self {
            snapshot,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenCatalog for StaticCatalog {
    async fn load(&self) -> Result<CatalogSnapshot> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot.clone())
    }
}
