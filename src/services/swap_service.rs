use std::sync::Arc;

use ethers::types::{ Address, U256 };
use serde::Serialize;
use tokio::sync::{ watch, Mutex };
use uuid::Uuid;

use crate::amount;
use crate::chains;
use crate::clock::Clock;
use crate::db::{ RecoveryRepository, TransactionRepository };
use crate::dex::error_map::{ classify, is_user_rejection };
use crate::dex::{ IntentParams, SwapBackend };
use crate::enums::{ SwapStep, TxStatus };
use crate::error::{ AppError, ErrorCode, Result, SwapError };
use crate::models::{ NewTransaction, PendingSwapRecord, Quote, NATIVE_TOKEN_ADDRESS };
use crate::providers::{ SigningProvider, WalletConnector };

use super::QuoteSession;

pub const SETTLEMENT_NOTICE: &str = "Swap submitted. Funds may take 1–2 minutes to arrive.";

/// Outcome of a swap that reached the solver.
#[derive(Debug, Clone, Serialize)]
pub struct SwapReceipt {
    pub success: bool,
    pub step: SwapStep,
    pub tx_hash: Option<String>,
    pub intent_hash: Option<String>,
    pub src_chain_id: String,
    pub dst_chain_id: String,
    pub explorer_url: Option<String>,
    pub ledger_id: Uuid,
    pub notice: String,
}

/// Validated inputs of one swap attempt.
struct SwapPlan<'a> {
    quote: &'a Quote,
    network_id: u64,
    signer: Arc<dyn SigningProvider>,
    params: IntentParams,
}

/// Drives a quote through approval, intent submission and confirmation.
pub struct SwapService {
    backend: Arc<dyn SwapBackend>,
    wallet: Arc<dyn WalletConnector>,
    recovery: Arc<RecoveryRepository>,
    ledger: Arc<TransactionRepository>,
    clock: Arc<dyn Clock>,
    guard: Mutex<()>,
    step: watch::Sender<Option<SwapStep>>,
}

impl SwapService {
    pub fn new(
        backend: Arc<dyn SwapBackend>,
        wallet: Arc<dyn WalletConnector>,
        recovery: Arc<RecoveryRepository>,
        ledger: Arc<TransactionRepository>,
        clock: Arc<dyn Clock>
    ) -> Self {
        let (step, _) = watch::channel(None);
        Self {
            backend,
            wallet,
            recovery,
            ledger,
            clock,
            guard: Mutex::new(()),
            step,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SwapStep>> {
        self.step.subscribe()
    }

    pub fn current_step(&self) -> Option<SwapStep> {
        *self.step.borrow()
    }

    fn set_step(&self, step: SwapStep) {
        tracing::info!("Swap step: {}", step.label());
        self.step.send_replace(Some(step));
    }

    /// Execute `quote` for `user_address`. Only one swap runs at a time.
    pub async fn execute_swap(
        &self,
        quote: Option<&Quote>,
        user_address: &str,
        slippage: f64
    ) -> Result<SwapReceipt> {
        let _running = self.guard.try_lock().map_err(|_| AppError::SwapInProgress)?;
        self.step.send_replace(None);

        let plan = self.plan(quote, user_address, slippage)?;
        self.align_network(plan.network_id).await?;

        if !plan.quote.from_token.is_native() {
            self.set_step(SwapStep::Approving);
            if let Err(e) = self.backend.approve(&plan.params, plan.signer.as_ref()).await {
                let err = if is_user_rejection(&e) {
                    SwapError::with_message(
                        ErrorCode::UserRejected,
                        "Token approval was rejected by user"
                    )
                } else {
                    SwapError::new(ErrorCode::TransactionFailed)
                };
                return Err(self.fail(None, err.caused_by(e)).await);
            }
        }

        self.set_step(SwapStep::CreatingIntent);
        let ledger_id = match self.ledger.append(NewTransaction::from(plan.quote)).await {
            Ok(id) => id,
            Err(e) => {
                self.set_step(SwapStep::Failed);
                return Err(e);
            }
        };

        self.set_step(SwapStep::SigningTx);
        self.set_step(SwapStep::SubmittingTx);
        // Approvals and earlier swaps share the signer; only a hash sent by
        // this submission identifies the swap's source transaction.
        let sent_before = plan.signer.last_sent_tx_hash();
        let (solver, intent, delivery) = match
            self.backend.swap(&plan.params, plan.signer.as_ref()).await
        {
            Ok(submission) => submission,
            Err(e) =>
                match classify(&e) {
                    ErrorCode::RelayTimeout => {
                        tracing::warn!("Relay did not confirm submission: {}", e);
                        let sent = plan.signer
                            .last_sent_tx_hash()
                            .filter(|hash| Some(hash) != sent_before.as_ref());
                        let Some(tx_hash) = sent else {
                            let err = SwapError::with_message(
                                ErrorCode::TransactionFailed,
                                "Swap was not submitted"
                            ).caused_by(e);
                            return Err(self.fail(Some(ledger_id), err).await);
                        };
                        return Ok(self.settle_pending(&plan, ledger_id, tx_hash).await);
                    }
                    ErrorCode::UserRejected => {
                        return Err(self.fail(Some(ledger_id), SwapError::from_backend(e)).await);
                    }
                    _ => {
                        let err = SwapError::new(ErrorCode::TransactionFailed).caused_by(e);
                        return Err(self.fail(Some(ledger_id), err).await);
                    }
                }
        };

        let Some(tx_hash) = delivery.src_tx_hash.clone() else {
            let err = SwapError::with_message(
                ErrorCode::TransactionFailed,
                "No transaction hash in swap response"
            );
            return Err(self.fail(Some(ledger_id), err).await);
        };
        tracing::info!("Intent {} submitted in {}", solver.intent_hash, tx_hash);

        // The source transaction is on chain from here on; storage failures
        // must not turn it into a reported failure.
        if let Err(e) = self.ledger.attach_tx_hash(ledger_id, &tx_hash).await {
            tracing::error!("Failed to attach {} to ledger entry {}: {}", tx_hash, ledger_id, e);
        }

        self.set_step(SwapStep::ConfirmingTx);
        if let Err(e) = self.recovery.set(self.pending_record(plan.quote, &tx_hash, SwapStep::ConfirmingTx)).await {
            tracing::error!("Failed to record pending swap {}: {}", tx_hash, e);
        }

        self.set_step(SwapStep::Complete);
        if let Err(e) = self.ledger.update_status(ledger_id, TxStatus::Success, None).await {
            tracing::error!("Failed to mark ledger entry {} successful: {}", ledger_id, e);
        }
        if let Err(e) = self.recovery.clear().await {
            tracing::error!("Failed to clear pending swap {}: {}", tx_hash, e);
        }

        Ok(SwapReceipt {
            success: true,
            step: SwapStep::Complete,
            explorer_url: chains::explorer_tx_url(plan.network_id, &tx_hash),
            tx_hash: Some(tx_hash),
            intent_hash: Some(solver.intent_hash),
            src_chain_id: delivery.src_chain_id.unwrap_or(intent.src_chain),
            dst_chain_id: delivery.dst_chain_id.unwrap_or(intent.dst_chain),
            ledger_id,
            notice: SETTLEMENT_NOTICE.to_string(),
        })
    }

    /// Execute the session's quote again, re-quoting first if it went stale.
    pub async fn retry(
        &self,
        session: &QuoteSession,
        user_address: &str,
        slippage: f64
    ) -> Result<SwapReceipt> {
        let quote = session.ensure_fresh_quote().await?;
        self.execute_swap(Some(&quote), user_address, slippage).await
    }

    /// Checks that change nothing and call no collaborator.
    fn plan<'a>(
        &self,
        quote: Option<&'a Quote>,
        user_address: &str,
        slippage: f64
    ) -> Result<SwapPlan<'a>> {
        let quote = quote.ok_or_else(|| AppError::InvalidInput("No quote available".to_string()))?;
        if quote.is_stale(self.clock.now_ms()) {
            return Err(SwapError::new(ErrorCode::QuoteExpired).into());
        }

        if !user_address.starts_with("0x") || user_address.parse::<Address>().is_err() {
            return Err(AppError::InvalidInput(format!("Invalid wallet address: {}", user_address)));
        }
        amount::validate_slippage(slippage)?;

        let src_chain = chains::to_backend_chain_id(&quote.from_token.chain_id)?;
        let dst_chain = chains::to_backend_chain_id(&quote.to_token.chain_id)?;
        let network_id = chains
            ::to_network_id(&quote.from_token.chain_id)
            .ok_or_else(|| AppError::UnsupportedChain(quote.from_token.chain_id.clone()))?;

        let signer = self.wallet
            .signing_provider(network_id)
            .ok_or_else(|| {
                SwapError::with_message(ErrorCode::NetworkError, "Wallet provider not available")
            })?;

        let params = IntentParams {
            input_token: quote.from_token.address.clone(),
            output_token: quote.to_token.address.clone(),
            input_amount: amount::encode(&quote.from_amount, quote.from_token.decimals)?,
            min_output_amount: amount::min_output(quote.quoted_amount, slippage)?,
            deadline: U256::zero(),
            allow_partial_fill: false,
            src_chain: src_chain.to_string(),
            dst_chain: dst_chain.to_string(),
            src_address: user_address.to_string(),
            dst_address: user_address.to_string(),
            solver: NATIVE_TOKEN_ADDRESS.to_string(),
            data: "0x".to_string(),
        };

        Ok(SwapPlan {
            quote,
            network_id,
            signer,
            params,
        })
    }

    async fn align_network(&self, network_id: u64) -> Result<()> {
        if self.wallet.active_network() == Some(network_id) {
            return Ok(());
        }

        tracing::info!("Switching wallet to network {}", network_id);
        if let Err(e) = self.wallet.switch_network(network_id).await {
            let code = if is_user_rejection(&e) {
                ErrorCode::UserRejected
            } else {
                ErrorCode::NetworkError
            };
            let err = SwapError::with_message(code, "Network switch rejected").caused_by(e);
            return Err(self.fail(None, err).await);
        }
        Ok(())
    }

    /// Submission went out in `tx_hash` but the relay never confirmed it.
    /// Treated as likely success: the ledger entry stays pending and the
    /// record is kept until the source transaction is checked.
    async fn settle_pending(
        &self,
        plan: &SwapPlan<'_>,
        ledger_id: Uuid,
        tx_hash: String
    ) -> SwapReceipt {
        if let Err(e) = self.ledger.attach_tx_hash(ledger_id, &tx_hash).await {
            tracing::error!("Failed to attach {} to ledger entry {}: {}", tx_hash, ledger_id, e);
        }
        let record = self.pending_record(plan.quote, &tx_hash, SwapStep::PendingConfirmation);
        if let Err(e) = self.recovery.set(record).await {
            tracing::error!("Failed to record pending swap {}: {}", tx_hash, e);
        }

        self.set_step(SwapStep::PendingConfirmation);

        SwapReceipt {
            success: true,
            step: SwapStep::PendingConfirmation,
            explorer_url: chains::explorer_tx_url(plan.network_id, &tx_hash),
            tx_hash: Some(tx_hash),
            intent_hash: None,
            src_chain_id: plan.params.src_chain.clone(),
            dst_chain_id: plan.params.dst_chain.clone(),
            ledger_id,
            notice: ErrorCode::RelayTimeout.user_message().to_string(),
        }
    }

    async fn fail(&self, ledger_id: Option<Uuid>, err: SwapError) -> AppError {
        tracing::warn!("Swap failed with {}: {:?}", err.code, err.cause);

        if let Some(id) = ledger_id {
            if
                let Err(e) = self.ledger.update_status(
                    id,
                    TxStatus::Failed,
                    Some(err.message.clone())
                ).await
            {
                tracing::error!("Failed to mark ledger entry {} failed: {}", id, e);
            }
        }

        self.set_step(SwapStep::Failed);
        err.into()
    }

    fn pending_record(&self, quote: &Quote, tx_hash: &str, step: SwapStep) -> PendingSwapRecord {
        PendingSwapRecord {
            tx_hash: tx_hash.to_string(),
            from_token: quote.from_token.clone(),
            to_token: quote.to_token.clone(),
            from_amount: quote.from_amount.clone(),
            to_amount: quote.to_amount.clone(),
            created_at_ms: self.clock.now_ms(),
            step,
        }
    }

    // ─── Recovery ───────────────────────────────────────────────────

    /// The unsettled swap from an earlier session, if it has not expired.
    pub async fn pending_swap(&self) -> Result<Option<PendingSwapRecord>> {
        self.recovery.get().await
    }

    pub async fn discard_pending_swap(&self) -> Result<()> {
        tracing::info!("Pending swap dismissed");
        self.recovery.clear().await
    }

    /// Wait for the pending swap's source transaction and settle it.
    /// Returns the resulting step, or `None` when nothing is pending.
    pub async fn check_pending_swap(&self) -> Result<Option<SwapStep>> {
        let _running = self.guard.try_lock().map_err(|_| AppError::SwapInProgress)?;

        let Some(record) = self.recovery.get().await? else {
            return Ok(None);
        };
        let network_id = chains
            ::to_network_id(&record.from_token.chain_id)
            .ok_or_else(|| AppError::UnsupportedChain(record.from_token.chain_id.clone()))?;
        let signer = self.wallet
            .signing_provider(network_id)
            .ok_or_else(|| {
                SwapError::with_message(ErrorCode::NetworkError, "Wallet provider not available")
            })?;

        self.set_step(SwapStep::PollingStatus);
        let ledger_id = self.ledger.find_by_tx_hash(&record.tx_hash).await.map(|t| t.id);

        let receipt = match signer.wait_for_transaction_receipt(&record.tx_hash).await {
            Ok(receipt) => receipt,
            Err(e) => {
                // Unknown outcome: keep the record for a later check.
                self.set_step(SwapStep::Failed);
                return Err(SwapError::from_backend(e).into());
            }
        };

        if receipt.success {
            if let Some(id) = ledger_id {
                self.ledger.update_status(id, TxStatus::Success, None).await?;
            }
            self.recovery.clear().await?;
            self.set_step(SwapStep::Complete);
            Ok(Some(SwapStep::Complete))
        } else {
            tracing::warn!("Pending swap {} reverted", record.tx_hash);
            if let Some(id) = ledger_id {
                let message = ErrorCode::TransactionFailed.user_message().to_string();
                self.ledger.update_status(id, TxStatus::Failed, Some(message)).await?;
            }
            self.recovery.clear().await?;
            self.set_step(SwapStep::Failed);
            Ok(Some(SwapStep::Failed))
        }
    }
}
