//! Transaction lifecycle orchestrator.
//!
//! One flow at a time: validate, ensure allowance, simulate, estimate gas,
//! submit, poll for the receipt. Progress and errors are published on the
//! feedback channel as they happen; the returned outcome carries what the
//! caller must refresh.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ethers::types::{Address, TransactionReceipt, H256, U256};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{
    classify, surface_message, ErrorKind, FlowError, INSUFFICIENT_FUNDS_MESSAGE, REVERTED_MESSAGE,
};
use crate::feedback::FeedbackChannel;
use crate::flows::{self, ApprovalPlan, FlowContext, TransactionIntent};
use crate::flows::{extract_token_address, DataScope};
use crate::recent_tokens::{DeployedToken, RecentTokensStore};
use crate::rpc_client::RpcClient;
use crate::settings::{SettingsStore, DEFAULT_GAS_PRICE_WEI};
use crate::wallet::WalletProvider;

#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub receipt_retry_limit: u32,
    pub receipt_retry_delay: Duration,
    /// Approve transactions skip estimation and use this fixed limit.
    pub approve_gas_limit: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            receipt_retry_limit: 20,
            receipt_retry_delay: Duration::from_secs(3),
            approve_gas_limit: 1_500_000,
        }
    }
}

/// Where the current (or last) flow stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Idle,
    Validating,
    Approving,
    Simulating,
    EstimatingGas,
    Submitting,
    AwaitingReceipt,
    Confirmed,
    Failed,
    /// Submitted but unconfirmed after the polling window closed.
    Unknown,
}

/// How a completed flow ended. `Unknown` means the transaction was submitted
/// but no receipt arrived within the polling window; it may still confirm
/// later, so it is not reported as success or failure.
#[derive(Debug, Clone)]
pub enum FlowOutcome {
    Confirmed {
        tx_hash: H256,
        block_number: u64,
        invalidates: Vec<DataScope>,
        deployed_token: Option<DeployedToken>,
    },
    Unknown {
        tx_hash: H256,
    },
}

pub struct Orchestrator {
    wallet: Arc<dyn WalletProvider>,
    rpc: Arc<RpcClient>,
    settings: Arc<SettingsStore>,
    recent_tokens: Arc<RecentTokensStore>,
    feedback: FeedbackChannel,
    config: FlowConfig,
    stage: Mutex<FlowStage>,
    in_flight: AtomicBool,
}

impl Orchestrator {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        rpc: Arc<RpcClient>,
        settings: Arc<SettingsStore>,
        recent_tokens: Arc<RecentTokensStore>,
    ) -> Self {
        Self::with_config(wallet, rpc, settings, recent_tokens, FlowConfig::default())
    }

    pub fn with_config(
        wallet: Arc<dyn WalletProvider>,
        rpc: Arc<RpcClient>,
        settings: Arc<SettingsStore>,
        recent_tokens: Arc<RecentTokensStore>,
        config: FlowConfig,
    ) -> Self {
        Self {
            wallet,
            rpc,
            settings,
            recent_tokens,
            feedback: FeedbackChannel::new(),
            config,
            stage: Mutex::new(FlowStage::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn feedback(&self) -> &FeedbackChannel {
        &self.feedback
    }

    pub fn stage(&self) -> FlowStage {
        *self.stage.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Clears feedback and stage between flows. Has no effect on a flow that
    /// is currently running.
    pub fn reset(&self) {
        if self.is_busy() {
            return;
        }
        self.feedback.reset();
        *self.stage.lock() = FlowStage::Idle;
    }

    /// Drives `intent` to completion. Rejected immediately with
    /// [`FlowError::Busy`] while another flow is in flight; the running
    /// flow's feedback and stage are left untouched in that case.
    pub async fn run(&self, intent: TransactionIntent) -> Result<FlowOutcome, FlowError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(FlowError::Busy);
        }

        let result = self.execute(&intent).await;
        match &result {
            Ok(FlowOutcome::Confirmed { .. }) => {
                *self.stage.lock() = FlowStage::Confirmed;
            }
            Ok(FlowOutcome::Unknown { .. }) => {
                *self.stage.lock() = FlowStage::Unknown;
            }
            Err(FlowError::UserRejected) => {
                // A rejection is the user changing their mind, not a failure.
                self.feedback.reset();
                *self.stage.lock() = FlowStage::Idle;
            }
            Err(err) => {
                self.feedback.danger(err.to_string());
                *self.stage.lock() = FlowStage::Failed;
            }
        }

        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn execute(&self, intent: &TransactionIntent) -> Result<FlowOutcome, FlowError> {
        *self.stage.lock() = FlowStage::Validating;
        let account = self.wallet.account().ok_or(FlowError::NoWallet)?;
        let ctx = FlowContext {
            account,
            chain_id: self.wallet.chain_id(),
        };
        let plan = flows::plan(intent, &ctx)?;

        // Value-carrying flows check the native balance up front; a failed
        // lookup is only logged, the node enforces it anyway.
        if !plan.call.value.is_zero() {
            match self.wallet.native_balance(account).await {
                Ok(balance) if balance < plan.call.value => {
                    return Err(FlowError::Validation(
                        INSUFFICIENT_FUNDS_MESSAGE.to_string(),
                    ));
                }
                Ok(_) => {}
                Err(err) => warn!("native balance check skipped: {err:#}"),
            }
        }

        if let Some(approval) = &plan.approval {
            *self.stage.lock() = FlowStage::Approving;
            self.ensure_allowance(account, approval).await?;
        }

        *self.stage.lock() = FlowStage::Simulating;
        self.feedback.progress(plan.simulate_label.clone());
        if let Err(err) = self.wallet.call(account, &plan.call).await {
            let raw = format!("{err:#}");
            let kind = classify(&raw);
            if kind == ErrorKind::UserRejected {
                return Err(FlowError::UserRejected);
            }
            let fatal = matches!(
                kind,
                ErrorKind::DenomAlreadyRegistered
                    | ErrorKind::CircuitBreaker
                    | ErrorKind::ContractValidation
                    | ErrorKind::InsufficientFunds
            );
            if fatal || !plan.tolerate_simulation_failure {
                return Err(FlowError::Simulation(surface_message(kind, &raw)));
            }
            warn!("simulation failed, continuing: {raw}");
        }

        *self.stage.lock() = FlowStage::EstimatingGas;
        let gas_limit = match self.wallet.estimate_gas(account, &plan.call).await {
            Ok(estimate) => gas_util::compute_gas_limit(estimate),
            Err(err) => {
                let raw = format!("{err:#}");
                if classify(&raw) == ErrorKind::UserRejected {
                    return Err(FlowError::UserRejected);
                }
                warn!("gas estimation failed, using the default limit: {raw}");
                gas_util::compute_gas_limit(plan.default_gas_limit)
            }
        };
        let gas_price = match plan.fixed_gas_price {
            Some(price) => Some(price),
            None => self.resolve_gas_price().await,
        };

        *self.stage.lock() = FlowStage::Submitting;
        self.feedback.progress(plan.submit_label.clone());
        let tx_hash = match self
            .wallet
            .send_transaction(account, &plan.call, gas_limit, gas_price)
            .await
        {
            Ok(hash) => hash,
            Err(err) => {
                let raw = format!("{err:#}");
                let kind = classify(&raw);
                if kind == ErrorKind::UserRejected {
                    return Err(FlowError::UserRejected);
                }
                return Err(FlowError::Submission(surface_message(kind, &raw)));
            }
        };

        info!("transaction submitted: {tx_hash:?}");
        *self.stage.lock() = FlowStage::AwaitingReceipt;
        self.feedback.progress(format!(
            "Transaction sent (hash: {tx_hash:?}), waiting for confirmation..."
        ));

        let Some(receipt) = self.wait_for_receipt(tx_hash).await else {
            warn!(
                "no receipt after {} attempts for {tx_hash:?}",
                self.config.receipt_retry_limit
            );
            // Neither success nor failure: say so instead of implying either.
            self.feedback.progress(format!(
                "Transaction {tx_hash:?} was sent but not confirmed yet. It may still complete."
            ));
            return Ok(FlowOutcome::Unknown { tx_hash });
        };

        if receipt.status == Some(0u64.into()) {
            return Err(FlowError::Reverted(REVERTED_MESSAGE.to_string()));
        }
        let block_number = receipt.block_number.map(|n| n.as_u64()).unwrap_or_default();

        let deployed_token = match &plan.deploy {
            Some(deploy) => self.record_deployment(deploy, &receipt, tx_hash),
            None => None,
        };

        self.feedback.success(plan.success.render(block_number));
        Ok(FlowOutcome::Confirmed {
            tx_hash,
            block_number,
            invalidates: plan.invalidates.clone(),
            deployed_token,
        })
    }

    async fn ensure_allowance(
        &self,
        account: Address,
        approval: &ApprovalPlan,
    ) -> Result<(), FlowError> {
        let current = self
            .wallet
            .allowance(approval.token, account, approval.spender)
            .await
            .map_err(|err| {
                let raw = format!("{err:#}");
                FlowError::Submission(surface_message(classify(&raw), &raw))
            })?;
        if current >= approval.required {
            self.feedback
                .progress("Token already approved for sufficient amount.");
            return Ok(());
        }

        self.feedback.progress("Approving token...");
        let gas_price = self.resolve_gas_price().await;
        let receipt = self
            .wallet
            .approve(
                approval.token,
                approval.spender,
                approval.required,
                self.config.approve_gas_limit,
                gas_price,
            )
            .await
            .map_err(|err| {
                let raw = format!("{err:#}");
                let kind = classify(&raw);
                if kind == ErrorKind::UserRejected {
                    FlowError::UserRejected
                } else {
                    FlowError::Submission(surface_message(kind, &raw))
                }
            })?;
        if receipt.status == Some(0u64.into()) {
            return Err(FlowError::Submission(
                "Token approval failed. Please try again.".to_string(),
            ));
        }
        Ok(())
    }

    /// Network quote with the configured multiplier applied, 20 gwei when the
    /// quote is unavailable.
    async fn resolve_gas_price(&self) -> Option<U256> {
        let base = match self.rpc.gas_price().await {
            Ok(Some(price)) => price,
            Ok(None) => DEFAULT_GAS_PRICE_WEI,
            Err(err) => {
                debug!("gas price lookup failed, using fallback: {err:#}");
                DEFAULT_GAS_PRICE_WEI
            }
        };
        Some(U256::from(self.settings.adjusted_gas_price(base)))
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> Option<TransactionReceipt> {
        for attempt in 0..self.config.receipt_retry_limit {
            if attempt > 0 {
                tokio::time::sleep(self.config.receipt_retry_delay).await;
            }
            match self.wallet.transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => return Some(receipt),
                Ok(None) => {}
                Err(err) => debug!("receipt lookup attempt {attempt} failed: {err:#}"),
            }
        }
        None
    }

    fn record_deployment(
        &self,
        deploy: &flows::DeployPlan,
        receipt: &TransactionReceipt,
        tx_hash: H256,
    ) -> Option<DeployedToken> {
        let Some(address) = extract_token_address(receipt) else {
            warn!("deployment confirmed but no token address found in receipt logs");
            return None;
        };
        let token = DeployedToken {
            address: format!("{address:#x}"),
            name: deploy.name.clone(),
            symbol: deploy.symbol.clone(),
            denom: deploy.denom.clone(),
            total_supply: deploy.total_supply.clone(),
            decimals: deploy.decimals,
            logo_base64: deploy.logo_base64.clone(),
            tx_hash: format!("{tx_hash:#x}"),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        if let Err(err) = self.recent_tokens.add(token.clone()) {
            warn!("failed to persist deployed token: {err:#}");
        }
        Some(token)
    }
}
