//! Shared fixtures: a scriptable wallet and an in-process JSON-RPC stub.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::routing::post;
use axum::{Json, Router};
use ethers::types::{Address, Bytes, Log, TransactionReceipt, H256, U256};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::Notify;

use portal_engine::chain_config::{HELIOS_NETWORK_ID, TOKEN_FACTORY_CONTRACT_ADDRESS};
use portal_engine::orchestrator::FlowConfig;
use portal_engine::{
    ContractCall, Orchestrator, RecentTokensStore, RpcClient, SettingsStore, WalletProvider,
};

pub const ACCOUNT: &str = "0x589A698b7b7dA0Bec545177D3963A2741105C7C9";

pub fn account() -> Address {
    ACCOUNT.parse().unwrap()
}

#[derive(Default)]
pub struct CallCounters {
    pub allowance: AtomicUsize,
    pub approve: AtomicUsize,
    pub call: AtomicUsize,
    pub estimate: AtomicUsize,
    pub send: AtomicUsize,
    pub receipt: AtomicUsize,
}

/// Wallet double whose behavior is scripted through its fields.
pub struct MockWallet {
    pub account: Option<Address>,
    pub chain_id: u64,
    pub allowance: U256,
    /// Error text returned by `call`, i.e. a failing simulation.
    pub call_error: Option<String>,
    /// Bytes returned by a successful `call`, 32 zero bytes by default.
    pub call_result: Option<Vec<u8>>,
    pub estimate_error: Option<String>,
    pub estimate: u64,
    pub send_error: Option<String>,
    /// `None` means the transaction never mines.
    pub receipt: Option<TransactionReceipt>,
    pub native_balance: U256,
    /// When set, `call` blocks until the gate is notified.
    pub gate: Option<Arc<Notify>>,
    pub counters: CallCounters,
    pub sent_gas_limit: Mutex<Option<u64>>,
    pub sent_gas_price: Mutex<Option<U256>>,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self {
            account: Some(account()),
            chain_id: HELIOS_NETWORK_ID,
            allowance: U256::zero(),
            call_error: None,
            call_result: None,
            estimate_error: None,
            estimate: 100_000,
            send_error: None,
            receipt: Some(success_receipt()),
            native_balance: U256::exp10(24),
            gate: None,
            counters: CallCounters::default(),
            sent_gas_limit: Mutex::new(None),
            sent_gas_price: Mutex::new(None),
        }
    }
}

pub fn success_receipt() -> TransactionReceipt {
    TransactionReceipt {
        status: Some(1u64.into()),
        block_number: Some(42u64.into()),
        ..Default::default()
    }
}

pub fn reverted_receipt() -> TransactionReceipt {
    TransactionReceipt {
        status: Some(0u64.into()),
        block_number: Some(42u64.into()),
        ..Default::default()
    }
}

/// Deployment receipt carrying the factory log that names `token`.
pub fn deploy_receipt(token: Address) -> TransactionReceipt {
    let mut data = vec![0u8; 32];
    data[12..].copy_from_slice(token.as_bytes());
    TransactionReceipt {
        status: Some(1u64.into()),
        block_number: Some(42u64.into()),
        logs: vec![Log {
            address: *TOKEN_FACTORY_CONTRACT_ADDRESS,
            data: Bytes::from(data),
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn account(&self) -> Option<Address> {
        self.account
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn allowance(&self, _token: Address, _owner: Address, _spender: Address) -> Result<U256> {
        self.counters.allowance.fetch_add(1, Ordering::SeqCst);
        Ok(self.allowance)
    }

    async fn approve(
        &self,
        _token: Address,
        _spender: Address,
        _amount: U256,
        _gas_limit: u64,
        _gas_price: Option<U256>,
    ) -> Result<TransactionReceipt> {
        self.counters.approve.fetch_add(1, Ordering::SeqCst);
        Ok(success_receipt())
    }

    async fn call(&self, _from: Address, _call: &ContractCall) -> Result<Vec<u8>> {
        self.counters.call.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(message) = &self.call_error {
            bail!("{message}");
        }
        Ok(self.call_result.clone().unwrap_or_else(|| vec![0u8; 32]))
    }

    async fn estimate_gas(&self, _from: Address, _call: &ContractCall) -> Result<u64> {
        self.counters.estimate.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.estimate_error {
            bail!("{message}");
        }
        Ok(self.estimate)
    }

    async fn send_transaction(
        &self,
        _from: Address,
        _call: &ContractCall,
        gas_limit: u64,
        gas_price: Option<U256>,
    ) -> Result<H256> {
        self.counters.send.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.send_error {
            bail!("{message}");
        }
        *self.sent_gas_limit.lock() = Some(gas_limit);
        *self.sent_gas_price.lock() = gas_price;
        Ok(H256::from_low_u64_be(1))
    }

    async fn transaction_receipt(&self, _tx_hash: H256) -> Result<Option<TransactionReceipt>> {
        self.counters.receipt.fetch_add(1, Ordering::SeqCst);
        Ok(self.receipt.clone())
    }

    async fn native_balance(&self, _address: Address) -> Result<U256> {
        Ok(self.native_balance)
    }
}

/// Settings pointing at `url` through debug mode, so tests never touch the
/// real endpoint.
pub fn settings_for(url: &str) -> Arc<SettingsStore> {
    let settings = SettingsStore::in_memory();
    settings.set_debug_mode(true).unwrap();
    settings.set_rpc_url(url).unwrap();
    Arc::new(settings)
}

/// A closed local port: every RPC call fails fast, exercising fallbacks.
pub const DEAD_RPC: &str = "http://127.0.0.1:9";

pub fn harness(wallet: Arc<MockWallet>) -> (Orchestrator, Arc<RecentTokensStore>) {
    harness_with_rpc(wallet, DEAD_RPC)
}

pub fn harness_with_rpc(
    wallet: Arc<MockWallet>,
    rpc_url: &str,
) -> (Orchestrator, Arc<RecentTokensStore>) {
    let settings = settings_for(rpc_url);
    let recent = Arc::new(RecentTokensStore::in_memory());
    let orchestrator = Orchestrator::with_config(
        wallet,
        Arc::new(RpcClient::new(settings.clone())),
        settings,
        recent.clone(),
        FlowConfig {
            receipt_retry_limit: 3,
            receipt_retry_delay: Duration::from_millis(5),
            approve_gas_limit: 1_500_000,
        },
    );
    (orchestrator, recent)
}

/// JSON-RPC stub serving canned results and counting calls per method.
pub struct RpcStub {
    pub url: String,
    counts: Arc<Mutex<HashMap<String, usize>>>,
}

impl RpcStub {
    /// Methods absent from `responses` answer with a JSON-RPC error.
    pub async fn spawn(responses: HashMap<String, Value>) -> Self {
        let counts: Arc<Mutex<HashMap<String, usize>>> = Arc::default();
        let handler_counts = counts.clone();
        let responses = Arc::new(responses);

        let app = Router::new().route(
            "/",
            post(move |Json(request): Json<Value>| {
                let responses = responses.clone();
                let counts = handler_counts.clone();
                async move {
                    let method = request["method"].as_str().unwrap_or_default().to_string();
                    *counts.lock().entry(method.clone()).or_insert(0) += 1;
                    let id = request["id"].clone();
                    match responses.get(&method) {
                        Some(result) => Json(json!({
                            "jsonrpc": "2.0",
                            "id": id,
                            "result": result,
                        })),
                        None => Json(json!({
                            "jsonrpc": "2.0",
                            "id": id,
                            "error": {"code": -32601, "message": format!("{method} unavailable")},
                        })),
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { url, counts }
    }

    pub fn count(&self, method: &str) -> usize {
        self.counts.lock().get(method).copied().unwrap_or(0)
    }
}
