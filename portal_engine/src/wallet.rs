//! Wallet/provider capability boundary.
//!
//! The engine never encodes calldata or signs anything itself: contract calls
//! travel as method name plus ABI tokens, and the connected provider owns
//! encoding, signing and submission.

use anyhow::Result;
use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::{Address, TransactionReceipt, H256, U256};

/// One contract interaction, read-only or state-changing depending on which
/// provider method it is handed to.
#[derive(Debug, Clone)]
pub struct ContractCall {
    pub contract: Address,
    pub method: String,
    pub args: Vec<Token>,
    /// Native value attached to the call, zero for plain calls.
    pub value: U256,
}

impl ContractCall {
    pub fn new(contract: Address, method: impl Into<String>) -> Self {
        Self {
            contract,
            method: method.into(),
            args: Vec::new(),
            value: U256::zero(),
        }
    }

    pub fn arg(mut self, token: Token) -> Self {
        self.args.push(token);
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Currently connected account, if any. Connector-cached, no network.
    fn account(&self) -> Option<Address>;

    /// Active chain of the connected wallet. Connector-cached, no network.
    fn chain_id(&self) -> u64;

    /// ERC-20 allowance granted by `owner` to `spender`.
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    /// Sends an approve transaction and waits for it to be mined.
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        gas_limit: u64,
        gas_price: Option<U256>,
    ) -> Result<TransactionReceipt>;

    /// Read-only execution of `call` from `from` (the simulation step).
    async fn call(&self, from: Address, call: &ContractCall) -> Result<Vec<u8>>;

    /// Gas units the node expects `call` to consume.
    async fn estimate_gas(&self, from: Address, call: &ContractCall) -> Result<u64>;

    /// Signs and submits, returning the transaction hash without waiting for
    /// inclusion.
    async fn send_transaction(
        &self,
        from: Address,
        call: &ContractCall,
        gas_limit: u64,
        gas_price: Option<U256>,
    ) -> Result<H256>;

    /// Receipt lookup, `None` while the transaction is not yet mined.
    async fn transaction_receipt(&self, tx_hash: H256) -> Result<Option<TransactionReceipt>>;

    /// Native currency balance, checked before value-carrying submissions.
    async fn native_balance(&self, address: Address) -> Result<U256>;
}
