//! JSON-RPC client for the chain node.
//!
//! One POST per request, no batching. The endpoint is resolved through the
//! settings store on every call so a debug-mode toggle takes effect
//! immediately.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use ethers::types::Address;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::settings::SettingsStore;
use crate::types::{
    BlockHeader, ChainToken, Delegation, Proposal, TokenDetail, TransferTx, Validator,
    WhitelistedAsset,
};

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    // no serde(default) here: it would demand T: Default on deserialization
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[allow(dead_code)]
    #[serde(default)]
    code: i64,
    message: String,
}

pub struct RpcClient {
    http: reqwest::Client,
    settings: Arc<SettingsStore>,
}

impl RpcClient {
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    /// Absent results come back as `Ok(None)`, node-side errors surface the
    /// node's `error.message`, transport and non-2xx failures surface a
    /// generic "<method> call failed.".
    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<T>> {
        let url = self.settings.resolve_rpc_url();
        debug!(method, %url, "rpc request");

        let response = self
            .http
            .post(&url)
            .json(&json!({
                "jsonrpc": "2.0",
                "method": method,
                "params": params,
                "id": 1,
            }))
            .send()
            .await
            .with_context(|| format!("{method} call failed."))?;

        if !response.status().is_success() {
            bail!("{method} call failed.");
        }

        let envelope: RpcEnvelope<T> = response
            .json()
            .await
            .with_context(|| format!("{method} call failed."))?;

        if let Some(error) = envelope.error {
            bail!(error.message);
        }
        Ok(envelope.result)
    }

    pub async fn latest_block_number(&self) -> Result<Option<u64>> {
        let number: Option<String> = self.request("eth_blockNumber", json!([])).await?;
        number.map(|n| from_hex_u64(&n)).transpose()
    }

    /// `number` is a hex quantity or the "latest" tag.
    pub async fn block_by_number(&self, number: &str) -> Result<Option<BlockHeader>> {
        self.request("eth_getBlockByNumber", json!([number, false]))
            .await
    }

    /// Network base gas price in wei.
    pub async fn gas_price(&self) -> Result<Option<u128>> {
        let price: Option<String> = self.request("eth_gasPrice", json!([])).await?;
        price.map(|p| from_hex_u128(&p)).transpose()
    }

    /// Validators for one page, jailed validators sorted last.
    pub async fn validators_by_page_and_size(&self, page: u64, size: u64) -> Result<Vec<Validator>> {
        let mut validators: Vec<Validator> = self
            .request(
                "eth_getValidatorsByPageAndSize",
                json!([to_hex(page), to_hex(size)]),
            )
            .await?
            .unwrap_or_default();
        validators.sort_by_key(|v| v.jailed);
        Ok(validators)
    }

    pub async fn proposals_by_page_and_size(&self, page: u64, size: u64) -> Result<Vec<Proposal>> {
        Ok(self
            .request(
                "eth_getProposalsByPageAndSize",
                json!([to_hex(page), to_hex(size)]),
            )
            .await?
            .unwrap_or_default())
    }

    pub async fn proposal_total_count(&self) -> Result<u64> {
        let count: Option<String> = self.request("eth_getProposalsCount", json!([])).await?;
        count.map(|c| from_hex_u64(&c)).transpose().map(Option::unwrap_or_default)
    }

    pub async fn proposal(&self, id: u64) -> Result<Option<Proposal>> {
        self.request("eth_getProposal", json!([to_hex(id)])).await
    }

    pub async fn whitelisted_assets(&self) -> Result<Vec<WhitelistedAsset>> {
        Ok(self
            .request("eth_getAllWhitelistedAssets", json!([]))
            .await?
            .unwrap_or_default())
    }

    pub async fn delegations(&self, address: Address) -> Result<Vec<Delegation>> {
        Ok(self
            .request("eth_getDelegations", json!([format!("{address:#x}")]))
            .await?
            .unwrap_or_default())
    }

    pub async fn tokens_by_chain_and_page_and_size(
        &self,
        chain_id: u64,
        page: u64,
        size: u64,
    ) -> Result<Vec<ChainToken>> {
        Ok(self
            .request(
                "eth_getTokensByChainIdAndPageAndSize",
                json!([to_hex(chain_id), to_hex(page), to_hex(size)]),
            )
            .await?
            .unwrap_or_default())
    }

    pub async fn token_detail(&self, address: Address) -> Result<Option<TokenDetail>> {
        self.request("eth_getTokenDetails", json!([format!("{address:#x}")]))
            .await
    }

    pub async fn account_transfer_txs(
        &self,
        address: Address,
        page: u64,
        size: u64,
    ) -> Result<Vec<TransferTx>> {
        Ok(self
            .request(
                "eth_getHyperionAccountTransferTxsByPageAndSize",
                json!([format!("{address:#x}"), to_hex(page), to_hex(size)]),
            )
            .await?
            .unwrap_or_default())
    }

    pub async fn all_transfer_txs(&self) -> Result<Vec<TransferTx>> {
        Ok(self
            .request("eth_getAllHyperionTransferTxs", json!([]))
            .await?
            .unwrap_or_default())
    }
}

pub fn to_hex(value: u64) -> String {
    format!("0x{value:x}")
}

pub fn from_hex_u64(value: &str) -> Result<u64> {
    u64::from_str_radix(value.trim_start_matches("0x"), 16)
        .map_err(|_| anyhow!("invalid hex quantity: {value}"))
}

pub fn from_hex_u128(value: &str) -> Result<u128> {
    u128::from_str_radix(value.trim_start_matches("0x"), 16)
        .map_err(|_| anyhow!("invalid hex quantity: {value}"))
}
