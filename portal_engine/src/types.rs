//! Shapes read from the chain RPC boundary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    /// Hex quantity, e.g. "0x1b4".
    pub number: String,
    /// Hex quantity, seconds.
    pub timestamp: String,
    #[serde(default)]
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    pub address: String,
    #[serde(default)]
    pub moniker: String,
    #[serde(default)]
    pub jailed: bool,
    #[serde(default)]
    pub shares: Option<String>,
    #[serde(default)]
    pub commission: Option<String>,
    #[serde(default)]
    pub apr: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub proposer: String,
    #[serde(default)]
    pub submit_time: Option<String>,
    #[serde(default)]
    pub voting_end_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegation {
    pub validator_address: String,
    #[serde(default)]
    pub shares: String,
    #[serde(default)]
    pub rewards: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistedAsset {
    pub denom: String,
    #[serde(default)]
    pub base_weight: u64,
    pub chain_id: String,
    #[serde(default)]
    pub chain_name: String,
    pub decimals: u32,
    pub symbol: String,
    #[serde(default)]
    pub contract_address: String,
    #[serde(default)]
    pub total_shares: String,
    #[serde(default)]
    pub network_percentage_securisation: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainToken {
    pub address: String,
    pub symbol: String,
    #[serde(default)]
    pub decimals: u8,
    #[serde(default)]
    pub denom: Option<String>,
}

/// Detail payload of `eth_getTokenDetails`. Note the node returns
/// `total_supply` in snake case while everything else is camel case.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetail {
    pub metadata: TokenMetadata,
    #[serde(default)]
    pub holders_count: u64,
    #[serde(default, rename = "total_supply")]
    pub total_supply: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Base denomination in the chain's native accounting system.
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub chains_metadatas: Vec<ChainMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainMetadata {
    pub chain_id: u64,
    #[serde(default)]
    pub is_originated: bool,
}

/// One cross-chain transfer as reported by the bridge history endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferTx {
    pub direction: String,
    pub status: String,
    pub chain_id: u64,
    #[serde(default)]
    pub sent_token: Option<TransferTokenInfo>,
    #[serde(default)]
    pub received_token: Option<TransferTokenInfo>,
    #[serde(default)]
    pub proof: Option<TransferProof>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferTokenInfo {
    #[serde(default)]
    pub contract: Option<String>,
    #[serde(default)]
    pub amount: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferProof {
    #[serde(default)]
    pub hashs: Option<String>,
}
