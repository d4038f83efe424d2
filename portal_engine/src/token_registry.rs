//! Token registry: cached, deduplicated token detail lookups.
//!
//! Concurrent lookups for the same token collapse into one network fetch;
//! followers wait on the leader's result instead of issuing their own
//! request. Cache entries live until `clear` is called.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use ethers::abi::Token;
use ethers::types::{Address, U256};
use ethers::utils::format_units;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::chain_config::HELIOS_NETWORK_ID;
use crate::price::PriceOracle;
use crate::rpc_client::RpcClient;
use crate::wallet::{ContractCall, WalletProvider};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub address: String,
    pub chain_id: u64,
    pub symbol: String,
    pub name: String,
    pub denom: String,
    pub decimals: u8,
    pub logo: String,
    pub price_usd: f64,
    pub holders_count: u64,
    pub total_supply: String,
    /// Connected account's balance in whole tokens, `None` when no wallet is
    /// attached or the lookup failed.
    pub balance: Option<f64>,
    /// Chain the token originates from, the local network when no chain
    /// metadata claims origination.
    pub origin_chain_id: u64,
}

type CacheKey = (String, u64);

#[derive(Clone)]
enum FetchOutcome {
    Found(TokenRecord),
    Missing,
    Failed(String),
}

pub struct TokenRegistry {
    rpc: Arc<RpcClient>,
    price: Arc<dyn PriceOracle>,
    wallet: Option<Arc<dyn WalletProvider>>,
    cache: RwLock<HashMap<CacheKey, TokenRecord>>,
    in_flight: Mutex<HashMap<CacheKey, watch::Receiver<Option<FetchOutcome>>>>,
}

impl TokenRegistry {
    pub fn new(rpc: Arc<RpcClient>, price: Arc<dyn PriceOracle>) -> Self {
        Self {
            rpc,
            price,
            wallet: None,
            cache: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Attaches a wallet so records carry the connected account's balance.
    pub fn with_wallet(mut self, wallet: Arc<dyn WalletProvider>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    /// `Ok(None)` means the node does not know this token.
    pub async fn token_by_address(
        &self,
        address: Address,
        chain_id: u64,
    ) -> Result<Option<TokenRecord>> {
        let key = (format!("{address:#x}"), chain_id);

        // Clone out of the read guard before awaiting anything; holding it
        // across the refresh would block the write-back below.
        let cached = self.cache.read().get(&key).cloned();
        if let Some(mut record) = cached {
            // Metadata is stable, only the balance goes stale.
            self.refresh_balance(&mut record, address).await;
            self.cache.write().insert(key, record.clone());
            return Ok(Some(record));
        }

        enum Role {
            Leader(watch::Sender<Option<FetchOutcome>>),
            Follower(watch::Receiver<Option<FetchOutcome>>),
        }

        let role = {
            let mut in_flight = self.in_flight.lock();
            match in_flight.get(&key) {
                Some(rx) => Role::Follower(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    in_flight.insert(key.clone(), rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Follower(mut rx) => loop {
                let outcome = rx.borrow().clone();
                if let Some(outcome) = outcome {
                    return match outcome {
                        FetchOutcome::Found(record) => Ok(Some(record)),
                        FetchOutcome::Missing => Ok(None),
                        FetchOutcome::Failed(message) => Err(anyhow!(message)),
                    };
                }
                if rx.changed().await.is_err() {
                    bail!("token lookup aborted");
                }
            },
            Role::Leader(tx) => {
                let fetched = self.fetch(address, chain_id).await;
                // Drop the slot before publishing so a retry after failure
                // starts a fresh fetch instead of joining a finished one.
                self.in_flight.lock().remove(&key);
                match fetched {
                    Ok(Some(record)) => {
                        self.cache.write().insert(key, record.clone());
                        let _ = tx.send(Some(FetchOutcome::Found(record.clone())));
                        Ok(Some(record))
                    }
                    Ok(None) => {
                        let _ = tx.send(Some(FetchOutcome::Missing));
                        Ok(None)
                    }
                    Err(err) => {
                        warn!("token detail fetch failed for {address:#x}: {err:#}");
                        let _ = tx.send(Some(FetchOutcome::Failed(format!("{err:#}"))));
                        Err(err)
                    }
                }
            }
        }
    }

    /// Cache-only lookup, case-insensitive on the symbol.
    pub fn token_by_symbol(&self, symbol: &str, chain_id: u64) -> Option<TokenRecord> {
        self.cache
            .read()
            .values()
            .find(|r| r.chain_id == chain_id && r.symbol.eq_ignore_ascii_case(symbol))
            .cloned()
    }

    /// One page of the chain's token list, each entry hydrated through the
    /// cached detail path.
    pub async fn tokens_by_chain(
        &self,
        chain_id: u64,
        page: u64,
        size: u64,
    ) -> Result<Vec<TokenRecord>> {
        let listed = self
            .rpc
            .tokens_by_chain_and_page_and_size(chain_id, page, size)
            .await?;
        let mut records = Vec::with_capacity(listed.len());
        for token in listed {
            let Ok(address) = token.address.parse::<Address>() else {
                debug!("skipping token with unparseable address {}", token.address);
                continue;
            };
            if let Some(record) = self.token_by_address(address, chain_id).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Seeds the cache directly, for tools and tests.
    pub fn prime(&self, record: TokenRecord) {
        let key = (record.address.to_lowercase(), record.chain_id);
        self.cache.write().insert(key, record);
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }

    async fn fetch(&self, address: Address, chain_id: u64) -> Result<Option<TokenRecord>> {
        let Some(detail) = self.rpc.token_detail(address).await? else {
            return Ok(None);
        };

        let symbol_key = detail.metadata.symbol.to_lowercase();
        let market = self.price.fetch(std::slice::from_ref(&symbol_key)).await;
        let market = market.get(&symbol_key);

        let origin_chain_id = detail
            .metadata
            .chains_metadatas
            .iter()
            .find(|m| m.is_originated)
            .map(|m| m.chain_id)
            .unwrap_or(HELIOS_NETWORK_ID);

        let mut record = TokenRecord {
            address: format!("{address:#x}"),
            chain_id,
            symbol: detail.metadata.symbol,
            name: detail.metadata.name,
            denom: detail.metadata.base,
            decimals: detail.metadata.decimals,
            logo: market.map(|m| m.logo.clone()).unwrap_or_default(),
            price_usd: market.map(|m| m.price).unwrap_or_default(),
            holders_count: detail.holders_count,
            total_supply: detail.total_supply,
            balance: None,
            origin_chain_id,
        };
        self.refresh_balance(&mut record, address).await;
        Ok(Some(record))
    }

    async fn refresh_balance(&self, record: &mut TokenRecord, address: Address) {
        let Some(wallet) = &self.wallet else {
            return;
        };
        let Some(account) = wallet.account() else {
            return;
        };
        let call = ContractCall::new(address, "balanceOf").arg(Token::Address(account));
        match wallet.call(account, &call).await {
            Ok(data) if data.len() >= 32 => {
                let raw = U256::from_big_endian(&data[data.len() - 32..]);
                if let Ok(units) = format_units(raw, u32::from(record.decimals)) {
                    record.balance = units.parse().ok();
                }
            }
            Ok(_) => {}
            Err(err) => debug!("balance lookup failed for {address:#x}: {err:#}"),
        }
    }
}
