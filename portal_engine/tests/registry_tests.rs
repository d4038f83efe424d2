mod common;

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use ethers::types::{Address, U256};
use serde_json::{json, Value};

use common::*;
use portal_engine::chain_config::HELIOS_NETWORK_ID;
use portal_engine::price::NoopPriceOracle;
use portal_engine::{RpcClient, TokenRegistry};

const TOKEN: &str = "0x2222222222222222222222222222222222222222";

fn token_detail_response() -> Value {
    json!({
        "metadata": {
            "name": "My Token",
            "symbol": "MTK",
            "decimals": 18,
            "base": "mtk",
            "chainsMetadatas": [
                {"chainId": 11155111, "isOriginated": true},
                {"chainId": HELIOS_NETWORK_ID, "isOriginated": false},
            ],
        },
        "holdersCount": 12,
        "total_supply": "1000000",
    })
}

fn registry_for(url: &str) -> TokenRegistry {
    TokenRegistry::new(
        Arc::new(RpcClient::new(settings_for(url))),
        Arc::new(NoopPriceOracle),
    )
}

#[tokio::test]
async fn test_detail_fields_and_origin_chain() {
    let stub = RpcStub::spawn(HashMap::from([(
        "eth_getTokenDetails".to_string(),
        token_detail_response(),
    )]))
    .await;
    let registry = registry_for(&stub.url);

    let record = registry
        .token_by_address(TOKEN.parse().unwrap(), HELIOS_NETWORK_ID)
        .await
        .unwrap()
        .expect("token known to the node");

    assert_eq!(record.symbol, "MTK");
    assert_eq!(record.denom, "mtk");
    assert_eq!(record.holders_count, 12);
    assert_eq!(record.total_supply, "1000000");
    assert_eq!(record.origin_chain_id, 11155111);
    assert_eq!(record.balance, None);
}

#[tokio::test]
async fn test_origin_defaults_to_local_network() {
    let mut response = token_detail_response();
    response["metadata"]["chainsMetadatas"] = json!([]);
    let stub = RpcStub::spawn(HashMap::from([(
        "eth_getTokenDetails".to_string(),
        response,
    )]))
    .await;
    let registry = registry_for(&stub.url);

    let record = registry
        .token_by_address(TOKEN.parse().unwrap(), HELIOS_NETWORK_ID)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.origin_chain_id, HELIOS_NETWORK_ID);
}

#[tokio::test]
async fn test_unknown_token_is_none() {
    let stub = RpcStub::spawn(HashMap::from([(
        "eth_getTokenDetails".to_string(),
        Value::Null,
    )]))
    .await;
    let registry = registry_for(&stub.url);

    let record = registry
        .token_by_address(TOKEN.parse().unwrap(), HELIOS_NETWORK_ID)
        .await
        .unwrap();
    assert!(record.is_none());
}

#[tokio::test]
async fn test_second_lookup_served_from_cache() {
    let stub = RpcStub::spawn(HashMap::from([(
        "eth_getTokenDetails".to_string(),
        token_detail_response(),
    )]))
    .await;
    let registry = registry_for(&stub.url);
    let address: Address = TOKEN.parse().unwrap();

    registry
        .token_by_address(address, HELIOS_NETWORK_ID)
        .await
        .unwrap();
    registry
        .token_by_address(address, HELIOS_NETWORK_ID)
        .await
        .unwrap();

    assert_eq!(stub.count("eth_getTokenDetails"), 1);
}

#[tokio::test]
async fn test_concurrent_lookups_collapse_into_one_fetch() {
    let stub = RpcStub::spawn(HashMap::from([(
        "eth_getTokenDetails".to_string(),
        token_detail_response(),
    )]))
    .await;
    let registry = Arc::new(registry_for(&stub.url));
    let address: Address = TOKEN.parse().unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            registry.token_by_address(address, HELIOS_NETWORK_ID).await
        }));
    }
    for handle in handles {
        let record = handle.await.unwrap().unwrap().unwrap();
        assert_eq!(record.symbol, "MTK");
    }

    assert_eq!(stub.count("eth_getTokenDetails"), 1);
}

#[tokio::test]
async fn test_concurrent_lookups_share_the_failure() {
    // stub knows no methods, every request answers with an error
    let stub = RpcStub::spawn(HashMap::new()).await;
    let registry = Arc::new(registry_for(&stub.url));
    let address: Address = TOKEN.parse().unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            registry.token_by_address(address, HELIOS_NETWORK_ID).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_err());
    }

    assert_eq!(stub.count("eth_getTokenDetails"), 1);
}

#[tokio::test]
async fn test_cache_hit_refreshes_balance_without_refetching() {
    let stub = RpcStub::spawn(HashMap::from([(
        "eth_getTokenDetails".to_string(),
        token_detail_response(),
    )]))
    .await;

    let mut raw = [0u8; 32];
    (U256::from(5u64) * U256::exp10(18)).to_big_endian(&mut raw);
    let wallet = Arc::new(MockWallet {
        call_result: Some(raw.to_vec()),
        ..Default::default()
    });

    let registry = TokenRegistry::new(
        Arc::new(RpcClient::new(settings_for(&stub.url))),
        Arc::new(NoopPriceOracle),
    )
    .with_wallet(wallet.clone());
    let address: Address = TOKEN.parse().unwrap();

    registry
        .token_by_address(address, HELIOS_NETWORK_ID)
        .await
        .unwrap();
    // served from cache, but the balance is re-read each time
    let record = registry
        .token_by_address(address, HELIOS_NETWORK_ID)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(record.balance, Some(5.0));
    assert_eq!(stub.count("eth_getTokenDetails"), 1);
    assert_eq!(wallet.counters.call.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_wallet_balance_hydrated_from_contract_call() {
    let stub = RpcStub::spawn(HashMap::from([(
        "eth_getTokenDetails".to_string(),
        token_detail_response(),
    )]))
    .await;

    let mut raw = [0u8; 32];
    (U256::from(2u64) * U256::exp10(18)).to_big_endian(&mut raw);
    let wallet = Arc::new(MockWallet {
        call_result: Some(raw.to_vec()),
        ..Default::default()
    });

    let registry = TokenRegistry::new(
        Arc::new(RpcClient::new(settings_for(&stub.url))),
        Arc::new(NoopPriceOracle),
    )
    .with_wallet(wallet.clone());

    let record = registry
        .token_by_address(TOKEN.parse().unwrap(), HELIOS_NETWORK_ID)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(record.balance, Some(2.0));
    assert_eq!(wallet.counters.call.load(Ordering::SeqCst), 1);
}
