//! Static chain and contract configuration.

use ethers::types::Address;
use once_cell::sync::Lazy;

pub const HELIOS_NETWORK_ID: u64 = 42000;

pub const DEFAULT_RPC_URL: &str = "https://testnet1.helioschainlabs.org";
pub const CDN_URL: &str = "https://testnet1-cdn.helioschainlabs.org";
pub const EXPLORER_URL: &str = "https://explorer.helioschainlabs.org";

/// Native HLS token, the only asset whose bridge fees are paid from the same
/// allowance as the bridged amount.
pub static HELIOS_TOKEN_ADDRESS: Lazy<Address> = Lazy::new(|| {
    "0xD4949664cD82660AaE99bEdc034a0deA8A0bd517"
        .parse()
        .expect("static address")
});

pub static BRIDGE_CONTRACT_ADDRESS: Lazy<Address> = Lazy::new(|| {
    "0x0000000000000000000000000000000000000900"
        .parse()
        .expect("static address")
});

pub static DELEGATE_CONTRACT_ADDRESS: Lazy<Address> = Lazy::new(|| {
    "0x0000000000000000000000000000000000000800"
        .parse()
        .expect("static address")
});

pub static GOVERNANCE_CONTRACT_ADDRESS: Lazy<Address> = Lazy::new(|| {
    "0x0000000000000000000000000000000000000805"
        .parse()
        .expect("static address")
});

pub static TOKEN_FACTORY_CONTRACT_ADDRESS: Lazy<Address> = Lazy::new(|| {
    "0x0000000000000000000000000000000000000806"
        .parse()
        .expect("static address")
});

/// Per-chain settings for the bridge and wrapper flows.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: &'static str,
    pub token: &'static str,
    pub wrapped_token: &'static str,
    pub decimals: u8,
    pub explorer_url: &'static str,
    /// Wrapped-native contract, absent on chains where wrapping is not offered.
    pub wrapper_contract: Option<&'static str>,
    /// Bridge counterpart contract on the external chain.
    pub hyperion_contract: Option<&'static str>,
}

static CHAIN_CONFIGS: &[ChainConfig] = &[
    ChainConfig {
        chain_id: HELIOS_NETWORK_ID,
        name: "Helios",
        token: "HLS",
        wrapped_token: "WHLS",
        decimals: 18,
        explorer_url: EXPLORER_URL,
        wrapper_contract: Some("0x9c5c5bcfB7F00E26112Ff9fDcA7e4867e3fb9377"),
        hyperion_contract: None,
    },
    ChainConfig {
        chain_id: 11155111,
        name: "Ethereum Sepolia",
        token: "ETH",
        wrapped_token: "WETH",
        decimals: 18,
        explorer_url: "https://sepolia.etherscan.io",
        wrapper_contract: Some("0x7b79995e5f793A07Bc00c21412e50Ecae098E7f9"),
        hyperion_contract: Some("0x55a4A5a09692Ff1fEd2bcaA9696e5bA17e45ba40"),
    },
    ChainConfig {
        chain_id: 97,
        name: "BNB Testnet",
        token: "BNB",
        wrapped_token: "WBNB",
        decimals: 18,
        explorer_url: "https://testnet.bscscan.com",
        wrapper_contract: Some("0xae13d989daC2f0dEbFf460aC112a837C89BAa7cd"),
        hyperion_contract: Some("0x1d1479C185d32EB90533a08b36B3CFa5F84A0E6B"),
    },
    ChainConfig {
        chain_id: 80002,
        name: "Polygon Amoy",
        token: "POL",
        wrapped_token: "WPOL",
        decimals: 18,
        explorer_url: "https://amoy.polygonscan.com",
        wrapper_contract: None,
        hyperion_contract: Some("0x8aE32e52BB71871d14D29B03653b07a46c45DF7b"),
    },
];

pub fn chain_config(chain_id: u64) -> Option<&'static ChainConfig> {
    CHAIN_CONFIGS.iter().find(|c| c.chain_id == chain_id)
}

pub fn is_wrappable_chain(chain_id: u64) -> bool {
    chain_config(chain_id).is_some_and(|c| c.wrapper_contract.is_some())
}

impl ChainConfig {
    pub fn wrapper_contract_address(&self) -> Option<Address> {
        self.wrapper_contract.and_then(|s| s.parse().ok())
    }

    pub fn hyperion_contract_address(&self) -> Option<Address> {
        self.hyperion_contract.and_then(|s| s.parse().ok())
    }

    pub fn explorer_tx_link(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }
}
