//! Token deployment through the token factory precompile.

use ethers::abi::Token;
use ethers::types::{Address, TransactionReceipt, H256, U256};
use ethers::utils::parse_units;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::chain_config::TOKEN_FACTORY_CONTRACT_ADDRESS;
use crate::error::FlowError;
use crate::wallet::ContractCall;

use super::{DataScope, SuccessMessage, TxPlan};

static SYMBOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("static regex"));
static DENOM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9_]+$").expect("static regex"));

/// keccak256("Transfer(address,address,uint256)")
static TRANSFER_TOPIC: Lazy<H256> = Lazy::new(|| {
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        .parse()
        .expect("static topic")
});

/// User-supplied parameters of a new ERC-20.
#[derive(Debug, Clone, Default)]
pub struct TokenParams {
    pub name: String,
    pub symbol: String,
    pub denom: String,
    /// Whole-token count, decimal string.
    pub total_supply: String,
    /// Decimal string, 0 to 18.
    pub decimals: String,
    pub logo_base64: Option<String>,
}

const MAX_LOGO_BYTES: usize = 100_000;

/// What the orchestrator records once the deployment confirms.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub name: String,
    pub symbol: String,
    pub denom: String,
    pub total_supply: String,
    pub decimals: u8,
    pub logo_base64: String,
}

pub(super) fn plan_deploy_token(params: &TokenParams) -> Result<TxPlan, FlowError> {
    let name = params.name.trim().to_string();
    let symbol = params.symbol.trim().to_string();
    let denom = params.denom.trim().to_string();

    if name.is_empty() {
        return Err(FlowError::Validation("Token name is required".to_string()));
    }
    if symbol.is_empty() {
        return Err(FlowError::Validation("Token symbol is required".to_string()));
    }
    if !SYMBOL_RE.is_match(&symbol) {
        return Err(FlowError::Validation(
            "Token symbol must contain only letters and numbers".to_string(),
        ));
    }
    if denom.is_empty() {
        return Err(FlowError::Validation(
            "Token denomination is required".to_string(),
        ));
    }
    if !DENOM_RE.is_match(&denom) {
        return Err(FlowError::Validation(
            "Denomination must contain only lowercase letters, numbers, and underscores"
                .to_string(),
        ));
    }
    if denom.len() < 3 {
        return Err(FlowError::Validation(
            "Denomination should be at least 3 characters long to ensure uniqueness".to_string(),
        ));
    }

    let decimals: u8 = match params.decimals.trim().parse() {
        Ok(d) if d <= 18 => d,
        _ => {
            return Err(FlowError::Validation(
                "Decimals must be an integer between 0 and 18".to_string(),
            ))
        }
    };

    let supply = params.total_supply.trim();
    if supply.is_empty() || supply.parse::<f64>().map(|v| v <= 0.0).unwrap_or(true) {
        return Err(FlowError::Validation(
            "Total supply must be a valid number greater than 0".to_string(),
        ));
    }
    let total_supply: U256 = parse_units(supply, u32::from(decimals))
        .map_err(|_| {
            FlowError::Validation("Total supply value is too large or invalid".to_string())
        })?
        .into();

    let logo = params.logo_base64.clone().unwrap_or_default();
    if logo.len() > MAX_LOGO_BYTES {
        return Err(FlowError::Validation(
            "Logo image is too large. Please use a smaller image".to_string(),
        ));
    }

    let call = ContractCall::new(*TOKEN_FACTORY_CONTRACT_ADDRESS, "createErc20")
        .arg(Token::String(name.clone()))
        .arg(Token::String(symbol.clone()))
        .arg(Token::String(denom.clone()))
        .arg(Token::Uint(total_supply))
        .arg(Token::Uint(u64::from(decimals).into()))
        .arg(Token::String(logo.clone()));

    Ok(TxPlan {
        call,
        approval: None,
        default_gas_limit: 800_000,
        fixed_gas_price: None,
        simulate_label: "Simulating transaction...".to_string(),
        submit_label: "Waiting for wallet confirmation...".to_string(),
        success: SuccessMessage::Static("Token deployed successfully!".to_string()),
        tolerate_simulation_failure: true,
        invalidates: vec![DataScope::Balances, DataScope::RecentTokens],
        deploy: Some(DeployPlan {
            name,
            symbol,
            denom,
            total_supply: supply.to_string(),
            decimals,
            logo_base64: logo,
        }),
    })
}

/// Pulls the freshly deployed token's address out of the deployment receipt.
///
/// The factory precompile emits a log whose data ends with the new contract
/// address; if that log is missing, fall back to the mint Transfer from the
/// zero address, whose emitting contract is the token itself.
pub fn extract_token_address(receipt: &TransactionReceipt) -> Option<Address> {
    for log in &receipt.logs {
        if log.address == *TOKEN_FACTORY_CONTRACT_ADDRESS && log.data.len() >= 20 {
            let tail = &log.data[log.data.len() - 20..];
            return Some(Address::from_slice(tail));
        }
    }
    for log in &receipt.logs {
        if log.topics.len() == 3
            && log.topics[0] == *TRANSFER_TOPIC
            && log.topics[1] == H256::zero()
        {
            return Some(log.address);
        }
    }
    None
}
