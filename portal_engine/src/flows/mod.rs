//! Flow planning: turns a user intent into the transaction plan the
//! orchestrator drives. All local validation happens here, before any
//! network call.

mod bridge;
mod governance;
mod staking;
mod token_factory;
mod wrapper;

pub use token_factory::{extract_token_address, DeployPlan, TokenParams};

use ethers::types::{Address, U256};
use ethers::utils::parse_units;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FlowError;
use crate::wallet::ContractCall;

/// One user-initiated write operation.
#[derive(Debug, Clone)]
pub enum TransactionIntent {
    /// Bridge assets from Helios out to another chain.
    BridgeOut {
        dest_chain_id: u64,
        receiver: String,
        token: String,
        amount: String,
        fees: String,
        decimals: u8,
    },
    /// Bridge assets from the active external chain into Helios.
    BridgeIn {
        receiver: String,
        token: String,
        amount: String,
        decimals: u8,
    },
    Wrap {
        amount: String,
    },
    Unwrap {
        amount: String,
    },
    Delegate {
        validator: String,
        amount: String,
        symbol: String,
        decimals: u8,
    },
    Undelegate {
        validator: String,
        amount: String,
        symbol: String,
        decimals: u8,
    },
    Vote {
        proposal_id: u64,
        choice: VoteChoice,
        metadata: String,
    },
    CreateProposal {
        title: String,
        description: String,
        msg: String,
        /// Deposit in wei, decimal string.
        initial_deposit: String,
    },
    DeployToken(TokenParams),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChoice {
    Yes,
    Abstain,
    No,
    NoWithVeto,
}

impl VoteChoice {
    pub fn option_value(self) -> u8 {
        match self {
            VoteChoice::Yes => 1,
            VoteChoice::Abstain => 2,
            VoteChoice::No => 3,
            VoteChoice::NoWithVeto => 4,
        }
    }
}

/// Caches and read models a confirmed flow invalidates. The caller re-fetches
/// whatever it holds for these scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataScope {
    Balances,
    Delegations,
    WhitelistedAssets,
    Proposals,
    BridgeHistory,
    RecentTokens,
}

/// Wallet facts the planner needs, resolved by the orchestrator up front.
#[derive(Debug, Clone, Copy)]
pub struct FlowContext {
    pub account: Address,
    pub chain_id: u64,
}

#[derive(Debug, Clone)]
pub struct ApprovalPlan {
    pub token: Address,
    pub spender: Address,
    pub required: U256,
}

#[derive(Debug, Clone)]
pub enum SuccessMessage {
    Static(String),
    /// `{block}` is replaced with the receipt's block number.
    WithBlock(String),
}

impl SuccessMessage {
    pub fn render(&self, block_number: u64) -> String {
        match self {
            SuccessMessage::Static(message) => message.clone(),
            SuccessMessage::WithBlock(template) => {
                template.replace("{block}", &block_number.to_string())
            }
        }
    }
}

/// Everything the orchestrator needs to drive one flow to completion.
#[derive(Debug, Clone)]
pub struct TxPlan {
    pub call: ContractCall,
    pub approval: Option<ApprovalPlan>,
    /// Fallback gas estimate when estimation fails for non-validation
    /// reasons; the usual 20% buffer is applied on top.
    pub default_gas_limit: u64,
    /// Fixed gas price for flows that pin one, otherwise the wallet decides.
    pub fixed_gas_price: Option<U256>,
    pub simulate_label: String,
    pub submit_label: String,
    pub success: SuccessMessage,
    /// Deploy-style flows keep going past an unclassified simulation failure
    /// instead of aborting; known fatal revert reasons still abort.
    pub tolerate_simulation_failure: bool,
    pub invalidates: Vec<DataScope>,
    pub deploy: Option<token_factory::DeployPlan>,
}

pub(crate) fn plan(intent: &TransactionIntent, ctx: &FlowContext) -> Result<TxPlan, FlowError> {
    match intent {
        TransactionIntent::BridgeOut {
            dest_chain_id,
            receiver,
            token,
            amount,
            fees,
            decimals,
        } => bridge::plan_bridge_out(*dest_chain_id, receiver, token, amount, fees, *decimals),
        TransactionIntent::BridgeIn {
            receiver,
            token,
            amount,
            decimals,
        } => bridge::plan_bridge_in(ctx, receiver, token, amount, *decimals),
        TransactionIntent::Wrap { amount } => wrapper::plan_wrap(ctx, amount),
        TransactionIntent::Unwrap { amount } => wrapper::plan_unwrap(ctx, amount),
        TransactionIntent::Delegate {
            validator,
            amount,
            symbol,
            decimals,
        } => staking::plan_staking(ctx, validator, amount, symbol, *decimals, false),
        TransactionIntent::Undelegate {
            validator,
            amount,
            symbol,
            decimals,
        } => staking::plan_staking(ctx, validator, amount, symbol, *decimals, true),
        TransactionIntent::Vote {
            proposal_id,
            choice,
            metadata,
        } => governance::plan_vote(ctx, *proposal_id, *choice, metadata),
        TransactionIntent::CreateProposal {
            title,
            description,
            msg,
            initial_deposit,
        } => governance::plan_create_proposal(title, description, msg, initial_deposit),
        TransactionIntent::DeployToken(params) => token_factory::plan_deploy_token(params),
    }
}

static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("static regex"));
static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("static regex"));

pub(crate) fn parse_address(label: &str, value: &str) -> Result<Address, FlowError> {
    if !ADDRESS_RE.is_match(value) {
        return Err(FlowError::Validation(format!("Invalid {label} address")));
    }
    value
        .parse()
        .map_err(|_| FlowError::Validation(format!("Invalid {label} address")))
}

/// Scales a positive decimal amount string into the smallest unit.
pub(crate) fn parse_amount(label: &str, value: &str, decimals: u8) -> Result<U256, FlowError> {
    let invalid = || FlowError::Validation(format!("{label} must be a valid number greater than 0"));
    if !AMOUNT_RE.is_match(value) {
        return Err(invalid());
    }
    let wei: U256 = parse_units(value, u32::from(decimals))
        .map_err(|_| invalid())?
        .into();
    if wei.is_zero() {
        return Err(invalid());
    }
    Ok(wei)
}

/// Like `parse_amount` but zero is allowed (bridge fees may be waived).
pub(crate) fn parse_optional_amount(
    label: &str,
    value: &str,
    decimals: u8,
) -> Result<U256, FlowError> {
    let invalid = || FlowError::Validation(format!("{label} must be a valid number"));
    if !AMOUNT_RE.is_match(value) {
        return Err(invalid());
    }
    let wei: U256 = parse_units(value, u32::from(decimals))
        .map_err(|_| invalid())?
        .into();
    Ok(wei)
}
