//! Governance flows: voting and proposal creation.

use ethers::abi::Token;
use ethers::types::U256;
use ethers::utils::parse_units;

use crate::chain_config::GOVERNANCE_CONTRACT_ADDRESS;
use crate::error::FlowError;
use crate::wallet::ContractCall;

use super::{DataScope, FlowContext, SuccessMessage, TxPlan, VoteChoice};

pub(super) fn plan_vote(
    ctx: &FlowContext,
    proposal_id: u64,
    choice: VoteChoice,
    metadata: &str,
) -> Result<TxPlan, FlowError> {
    if proposal_id == 0 {
        return Err(FlowError::Validation("Proposal id is required".to_string()));
    }

    let call = ContractCall::new(*GOVERNANCE_CONTRACT_ADDRESS, "vote")
        .arg(Token::Address(ctx.account))
        .arg(Token::Uint(proposal_id.into()))
        .arg(Token::Uint(u64::from(choice.option_value()).into()))
        .arg(Token::String(metadata.to_string()));

    Ok(TxPlan {
        call,
        approval: None,
        default_gas_limit: 1_500_000,
        fixed_gas_price: None,
        simulate_label: "Submitting your vote...".to_string(),
        submit_label: "Transaction sent, waiting for confirmation...".to_string(),
        success: SuccessMessage::Static("Your vote has been successfully submitted!".to_string()),
        tolerate_simulation_failure: false,
        invalidates: vec![DataScope::Proposals],
        deploy: None,
    })
}

pub(super) fn plan_create_proposal(
    title: &str,
    description: &str,
    msg: &str,
    initial_deposit: &str,
) -> Result<TxPlan, FlowError> {
    let title = title.trim();
    let description = description.trim();
    if title.is_empty() {
        return Err(FlowError::Validation("Proposal title is required".to_string()));
    }
    if description.is_empty() {
        return Err(FlowError::Validation(
            "Proposal description is required".to_string(),
        ));
    }
    let deposit = U256::from_dec_str(initial_deposit).map_err(|_| {
        FlowError::Validation("Initial deposit must be a valid amount".to_string())
    })?;
    if deposit.is_zero() {
        return Err(FlowError::Validation(
            "Initial deposit must be greater than 0".to_string(),
        ));
    }

    let call = ContractCall::new(*GOVERNANCE_CONTRACT_ADDRESS, "hyperionProposal")
        .arg(Token::String(title.to_string()))
        .arg(Token::String(description.to_string()))
        .arg(Token::String(msg.to_string()))
        .arg(Token::Uint(deposit))
        .with_value(deposit);

    // Proposal creation pins its own gas price instead of the node quote.
    let fixed_gas_price: U256 = parse_units("50", "gwei")
        .map_err(|_| FlowError::Validation("Initial deposit must be a valid amount".to_string()))?
        .into();

    Ok(TxPlan {
        call,
        approval: None,
        default_gas_limit: 5_000_000,
        fixed_gas_price: Some(fixed_gas_price),
        simulate_label: "Creating proposal transaction...".to_string(),
        submit_label: "Transaction sent, waiting for confirmation...".to_string(),
        success: SuccessMessage::Static(
            "Proposal created successfully! Refreshing data...".to_string(),
        ),
        tolerate_simulation_failure: false,
        invalidates: vec![DataScope::Proposals, DataScope::Balances],
        deploy: None,
    })
}
