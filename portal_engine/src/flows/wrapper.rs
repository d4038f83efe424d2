//! Native token wrap and unwrap against the chain's wrapper contract.

use ethers::abi::Token;

use crate::chain_config::chain_config;
use crate::error::FlowError;
use crate::wallet::ContractCall;

use super::{parse_amount, DataScope, FlowContext, SuccessMessage, TxPlan};

pub(super) fn plan_wrap(ctx: &FlowContext, amount: &str) -> Result<TxPlan, FlowError> {
    let (config, wrapper) = wrapper_for(ctx.chain_id)?;
    let wei = parse_amount("Amount", amount, config.decimals)?;

    let call = ContractCall::new(wrapper, "deposit").with_value(wei);

    Ok(TxPlan {
        call,
        approval: None,
        default_gas_limit: 1_500_000,
        fixed_gas_price: None,
        simulate_label: "Wrap in progress...".to_string(),
        submit_label: "Transaction sent, waiting for confirmation...".to_string(),
        success: SuccessMessage::Static(format!(
            "Successfully wrapped {amount} {}!",
            config.token
        )),
        tolerate_simulation_failure: false,
        invalidates: vec![DataScope::Balances],
        deploy: None,
    })
}

pub(super) fn plan_unwrap(ctx: &FlowContext, amount: &str) -> Result<TxPlan, FlowError> {
    let (config, wrapper) = wrapper_for(ctx.chain_id)?;
    let wei = parse_amount("Amount", amount, config.decimals)?;

    let call = ContractCall::new(wrapper, "withdraw").arg(Token::Uint(wei));

    Ok(TxPlan {
        call,
        approval: None,
        default_gas_limit: 1_500_000,
        fixed_gas_price: None,
        simulate_label: "Unwrap in progress...".to_string(),
        submit_label: "Transaction sent, waiting for confirmation...".to_string(),
        success: SuccessMessage::Static(format!(
            "Successfully unwrapped {amount} {}!",
            config.wrapped_token
        )),
        tolerate_simulation_failure: false,
        invalidates: vec![DataScope::Balances],
        deploy: None,
    })
}

fn wrapper_for(
    chain_id: u64,
) -> Result<(&'static crate::chain_config::ChainConfig, ethers::types::Address), FlowError> {
    let config = chain_config(chain_id).ok_or_else(|| {
        FlowError::Validation("Wrapping is not supported on this chain".to_string())
    })?;
    let wrapper = config.wrapper_contract_address().ok_or_else(|| {
        FlowError::Validation("Wrapping is not supported on this chain".to_string())
    })?;
    Ok((config, wrapper))
}
