//! Delegation flows against the staking precompile.

use ethers::abi::Token;

use crate::chain_config::DELEGATE_CONTRACT_ADDRESS;
use crate::error::FlowError;
use crate::wallet::ContractCall;

use super::{parse_address, parse_amount, DataScope, FlowContext, SuccessMessage, TxPlan};

pub(super) fn plan_staking(
    ctx: &FlowContext,
    validator: &str,
    amount: &str,
    symbol: &str,
    decimals: u8,
    undelegate: bool,
) -> Result<TxPlan, FlowError> {
    let validator = parse_address("validator", validator)?;
    let amount = parse_amount("Amount", amount, decimals)?;
    if symbol.trim().is_empty() {
        return Err(FlowError::Validation("Asset symbol is required".to_string()));
    }

    let method = if undelegate { "undelegate" } else { "delegate" };
    let call = ContractCall::new(*DELEGATE_CONTRACT_ADDRESS, method)
        .arg(Token::Address(ctx.account))
        .arg(Token::Address(validator))
        .arg(Token::Uint(amount))
        .arg(Token::String(symbol.trim().to_string()));

    let (simulate_label, success) = if undelegate {
        (
            "Undelegation in progress...",
            "Undelegation successful! Refreshing your delegations...",
        )
    } else {
        (
            "Delegation in progress...",
            "Delegation successful! Refreshing your delegations...",
        )
    };

    Ok(TxPlan {
        call,
        approval: None,
        default_gas_limit: 1_500_000,
        fixed_gas_price: None,
        simulate_label: simulate_label.to_string(),
        submit_label: "Transaction sent, waiting for confirmation...".to_string(),
        success: SuccessMessage::Static(success.to_string()),
        tolerate_simulation_failure: false,
        invalidates: vec![
            DataScope::Delegations,
            DataScope::Balances,
            DataScope::WhitelistedAssets,
        ],
        deploy: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_config::HELIOS_NETWORK_ID;

    fn ctx() -> FlowContext {
        FlowContext {
            account: "0x589A698b7b7dA0Bec545177D3963A2741105C7C9".parse().unwrap(),
            chain_id: HELIOS_NETWORK_ID,
        }
    }

    #[test]
    fn test_delegate_args_start_with_delegator() {
        let plan = plan_staking(
            &ctx(),
            "0x1111111111111111111111111111111111111111",
            "10",
            "HLS",
            18,
            false,
        )
        .unwrap();
        assert_eq!(plan.call.args.len(), 4);
        assert_eq!(plan.call.args[0], Token::Address(ctx().account));
        assert_eq!(plan.call.args[3], Token::String("HLS".to_string()));
    }

    #[test]
    fn test_undelegate_uses_undelegate_method() {
        let plan = plan_staking(
            &ctx(),
            "0x1111111111111111111111111111111111111111",
            "10",
            "HLS",
            18,
            true,
        )
        .unwrap();
        assert_eq!(plan.call.method, "undelegate");
    }

    #[test]
    fn test_blank_symbol_rejected() {
        let err = plan_staking(
            &ctx(),
            "0x1111111111111111111111111111111111111111",
            "10",
            "  ",
            18,
            false,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Asset symbol is required");
    }
}
