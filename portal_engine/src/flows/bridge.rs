//! Cross-chain bridge flows, both directions.

use ethers::abi::Token;

use crate::chain_config::{chain_config, BRIDGE_CONTRACT_ADDRESS, HELIOS_TOKEN_ADDRESS};
use crate::error::FlowError;
use crate::wallet::ContractCall;

use super::{
    parse_address, parse_amount, parse_optional_amount, ApprovalPlan, DataScope, FlowContext,
    SuccessMessage, TxPlan,
};

pub(super) fn plan_bridge_out(
    dest_chain_id: u64,
    receiver: &str,
    token: &str,
    amount: &str,
    fees: &str,
    decimals: u8,
) -> Result<TxPlan, FlowError> {
    let receiver = parse_address("receiver", receiver)?;
    let token = parse_address("token", token)?;
    let amount = parse_amount("Amount", amount, decimals)?;
    // Bridge fees are quoted in HLS regardless of the bridged asset.
    let fees = parse_optional_amount("Fees", fees, 18)?;

    if chain_config(dest_chain_id).is_none() {
        return Err(FlowError::Validation(format!(
            "Unsupported destination chain {dest_chain_id}"
        )));
    }

    // Bridging the native token spends amount and fees from one allowance.
    let required = if token == *HELIOS_TOKEN_ADDRESS {
        amount + fees
    } else {
        amount
    };

    let call = ContractCall::new(*BRIDGE_CONTRACT_ADDRESS, "sendToChain")
        .arg(Token::Uint(dest_chain_id.into()))
        .arg(Token::Address(receiver))
        .arg(Token::Address(token))
        .arg(Token::Uint(amount))
        .arg(Token::Uint(fees));

    Ok(TxPlan {
        call,
        approval: Some(ApprovalPlan {
            token,
            spender: *BRIDGE_CONTRACT_ADDRESS,
            required,
        }),
        default_gas_limit: 1_500_000,
        fixed_gas_price: None,
        simulate_label: "Simulating cross-chain transaction...".to_string(),
        submit_label: "Sending cross-chain transaction...".to_string(),
        success: SuccessMessage::WithBlock(
            "Transaction confirmed in block #{block}. It will be available in a few minutes."
                .to_string(),
        ),
        tolerate_simulation_failure: false,
        invalidates: vec![DataScope::Balances, DataScope::BridgeHistory],
        deploy: None,
    })
}

pub(super) fn plan_bridge_in(
    ctx: &FlowContext,
    receiver: &str,
    token: &str,
    amount: &str,
    decimals: u8,
) -> Result<TxPlan, FlowError> {
    let config = chain_config(ctx.chain_id).ok_or_else(|| {
        FlowError::Validation(format!("Unsupported source chain {}", ctx.chain_id))
    })?;
    let hyperion = config.hyperion_contract_address().ok_or_else(|| {
        FlowError::Validation(format!("Bridging to Helios is not supported from {}", config.name))
    })?;

    let receiver = parse_address("receiver", receiver)?;
    let token = parse_address("token", token)?;
    let amount = parse_amount("Amount", amount, decimals)?;

    // The counterpart contract takes the Helios destination as a left-padded
    // 32-byte value.
    let mut destination = [0u8; 32];
    destination[12..].copy_from_slice(receiver.as_bytes());

    let call = ContractCall::new(hyperion, "sendToHelios")
        .arg(Token::Address(token))
        .arg(Token::FixedBytes(destination.to_vec()))
        .arg(Token::Uint(amount))
        .arg(Token::String(String::new()));

    Ok(TxPlan {
        call,
        approval: Some(ApprovalPlan {
            token,
            spender: hyperion,
            required: amount,
        }),
        default_gas_limit: 1_500_000,
        fixed_gas_price: None,
        simulate_label: "Simulating cross-chain transaction...".to_string(),
        submit_label: "Sending tokens to Helios...".to_string(),
        success: SuccessMessage::WithBlock(
            "Tokens sent to Helios in block #{block}. It will be available in a few minutes."
                .to_string(),
        ),
        tolerate_simulation_failure: false,
        invalidates: vec![DataScope::Balances, DataScope::BridgeHistory],
        deploy: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::U256;

    #[test]
    fn test_bridge_out_rejects_unknown_destination() {
        let err = plan_bridge_out(
            999,
            "0x589A698b7b7dA0Bec545177D3963A2741105C7C9",
            "0x1111111111111111111111111111111111111111",
            "1",
            "0",
            18,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unsupported destination chain"));
    }

    #[test]
    fn test_bridge_in_pads_receiver_to_32_bytes() {
        let ctx = FlowContext {
            account: "0x589A698b7b7dA0Bec545177D3963A2741105C7C9".parse().unwrap(),
            chain_id: 11155111,
        };
        let plan = plan_bridge_in(
            &ctx,
            "0x589A698b7b7dA0Bec545177D3963A2741105C7C9",
            "0x1111111111111111111111111111111111111111",
            "1",
            18,
        )
        .unwrap();
        assert_eq!(plan.call.method, "sendToHelios");
        match &plan.call.args[1] {
            Token::FixedBytes(bytes) => {
                assert_eq!(bytes.len(), 32);
                assert_eq!(&bytes[..12], &[0u8; 12]);
            }
            other => panic!("expected fixed bytes, got {other:?}"),
        }
    }

    #[test]
    fn test_bridge_fees_always_scaled_to_18_decimals() {
        let plan = plan_bridge_out(
            11155111,
            "0x589A698b7b7dA0Bec545177D3963A2741105C7C9",
            "0x1111111111111111111111111111111111111111",
            "1",
            "0.5",
            6,
        )
        .unwrap();
        match &plan.call.args[4] {
            Token::Uint(fees) => assert_eq!(*fees, U256::exp10(17) * 5),
            other => panic!("expected uint, got {other:?}"),
        }
    }
}
