//! Multicall encoding against the swap router's known interface.
//!
//! The router executes an encoded batch atomically; this layer's only duty
//! is faithful ordering and encoding, checked statically against the known
//! function shapes before anything touches the network.

#![allow(deprecated)] // ethabi::Function's `constant` field

use crate::params::{AmountMode, TradeParams};
use ethabi::{Function, Param, ParamType, StateMutability, Token as AbiToken};
use powerperp_domain::TokenAmount;
use primitive_types::U256;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EncodeError {
    /// The referenced function is not part of the router interface; this is
    /// a programming error, detected before any network call.
    #[error("function {0} is not part of the router interface")]
    UnknownFunction(String),
    #[error("invalid address {0}")]
    InvalidAddress(String),
    /// The argument tuple does not match the function's parameter shape.
    #[error(transparent)]
    Abi(#[from] ethabi::Error),
}

fn param(name: &str, kind: ParamType) -> Param {
    Param {
        name: name.to_string(),
        kind,
        internal_type: None,
    }
}

fn swap_params_tuple() -> Vec<ParamType> {
    vec![
        ParamType::Address,   // tokenIn
        ParamType::Address,   // tokenOut
        ParamType::Uint(24),  // fee
        ParamType::Address,   // recipient
        ParamType::Uint(256), // deadline
        ParamType::Uint(256), // amountIn / amountOut
        ParamType::Uint(256), // amountOutMinimum / amountInMaximum
        ParamType::Uint(160), // sqrtPriceLimitX96
    ]
}

fn exact_input_single_fn() -> Function {
    Function {
        name: "exactInputSingle".to_string(),
        inputs: vec![param("params", ParamType::Tuple(swap_params_tuple()))],
        outputs: vec![param("amountOut", ParamType::Uint(256))],
        constant: None,
        state_mutability: StateMutability::Payable,
    }
}

fn exact_output_single_fn() -> Function {
    Function {
        name: "exactOutputSingle".to_string(),
        inputs: vec![param("params", ParamType::Tuple(swap_params_tuple()))],
        outputs: vec![param("amountIn", ParamType::Uint(256))],
        constant: None,
        state_mutability: StateMutability::Payable,
    }
}

fn refund_native_fn() -> Function {
    Function {
        name: "refundETH".to_string(),
        inputs: vec![],
        outputs: vec![],
        constant: None,
        state_mutability: StateMutability::Payable,
    }
}

fn unwrap_native_fn() -> Function {
    Function {
        name: "unwrapWETH9".to_string(),
        inputs: vec![
            param("amountMinimum", ParamType::Uint(256)),
            param("recipient", ParamType::Address),
        ],
        outputs: vec![],
        constant: None,
        state_mutability: StateMutability::Payable,
    }
}

/// Encodes ordered call batches against the router's known interface.
pub struct MulticallEncoder {
    functions: Vec<Function>,
}

impl Default for MulticallEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MulticallEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            functions: vec![
                exact_input_single_fn(),
                exact_output_single_fn(),
                refund_native_fn(),
                unwrap_native_fn(),
            ],
        }
    }

    /// Encodes a single call. Unknown names and mismatched argument shapes
    /// fail here, statically.
    pub fn encode(&self, name: &str, args: &[AbiToken]) -> Result<Vec<u8>, EncodeError> {
        let function = self
            .functions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| EncodeError::UnknownFunction(name.to_string()))?;
        Ok(function.encode_input(args)?)
    }

    /// Encodes a sequence of calls, preserving caller order exactly.
    pub fn encode_batch(
        &self,
        calls: &[(&str, Vec<AbiToken>)],
    ) -> Result<Vec<Vec<u8>>, EncodeError> {
        calls
            .iter()
            .map(|(name, args)| self.encode(name, args))
            .collect()
    }

    /// The swap call for a set of trade params.
    pub fn swap_call(&self, params: &TradeParams) -> Result<Vec<u8>, EncodeError> {
        let (name, args) = swap_call_args(params)?;
        self.encode(name, &args)
    }

    /// Canonical buy-with-native batch: the swap followed by a refund of
    /// any unspent native currency.
    pub fn buy_with_native_calls(
        &self,
        params: &TradeParams,
    ) -> Result<Vec<Vec<u8>>, EncodeError> {
        let (name, args) = swap_call_args(params)?;
        let batch = self.encode_batch(&[(name, args), ("refundETH", vec![])])?;
        debug!(calls = batch.len(), swap = name, "encoded buy multicall");
        Ok(batch)
    }

    /// Canonical sell-for-native batch: the swap (outputting the wrapped
    /// asset to the router) followed by unwrapping to the recipient.
    pub fn sell_for_native_calls(
        &self,
        params: &TradeParams,
        unwrap_minimum: TokenAmount,
        recipient: &str,
    ) -> Result<Vec<Vec<u8>>, EncodeError> {
        let (name, args) = swap_call_args(params)?;
        let unwrap_args = vec![
            AbiToken::Uint(abi_uint(unwrap_minimum.0)),
            AbiToken::Address(parse_address(recipient)?),
        ];
        let batch = self.encode_batch(&[(name, args), ("unwrapWETH9", unwrap_args)])?;
        debug!(calls = batch.len(), swap = name, "encoded sell multicall");
        Ok(batch)
    }
}

/// Function name and argument tuple for a swap, per the params' mode.
fn swap_call_args(params: &TradeParams) -> Result<(&'static str, Vec<AbiToken>), EncodeError> {
    let tuple = AbiToken::Tuple(vec![
        AbiToken::Address(parse_address(&params.token_in.address)?),
        AbiToken::Address(parse_address(&params.token_out.address)?),
        AbiToken::Uint(ethabi::Uint::from(params.fee.as_raw())),
        AbiToken::Address(parse_address(&params.recipient)?),
        AbiToken::Uint(ethabi::Uint::from(params.deadline)),
        AbiToken::Uint(abi_uint(params.exact_amount.0)),
        AbiToken::Uint(abi_uint(params.bound_amount.0)),
        AbiToken::Uint(abi_uint(params.sqrt_price_limit_x96)),
    ]);
    let name = match params.mode {
        AmountMode::ExactIn => "exactInputSingle",
        AmountMode::ExactOut => "exactOutputSingle",
    };
    Ok((name, vec![tuple]))
}

fn parse_address(addr: &str) -> Result<ethabi::Address, EncodeError> {
    ethabi::Address::from_str(addr.trim()).map_err(|_| EncodeError::InvalidAddress(addr.to_string()))
}

fn abi_uint(value: U256) -> ethabi::Uint {
    // Byte-wise copy: the two U256 types come from different crate
    // generations and share no conversion impls.
    let mut buf = [0u8; 32];
    for (i, slot) in buf.iter_mut().enumerate() {
        *slot = value.byte(31 - i);
    }
    ethabi::Uint::from_big_endian(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerperp_domain::{FeeTier, Token};

    fn sell_params() -> TradeParams {
        TradeParams {
            token_in: Token::power_perp("0x0b99e3e573a1a9c5e6b2ce818b617f0e664e86b1"),
            token_out: Token::wrapped_native("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
            fee: FeeTier::Medium,
            recipient: "0x1111111111111111111111111111111111111111".to_string(),
            deadline: 1_700_086_400,
            mode: AmountMode::ExactIn,
            exact_amount: TokenAmount::from(100_000_000_000_000u128),
            bound_amount: TokenAmount::from(1_990_000_000_000_000_000_000u128),
            sqrt_price_limit_x96: U256::zero(),
        }
    }

    fn buy_params() -> TradeParams {
        let mut params = sell_params();
        std::mem::swap(&mut params.token_in, &mut params.token_out);
        params.mode = AmountMode::ExactOut;
        params
    }

    #[test]
    fn test_batch_preserves_order() {
        let encoder = MulticallEncoder::new();
        let batch = encoder
            .encode_batch(&[("refundETH", vec![]), (
                "unwrapWETH9",
                vec![
                    AbiToken::Uint(ethabi::Uint::from(1u64)),
                    AbiToken::Address(ethabi::Address::zero()),
                ],
            )])
            .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0][..4], refund_native_fn().short_signature());
        assert_eq!(batch[1][..4], unwrap_native_fn().short_signature());
    }

    #[test]
    fn test_buy_sequence_is_swap_then_refund() {
        let encoder = MulticallEncoder::new();
        let batch = encoder.buy_with_native_calls(&buy_params()).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0][..4], exact_output_single_fn().short_signature());
        assert_eq!(batch[1][..4], refund_native_fn().short_signature());
    }

    #[test]
    fn test_sell_sequence_is_swap_then_unwrap() {
        let encoder = MulticallEncoder::new();
        let params = sell_params();
        let batch = encoder
            .sell_for_native_calls(
                &params,
                params.bound_amount,
                &params.recipient,
            )
            .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0][..4], exact_input_single_fn().short_signature());
        assert_eq!(batch[1][..4], unwrap_native_fn().short_signature());
    }

    #[test]
    fn test_unknown_function_rejected() {
        let encoder = MulticallEncoder::new();
        let err = encoder.encode("sweepToken", &[]).unwrap_err();
        assert!(matches!(err, EncodeError::UnknownFunction(_)));
    }

    #[test]
    fn test_argument_shape_mismatch_rejected() {
        let encoder = MulticallEncoder::new();
        // unwrapWETH9 takes (uint256, address); one uint is a shape error.
        let err = encoder
            .encode("unwrapWETH9", &[AbiToken::Uint(ethabi::Uint::from(1u64))])
            .unwrap_err();
        assert!(matches!(err, EncodeError::Abi(_)));
    }

    #[test]
    fn test_invalid_address_rejected() {
        let encoder = MulticallEncoder::new();
        let mut params = sell_params();
        params.recipient = "not-an-address".to_string();
        let err = encoder.swap_call(&params).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidAddress(_)));
    }
}
