//! Hand-built ABI fragments for the pool contract's read surface.

#![allow(deprecated)] // ethabi::Function's `constant` field

use ethabi::{Function, Param, ParamType, StateMutability};

fn view_function(name: &str, inputs: Vec<Param>, outputs: Vec<Param>) -> Function {
    Function {
        name: name.to_string(),
        inputs,
        outputs,
        constant: None,
        state_mutability: StateMutability::View,
    }
}

fn output(name: &str, kind: ParamType) -> Param {
    Param {
        name: name.to_string(),
        kind,
        internal_type: None,
    }
}

/// `token0() -> address`
pub fn token0_fn() -> Function {
    view_function("token0", vec![], vec![output("", ParamType::Address)])
}

/// `token1() -> address`
pub fn token1_fn() -> Function {
    view_function("token1", vec![], vec![output("", ParamType::Address)])
}

/// `fee() -> uint24`
pub fn fee_fn() -> Function {
    view_function("fee", vec![], vec![output("", ParamType::Uint(24))])
}

/// `liquidity() -> uint128`
pub fn liquidity_fn() -> Function {
    view_function("liquidity", vec![], vec![output("", ParamType::Uint(128))])
}

/// `slot0() -> (sqrtPriceX96, tick, observationIndex, observationCardinality,
/// observationCardinalityNext, feeProtocol, unlocked)`
pub fn slot0_fn() -> Function {
    view_function(
        "slot0",
        vec![],
        vec![
            output("sqrtPriceX96", ParamType::Uint(160)),
            output("tick", ParamType::Int(24)),
            output("observationIndex", ParamType::Uint(16)),
            output("observationCardinality", ParamType::Uint(16)),
            output("observationCardinalityNext", ParamType::Uint(16)),
            output("feeProtocol", ParamType::Uint(8)),
            output("unlocked", ParamType::Bool),
        ],
    )
}

/// `ticks(int24) -> (liquidityGross, liquidityNet, feeGrowthOutside0X128,
/// feeGrowthOutside1X128, tickCumulativeOutside, secondsPerLiquidityOutsideX128,
/// secondsOutside, initialized)`
pub fn ticks_fn() -> Function {
    view_function(
        "ticks",
        vec![Param {
            name: "tick".to_string(),
            kind: ParamType::Int(24),
            internal_type: None,
        }],
        vec![
            output("liquidityGross", ParamType::Uint(128)),
            output("liquidityNet", ParamType::Int(128)),
            output("feeGrowthOutside0X128", ParamType::Uint(256)),
            output("feeGrowthOutside1X128", ParamType::Uint(256)),
            output("tickCumulativeOutside", ParamType::Int(56)),
            output("secondsPerLiquidityOutsideX128", ParamType::Uint(160)),
            output("secondsOutside", ParamType::Uint(32)),
            output("initialized", ParamType::Bool),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethabi::Token;

    #[test]
    fn test_read_selectors_encode() {
        for f in [token0_fn(), token1_fn(), fee_fn(), liquidity_fn(), slot0_fn()] {
            let data = f.encode_input(&[]).unwrap();
            // Selector only: no arguments.
            assert_eq!(data.len(), 4, "{}", f.name);
        }
    }

    #[test]
    fn test_ticks_takes_signed_index() {
        let data = ticks_fn()
            .encode_input(&[Token::Int(ethabi::Int::from(60))])
            .unwrap();
        assert_eq!(data.len(), 4 + 32);
    }
}
