//! Pool-state oracle over batched JSON-RPC `eth_call`s.

use crate::abi;
use crate::config::DeploymentConfig;
use async_trait::async_trait;
use ethabi::Token as AbiToken;
use powerperp_domain::math::tick::{MAX_TICK, MIN_TICK};
use powerperp_domain::{FeeTier, PoolState, TickData, Token};
use primitive_types::U256;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("rpc transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("missing result for batched call {0}")]
    MissingResult(usize),
    #[error("failed to decode {context}: {reason}")]
    Decode {
        context: &'static str,
        reason: String,
    },
    #[error(transparent)]
    Abi(#[from] ethabi::Error),
}

fn decode_err(context: &'static str, reason: impl ToString) -> OracleError {
    OracleError::Decode {
        context,
        reason: reason.to_string(),
    }
}

/// Read access to the pool's on-chain state.
///
/// Implementations return a fresh immutable snapshot per call; callers must
/// re-quote whenever they refresh.
#[async_trait]
pub trait PoolStateOracle: Send + Sync {
    async fn fetch_pool_state(&self) -> Result<PoolState, OracleError>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    id: usize,
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Oracle that reads the pool over JSON-RPC, batching calls where possible.
pub struct RpcPoolOracle {
    client: reqwest::Client,
    config: DeploymentConfig,
    /// Tick spacings swept on each side of the current tick.
    tick_window: i32,
}

impl RpcPoolOracle {
    pub fn new(config: DeploymentConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            tick_window: 32,
        }
    }

    #[must_use]
    pub fn with_tick_window(mut self, window: i32) -> Self {
        self.tick_window = window;
        self
    }

    /// Sends one JSON-RPC batch of `eth_call`s against the pool and returns
    /// the raw return data in request order.
    async fn batch_call(&self, calls: &[Vec<u8>]) -> Result<Vec<Vec<u8>>, OracleError> {
        let body: Vec<Value> = calls
            .iter()
            .enumerate()
            .map(|(id, data)| {
                json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "method": "eth_call",
                    "params": [
                        { "to": self.config.pool, "data": format!("0x{}", hex::encode(data)) },
                        "latest",
                    ],
                })
            })
            .collect();

        let responses: Vec<RpcResponse> = self
            .client
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        // Batch responses may arrive out of order; realign by id.
        let mut by_id: Vec<Option<Vec<u8>>> = vec![None; calls.len()];
        for response in responses {
            if let Some(err) = response.error {
                return Err(OracleError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            let raw = response
                .result
                .ok_or(OracleError::MissingResult(response.id))?;
            if response.id < by_id.len() {
                by_id[response.id] = Some(decode_hex(&raw)?);
            }
        }
        by_id
            .into_iter()
            .enumerate()
            .map(|(id, data)| data.ok_or(OracleError::MissingResult(id)))
            .collect()
    }

    async fn fetch_tick_window(
        &self,
        tick: i32,
        fee_tier: FeeTier,
    ) -> Result<Vec<TickData>, OracleError> {
        let indices = window_indices(tick, fee_tier.tick_spacing(), self.tick_window);
        let ticks_fn = abi::ticks_fn();
        let calls = indices
            .iter()
            .map(|&index| {
                ticks_fn
                    .encode_input(&[AbiToken::Int(abi_int_from_i32(index))])
                    .map_err(OracleError::from)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let results = self.batch_call(&calls).await?;

        let mut ticks = Vec::new();
        for (&index, data) in indices.iter().zip(&results) {
            let fields = ticks_fn.decode_output(data)?;
            let initialized = fields
                .get(7)
                .and_then(|t| t.clone().into_bool())
                .ok_or_else(|| decode_err("ticks.initialized", index))?;
            if !initialized {
                continue;
            }
            let net = fields
                .get(1)
                .and_then(|t| t.clone().into_int())
                .ok_or_else(|| decode_err("ticks.liquidityNet", index))?;
            ticks.push(TickData {
                index,
                liquidity_net: net.low_u128() as i128,
            });
        }
        Ok(ticks)
    }
}

#[async_trait]
impl PoolStateOracle for RpcPoolOracle {
    async fn fetch_pool_state(&self) -> Result<PoolState, OracleError> {
        let functions = [
            abi::token0_fn(),
            abi::token1_fn(),
            abi::fee_fn(),
            abi::slot0_fn(),
            abi::liquidity_fn(),
        ];
        let calls = functions
            .iter()
            .map(|f| f.encode_input(&[]).map_err(OracleError::from))
            .collect::<Result<Vec<_>, _>>()?;
        let results = self.batch_call(&calls).await?;

        let token0_addr = decode_address(&functions[0], &results[0], "token0")?;
        let token1_addr = decode_address(&functions[1], &results[1], "token1")?;

        let fee_raw = decode_uint(&functions[2], &results[2], "fee")?.low_u32();
        let fee_tier = FeeTier::from_raw(fee_raw)
            .ok_or_else(|| decode_err("fee", format!("unknown fee tier {fee_raw}")))?;

        let slot0 = functions[3].decode_output(&results[3])?;
        let sqrt_price_x96 = slot0
            .first()
            .and_then(|t| t.clone().into_uint())
            .map(abi_uint_to_u256)
            .ok_or_else(|| decode_err("slot0.sqrtPriceX96", "not a uint"))?;
        let tick = slot0
            .get(1)
            .and_then(|t| t.clone().into_int())
            .map(|v| v.low_u32() as i32)
            .ok_or_else(|| decode_err("slot0.tick", "not an int"))?;

        let liquidity = decode_uint(&functions[4], &results[4], "liquidity")?.low_u128();

        let (token0, token1) = self.describe_tokens(&token0_addr, &token1_addr)?;
        let ticks = self.fetch_tick_window(tick, fee_tier).await?;

        let pool = PoolState {
            token0,
            token1,
            fee_tier,
            sqrt_price_x96,
            tick,
            liquidity,
            ticks,
        };
        debug!(
            pool = %self.config.pool,
            tick,
            liquidity,
            initialized_ticks = pool.ticks.len(),
            "fetched pool snapshot"
        );
        Ok(pool)
    }
}

impl RpcPoolOracle {
    /// Matches the fetched pair addresses against the deployment's known
    /// tokens; decimals are fixed per deployment, not read from chain.
    fn describe_tokens(
        &self,
        token0_addr: &str,
        token1_addr: &str,
    ) -> Result<(Token, Token), OracleError> {
        let describe = |addr: &str| -> Result<Token, OracleError> {
            if addr.eq_ignore_ascii_case(&normalize(&self.config.wrapped_native)) {
                Ok(Token::wrapped_native(addr))
            } else if addr.eq_ignore_ascii_case(&normalize(&self.config.power_token)) {
                Ok(Token::power_perp(addr))
            } else {
                Err(decode_err(
                    "pool tokens",
                    format!("{addr} does not match the configured deployment"),
                ))
            }
        };
        Ok((describe(token0_addr)?, describe(token1_addr)?))
    }
}

fn normalize(addr: &str) -> String {
    addr.to_lowercase()
}

fn decode_hex(raw: &str) -> Result<Vec<u8>, OracleError> {
    let stripped = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(stripped).map_err(|e| decode_err("hex payload", e))
}

fn decode_address(
    function: &ethabi::Function,
    data: &[u8],
    context: &'static str,
) -> Result<String, OracleError> {
    function
        .decode_output(data)?
        .first()
        .and_then(|t| t.clone().into_address())
        .map(|a| format!("0x{a:x}"))
        .ok_or_else(|| decode_err(context, "not an address"))
}

fn decode_uint(
    function: &ethabi::Function,
    data: &[u8],
    context: &'static str,
) -> Result<ethabi::Uint, OracleError> {
    function
        .decode_output(data)?
        .first()
        .and_then(|t| t.clone().into_uint())
        .ok_or_else(|| decode_err(context, "not a uint"))
}

fn abi_uint_to_u256(value: ethabi::Uint) -> U256 {
    // Byte-wise copy: the two U256 types come from different crate
    // generations and share no conversion impls.
    let mut buf = [0u8; 32];
    for (i, slot) in buf.iter_mut().enumerate() {
        *slot = value.byte(31 - i);
    }
    U256::from_big_endian(&buf)
}

/// Two's-complement encoding of a signed tick index.
fn abi_int_from_i32(value: i32) -> ethabi::Int {
    if value >= 0 {
        ethabi::Int::from(value as u64)
    } else {
        let magnitude = ethabi::Int::from(u64::from(value.unsigned_abs()));
        (!magnitude).overflowing_add(ethabi::Int::one()).0
    }
}

/// Grid-aligned tick indices within `window` spacings of the current tick.
fn window_indices(tick: i32, spacing: i32, window: i32) -> Vec<i32> {
    let base = tick.div_euclid(spacing) * spacing;
    (-window..=window)
        .map(|i| base + i * spacing)
        .filter(|&t| (MIN_TICK..=MAX_TICK).contains(&t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_indices_centered_and_sorted() {
        let indices = window_indices(125, 60, 2);
        assert_eq!(indices, vec![0, 60, 120, 180, 240]);

        let negative = window_indices(-125, 60, 1);
        assert_eq!(negative, vec![-240, -180, -120]);
    }

    #[test]
    fn test_window_clamped_to_tick_bounds() {
        let indices = window_indices(MIN_TICK + 5, 60, 3);
        assert!(indices.iter().all(|&t| t >= MIN_TICK));
        assert!(!indices.is_empty());
    }

    #[test]
    fn test_signed_tick_encoding_round_trips() {
        for value in [0i32, 60, -60, 887_220, -887_220] {
            let encoded = abi_int_from_i32(value);
            assert_eq!(encoded.low_u32() as i32, value);
        }
    }

    #[test]
    fn test_decode_hex_strips_prefix() {
        assert_eq!(decode_hex("0x00ff").unwrap(), vec![0u8, 255]);
        assert_eq!(decode_hex("00ff").unwrap(), vec![0u8, 255]);
        assert!(decode_hex("0xzz").is_err());
    }
}
