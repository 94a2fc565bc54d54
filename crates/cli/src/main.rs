//! Operator CLI for the power-perpetual trading core.
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use powerperp_domain::value_objects::amount::Amount;
use powerperp_domain::{Percentage, PoolState, Token, TokenAmount};
use powerperp_protocols::{DeploymentConfig, PoolStateOracle, RpcPoolOracle};
use powerperp_trading::encoder::MulticallEncoder;
use powerperp_trading::params::{
    AmountMode, TradeIntent, TradeSide, bounded_quote_for_intent, build_for_intent,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser)]
#[command(name = "powerperp")]
#[command(about = "Quoting and trade construction for the power-perpetual pool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Buy,
    Sell,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExactArg {
    In,
    Out,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print the current pool snapshot
    Pool,
    /// Quote a trade against the current pool state
    Quote {
        /// Trade direction
        #[arg(short, long, value_enum)]
        side: SideArg,

        /// Which leg the amount fixes
        #[arg(short, long, value_enum, default_value = "in")]
        exact: ExactArg,

        /// Human-readable amount of the exact leg
        #[arg(short, long)]
        amount: String,

        /// Slippage tolerance in percent
        #[arg(long, default_value = "0.5")]
        slippage: String,
    },
    /// Build trade params and the encoded multicall payloads
    Params {
        #[arg(short, long, value_enum)]
        side: SideArg,

        #[arg(short, long, value_enum, default_value = "in")]
        exact: ExactArg,

        #[arg(short, long)]
        amount: String,

        #[arg(long, default_value = "0.5")]
        slippage: String,

        /// Recipient address for the swap output
        #[arg(short, long)]
        recipient: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = DeploymentConfig::from_env().context("incomplete deployment configuration")?;
    let oracle = RpcPoolOracle::new(config.clone());

    println!("📡 Fetching pool state from {}...", config.rpc_url);
    let pool = oracle.fetch_pool_state().await?;

    match &cli.command {
        Commands::Pool => print_pool(&pool),
        Commands::Quote {
            side,
            exact,
            amount,
            slippage,
        } => {
            let intent = intent_from_args(&pool, *side, *exact, amount)?;
            let slippage = parse_slippage(slippage)?;
            run_quote(&pool, &intent, slippage)?;
        }
        Commands::Params {
            side,
            exact,
            amount,
            slippage,
            recipient,
        } => {
            let intent = intent_from_args(&pool, *side, *exact, amount)?;
            let slippage = parse_slippage(slippage)?;
            run_params(&pool, &intent, slippage, recipient)?;
        }
    }

    Ok(())
}

fn print_pool(pool: &PoolState) {
    println!("✅ Pool snapshot:");
    println!("  pair:          {} / {}", pool.token0.symbol, pool.token1.symbol);
    println!("  fee tier:      {} (hundredths of a bip)", pool.fee_tier.as_raw());
    println!("  current tick:  {}", pool.tick);
    println!("  liquidity:     {}", pool.liquidity);
    println!("  sqrtPriceX96:  {}", pool.sqrt_price_x96);
    if let Ok(price) = pool.price_token1_per_token0() {
        println!("  raw price:     {price} ({}/{})", pool.token1.symbol, pool.token0.symbol);
    }
    println!("  ticks loaded:  {}", pool.ticks.len());
}

/// The pair, as (base asset, derivative token).
fn deployment_pair(pool: &PoolState) -> (Token, Token) {
    if pool.token0.decimals == powerperp_domain::WRAPPED_NATIVE_DECIMALS {
        (pool.token0.clone(), pool.token1.clone())
    } else {
        (pool.token1.clone(), pool.token0.clone())
    }
}

fn intent_from_args(
    pool: &PoolState,
    side: SideArg,
    exact: ExactArg,
    amount: &str,
) -> Result<TradeIntent> {
    let side = match side {
        SideArg::Buy => TradeSide::Buy,
        SideArg::Sell => TradeSide::Sell,
    };
    let mode = match exact {
        ExactArg::In => AmountMode::ExactIn,
        ExactArg::Out => AmountMode::ExactOut,
    };

    let (base, derivative) = deployment_pair(pool);
    // The exact amount is denominated in the input token for exact-in and
    // the output token for exact-out.
    let exact_token = match (side, mode) {
        (TradeSide::Buy, AmountMode::ExactIn) | (TradeSide::Sell, AmountMode::ExactOut) => &base,
        (TradeSide::Buy, AmountMode::ExactOut) | (TradeSide::Sell, AmountMode::ExactIn) => {
            &derivative
        }
    };

    let human = Decimal::from_str(amount).with_context(|| format!("invalid amount {amount}"))?;
    let raw = Amount::from_decimal(human, exact_token.decimals)
        .map_err(|e| anyhow::anyhow!("amount out of range: {e}"))?;

    Ok(TradeIntent {
        side,
        mode,
        amount: raw.token_amount(),
    })
}

fn parse_slippage(raw: &str) -> Result<Percentage> {
    let pct = Decimal::from_str(raw).with_context(|| format!("invalid slippage {raw}"))?;
    Ok(Percentage::from_percent(pct))
}

fn run_quote(pool: &PoolState, intent: &TradeIntent, slippage: Percentage) -> Result<()> {
    let (base, derivative) = deployment_pair(pool);
    let bounded = bounded_quote_for_intent(intent, pool, &base, &derivative, slippage)
        .map_err(|e| anyhow::anyhow!("quote failed: {e}"))?;

    let (token_in, token_out) = intent.legs(&base, &derivative);
    let counter_token = match intent.mode {
        AmountMode::ExactIn => token_out,
        AmountMode::ExactOut => token_in,
    };

    println!("✅ Quote:");
    println!(
        "  counter amount: {} {}",
        display_amount(bounded.amount, counter_token.decimals)?,
        counter_token.symbol
    );
    println!(
        "  bound:          {} {}",
        display_amount(bounded.bound, counter_token.decimals)?,
        counter_token.symbol
    );
    println!("  price impact:   {}%", bounded.price_impact_pct);
    Ok(())
}

fn run_params(
    pool: &PoolState,
    intent: &TradeIntent,
    slippage: Percentage,
    recipient: &str,
) -> Result<()> {
    let (base, derivative) = deployment_pair(pool);
    let quote = intent
        .quote(pool, &base, &derivative)
        .map_err(|e| anyhow::anyhow!("quote failed: {e}"))?;

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let params = build_for_intent(
        intent,
        &base,
        &derivative,
        pool.fee_tier,
        recipient,
        &quote,
        slippage,
        now,
    )
    .map_err(|e| anyhow::anyhow!("param construction failed: {e}"))?;

    println!("✅ Trade params:");
    println!("  token in:   {}", params.token_in.symbol);
    println!("  token out:  {}", params.token_out.symbol);
    println!("  exact:      {}", params.exact_amount);
    println!("  bound:      {}", params.bound_amount);
    println!("  deadline:   {}", params.deadline);
    println!("  native leg: {}", params.required_native_value());

    let encoder = MulticallEncoder::new();
    let calls = match intent.side {
        TradeSide::Buy => encoder.buy_with_native_calls(&params)?,
        TradeSide::Sell => {
            // The unwrap minimum is the native leg the seller must receive.
            let unwrap_min = match params.mode {
                AmountMode::ExactIn => params.bound_amount,
                AmountMode::ExactOut => params.exact_amount,
            };
            encoder.sell_for_native_calls(&params, unwrap_min, recipient)?
        }
    };
    if calls.is_empty() {
        bail!("encoder produced an empty batch");
    }

    println!("📦 Multicall payloads ({} calls):", calls.len());
    for (i, call) in calls.iter().enumerate() {
        println!("  [{i}] 0x{}", hex::encode(call));
    }
    Ok(())
}

fn display_amount(amount: TokenAmount, decimals: u8) -> Result<Decimal> {
    Amount::new(amount.0, decimals)
        .to_decimal()
        .map_err(|e| anyhow::anyhow!("amount out of range: {e}"))
}
