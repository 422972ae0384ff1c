//! Command Line Interface for the swap router.
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use swap_router_domain::{
    FeeTier, PoolSnapshot, PoolVersion, Quote, SlippageTolerance, Token, TokenAmount,
};
use swap_router_engine::{QuoteRequest, RouterConfig, SwapRouter};
use swap_router_protocols::prelude::{InMemoryProvider, PoolFixture};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swap-router")]
#[command(about = "Swap quotation and pool routing engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a swap against the pools of a fixture file
    Quote {
        /// Pool fixture (JSON)
        #[arg(short, long)]
        pools: PathBuf,

        /// Token to sell (symbol or address)
        #[arg(long)]
        token_in: String,

        /// Token to buy (symbol or address)
        #[arg(long)]
        token_out: String,

        /// Input amount in the smallest unit of token_in
        #[arg(short, long)]
        amount: String,

        /// Slippage tolerance in basis points
        #[arg(short, long, default_value_t = 50)]
        slippage_bps: u32,

        /// Restrict routing to one pool version (v2 or v3)
        #[arg(long)]
        version: Option<PoolVersion>,

        /// Probe only this fee tier, in hundredths of a bip (e.g. 3000)
        #[arg(long)]
        fee: Option<u32>,

        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the pools of a fixture file
    Pools {
        /// Pool fixture (JSON)
        #[arg(short, long)]
        pools: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Quote {
            pools,
            token_in,
            token_out,
            amount,
            slippage_bps,
            version,
            fee,
            json,
        } => {
            let fixture = PoolFixture::load(&pools)
                .with_context(|| format!("loading {}", pools.display()))?;
            let token_in = find_token(&fixture, &token_in)?;
            let token_out = find_token(&fixture, &token_out)?;
            let amount: TokenAmount = amount.parse()?;

            let mut request = QuoteRequest::new(token_in.clone(), token_out.clone(), amount)
                .with_slippage(SlippageTolerance::from_bps(slippage_bps)?);
            if let Some(version) = version {
                request = request.with_version(version);
            }
            if let Some(pips) = fee {
                request = request.with_pinned_fee(FeeTier::from_pips(pips)?);
            }

            let config = RouterConfig::from_env()?;
            let provider = Arc::new(InMemoryProvider::from_fixture(&fixture)?);
            let router = SwapRouter::new(provider, config);
            let quote = router.get_swap_quote(&request).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&quote)?);
            } else {
                print_quote(&quote, &token_in, &token_out);
            }
        }
        Commands::Pools { pools } => {
            let fixture = PoolFixture::load(&pools)
                .with_context(|| format!("loading {}", pools.display()))?;
            let provider = InMemoryProvider::from_fixture(&fixture)?;

            let snapshots = provider.pools().await;
            println!("📚 {} pools in {}", snapshots.len(), pools.display());
            println!(
                "{:<44} | {:<4} | {:<6} | {:<40}",
                "Address", "Ver", "Fee", "State"
            );
            println!("{}", "-".repeat(102));
            for snapshot in snapshots {
                let (fee, state) = match &snapshot {
                    PoolSnapshot::ConstantProduct(pool) => (
                        format!("{}‰", pool.fee_per_mille),
                        format!("r0={} r1={}", pool.reserve0, pool.reserve1),
                    ),
                    PoolSnapshot::Concentrated(pool) => (
                        pool.fee_tier.to_string(),
                        format!("tick={} L={}", pool.tick, pool.liquidity),
                    ),
                };
                println!(
                    "{:<44} | {:<4} | {:<6} | {:<40}",
                    snapshot.address(),
                    snapshot.version(),
                    fee,
                    state
                );
            }
        }
    }

    Ok(())
}

fn find_token(fixture: &PoolFixture, needle: &str) -> Result<Token> {
    fixture
        .find_token(needle)
        .cloned()
        .ok_or_else(|| anyhow!("unknown token {needle:?}; add it to the fixture's tokens"))
}

/// Renders a raw amount with the token's decimal point.
fn format_units(amount: TokenAmount, decimals: u8) -> String {
    let raw = amount.to_string();
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return raw;
    }
    let padded = format!("{raw:0>width$}", width = decimals + 1);
    let (int, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        int.to_string()
    } else {
        format!("{int}.{frac}")
    }
}

fn print_quote(quote: &Quote, token_in: &Token, token_out: &Token) {
    println!("\n📊 Swap Quote");
    println!("════════════════════════════════════");
    println!(
        "Sell:             {} {}",
        format_units(quote.amount_in, token_in.decimals),
        token_in
    );
    println!(
        "Receive:          {} {}",
        format_units(quote.output_amount, token_out.decimals),
        token_out
    );
    println!(
        "Minimum received: {} {} ({}% slippage)",
        format_units(quote.minimum_received, token_out.decimals),
        token_out,
        quote.slippage.as_percent()
    );
    println!("Price impact:     {}", quote.price_impact);
    println!(
        "Fee:              {} {}",
        format_units(quote.fee_amount, token_in.decimals),
        token_in
    );
    if let Some(spot) = quote.spot_price {
        println!("Spot price:       {} {} per {}", spot, token_out, token_in);
    }
    println!("Route:            {}", quote.route);
    println!("════════════════════════════════════");
    if quote.high_slippage_warning {
        println!("⚠️  High slippage tolerance: the trade may execute far below the quote.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(TokenAmount::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(TokenAmount::from(42u64), 6), "0.000042");
        assert_eq!(format_units(TokenAmount::from(2_000_000u64), 6), "2");
        assert_eq!(format_units(TokenAmount::from(7u64), 0), "7");
    }

    #[test]
    fn test_cli_parses_quote() {
        let cli = Cli::try_parse_from([
            "swap-router",
            "quote",
            "--pools",
            "pools.json",
            "--token-in",
            "USDC",
            "--token-out",
            "WETH",
            "--amount",
            "1000000",
            "--version",
            "v3",
            "--fee",
            "500",
        ])
        .unwrap();
        match cli.command {
            Commands::Quote {
                version, fee, json, slippage_bps, ..
            } => {
                assert_eq!(version, Some(PoolVersion::ConcentratedLiquidity));
                assert_eq!(fee, Some(500));
                assert_eq!(slippage_bps, 50);
                assert!(!json);
            }
            Commands::Pools { .. } => panic!("expected quote command"),
        }
    }
}
