use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::Signer as _;
use ethers::types::{Address, U256};
use revfund_core::{Currency, Signer, TokenStandard, TxOptions};
use revfund_ensemble::Ensemble;
use revfund_ethers::connect_ensemble;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "revfund")]
#[command(about = "Query and claim fees accrued across revenue fund shards", long_about = None)]
pub struct Cli {
    /// Settings file (TOML)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint, overrides the settings
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct CurrencyArgs {
    /// Currency contract address (zero address for ether)
    #[arg(long, default_value = "0x0000000000000000000000000000000000000000")]
    pub currency: Address,

    /// Currency id
    #[arg(long, default_value = "0", value_parser = parse_decimal)]
    pub currency_id: U256,
}

impl CurrencyArgs {
    fn currency(&self) -> Currency {
        Currency::new(self.currency, self.currency_id)
    }
}

#[derive(Args, Debug, Clone)]
pub struct RangeArgs {
    /// First accrual (or block with --blocks), inclusive
    #[arg(long)]
    pub start: u64,

    /// Last accrual (or block with --blocks), inclusive
    #[arg(long)]
    pub end: u64,

    /// Interpret the range as block numbers
    #[arg(long)]
    pub blocks: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TxArgs {
    #[arg(long, value_parser = parse_decimal)]
    pub gas_limit: Option<U256>,

    /// Gas price in wei
    #[arg(long, value_parser = parse_decimal)]
    pub gas_price: Option<U256>,
}

impl From<&TxArgs> for TxOptions {
    fn from(args: &TxArgs) -> Self {
        TxOptions { gas_limit: args.gas_limit, gas_price: args.gas_price, nonce: None }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show how a currency's accruals are spread over the shards
    Decomposition {
        #[command(flatten)]
        currency: CurrencyArgs,
    },

    /// Fees claimable over an accrual or block range
    Claimable {
        #[command(flatten)]
        currency: CurrencyArgs,
        #[command(flatten)]
        range: RangeArgs,
        /// Claimant, defaults to the configured signer
        #[arg(long)]
        wallet: Option<Address>,
    },

    /// Whether an accrual has been fully claimed
    FullyClaimed {
        #[command(flatten)]
        currency: CurrencyArgs,
        #[arg(long)]
        accrual: u64,
        #[arg(long)]
        wallet: Option<Address>,
    },

    /// Staged balance summed over all shards
    Staged {
        #[command(flatten)]
        currency: CurrencyArgs,
        #[arg(long)]
        wallet: Option<Address>,
    },

    /// Claim and stage fees over an accrual or block range
    Claim {
        #[command(flatten)]
        currency: CurrencyArgs,
        #[command(flatten)]
        range: RangeArgs,
        #[command(flatten)]
        tx: TxArgs,
    },

    /// Withdraw staged fees
    Withdraw {
        #[command(flatten)]
        currency: CurrencyArgs,
        /// Amount in the currency's base unit
        #[arg(long, value_parser = parse_decimal)]
        amount: U256,
        #[arg(long, default_value = "ETH")]
        standard: TokenStandard,
        #[command(flatten)]
        tx: TxArgs,
    },
}

fn parse_decimal(s: &str) -> Result<U256, String> {
    U256::from_dec_str(s).map_err(|e| format!("invalid decimal amount {:?}: {}", s, e))
}

pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(rpc_url) = cli.rpc_url {
        settings.rpc_url = rpc_url;
    }
    let signer = settings.signer()?;

    let provider = Provider::<Http>::try_from(settings.rpc_url.as_str())
        .with_context(|| format!("invalid rpc url {}", settings.rpc_url))?;
    let chain_id = match settings.chain_id {
        Some(chain_id) => chain_id,
        None => provider.get_chainid().await.context("failed to query chain id")?.as_u64(),
    };
    info!(rpc_url = %settings.rpc_url, chain_id, "connecting");

    let ensemble = connect_ensemble(Arc::new(provider), chain_id, &settings.ensemble)?;
    execute(&ensemble, signer.as_ref(), cli.command).await
}

fn claimant(wallet: Option<Address>, signer: Option<&Signer>) -> Result<Address> {
    wallet
        .or_else(|| signer.map(|s| s.address()))
        .ok_or_else(|| anyhow!("no --wallet given and no private key configured"))
}

fn require_signer(signer: Option<&Signer>) -> Result<&Signer> {
    signer.ok_or_else(|| {
        anyhow!("a private key is required; set private_key or REVFUND_PRIVATE_KEY")
    })
}

pub async fn execute(
    ensemble: &Ensemble,
    signer: Option<&Signer>,
    command: Commands,
) -> Result<()> {
    let output = match command {
        Commands::Decomposition { currency } => {
            let decomposition = ensemble.decomposition(&currency.currency()).await?;
            let shards: Vec<_> = ensemble
                .shard_addresses()
                .into_iter()
                .zip(decomposition.shards.iter())
                .map(|(address, shard)| {
                    json!({
                        "shard": address,
                        "start_accrual": shard.start_accrual,
                        "end_accrual": shard.end_accrual(),
                        "start_block": shard.blocks.map(|b| b.start),
                        "end_block": shard.blocks.map(|b| b.end),
                    })
                })
                .collect();
            json!({ "currency": currency.currency(), "shards": shards })
        }
        Commands::Claimable { currency, range, wallet } => {
            let wallet = claimant(wallet, signer)?;
            let currency = currency.currency();
            let amount = if range.blocks {
                ensemble
                    .claimable_amount_by_block_numbers(wallet, &currency, range.start, range.end)
                    .await?
            } else {
                ensemble
                    .claimable_amount_by_accruals(wallet, &currency, range.start, range.end)
                    .await?
            };
            json!({ "wallet": wallet, "claimable": amount.to_string() })
        }
        Commands::FullyClaimed { currency, accrual, wallet } => {
            let wallet = claimant(wallet, signer)?;
            let claimed = ensemble.fully_claimed(wallet, &currency.currency(), accrual).await?;
            json!({ "wallet": wallet, "accrual": accrual, "fully_claimed": claimed })
        }
        Commands::Staged { currency, wallet } => {
            let wallet = claimant(wallet, signer)?;
            let currency = currency.currency();
            let balances = ensemble.staged_balances(wallet, &currency).await?;
            let total = ensemble.staged_balance(wallet, &currency).await?;
            json!({
                "wallet": wallet,
                "staged": total.to_string(),
                "per_shard": balances.iter().map(U256::to_string).collect::<Vec<_>>(),
            })
        }
        Commands::Claim { currency, range, tx } => {
            let signer = require_signer(signer)?;
            let currency = currency.currency();
            let options = TxOptions::from(&tx);
            let txs = if range.blocks {
                ensemble
                    .claim_and_stage_by_block_numbers(
                        signer,
                        &currency,
                        range.start,
                        range.end,
                        &options,
                    )
                    .await?
            } else {
                ensemble
                    .claim_and_stage_by_accruals(
                        signer,
                        &currency,
                        range.start,
                        range.end,
                        &options,
                    )
                    .await?
            };
            json!({ "transactions": txs })
        }
        Commands::Withdraw { currency, amount, standard, tx } => {
            let signer = require_signer(signer)?;
            let txs = ensemble
                .withdraw(signer, &currency.currency(), amount, standard, &TxOptions::from(&tx))
                .await?;
            json!({ "transactions": txs })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_amounts_parse_as_decimal() {
        assert_eq!(parse_decimal("100").unwrap(), U256::from(100));
        assert!(parse_decimal("0x64").is_err());
    }

    #[test]
    fn test_parse_withdraw() {
        let cli = Cli::try_parse_from([
            "revfund",
            "withdraw",
            "--currency",
            "0x1111111111111111111111111111111111111111",
            "--currency-id",
            "3",
            "--amount",
            "40",
            "--standard",
            "ERC1155",
        ])
        .unwrap();

        match cli.command {
            Commands::Withdraw { currency, amount, standard, tx } => {
                assert_eq!(
                    currency.currency(),
                    Currency::new(Address::repeat_byte(0x11), U256::from(3))
                );
                assert_eq!(amount, U256::from(40));
                assert_eq!(standard, TokenStandard::Erc1155);
                assert_eq!(TxOptions::from(&tx), TxOptions::default());
            }
            _ => panic!("expected withdraw"),
        }
    }

    #[test]
    fn test_claimant_falls_back_to_signer() {
        let signer: Signer = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318"
            .parse()
            .unwrap();
        assert_eq!(claimant(None, Some(&signer)).unwrap(), signer.address());
        assert_eq!(
            claimant(Some(Address::repeat_byte(1)), Some(&signer)).unwrap(),
            Address::repeat_byte(1)
        );
        assert!(claimant(None, None).is_err());
    }
}
