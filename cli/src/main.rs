//! cosmrpc CLI: query a cluster of Cosmos nodes through the failover client.
//!
//! Usage:
//! ```bash
//! # Chain id and latest block, failing over between two gateways
//! cosmrpc status --endpoints https://rest-a.example.com,https://rest-b.example.com
//!
//! # Every transaction in a block
//! cosmrpc txs --height 1200000 --config client.json
//!
//! # CosmWasm smart query
//! cosmrpc query-contract --contract neutron1... --msg '{"config":{}}' --endpoints http://localhost:1317
//! ```

mod logging;

use std::env;
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use cosmrpc_core::{Client, ClientConfig, JsonTxCodec, NodeRpc};
use serde::Serialize;

use crate::logging::{init_tracing, LogConfig};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    match command {
        "version" | "--version" | "-V" => {
            println!("cosmrpc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        "help" | "--help" | "-h" => {
            print_usage();
            return;
        }
        _ => {}
    }

    let rest = &args[2..];
    init_tracing(&LogConfig {
        level: parse_flag(rest, "--log-level").unwrap_or_else(|| "warn".into()),
        json: has_flag(rest, "--log-json"),
        ..LogConfig::default()
    });

    let result = match command {
        "status" => cmd_status(rest).await,
        "block" => cmd_block(rest).await,
        "account" => cmd_account(rest).await,
        "balance" => cmd_balance(rest).await,
        "txs" => cmd_txs(rest).await,
        "tx" => cmd_tx(rest).await,
        "query-contract" => cmd_query_contract(rest).await,
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("cosmrpc {}", env!("CARGO_PKG_VERSION"));
    println!("Query Cosmos nodes with endpoint failover\n");
    println!("USAGE:");
    println!("    cosmrpc <COMMAND> [FLAGS]\n");
    println!("COMMANDS:");
    println!("    status          Chain id, latest height and block time");
    println!("    block           Block header         --height <H>");
    println!("    account         Account counters     --address <ADDR>");
    println!("    balance         Single-denom balance --address <ADDR> --denom <DENOM> [--height <H>]");
    println!("    txs             Transactions in a block --height <H> [--skip-unparsable]");
    println!("    tx              Transaction by hash  --hash <HASH>");
    println!("    query-contract  CosmWasm smart query --contract <ADDR> --msg <JSON> [--height <H>]");
    println!("    version         Print version");
    println!("    help            Print this help\n");
    println!("CONNECTION FLAGS:");
    println!("    --endpoints <URL,URL,...>  REST gateway addresses, in failover order");
    println!("    --config <FILE>            JSON client config (endpoints, gas_price, ...)");
    println!("    --gas-price <COINS>        Gas price [default: 0.025stake]");
    println!("    --prefix <PREFIX>          Account address prefix [default: cosmos]\n");
    println!("LOGGING FLAGS:");
    println!("    --log-level <LEVEL>        trace | debug | info | warn | error [default: warn]");
    println!("    --log-json                 Emit logs as JSON lines on stderr");
}

/// Build the client config from `--config` and/or command-line flags.
fn load_config(args: &[String]) -> Result<ClientConfig> {
    let mut config = match parse_flag(args, "--config") {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            ClientConfig::from_json(&raw).with_context(|| format!("parsing config {path}"))?
        }
        None => ClientConfig::new(
            Vec::new(),
            parse_flag(args, "--gas-price").unwrap_or_else(|| "0.025stake".into()),
            parse_flag(args, "--prefix").unwrap_or_else(|| "cosmos".into()),
        ),
    };
    if let Some(list) = parse_flag(args, "--endpoints") {
        config.endpoints = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }
    if config.endpoints.is_empty() {
        bail!("--endpoints or --config is required");
    }
    // read-only: never sign from the CLI
    config.from_name = None;
    Ok(config)
}

async fn connect(args: &[String]) -> Result<Client> {
    let config = load_config(args)?;
    tracing::debug!(endpoints = ?config.endpoints, "connecting");
    let client = cosmrpc_http::connect(&config, None, Arc::new(JsonTxCodec))
        .await
        .context("connecting to endpoints")?;
    Ok(client)
}

fn required(args: &[String], flag: &str) -> Result<String> {
    parse_flag(args, flag).with_context(|| format!("{flag} is required"))
}

fn height_flag(args: &[String]) -> Result<Option<u64>> {
    parse_flag(args, "--height")
        .map(|h| h.parse().with_context(|| format!("invalid height {h:?}")))
        .transpose()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn cmd_status(args: &[String]) -> Result<()> {
    let client = connect(args).await?;
    let status = client.node_status().await?;

    println!("  Chain id:     {}", status.network);
    println!("  Height:       {}", status.latest_block_height);
    println!("  Block time:   {}", status.latest_block_time);
    println!("  Denom:        {}", client.denom());
    println!(
        "  Endpoint:     {} ({} of {})",
        client.current_endpoint().url(),
        client.current_endpoint_index() + 1,
        client.endpoint_count()
    );
    Ok(())
}

async fn cmd_block(args: &[String]) -> Result<()> {
    let height = height_flag(args)?.context("--height is required")?;
    let client = connect(args).await?;
    let block = client.query_block(height).await?;

    println!("  Height:   {}", block.height);
    println!("  Hash:     {}", block.hash);
    println!("  Chain id: {}", block.chain_id);
    println!("  Time:     {}", block.time);
    println!("  Txs:      {}", block.txs.len());
    Ok(())
}

async fn cmd_account(args: &[String]) -> Result<()> {
    let address = required(args, "--address")?;
    let client = connect(args).await?;
    print_json(&client.query_account(&address).await?)
}

async fn cmd_balance(args: &[String]) -> Result<()> {
    let address = required(args, "--address")?;
    let denom = required(args, "--denom")?;
    let height = height_flag(args)?;
    let client = connect(args).await?;
    print_json(&client.query_balance(&address, &denom, height).await?)
}

async fn cmd_txs(args: &[String]) -> Result<()> {
    let height = height_flag(args)?.context("--height is required")?;
    let client = connect(args).await?;
    let txs = if has_flag(args, "--skip-unparsable") {
        client.get_block_txs_with_parse_err_skip(height).await?
    } else {
        client.get_block_txs(height).await?
    };
    print_json(&txs)
}

async fn cmd_tx(args: &[String]) -> Result<()> {
    let hash = required(args, "--hash")?;
    let client = connect(args).await?;
    let hash = hash.trim_start_matches("0x").to_uppercase();
    print_json(&client.query_tx_by_hash(&hash).await?)
}

async fn cmd_query_contract(args: &[String]) -> Result<()> {
    let contract = required(args, "--contract")?;
    let msg = required(args, "--msg")?;
    serde_json::from_str::<serde_json::Value>(&msg).context("--msg must be valid JSON")?;
    let height = height_flag(args)?;
    let client = connect(args).await?;

    let res = match height {
        Some(h) => client.query_smart_contract_state_at(&contract, msg.as_bytes(), h).await?,
        None => client.query_smart_contract_state(&contract, msg.as_bytes()).await?,
    };
    print_json(&res.data)
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
