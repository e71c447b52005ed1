//! Prints the latest CoinMarketCap listings as a table.
//!
//! ```bash
//! COINMARKETCAP_API_KEY=... cmc-listings --limit 20 --convert EUR
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cmc_listings::{
    api::{ListingsRequest, DEFAULT_LIMIT},
    client::CoinMarketCap,
    error::ClientError,
    models::Listing,
    paths::API_KEY_ENV,
    presenter,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cmc-listings")]
#[command(about = "Fetch and display the latest cryptocurrency listings from CoinMarketCap")]
struct Args {
    /// Number of assets to fetch (1-5000)
    #[arg(short, long, default_value_t = DEFAULT_LIMIT, allow_negative_numbers = true)]
    limit: i64,

    /// Currency to quote prices in
    #[arg(short, long, default_value = "USD")]
    convert: String,

    /// CoinMarketCap API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Re-fetch and re-render every SECS seconds until interrupted
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    refresh: Option<u64>,

    /// Print the listing as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn print_listing(listing: &Listing, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(listing).context("failed to encode listing")?;
        println!("{out}");
    } else {
        println!("{}", presenter::render(listing));
    }
    Ok(())
}

fn print_setup_help(err: &ClientError) {
    eprintln!("Configuration Error: {err}");
    eprintln!();
    eprintln!("To use this tool, you need a CoinMarketCap API key.");
    eprintln!("1. Get your free API key from: https://coinmarketcap.com/api/");
    eprintln!("2. Set it as an environment variable: export {API_KEY_ENV}='your-api-key'");
    eprintln!("3. Or create a .env file with: {API_KEY_ENV}=your-api-key");
}

async fn run(args: Args) -> Result<()> {
    let client = match &args.api_key {
        Some(key) => CoinMarketCap::with_api_key(key.as_str()),
        None => CoinMarketCap::load_from_env(),
    };
    let client = match client {
        Ok(client) => client,
        Err(e @ ClientError::MissingCredentials(_)) => {
            print_setup_help(&e);
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let request = ListingsRequest::builder()
        .limit(args.limit)
        .convert(args.convert.clone())
        .build();

    let Some(secs) = args.refresh else {
        info!("Fetching top {} cryptocurrencies...", request.limit);
        let listing = client.latest_listings(&request).await?;
        return print_listing(&listing, args.json);
    };

    let mut ticker = tokio::time::interval(Duration::from_secs(secs));
    loop {
        ticker.tick().await;
        info!("Fetching top {} cryptocurrencies...", request.limit);
        let listing = client.latest_listings(&request).await?;
        print_listing(&listing, args.json)?;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cmc_listings=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
