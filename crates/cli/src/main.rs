//! Shopfront - terminal storefront over the demo catalog.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog, optionally filtered
//! shopfront catalog --category Electronics --max-price 150
//!
//! # Change the cart (persisted between runs)
//! shopfront add 1
//! shopfront qty 1 3
//! shopfront remove 1
//! shopfront clear
//!
//! # Show the cart and check out
//! shopfront cart
//! shopfront checkout
//!
//! # Interactive session
//! shopfront shell
//! ```
//!
//! # Commands
//!
//! - `catalog` - List products matching the filters
//! - `add` / `remove` / `qty` / `clear` - Edit the cart
//! - `cart` - Show the cart sidebar
//! - `checkout` - Simulated checkout; Ctrl-C during confirmation keeps the cart
//! - `shell` - Interactive storefront

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use shopfront_core::{Catalog, CategoryFilter, FilterState, Price, ProductId};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod render;

use config::ShopConfig;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront terminal storefront")]
struct Cli {
    /// Directory holding the cart snapshot (overrides `SHOPFRONT_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Checkout confirmation delay in milliseconds (overrides `SHOPFRONT_CHECKOUT_DELAY_MS`)
    #[arg(long, global = true)]
    checkout_delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Catalog {
        /// Category to show (`All`, `Electronics`, `Fashion`, `Home`)
        #[arg(short, long, default_value = "All")]
        category: CategoryFilter,

        /// Price ceiling, 0 to 300
        #[arg(short, long, value_parser = Price::parse_amount)]
        max_price: Option<Decimal>,
    },
    /// Add one unit of a product to the cart
    Add {
        /// Product ID
        id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Set a cart line's quantity (0 removes it)
    Qty {
        /// Product ID
        id: ProductId,

        /// New quantity, clamped to stock
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Show the cart
    Cart,
    /// Empty the cart
    Clear,
    /// Check out the cart
    Checkout,
    /// Interactive storefront session
    Shell,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shopfront_cli=info,shopfront_cart=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ShopConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(ms) = cli.checkout_delay_ms {
        config.checkout_delay = Duration::from_millis(ms);
    }

    let catalog = Arc::new(Catalog::demo());
    let mut ledger = commands::open_ledger(&config, catalog);
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Catalog {
            category,
            max_price,
        } => {
            let ceiling = max_price.unwrap_or(FilterState::PRICE_CEILING_MAX);
            let state = FilterState::new(category, ceiling);
            commands::catalog::list(&mut out, &ledger, &state)?;
        }
        Commands::Add { id } => commands::cart::add(&mut out, &mut ledger, id)?,
        Commands::Remove { id } => commands::cart::remove(&mut out, &mut ledger, id)?,
        Commands::Qty { id, quantity } => {
            commands::cart::set_quantity(&mut out, &mut ledger, id, quantity)?;
        }
        Commands::Cart => commands::cart::show(&mut out, &ledger)?,
        Commands::Clear => commands::cart::clear(&mut out, &mut ledger)?,
        Commands::Checkout => {
            commands::checkout::run(&mut out, &mut ledger, config.checkout_delay).await?;
        }
        Commands::Shell => {
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            commands::shell::run(input, &mut out, &mut ledger, config.checkout_delay).await?;
        }
    }
    Ok(())
}
