//! Maplemart CLI - a terminal front end for the Maplemart storefront.
//!
//! # Usage
//!
//! ```bash
//! # Create an account and sign in
//! maplemart account register -n "Ada" -e ada@example.com
//! maplemart account login -e ada@example.com
//!
//! # Browse the catalog
//! maplemart catalog list --category Books --search compiler
//! maplemart catalog show <product-id>
//!
//! # Shop
//! maplemart cart add <product-id> --quantity 2
//! maplemart cart show
//! maplemart checkout --name "Ada L" --address "1 Main St" --city London \
//!     --postal-code "N1 7AA" --country UK
//!
//! # Review orders
//! maplemart orders list
//! ```
//!
//! Admin accounts additionally get `catalog create/update/delete`,
//! `orders all`, and `orders set-status`.

#![cfg_attr(not(test), forbid(unsafe_code))]
// A CLI's whole job is writing to the terminal
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::{Parser, Subcommand};

use maplemart_client::{AppState, ClientConfig};

mod commands;

#[derive(Parser)]
#[command(name = "maplemart")]
#[command(author, version, about = "Maplemart terminal storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage your account and session
    Account {
        #[command(subcommand)]
        action: commands::account::AccountAction,
    },
    /// Browse and (as admin) manage the product catalog
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Place an order from the current cart
    Checkout(commands::orders::CheckoutArgs),
    /// Review orders
    Orders {
        #[command(subcommand)]
        action: commands::orders::OrdersAction,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before tracing init so RUST_LOG from the file is seen
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let app = AppState::new(config);
    app.set_on_session_expired(Box::new(|| {
        eprintln!("Your session has expired. Please log in again.");
    }));
    app.initialize().await;

    match cli.command {
        Commands::Account { action } => commands::account::run(&app, action).await?,
        Commands::Catalog { action } => commands::catalog::run(&app, action).await?,
        Commands::Cart { action } => commands::cart::run(&app, action).await?,
        Commands::Checkout(args) => commands::orders::checkout(&app, args).await?,
        Commands::Orders { action } => commands::orders::run(&app, action).await?,
    }
    Ok(())
}
