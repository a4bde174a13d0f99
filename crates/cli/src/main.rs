//! Dispaso CLI - drive the cart widget from a terminal.
//!
//! The cart is persisted in a file-backed store, so successive invocations
//! behave like successive clicks on the product page.
//!
//! # Usage
//!
//! ```bash
//! # Add a product (name and price as the product card would carry them)
//! dispaso add energy-rush --name "Energy Rush" --price 49
//!
//! # Change quantities
//! dispaso inc energy-rush
//! dispaso dec energy-rush
//! dispaso remove energy-rush
//!
//! # Show the cart, or the rendered page fragments
//! dispaso show
//! dispaso show --html
//!
//! # Check out
//! dispaso checkout --method card --card-type debit
//!
//! # Try the payment input formatters
//! dispaso format card-number 4111111111111111
//! dispaso format expiry 1225
//! ```
//!
//! # Commands
//!
//! - `add` / `remove` / `inc` / `dec` - Cart mutations
//! - `show` - Print the cart
//! - `checkout` - Walk the checkout overlay through payment
//! - `format` - Apply the payment input formatters

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod error;
mod output;

use error::CliError;

#[derive(Parser)]
#[command(name = "dispaso")]
#[command(author, version, about = "Dispaso cart widget CLI")]
struct Cli {
    /// Directory holding the persisted cart (overrides `DISPASO_CART_DIR`)
    #[arg(long, global = true)]
    cart_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one unit of a product to the cart
    Add {
        /// Product id
        id: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Unit price
        #[arg(short, long)]
        price: Option<String>,

        /// Image URL
        #[arg(short, long)]
        image: Option<String>,
    },
    /// Remove a product from the cart
    Remove {
        /// Product id
        id: String,
    },
    /// Add one more unit of a product already in the cart
    Inc {
        /// Product id
        id: String,
    },
    /// Take one unit of a product out of the cart
    Dec {
        /// Product id
        id: String,
    },
    /// Show the cart
    Show {
        /// Print the rendered HTML fragments instead of a summary
        #[arg(long)]
        html: bool,
    },
    /// Pay for the cart
    Checkout {
        /// Payment method (`card`, `upi`, `qr`, `paypal`)
        #[arg(short, long)]
        method: String,

        /// Card type for card payments (`credit`, `debit`)
        #[arg(short = 't', long)]
        card_type: Option<String>,
    },
    /// Format a payment input value
    Format {
        #[command(subcommand)]
        field: FormatField,
    },
}

#[derive(Subcommand)]
enum FormatField {
    /// Group a card number in blocks of four
    CardNumber {
        /// Raw input
        value: String,
    },
    /// Format a card expiry as MM/YY
    Expiry {
        /// Raw input
        value: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing with `EnvFilter`, defaulting to info for our crates.
fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dispaso=info,dispaso_storefront=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let command = cli.command;
    if let Commands::Format { field } = command {
        match field {
            FormatField::CardNumber { value } => commands::format::card_number(&value),
            FormatField::Expiry { value } => commands::format::expiry(&value),
        }
        return Ok(());
    }

    let mut config = dispaso_storefront::WidgetConfig::from_env()?;
    if let Some(dir) = cli.cart_dir {
        config.cart_dir = dir;
    }
    let mut session = commands::Session::open(config);

    match command {
        Commands::Add {
            id,
            name,
            price,
            image,
        } => commands::cart::add(&mut session, id, name, price, image)?,
        Commands::Remove { id } => commands::cart::remove(&mut session, id)?,
        Commands::Inc { id } => commands::cart::increment(&mut session, id)?,
        Commands::Dec { id } => commands::cart::decrement(&mut session, id)?,
        Commands::Show { html } => commands::cart::show(&session, html)?,
        Commands::Checkout { method, card_type } => {
            commands::checkout::run(&mut session, &method, card_type.as_deref()).await?;
        }
        Commands::Format { .. } => {}
    }
    Ok(())
}
