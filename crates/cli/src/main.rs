//! Shiplane CLI - Partner registry and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Seed the courier partner registry with the built-in adapters
//! sl-cli partner seed
//!
//! # List partners and their active flags
//! sl-cli partner list
//!
//! # Disable a partner (the manager stops querying it)
//! sl-cli partner disable shadowfax
//!
//! # Create a user
//! sl-cli user create -e ops@example.com -n "Ops Desk" -p 9876543210
//!
//! # Fetch live quotes for a lane from the terminal
//! sl-cli quote -o 110001 -d 560037 -w 500
//! ```
//!
//! # Commands
//!
//! - `partner` - Manage the courier partner registry
//! - `user` - Create users
//! - `quote` - Ad-hoc rate comparison against the live partner APIs

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sl-cli")]
#[command(author, version, about = "Shiplane CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the courier partner registry
    Partner {
        #[command(subcommand)]
        action: PartnerAction,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Fetch live quotes for a lane
    Quote {
        /// Origin pincode
        #[arg(short, long)]
        origin: String,

        /// Destination pincode
        #[arg(short, long)]
        destination: String,

        /// Dead weight in grams
        #[arg(short, long)]
        weight: u32,

        /// Quote for cash on delivery
        #[arg(long, default_value_t = false)]
        cod: bool,

        /// Declared value in rupees
        #[arg(short = 'v', long, default_value = "1000")]
        value: String,
    },
}

#[derive(Subcommand)]
enum PartnerAction {
    /// Seed the registry with the built-in adapters
    Seed,
    /// List partners and their active flags
    List,
    /// Enable a partner
    Enable {
        /// Partner code (e.g., `delhivery`)
        code: String,
    },
    /// Disable a partner
    Disable {
        /// Partner code (e.g., `delhivery`)
        code: String,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Mobile number
        #[arg(short, long)]
        phone: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Partner { action } => match action {
            PartnerAction::Seed => commands::partner::seed().await?,
            PartnerAction::List => commands::partner::list().await?,
            PartnerAction::Enable { code } => commands::partner::set_active(&code, true).await?,
            PartnerAction::Disable { code } => commands::partner::set_active(&code, false).await?,
        },
        Commands::User { action } => match action {
            UserAction::Create { email, name, phone } => {
                commands::user::create(&email, &name, &phone).await?;
            }
        },
        Commands::Quote {
            origin,
            destination,
            weight,
            cod,
            value,
        } => {
            commands::quote::run(&origin, &destination, weight, cod, &value).await?;
        }
    }
    Ok(())
}
