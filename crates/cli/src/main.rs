//! Atelier CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run catalog database migrations
//! atelier-cli migrate
//!
//! # Load products from a YAML file, replacing the current catalog
//! atelier-cli seed --file crates/cli/data/products.yaml --clear
//!
//! # Grant or revoke catalog admin rights
//! atelier-cli user promote -e admin@example.com
//! atelier-cli user demote -e admin@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Insert products from a YAML file
//! - `user promote` / `user demote` - Change an account's role

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use atelier_core::Role;

mod commands;

#[derive(Parser)]
#[command(name = "atelier-cli")]
#[command(author, version, about = "Atelier CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog from a YAML file
    Seed {
        /// Path to the products file
        #[arg(short, long, default_value = "crates/cli/data/products.yaml")]
        file: String,

        /// Remove existing products first
        #[arg(long)]
        clear: bool,
    },
    /// Manage account roles
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Grant the admin role
    Promote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Revoke the admin role
    Demote {
        /// Account email address
        #[arg(short, long)]
        email: String,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, clear } => commands::seed::products(&file, clear).await?,
        Commands::User { action } => match action {
            UserAction::Promote { email } => {
                commands::user::set_role(&email, Role::Admin).await?;
            }
            UserAction::Demote { email } => {
                commands::user::set_role(&email, Role::User).await?;
            }
        },
    }
    Ok(())
}
