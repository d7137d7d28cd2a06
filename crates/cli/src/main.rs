//! Clementine CLI - Database migrations and store management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run store database migrations
//! clem-cli migrate
//!
//! # Grant the admin role to a profile
//! clem-cli admin grant --email ops@example.com
//! clem-cli admin grant --identity 7f0e1fae-5b1c-4d55-9c3e-2a3f8b1c9d10
//!
//! # Revoke the admin role (back to the user role)
//! clem-cli admin revoke --email ops@example.com
//!
//! # List profiles holding the admin role
//! clem-cli admin list
//!
//! # Seed categories and products from a JSON file
//! clem-cli seed catalog --file fixtures/catalog.json
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run store database migrations
//! - `admin grant|revoke|list` - Manage admin role grants
//! - `seed catalog` - Seed the catalog from a JSON file

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

mod commands;

#[derive(Parser)]
#[command(name = "clem-cli")]
#[command(author, version, about = "Clementine CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run store database migrations
    Migrate,
    /// Manage admin role grants
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant the admin role to a profile
    Grant {
        #[command(flatten)]
        profile: ProfileRef,
    },
    /// Revoke the admin role from a profile
    Revoke {
        #[command(flatten)]
        profile: ProfileRef,
    },
    /// List profiles holding the admin role
    List,
}

/// Selects a profile by identity id or by email, never both.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct ProfileRef {
    /// Identity UUID of the profile
    #[arg(short, long)]
    identity: Option<Uuid>,

    /// Email on the profile
    #[arg(short, long)]
    email: Option<String>,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Seed categories and products from a JSON file
    Catalog {
        /// Path to the seed file
        #[arg(short, long)]
        file: String,

        /// Delete existing products and categories before seeding
        #[arg(long)]
        replace: bool,
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
        Commands::Migrate => commands::migrate::store().await?,
        Commands::Admin { action } => match action {
            AdminAction::Grant { profile } => {
                commands::admin::grant(profile.identity, profile.email).await?;
            }
            AdminAction::Revoke { profile } => {
                commands::admin::revoke(profile.identity, profile.email).await?;
            }
            AdminAction::List => commands::admin::list().await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file, replace } => {
                commands::seed::catalog(&file, replace).await?;
            }
        },
    }
    Ok(())
}
