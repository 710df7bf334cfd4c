//! Greengrocer CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (schema + session table)
//! gg-cli migrate
//!
//! # Load the starter catalog into an empty products table
//! gg-cli seed
//!
//! # Create an admin account
//! gg-cli admin create -u grocer -e admin@example.com -p 'a long password'
//!
//! # Grant admin to an existing account
//! gg-cli admin promote -e shopper@example.com
//! ```
//!
//! All commands read `GROCER_DATABASE_URL` (or `DATABASE_URL`), loading
//! `.env` if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gg-cli")]
#[command(author, version, about = "Greengrocer CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert the starter products if the catalog is empty
    Seed,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Username (3-80 characters)
        #[arg(short, long)]
        username: String,

        /// Email address used to log in
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Grant the admin role to an existing user
    Promote {
        /// Email address of the user
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let pool = commands::connect().await?;
    match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await?,
        Commands::Seed => {
            commands::seed::run(&pool).await?;
        }
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                email,
                password,
            } => {
                commands::admin::create_user(&pool, &username, &email, &password).await?;
            }
            AdminAction::Promote { email } => commands::admin::promote(&pool, &email).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_admin_create_arguments() {
        let cli = Cli::try_parse_from([
            "gg-cli", "admin", "create", "-u", "grocer", "-e", "a@b.co", "-p", "secret123",
        ])
        .map_err(|e| e.to_string());
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::Admin {
                    action: AdminAction::Create { .. }
                }
            })
        ));
    }
}
