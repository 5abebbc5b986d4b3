//! Orders API CLI - database setup and health checks.
//!
//! # Usage
//!
//! ```bash
//! # Create any missing tables
//! orders-cli init-db
//!
//! # Verify the database is reachable and see which tables exist
//! orders-cli check
//! ```
//!
//! Both commands read the same environment as the server
//! (`ORDERS_DATABASE_URL`, falling back to `DATABASE_URL`, plus `.env`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "orders-cli")]
#[command(version, about = "Orders API CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the users, products, orders and order_products tables if absent
    InitDb,
    /// Check database connectivity and report which tables exist
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orders_api_cli=info,orders_api_server=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::InitDb => commands::init_db().await,
        Commands::Check => commands::check().await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
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
    fn test_subcommands_are_kebab_case() {
        assert!(matches!(
            Cli::try_parse_from(["orders-cli", "init-db"]).map(|c| c.command),
            Ok(Commands::InitDb)
        ));
        assert!(matches!(
            Cli::try_parse_from(["orders-cli", "check"]).map(|c| c.command),
            Ok(Commands::Check)
        ));
        assert!(Cli::try_parse_from(["orders-cli", "migrate"]).is_err());
    }
}
