//! The `strata` CLI.
//!
//! Thin shell over the library: connects, loads the default registry,
//! and dispatches to the migrator. Migrations register themselves
//! programmatically; `generate` only writes the stub file.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use strata_migrate::{default_registry, set_migrations_dir, Database, Generator, Migrator};

/// Declarative schema migrations.
#[derive(Parser)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database connection URL (postgres://, mysql:// or sqlite://).
    #[arg(long, env = "DATABASE_URL")]
    database: Option<String>,

    /// Directory containing migration files.
    #[arg(long, default_value = "./migrations")]
    migrations_dir: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new migration file.
    #[command(alias = "g")]
    Generate {
        /// Migration name (e.g. create_users).
        name: String,
    },

    /// Apply pending migrations, optionally up to a version.
    #[command(alias = "m")]
    Migrate {
        /// Target version (applies everything when omitted).
        version: Option<String>,
    },

    /// Roll back the most recent migrations.
    #[command(alias = "r")]
    Rollback {
        /// Number of migrations to roll back.
        #[arg(default_value_t = 1)]
        steps: usize,
    },

    /// Show the status of every known migration.
    #[command(alias = "s")]
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    set_migrations_dir(&cli.migrations_dir);

    match &cli.command {
        Commands::Generate { name } => {
            let registry = default_registry()?;
            let path = Generator::new(&registry).generate(name)?;
            info!("created migration: {}", path.display());
        }

        Commands::Migrate { version } => {
            let migrator = connect_migrator(&cli).await?;
            migrator.migrate(version.as_deref()).await?;
            info!("migrations applied successfully");
        }

        Commands::Rollback { steps } => {
            let migrator = connect_migrator(&cli).await?;
            migrator.rollback(*steps).await?;
            info!("migrations rolled back successfully");
        }

        Commands::Status => {
            let migrator = connect_migrator(&cli).await?;
            let statuses = migrator.status().await?;

            if statuses.is_empty() {
                println!("No migrations found");
                return Ok(());
            }

            println!("{:-<96}", "");
            println!("{:<14} | {:<40} | {:<8} | {}", "Version", "Name", "Status", "Applied At");
            println!("{:-<96}", "");
            for status in &statuses {
                let applied_at = status
                    .applied_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default();
                println!(
                    "{:<14} | {:<40} | {:<8} | {}",
                    status.version, status.name, status.state, applied_at
                );
            }
            println!("{:-<96}", "");

            match migrator.tracker().current_version().await? {
                Some(version) => println!("Current version: {version}"),
                None => println!("Current version: none"),
            }
        }
    }

    Ok(())
}

/// Connects to the database and pairs it with the default registry.
async fn connect_migrator(cli: &Cli) -> anyhow::Result<Migrator> {
    let url = cli
        .database
        .as_deref()
        .context("--database (or DATABASE_URL) is required")?;
    let db = Database::connect(url).await?;

    let registry = default_registry()?;
    // Surface what exists on disk; registration itself is
    // programmatic.
    registry.load_from_directory()?;

    Ok(Migrator::new(db, registry))
}
