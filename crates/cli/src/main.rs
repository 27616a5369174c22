//! `workers-registry` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`: start the API server.
//! - `migrate`: apply pending migrations (`up`, the default) or revert the
//!   most recent one (`down`).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use migrations::Direction;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use db::{DatabaseConfig, DbPool};
use migrator::{MigrationRegistry, MigrationRunner};

const MIGRATE_USAGE: &str = "Usage: workers-registry migrate [up|down]";

#[derive(Parser)]
#[command(
    name = "workers-registry",
    about = "Workers registry API and schema migration runner",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Where to find the database.
#[derive(Args)]
struct DatabaseArgs {
    /// Connection string; takes precedence over the config file.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    /// JSON file mapping environment names to connection settings.
    #[arg(long, default_value = "config/database.json")]
    config: PathBuf,
    /// Entry to pick from the config file.
    #[arg(long = "env", env = "APP_ENV", default_value = db::config::DEFAULT_ENVIRONMENT)]
    environment: String,
}

impl DatabaseArgs {
    async fn connect(&self) -> anyhow::Result<DbPool> {
        let config = DatabaseConfig::resolve(
            self.database_url.as_deref(),
            &self.config,
            &self.environment,
        )?;
        let pool = db::pool::connect(&config)
            .await
            .context("failed to connect to database")?;
        Ok(pool)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        bind: String,
        #[command(flatten)]
        database: DatabaseArgs,
    },
    /// Apply pending migrations (`up`) or revert the latest one (`down`).
    Migrate {
        /// `up` or `down`.
        #[arg(default_value = "up")]
        direction: String,
        /// Directory of extra `.sql` migrations to run alongside the built-in ones.
        #[arg(long)]
        scripts: Option<PathBuf>,
        #[command(flatten)]
        database: DatabaseArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind, database } => {
            info!("Starting API server on {bind}");
            let pool = database.connect().await?;
            api::serve(&bind, pool).await?;
            Ok(())
        }
        Command::Migrate {
            direction,
            scripts,
            database,
        } => {
            let Ok(direction) = direction.parse::<Direction>() else {
                println!("{MIGRATE_USAGE}");
                return Ok(());
            };

            let mut registry = MigrationRegistry::builtin()?;
            if let Some(dir) = scripts {
                registry.load_dir(&dir)?;
            }

            let pool = database.connect().await?;
            let outcome = migrate(&pool, registry, direction).await;
            pool.close().await;

            if let Err(e) = &outcome {
                error!("Migration {direction} failed: {e}");
            }
            outcome
        }
    }
}

async fn migrate(
    pool: &DbPool,
    registry: MigrationRegistry,
    direction: Direction,
) -> anyhow::Result<()> {
    let runner = MigrationRunner::postgres(pool.clone(), registry);

    match direction {
        Direction::Up => {
            let report = runner.run_pending().await?;
            info!(
                "All migrations completed ({} applied, {} already up to date)",
                report.applied.len(),
                report.skipped.len()
            );
        }
        Direction::Down => match runner.revert_last().await? {
            Some(name) => info!("Reverted {name}"),
            None => info!("No migrations to revert"),
        },
    }

    Ok(())
}
