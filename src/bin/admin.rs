//! CLI administration tool for the book catalog.
//!
//! Covers maintenance that has no HTTP endpoint: database diagnostics and
//! manual cache control for records edited outside the service.
//!
//! # Usage
//!
//! ```bash
//! # Check database connection
//! cargo run --bin book-admin -- db check
//!
//! # Drop the cached snapshot of book 42 after editing it in SQL
//! cargo run --bin book-admin -- cache evict 42
//!
//! # Load every book into the cache
//! cargo run --bin book-admin -- cache warm --yes
//!
//! # Catalog statistics
//! cargo run --bin book-admin -- stats
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (see `book_catalog::config`); `REDIS_URL` is needed for
//! the `cache` commands to have any effect.

use book_catalog::application::cache_aside::CacheFailurePolicy;
use book_catalog::config::{self, Config};
use book_catalog::infrastructure::cache::RedisCache;
use book_catalog::infrastructure::persistence::PgBookRepository;
use book_catalog::state::{AppState, CacheSettings};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing the book catalog.
#[derive(Parser)]
#[command(name = "book-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage cached book snapshots
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show catalog statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Cache management subcommands.
#[derive(Subcommand)]
enum CacheAction {
    /// Remove the cached snapshot of one book
    Evict {
        /// Book id
        id: i64,
    },

    /// Write every stored book into the cache
    Warm {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Cache { action } => handle_cache_action(action, &config, pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches cache commands through the same service the server uses.
async fn handle_cache_action(action: CacheAction, config: &Config, pool: PgPool) -> Result<()> {
    let Some(redis_url) = &config.redis_url else {
        println!(
            "{}",
            "Redis is not configured (REDIS_URL / REDIS_HOST); nothing to do.".yellow()
        );
        return Ok(());
    };

    let cache = RedisCache::connect(redis_url, config.cache_ttl_seconds)
        .await
        .context("Failed to connect to Redis")?;

    // Cache errors must surface here instead of being logged and skipped.
    let settings = CacheSettings {
        failure_policy: CacheFailurePolicy::Propagate,
        ..CacheSettings::from(config)
    };
    let repository = Arc::new(PgBookRepository::new(Arc::new(pool)));
    let state = AppState::build(repository, Arc::new(cache), settings);

    match action {
        CacheAction::Evict { id } => {
            state.book_service.invalidate(id).await?;
            println!(
                "{} {}",
                "Evicted".green().bold(),
                state.book_service.cache().key(id).bright_white()
            );
        }
        CacheAction::Warm { yes } => {
            let total = state.book_service.count().await?;

            if !yes {
                let proceed = Confirm::new()
                    .with_prompt(format!("Write {} books into the cache?", total))
                    .default(false)
                    .interact()?;
                if !proceed {
                    println!("{}", "Cancelled".yellow());
                    return Ok(());
                }
            }

            let written = state.book_service.warm_cache().await?;
            println!(
                "{} {} books (TTL {}s)",
                "Cached".green().bold(),
                written.to_string().bright_green(),
                state.book_service.cache().ttl_seconds()
            );
        }
    }

    Ok(())
}

/// Prints book counts.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(pool)
        .await?;

    let available: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE available")
        .fetch_one(pool)
        .await?;

    let categories: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT category) FROM books")
        .fetch_one(pool)
        .await?;

    println!("  Books:      {}", total.to_string().bright_green().bold());
    println!(
        "  Available:  {}",
        available.to_string().bright_green().bold()
    );
    println!(
        "  Categories: {}",
        categories.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
