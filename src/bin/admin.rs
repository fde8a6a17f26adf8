//! CLI administration tool for shortlink-lifecycle.
//!
//! Runs lifecycle maintenance by hand, without waiting for the background
//! jobs and without HTTP access.
//!
//! # Usage
//!
//! ```bash
//! # Delete expired links now (asks for confirmation)
//! cargo run --bin admin -- sweep
//!
//! # Fold pending lookup counters into click counts
//! cargo run --bin admin -- reconcile
//! cargo run --bin admin -- reconcile g
//!
//! # Show analytics for one link
//! cargo run --bin admin -- analytics g
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_URL` (or `DB_*`) is required, `REDIS_URL`
//! (or `REDIS_*`) enables the cache and the click counter.

use shortlink_lifecycle::config::{self, Config};
use shortlink_lifecycle::domain::LinkAnalytics;
use shortlink_lifecycle::server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;

/// CLI tool for managing shortlink-lifecycle.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Delete expired links and purge abandoned creations
    Sweep {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Fold pending lookup counters into durable click counts
    Reconcile {
        /// Short code to reconcile (all pending codes if omitted)
        code: Option<String>,
    },

    /// Show analytics for a short link
    Analytics {
        /// Short code
        code: String,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;
    let pool = server::connect_database(&config).await?;

    match cli.command {
        Commands::Sweep { yes } => sweep(&config, pool, yes).await?,
        Commands::Reconcile { code } => reconcile(&config, pool, code).await?,
        Commands::Analytics { code } => analytics(&config, pool, &code).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Runs one expiry sweep after confirmation.
async fn sweep(config: &Config, pool: PgPool, skip_confirm: bool) -> Result<()> {
    println!("{}", "🧹 Expiry Sweep".bright_blue().bold());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete all expired links and their clicks?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let service = server::build_link_service(config, pool).await;
    let report = service
        .sweep_expired()
        .await
        .map_err(|e| anyhow::anyhow!("Sweep failed: {}", e))?;

    println!();
    println!(
        "  Scanned:         {}",
        report.scanned.to_string().bright_white()
    );
    println!(
        "  Deleted:         {}",
        report.deleted.to_string().bright_green().bold()
    );
    println!(
        "  Orphans purged:  {}",
        report.orphans_purged.to_string().bright_green()
    );
    println!();
    println!("{}", "✅ Sweep finished".green().bold());

    Ok(())
}

/// Reconciles one code, or every code with a pending counter.
async fn reconcile(config: &Config, pool: PgPool, code: Option<String>) -> Result<()> {
    println!("{}", "🔄 Click Reconciliation".bright_blue().bold());
    println!();

    if !config.is_cache_enabled() {
        println!(
            "{}",
            "⚠️  Redis is not configured: there are no counters to reconcile".yellow()
        );
        return Ok(());
    }

    let service = server::build_link_service(config, pool).await;

    match code {
        Some(code) => {
            let link = service
                .reconcile(&code)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to reconcile '{}': {}", code, e))?;

            println!(
                "  {} → click count {}",
                code.cyan(),
                link.click_count.to_string().bright_green().bold()
            );
        }
        None => {
            let report = service
                .reconcile_pending()
                .await
                .map_err(|e| anyhow::anyhow!("Reconciliation failed: {}", e))?;

            println!(
                "  Reconciled:     {}",
                report.reconciled.to_string().bright_green().bold()
            );
            println!(
                "  Clicks applied: {}",
                report.clicks_applied.to_string().bright_white()
            );
            if report.failed > 0 {
                println!(
                    "  Failed:         {}",
                    report.failed.to_string().red().bold()
                );
            }
        }
    }

    println!();
    Ok(())
}

/// Prints aggregate analytics for one link.
async fn analytics(config: &Config, pool: PgPool, code: &str) -> Result<()> {
    let service = server::build_link_service(config, pool).await;

    let analytics = service
        .get_analytics(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    print_analytics(&analytics, &service.short_url(&config.base_url, code));
    Ok(())
}

fn print_analytics(analytics: &LinkAnalytics, short_url: &str) {
    println!("{}", "📊 Link Analytics".bright_blue().bold());
    println!();
    println!("  Short URL:       {}", short_url.cyan());
    println!("  Target:          {}", analytics.target_url.bright_white());
    println!(
        "  Owner:           {}",
        analytics.owner.as_deref().unwrap_or("-").bright_black()
    );
    println!(
        "  Created:         {}",
        analytics
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!(
        "  Expires:         {}",
        analytics
            .expires_at
            .map(|e| e.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string())
            .bright_black()
    );
    println!(
        "  Clicks:          {}",
        analytics.click_count.to_string().bright_green().bold()
    );
    println!(
        "  Pending lookups: {}",
        analytics.pending_lookups.to_string().yellow()
    );
    println!(
        "  Last accessed:   {}",
        analytics
            .last_accessed_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string())
            .bright_black()
    );
    println!();
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
                .fetch_one(pool)
                .await?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  Links: {}", links.to_string().bright_white());
        }
    }

    Ok(())
}
