//! CLI administration tool for the food-ordering service.
//!
//! Provides store diagnostics, statistics and manual order handling without
//! going through the HTTP API (and therefore without an identity token).
//!
//! # Usage
//!
//! ```bash
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Inspect an order
//! cargo run --bin admin -- order show 1f0c...
//!
//! # Mark an order paid when the payment webhook never arrived
//! cargo run --bin admin -- order set-status 1f0c... paid
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use food_ordering::domain::entities::{Order, OrderStatus};
use food_ordering::domain::repositories::{
    OrderRepository, RestaurantRepository, UserRepository,
};
use food_ordering::infrastructure::persistence::{
    PgOrderRepository, PgRestaurantRepository, PgUserRepository,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// CLI tool for managing the food-ordering service.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Show statistics
    Stats,

    /// Inspect and correct orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Order subcommands.
#[derive(Subcommand)]
enum OrderAction {
    /// Show one order
    Show {
        /// Order id
        id: Uuid,
    },

    /// Set the status of an order
    SetStatus {
        /// Order id
        id: Uuid,

        /// paid, inProgress, outForDelivery or delivered
        status: String,

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
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Order { action } => handle_order_action(action, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Displays record counts and the order status breakdown.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let pool = Arc::new(pool.clone());
    let users = PgUserRepository::new(pool.clone());
    let restaurants = PgRestaurantRepository::new(pool.clone());
    let orders = PgOrderRepository::new(pool);

    let (users_count, restaurants_count, by_status) =
        tokio::try_join!(users.count(), restaurants.count(), orders.count_by_status())
            .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    println!(
        "  Users:       {}",
        users_count.to_string().bright_green().bold()
    );
    println!(
        "  Restaurants: {}",
        restaurants_count.to_string().bright_green().bold()
    );
    println!(
        "  Orders:      {}",
        by_status
            .iter()
            .map(|(_, n)| n)
            .sum::<i64>()
            .to_string()
            .bright_green()
            .bold()
    );

    for (status, count) in &by_status {
        println!("    {:<16} {}", status.as_str().cyan(), count);
    }
    println!();

    Ok(())
}

/// Dispatches order commands.
async fn handle_order_action(action: OrderAction, pool: &PgPool) -> Result<()> {
    let repo = PgOrderRepository::new(Arc::new(pool.clone()));

    match action {
        OrderAction::Show { id } => {
            let order = find_order(&repo, id).await?;
            print_order(&order);
        }
        OrderAction::SetStatus { id, status, yes } => {
            set_status(&repo, id, &status, yes).await?;
        }
    }

    Ok(())
}

async fn find_order(repo: &PgOrderRepository, id: Uuid) -> Result<Order> {
    repo.find_by_id(id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Order not found")
}

fn print_order(order: &Order) {
    println!("{}", "🧾 Order".bright_blue().bold());
    println!();
    println!("  ID:         {}", order.id.to_string().bright_white());
    println!("  Restaurant: {}", order.restaurant_id.to_string().bright_black());
    println!("  User:       {}", order.user_id.to_string().bright_black());
    println!("  Status:     {}", order.status.as_str().cyan());
    println!(
        "  Total:      {}",
        order
            .total_amount
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  Created:    {}",
        order.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
    );
    println!(
        "  Deliver to: {}, {}, {}",
        order.delivery_details.name, order.delivery_details.address_line1, order.delivery_details.city
    );
    println!();
    for item in &order.cart_items {
        println!("    {} x {}", item.quantity, item.name);
    }
    println!();
}

/// Applies a manual status change.
///
/// Follows the API's rules (no `placed`, no backwards moves) except that an
/// operator may also mark an order `paid`, for payments confirmed outside
/// the webhook.
async fn set_status(repo: &PgOrderRepository, id: Uuid, status: &str, yes: bool) -> Result<()> {
    let target: OrderStatus = status.parse()?;
    if !(target.is_operator_settable() || target == OrderStatus::Paid) {
        anyhow::bail!("Status '{}' cannot be set manually", target);
    }

    let order = find_order(repo, id).await?;
    if !order.status.can_transition_to(target) {
        anyhow::bail!("Cannot move order from '{}' to '{}'", order.status, target);
    }

    println!(
        "  Order {}: {} → {}",
        order.id.to_string().bright_black(),
        order.status.as_str().yellow(),
        target.as_str().green()
    );
    println!();

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Apply this change?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    repo.update_status(id, target)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to update order: {}", e))?
        .context("Order not found")?;

    println!("{}", "✅ Order updated".green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
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
