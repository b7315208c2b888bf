use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use botpulse_core::repositories::postgres::{
    PostgresBotConfigRepository, PostgresInteractionRepository, PostgresStatsRepository,
};
use botpulse_core::services::{AnalyticsService, BotRef};
use botpulse_core::{Database, Error};

#[derive(Parser, Debug)]
#[command(name = "botpulse")]
#[command(author, version, about = "Chat-bot analytics store and statistics engine")]
struct Args {
    /// Postgres connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://botpulse@localhost:5432/botpulse"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a bot for monitoring.
    AddBot {
        bot_id: String,
        name: String,
        token: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Remove a bot and all of its recorded interactions.
    RemoveBot { bot_id: String },
    /// List all monitored bots, newest first.
    ListBots,
    /// Rename a bot, change its description, or flip its active flag.
    UpdateBot {
        bot_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Record one interaction (mainly for smoke-testing a deployment).
    Track {
        bot_id: String,
        user_id: i64,
        #[arg(long, default_value = "message")]
        interaction_type: String,
        #[arg(long)]
        message: Option<String>,
    },
    /// Per-bot statistics for today.
    Stats { bot_id: String },
    /// Cross-bot statistics for today.
    GlobalStats,
    /// Daily activity timeline for a bot.
    Timeline {
        bot_id: String,
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!(error = %e, "command failed");
        return Err(e);
    }
    Ok(())
}

async fn run(args: Args) -> Result<(), Error> {
    let db = Database::new(&args.database_url).await?;
    db.migrate().await?;

    let bot_configs = Arc::new(PostgresBotConfigRepository::new(db.pool().clone()));
    let interactions = Arc::new(PostgresInteractionRepository::new(db.pool().clone()));
    let stats = Arc::new(PostgresStatsRepository::new(db.pool().clone()));
    let service = AnalyticsService::new(bot_configs, interactions, stats);

    match args.command {
        Command::AddBot {
            bot_id,
            name,
            token,
            description,
        } => {
            let config = service
                .add_bot(&bot_id, &name, &token, description.as_deref())
                .await?;
            println!("registered {} ({})", config.name, config.bot_id);
        }

        Command::RemoveBot { bot_id } => {
            if service.remove_bot(&bot_id).await? {
                println!("removed {}", bot_id);
            } else {
                println!("no such bot: {}", bot_id);
            }
        }

        Command::ListBots => {
            let bots = service.list_bots().await?;
            if bots.is_empty() {
                println!("no bots registered");
            }
            for bot in bots {
                let state = if bot.is_active { "active" } else { "inactive" };
                println!(
                    "{:<20} {:<24} {}  since {}",
                    bot.bot_id,
                    bot.name,
                    state,
                    bot.created_at.format("%Y-%m-%d")
                );
            }
        }

        Command::UpdateBot {
            bot_id,
            name,
            description,
            active,
        } => {
            let mut config = service
                .get_bot(&bot_id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("bot '{}'", bot_id)))?;
            if let Some(name) = name {
                config.name = name;
            }
            if let Some(description) = description {
                config.description = Some(description);
            }
            if let Some(active) = active {
                config.is_active = active;
            }
            let updated = service.update_bot(&config).await?;
            println!("updated {} ({})", updated.name, updated.bot_id);
        }

        Command::Track {
            bot_id,
            user_id,
            interaction_type,
            message,
        } => {
            service
                .track_interaction(
                    BotRef::Id(&bot_id),
                    user_id,
                    &interaction_type,
                    Utc::now(),
                    None,
                    None,
                    None,
                    None,
                    message.as_deref(),
                )
                .await?;
            info!(bot_id = %bot_id, user_id, "interaction recorded");
        }

        Command::Stats { bot_id } => {
            let stats = service.bot_statistics(&bot_id).await?;
            println!("{} ({})", stats.bot_name, stats.bot_id);
            println!("  total users:          {}", stats.total_users);
            println!("  daily active users:   {}", stats.daily_active_users);
            println!("  weekly active users:  {}", stats.weekly_active_users);
            println!("  monthly active users: {}", stats.monthly_active_users);
            println!("  new users today:      {}", stats.new_users_today);
            println!("  total interactions:   {}", stats.total_interactions);
            match stats.last_interaction {
                Some(ts) => println!("  last interaction:     {}", ts.format("%Y-%m-%d %H:%M:%S")),
                None => println!("  last interaction:     never"),
            }
        }

        Command::GlobalStats => {
            let stats = service.global_statistics().await?;
            println!("bots:               {}", stats.total_bots);
            println!("active today:       {}", stats.active_bots);
            println!("users (all-time):   {}", stats.total_users_across_bots);
            println!("interactions today: {}", stats.total_interactions_today);
            println!(
                "most active today:  {}",
                stats.most_active_bot.as_deref().unwrap_or("-")
            );
            println!(
                "least active today: {}",
                stats.least_active_bot.as_deref().unwrap_or("-")
            );
        }

        Command::Timeline { bot_id, days } => {
            let timeline = service.activity_timeline(&bot_id, Some(days)).await?;
            println!("{:<12} {:>12} {:>14}", "date", "unique users", "interactions");
            for day in timeline {
                println!(
                    "{:<12} {:>12} {:>14}",
                    day.date, day.unique_users, day.total_interactions
                );
            }
        }
    }

    Ok(())
}
