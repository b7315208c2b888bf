// File: botpulse-core/tests/stats_tests.rs

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use botpulse_common::models::{BotConfig, UserInteraction};
use botpulse_common::traits::repository_traits::{
    BotConfigRepository, InteractionRepo, StatsRepo,
};
use botpulse_core::repositories::postgres::{
    PostgresBotConfigRepository, PostgresInteractionRepository, PostgresStatsRepository,
};
use botpulse_core::test_utils::helpers::*;
use botpulse_core::utils::time::{local_day_start, local_today};
use botpulse_core::Error;

/// An instant safely inside the local calendar day `days_ago` days back.
fn noon_days_ago(days_ago: i64) -> DateTime<Utc> {
    local_day_start(local_today() - Duration::days(days_ago)) + Duration::hours(12)
}

fn day(days_ago: i64) -> NaiveDate {
    local_today() - Duration::days(days_ago)
}

fn event_at(bot_id: &str, user_id: i64, timestamp: DateTime<Utc>) -> UserInteraction {
    UserInteraction {
        bot_id: bot_id.to_string(),
        user_id,
        username: None,
        first_name: None,
        last_name: None,
        language_code: None,
        interaction_type: "message".to_string(),
        timestamp,
        message_text: None,
    }
}

async fn register_bot(repo: &PostgresBotConfigRepository, bot_id: &str) -> Result<(), Error> {
    repo.create(&BotConfig::new(
        bot_id,
        &format!("{bot_id} bot"),
        &Uuid::new_v4().to_string(),
        None,
    ))
    .await
}

#[tokio::test]
async fn test_active_user_windows() -> Result<(), Error> {
    let _guard = db_guard().await;
    let db = setup_test_database().await?;
    let bots = PostgresBotConfigRepository::new(db.pool().clone());
    let recorder = PostgresInteractionRepository::new(db.pool().clone());
    let stats = PostgresStatsRepository::new(db.pool().clone());

    register_bot(&bots, "windows").await?;
    // One distinct user per day: D-10, D-5, D-1, D.
    for (user_id, days_ago) in [(1, 10), (2, 5), (3, 1), (4, 0)] {
        recorder
            .record_interaction(&event_at("windows", user_id, noon_days_ago(days_ago)))
            .await?;
    }

    let s = stats.get_bot_stats("windows", local_today()).await?;
    assert_eq!(s.total_users, 4);
    assert_eq!(s.daily_active_users, 1);
    // The 7-day trailing window [D-6, D] keeps D-5, D-1 and D but not D-10.
    assert_eq!(s.weekly_active_users, 3);
    // The 30-day window keeps all four.
    assert_eq!(s.monthly_active_users, 4);
    assert_eq!(s.total_interactions, 4);

    Ok(())
}

#[tokio::test]
async fn test_new_user_counts_only_on_first_day() -> Result<(), Error> {
    let _guard = db_guard().await;
    let db = setup_test_database().await?;
    let bots = PostgresBotConfigRepository::new(db.pool().clone());
    let recorder = PostgresInteractionRepository::new(db.pool().clone());
    let stats = PostgresStatsRepository::new(db.pool().clone());

    register_bot(&bots, "firsts").await?;
    recorder
        .record_interaction(&event_at("firsts", 9, noon_days_ago(1)))
        .await?;
    recorder
        .record_interaction(&event_at("firsts", 9, noon_days_ago(0)))
        .await?;

    let yesterday = stats.get_bot_stats("firsts", day(1)).await?;
    assert_eq!(yesterday.new_users_today, 1);

    // Returning the next day does not make the user new again.
    let today = stats.get_bot_stats("firsts", day(0)).await?;
    assert_eq!(today.new_users_today, 0);
    assert_eq!(today.daily_active_users, 1);

    Ok(())
}

#[tokio::test]
async fn test_two_user_scenario() -> Result<(), Error> {
    let _guard = db_guard().await;
    let db = setup_test_database().await?;
    let bots = PostgresBotConfigRepository::new(db.pool().clone());
    let recorder = PostgresInteractionRepository::new(db.pool().clone());
    let stats = PostgresStatsRepository::new(db.pool().clone());

    register_bot(&bots, "scenario").await?;
    // User 1 interacts yesterday and today, user 2 only today.
    let latest = noon_days_ago(0);
    recorder
        .record_interaction(&event_at("scenario", 1, noon_days_ago(1)))
        .await?;
    recorder
        .record_interaction(&event_at("scenario", 1, latest - Duration::minutes(5)))
        .await?;
    recorder
        .record_interaction(&event_at("scenario", 2, latest))
        .await?;

    let s = stats.get_bot_stats("scenario", local_today()).await?;
    assert_eq!(s.bot_name, "scenario bot");
    assert_eq!(s.total_users, 2);
    assert_eq!(s.daily_active_users, 2);
    assert_eq!(s.new_users_today, 1);
    assert_eq!(s.total_interactions, 3);
    assert_eq!(s.last_interaction, Some(latest));

    Ok(())
}

#[tokio::test]
async fn test_unknown_bot_stats_are_zero_filled() -> Result<(), Error> {
    let _guard = db_guard().await;
    let db = setup_test_database().await?;
    let stats = PostgresStatsRepository::new(db.pool().clone());

    let s = stats.get_bot_stats("nonexistent", local_today()).await?;
    assert_eq!(s.bot_name, "Unknown Bot");
    assert_eq!(s.total_users, 0);
    assert_eq!(s.daily_active_users, 0);
    assert_eq!(s.weekly_active_users, 0);
    assert_eq!(s.monthly_active_users, 0);
    assert_eq!(s.new_users_today, 0);
    assert_eq!(s.total_interactions, 0);
    assert!(s.last_interaction.is_none());

    Ok(())
}

#[tokio::test]
async fn test_timeline_is_dense_without_events() -> Result<(), Error> {
    let _guard = db_guard().await;
    let db = setup_test_database().await?;
    let bots = PostgresBotConfigRepository::new(db.pool().clone());
    let stats = PostgresStatsRepository::new(db.pool().clone());

    register_bot(&bots, "quiet").await?;

    let timeline = stats.get_activity_timeline("quiet", 7).await?;
    assert_eq!(timeline.len(), 7);
    assert_eq!(timeline[0].date, day(6));
    assert_eq!(timeline[6].date, day(0));
    for pair in timeline.windows(2) {
        assert!(pair[0].date < pair[1].date);
    }
    for entry in &timeline {
        assert_eq!(entry.unique_users, 0);
        assert_eq!(entry.total_interactions, 0);
    }

    Ok(())
}

#[tokio::test]
async fn test_timeline_fills_gaps_between_active_days() -> Result<(), Error> {
    let _guard = db_guard().await;
    let db = setup_test_database().await?;
    let bots = PostgresBotConfigRepository::new(db.pool().clone());
    let recorder = PostgresInteractionRepository::new(db.pool().clone());
    let stats = PostgresStatsRepository::new(db.pool().clone());

    register_bot(&bots, "bursty").await?;
    // Two users today, one user twice the day before yesterday.
    recorder
        .record_interaction(&event_at("bursty", 1, noon_days_ago(0)))
        .await?;
    recorder
        .record_interaction(&event_at("bursty", 2, noon_days_ago(0)))
        .await?;
    recorder
        .record_interaction(&event_at("bursty", 3, noon_days_ago(2)))
        .await?;
    recorder
        .record_interaction(&event_at("bursty", 3, noon_days_ago(2) + Duration::hours(1)))
        .await?;

    let timeline = stats.get_activity_timeline("bursty", 7).await?;
    assert_eq!(timeline.len(), 7);

    let today = &timeline[6];
    assert_eq!((today.unique_users, today.total_interactions), (2, 2));

    let burst_day = &timeline[4];
    assert_eq!(burst_day.date, day(2));
    assert_eq!((burst_day.unique_users, burst_day.total_interactions), (1, 2));

    // The day in between is present and zeroed, not missing.
    let gap = &timeline[5];
    assert_eq!(gap.date, day(1));
    assert_eq!((gap.unique_users, gap.total_interactions), (0, 0));

    Ok(())
}

#[tokio::test]
async fn test_global_stats() -> Result<(), Error> {
    let _guard = db_guard().await;
    let db = setup_test_database().await?;
    let bots = PostgresBotConfigRepository::new(db.pool().clone());
    let recorder = PostgresInteractionRepository::new(db.pool().clone());
    let stats = PostgresStatsRepository::new(db.pool().clone());

    register_bot(&bots, "alpha").await?;
    register_bot(&bots, "beta").await?;
    register_bot(&bots, "gamma").await?;

    // alpha: two events today; beta: one event today; gamma: yesterday only.
    recorder
        .record_interaction(&event_at("alpha", 1, noon_days_ago(0)))
        .await?;
    recorder
        .record_interaction(&event_at("alpha", 2, noon_days_ago(0)))
        .await?;
    recorder
        .record_interaction(&event_at("beta", 1, noon_days_ago(0)))
        .await?;
    recorder
        .record_interaction(&event_at("gamma", 3, noon_days_ago(1)))
        .await?;

    let g = stats.get_global_stats(local_today()).await?;
    assert_eq!(g.total_bots, 3);
    assert_eq!(g.active_bots, 2);
    // All-time distinct users, not scoped to today: gamma's user counts.
    assert_eq!(g.total_users_across_bots, 3);
    assert_eq!(g.total_interactions_today, 3);
    assert_eq!(g.most_active_bot.as_deref(), Some("alpha"));
    assert_eq!(g.least_active_bot.as_deref(), Some("beta"));

    Ok(())
}

#[tokio::test]
async fn test_global_stats_tie_breaks_on_bot_id() -> Result<(), Error> {
    let _guard = db_guard().await;
    let db = setup_test_database().await?;
    let bots = PostgresBotConfigRepository::new(db.pool().clone());
    let recorder = PostgresInteractionRepository::new(db.pool().clone());
    let stats = PostgresStatsRepository::new(db.pool().clone());

    register_bot(&bots, "alpha").await?;
    register_bot(&bots, "beta").await?;
    recorder
        .record_interaction(&event_at("alpha", 1, noon_days_ago(0)))
        .await?;
    recorder
        .record_interaction(&event_at("beta", 2, noon_days_ago(0)))
        .await?;

    // Equal counts on both sides resolve to the lexically smaller bot_id.
    let g = stats.get_global_stats(local_today()).await?;
    assert_eq!(g.most_active_bot.as_deref(), Some("alpha"));
    assert_eq!(g.least_active_bot.as_deref(), Some("alpha"));

    Ok(())
}

#[tokio::test]
async fn test_global_stats_on_a_quiet_day() -> Result<(), Error> {
    let _guard = db_guard().await;
    let db = setup_test_database().await?;
    let bots = PostgresBotConfigRepository::new(db.pool().clone());
    let recorder = PostgresInteractionRepository::new(db.pool().clone());
    let stats = PostgresStatsRepository::new(db.pool().clone());

    register_bot(&bots, "idle").await?;
    recorder
        .record_interaction(&event_at("idle", 1, noon_days_ago(1)))
        .await?;

    let g = stats.get_global_stats(local_today()).await?;
    assert_eq!(g.total_bots, 1);
    assert_eq!(g.active_bots, 0);
    assert_eq!(g.total_interactions_today, 0);
    assert!(g.most_active_bot.is_none());
    assert!(g.least_active_bot.is_none());

    Ok(())
}
