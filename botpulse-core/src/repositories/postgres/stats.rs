// src/repositories/postgres/stats.rs

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Postgres, Row};
use tracing::warn;

use botpulse_common::models::{ActivityDay, BotStats, GlobalStats};
use botpulse_common::traits::repository_traits::StatsRepo;
use crate::utils::time::{date_sequence, day_range, local_date_of, local_today, trailing_window};
use crate::Error;

/// Placeholder name when stats are requested for a bot that has no
/// configuration record (deleted or never registered).
const UNKNOWN_BOT_NAME: &str = "Unknown Bot";

/// Statistics engine over the raw interaction log. Every query recomputes
/// from the log; nothing here is cached or persisted.
///
/// Day-scoped metrics treat a calendar day D as the half-open instant range
/// `[local midnight of D, local midnight of D+1)`, which is equivalent to
/// truncating each event timestamp to its local calendar date and lets the
/// `(bot_id, timestamp)` index drive the scan.
#[derive(Clone)]
pub struct PostgresStatsRepository {
    pool: Pool<Postgres>,
}

impl PostgresStatsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Distinct users of one bot with an event in `[from, until)`.
    async fn active_users_between(
        &self,
        bot_id: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<i64, Error> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(DISTINCT user_id) AS count
            FROM user_interactions
            WHERE bot_id = $1 AND timestamp >= $2 AND timestamp < $3
            "#,
        )
            .bind(bot_id)
            .bind(from)
            .bind(until)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("count")?)
    }

    /// The bot with the highest (or lowest) interaction count in
    /// `[from, until)`, among bots with at least one event there. Ties
    /// resolve to the lexically smaller bot_id.
    async fn ranked_bot(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        most_active: bool,
    ) -> Result<Option<String>, Error> {
        let sql = if most_active {
            r#"
            SELECT bot_id, COUNT(*) AS interaction_count
            FROM user_interactions
            WHERE timestamp >= $1 AND timestamp < $2
            GROUP BY bot_id
            ORDER BY interaction_count DESC, bot_id ASC
            LIMIT 1
            "#
        } else {
            r#"
            SELECT bot_id, COUNT(*) AS interaction_count
            FROM user_interactions
            WHERE timestamp >= $1 AND timestamp < $2
            GROUP BY bot_id
            ORDER BY interaction_count ASC, bot_id ASC
            LIMIT 1
            "#
        };

        let row = sqlx::query(sql)
            .bind(from)
            .bind(until)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(r.try_get("bot_id")?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl StatsRepo for PostgresStatsRepository {
    async fn get_bot_stats(&self, bot_id: &str, target_date: NaiveDate) -> Result<BotStats, Error> {
        let bot_row = sqlx::query("SELECT name FROM bot_configs WHERE bot_id = $1")
            .bind(bot_id)
            .fetch_optional(&self.pool)
            .await?;

        let bot_name: String = match bot_row {
            Some(r) => r.try_get("name")?,
            None => {
                warn!(bot_id, "stats requested for unknown bot");
                UNKNOWN_BOT_NAME.to_string()
            }
        };

        let row = sqlx::query(
            r#"
            SELECT COUNT(DISTINCT user_id) AS total_users,
                   COUNT(*) AS total_interactions,
                   MAX(timestamp) AS last_interaction
            FROM user_interactions
            WHERE bot_id = $1
            "#,
        )
            .bind(bot_id)
            .fetch_one(&self.pool)
            .await?;

        let total_users: i64 = row.try_get("total_users")?;
        let total_interactions: i64 = row.try_get("total_interactions")?;
        let last_interaction: Option<DateTime<Utc>> = row.try_get("last_interaction")?;

        let (day_from, day_until) = day_range(target_date);
        let daily_active_users = self.active_users_between(bot_id, day_from, day_until).await?;

        let (week_from, week_until) = trailing_window(target_date, 7);
        let weekly_active_users = self
            .active_users_between(bot_id, week_from, week_until)
            .await?;

        let (month_from, month_until) = trailing_window(target_date, 30);
        let monthly_active_users = self
            .active_users_between(bot_id, month_from, month_until)
            .await?;

        // A user is new on the target date when their earliest event falls
        // on it. The earliest instant and the earliest local date coincide
        // (the instant-to-local-date mapping is monotone), so comparing
        // MIN(timestamp) against the day's range is enough.
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count
            FROM (
                SELECT user_id, MIN(timestamp) AS first_seen
                FROM user_interactions
                WHERE bot_id = $1
                GROUP BY user_id
            ) firsts
            WHERE first_seen >= $2 AND first_seen < $3
            "#,
        )
            .bind(bot_id)
            .bind(day_from)
            .bind(day_until)
            .fetch_one(&self.pool)
            .await?;

        let new_users_today: i64 = row.try_get("count")?;

        Ok(BotStats {
            bot_id: bot_id.to_string(),
            bot_name,
            total_users,
            daily_active_users,
            weekly_active_users,
            monthly_active_users,
            new_users_today,
            total_interactions,
            last_interaction,
        })
    }

    async fn get_global_stats(&self, target_date: NaiveDate) -> Result<GlobalStats, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM bot_configs")
            .fetch_one(&self.pool)
            .await?;
        let total_bots: i64 = row.try_get("count")?;

        let (from, until) = day_range(target_date);

        let row = sqlx::query(
            r#"
            SELECT COUNT(DISTINCT bot_id) AS active_bots,
                   COUNT(*) AS interactions_today
            FROM user_interactions
            WHERE timestamp >= $1 AND timestamp < $2
            "#,
        )
            .bind(from)
            .bind(until)
            .fetch_one(&self.pool)
            .await?;

        let active_bots: i64 = row.try_get("active_bots")?;
        let total_interactions_today: i64 = row.try_get("interactions_today")?;

        // All-time reach, deliberately not scoped to the target date.
        let row = sqlx::query("SELECT COUNT(DISTINCT user_id) AS count FROM user_interactions")
            .fetch_one(&self.pool)
            .await?;
        let total_users_across_bots: i64 = row.try_get("count")?;

        let most_active_bot = self.ranked_bot(from, until, true).await?;
        let least_active_bot = self.ranked_bot(from, until, false).await?;

        Ok(GlobalStats {
            total_bots,
            active_bots,
            total_users_across_bots,
            total_interactions_today,
            most_active_bot,
            least_active_bot,
        })
    }

    async fn get_activity_timeline(
        &self,
        bot_id: &str,
        days: i64,
    ) -> Result<Vec<ActivityDay>, Error> {
        let today = local_today();
        let dates = date_sequence(today, days);
        if dates.is_empty() {
            return Ok(Vec::new());
        }

        let (from, until) = trailing_window(today, days);

        let rows = sqlx::query(
            r#"
            SELECT user_id, timestamp
            FROM user_interactions
            WHERE bot_id = $1 AND timestamp >= $2 AND timestamp < $3
            "#,
        )
            .bind(bot_id)
            .bind(from)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;

        let mut buckets: HashMap<NaiveDate, (HashSet<i64>, i64)> = HashMap::new();
        for row in rows {
            let user_id: i64 = row.try_get("user_id")?;
            let ts: DateTime<Utc> = row.try_get("timestamp")?;
            let entry = buckets.entry(local_date_of(ts)).or_default();
            entry.0.insert(user_id);
            entry.1 += 1;
        }

        // Consumers chart this series, so it must be dense: one entry per
        // calendar day, zero-filled where the log has nothing.
        Ok(dates
            .into_iter()
            .map(|date| {
                let (unique_users, total_interactions) = buckets
                    .get(&date)
                    .map(|(users, count)| (users.len() as i64, *count))
                    .unwrap_or((0, 0));
                ActivityDay {
                    date,
                    unique_users,
                    total_interactions,
                }
            })
            .collect())
    }
}
