use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Statistics for a single bot, computed relative to a target date.
/// Derived from the interaction log on every query; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct BotStats {
    pub bot_id: String,
    pub bot_name: String,
    pub total_users: i64,
    pub daily_active_users: i64,
    pub weekly_active_users: i64,
    pub monthly_active_users: i64,
    pub new_users_today: i64,
    pub total_interactions: i64,
    pub last_interaction: Option<DateTime<Utc>>,
}

/// Cross-bot statistics for a target date.
///
/// `total_users_across_bots` is an all-time distinct count while
/// `total_interactions_today` is date-scoped; the asymmetry is deliberate
/// (lifetime reach next to today's volume).
#[derive(Debug, Clone, Serialize)]
pub struct GlobalStats {
    pub total_bots: i64,
    pub active_bots: i64,
    pub total_users_across_bots: i64,
    pub total_interactions_today: i64,
    pub most_active_bot: Option<String>,
    pub least_active_bot: Option<String>,
}

/// One day of a bot's activity timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityDay {
    pub date: NaiveDate,
    pub unique_users: i64,
    pub total_interactions: i64,
}
