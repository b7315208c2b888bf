use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Error;
use crate::models::bot_config::BotConfig;
use crate::models::interaction::UserInteraction;
use crate::models::stats::{ActivityDay, BotStats, GlobalStats};

/// CRUD over bot configuration records.
#[async_trait]
pub trait BotConfigRepository: Send + Sync {
    /// Insert a new bot. Fails with `Error::DuplicateKey` when the `bot_id`
    /// or `token` is already taken.
    async fn create(&self, config: &BotConfig) -> Result<(), Error>;

    async fn get_by_id(&self, bot_id: &str) -> Result<Option<BotConfig>, Error>;

    async fn get_by_token(&self, token: &str) -> Result<Option<BotConfig>, Error>;

    /// All bots, newest first.
    async fn get_all(&self) -> Result<Vec<BotConfig>, Error>;

    /// Apply `name`, `description` and `is_active` from `config`. The id,
    /// token and creation time are immutable. Returns the stored record
    /// after the update.
    async fn update(&self, config: &BotConfig) -> Result<BotConfig, Error>;

    /// Remove a bot together with every interaction it owns, atomically.
    /// Returns whether a bot row was actually removed.
    async fn delete(&self, bot_id: &str) -> Result<bool, Error>;
}

/// Append-only ingestion of interaction events.
#[async_trait]
pub trait InteractionRepo: Send + Sync {
    /// Append one event. No read-before-write; the store's foreign key is
    /// the only validation.
    async fn record_interaction(&self, interaction: &UserInteraction) -> Result<(), Error>;
}

/// Windowed aggregate queries over the interaction log.
///
/// Date-scoped metrics bucket event timestamps into *local* calendar days.
/// Unknown bots yield zero-filled results, not errors.
#[async_trait]
pub trait StatsRepo: Send + Sync {
    async fn get_bot_stats(&self, bot_id: &str, target_date: NaiveDate) -> Result<BotStats, Error>;

    async fn get_global_stats(&self, target_date: NaiveDate) -> Result<GlobalStats, Error>;

    /// A dense series of exactly `days` entries ending today, ascending,
    /// zero-filled for days without activity.
    async fn get_activity_timeline(&self, bot_id: &str, days: i64)
        -> Result<Vec<ActivityDay>, Error>;
}
