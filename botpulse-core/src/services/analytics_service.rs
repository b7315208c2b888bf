use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use botpulse_common::models::{ActivityDay, BotConfig, BotStats, GlobalStats, UserInteraction};
use botpulse_common::traits::repository_traits::{BotConfigRepository, InteractionRepo, StatsRepo};
use crate::utils::time::local_today;
use crate::Error;

pub const DEFAULT_TIMELINE_DAYS: i64 = 7;

/// How a tracked interaction names its bot: producers that only hold the
/// bot's token don't need to know its id.
pub enum BotRef<'a> {
    Id(&'a str),
    Token(&'a str),
}

/// Use-case layer over the repositories: bot registration and removal,
/// interaction tracking, and today-scoped statistics lookups.
pub struct AnalyticsService {
    bot_configs: Arc<dyn BotConfigRepository>,
    interactions: Arc<dyn InteractionRepo>,
    stats: Arc<dyn StatsRepo>,
}

impl AnalyticsService {
    pub fn new(
        bot_configs: Arc<dyn BotConfigRepository>,
        interactions: Arc<dyn InteractionRepo>,
        stats: Arc<dyn StatsRepo>,
    ) -> Self {
        Self {
            bot_configs,
            interactions,
            stats,
        }
    }

    /// Register a bot for monitoring. The id and token are checked up front
    /// so the caller gets a message naming the conflicting bot; the store's
    /// unique constraints still backstop a concurrent create.
    pub async fn add_bot(
        &self,
        bot_id: &str,
        name: &str,
        token: &str,
        description: Option<&str>,
    ) -> Result<BotConfig, Error> {
        if let Some(existing) = self.bot_configs.get_by_id(bot_id).await? {
            return Err(Error::DuplicateKey(format!(
                "bot {} ({}) already exists",
                bot_id, existing.name
            )));
        }
        if let Some(existing) = self.bot_configs.get_by_token(token).await? {
            return Err(Error::DuplicateKey(format!(
                "token already registered for {} ({})",
                existing.name, existing.bot_id
            )));
        }

        let config = BotConfig::new(bot_id, name, token, description);
        self.bot_configs.create(&config).await?;
        Ok(config)
    }

    /// Remove a bot and every interaction it owns. Returns whether a bot
    /// was actually removed.
    pub async fn remove_bot(&self, bot_id: &str) -> Result<bool, Error> {
        self.bot_configs.delete(bot_id).await
    }

    /// All monitored bots, newest first.
    pub async fn list_bots(&self) -> Result<Vec<BotConfig>, Error> {
        self.bot_configs.get_all().await
    }

    pub async fn get_bot(&self, bot_id: &str) -> Result<Option<BotConfig>, Error> {
        self.bot_configs.get_by_id(bot_id).await
    }

    pub async fn get_bot_by_token(&self, token: &str) -> Result<Option<BotConfig>, Error> {
        self.bot_configs.get_by_token(token).await
    }

    pub async fn update_bot(&self, config: &BotConfig) -> Result<BotConfig, Error> {
        self.bot_configs.update(config).await
    }

    /// Record one interaction. An unknown bot id or token is logged and
    /// dropped rather than surfaced: event producers fire and forget, they
    /// have no way to handle a rejection.
    #[allow(clippy::too_many_arguments)]
    pub async fn track_interaction(
        &self,
        bot: BotRef<'_>,
        user_id: i64,
        interaction_type: &str,
        timestamp: DateTime<Utc>,
        username: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
        language_code: Option<&str>,
        message_text: Option<&str>,
    ) -> Result<(), Error> {
        let bot_id = match bot {
            BotRef::Id(id) => match self.bot_configs.get_by_id(id).await? {
                Some(config) => config.bot_id,
                None => {
                    warn!(bot_id = id, "dropping interaction for unknown bot id");
                    return Ok(());
                }
            },
            BotRef::Token(token) => match self.bot_configs.get_by_token(token).await? {
                Some(config) => config.bot_id,
                None => {
                    warn!("dropping interaction for unknown bot token");
                    return Ok(());
                }
            },
        };

        let interaction = UserInteraction {
            bot_id,
            user_id,
            username: username.map(String::from),
            first_name: first_name.map(String::from),
            last_name: last_name.map(String::from),
            language_code: language_code.map(String::from),
            interaction_type: interaction_type.to_string(),
            timestamp,
            message_text: message_text.map(String::from),
        };
        self.interactions.record_interaction(&interaction).await?;
        debug!(
            bot_id = %interaction.bot_id,
            user_id,
            interaction_type,
            "interaction tracked"
        );
        Ok(())
    }

    /// Statistics for one monitored bot, scoped to today. Unlike the raw
    /// stats query, an unknown bot is an error here: the caller asked for a
    /// bot that is not being monitored.
    pub async fn bot_statistics(&self, bot_id: &str) -> Result<BotStats, Error> {
        if self.bot_configs.get_by_id(bot_id).await?.is_none() {
            return Err(Error::NotFound(format!("bot '{}'", bot_id)));
        }
        self.stats.get_bot_stats(bot_id, local_today()).await
    }

    pub async fn global_statistics(&self) -> Result<GlobalStats, Error> {
        self.stats.get_global_stats(local_today()).await
    }

    pub async fn activity_timeline(
        &self,
        bot_id: &str,
        days: Option<i64>,
    ) -> Result<Vec<ActivityDay>, Error> {
        if self.bot_configs.get_by_id(bot_id).await?.is_none() {
            return Err(Error::NotFound(format!("bot '{}'", bot_id)));
        }
        self.stats
            .get_activity_timeline(bot_id, days.unwrap_or(DEFAULT_TIMELINE_DAYS))
            .await
    }
}
