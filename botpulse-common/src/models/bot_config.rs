use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Configuration record for a monitored bot.
///
/// `bot_id` and `token` are fixed at creation; `name`, `description` and
/// `is_active` may change over the bot's lifetime.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct BotConfig {
    pub bot_id: String,
    pub name: String,
    pub token: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl BotConfig {
    pub fn new(bot_id: &str, name: &str, token: &str, description: Option<&str>) -> Self {
        Self {
            bot_id: bot_id.to_string(),
            name: name.to_string(),
            token: token.to_string(),
            description: description.map(String::from),
            created_at: Utc::now(),
            is_active: true,
        }
    }
}
