use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user interaction event, append-only.
///
/// The optional user fields are a snapshot of the user as seen at interaction
/// time; they are never updated retroactively.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct UserInteraction {
    pub bot_id: String,
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub language_code: Option<String>,
    pub interaction_type: String,
    pub timestamp: DateTime<Utc>,
    pub message_text: Option<String>,
}
