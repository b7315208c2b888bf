// src/repositories/postgres/interactions.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use botpulse_common::models::UserInteraction;
use botpulse_common::traits::repository_traits::InteractionRepo;
use crate::Error;

/// Append-only recorder for interaction events. Called at high frequency, so
/// each record is a single INSERT; the `bot_id` foreign key is the only
/// validation applied.
#[derive(Clone)]
pub struct PostgresInteractionRepository {
    pool: Pool<Postgres>,
}

impl PostgresInteractionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InteractionRepo for PostgresInteractionRepository {
    async fn record_interaction(&self, interaction: &UserInteraction) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO user_interactions (
                bot_id, user_id, username, first_name, last_name,
                language_code, interaction_type, timestamp, message_text
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
            .bind(&interaction.bot_id)
            .bind(interaction.user_id)
            .bind(&interaction.username)
            .bind(&interaction.first_name)
            .bind(&interaction.last_name)
            .bind(&interaction.language_code)
            .bind(&interaction.interaction_type)
            .bind(interaction.timestamp)
            .bind(&interaction.message_text)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
