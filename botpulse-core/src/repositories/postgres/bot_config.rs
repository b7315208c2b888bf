// src/repositories/postgres/bot_config.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::info;

use botpulse_common::models::BotConfig;
use botpulse_common::traits::repository_traits::BotConfigRepository;
use crate::Error;

/// Postgres-backed bot configuration repository.
#[derive(Clone)]
pub struct PostgresBotConfigRepository {
    pool: Pool<Postgres>,
}

impl PostgresBotConfigRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Turn a unique-constraint violation on `bot_configs` into a `DuplicateKey`
/// error that names the offending column. Anything else passes through as a
/// store error.
fn classify_create_error(err: sqlx::Error, config: &BotConfig) -> Error {
    if let sqlx::Error::Database(ref db_err) = err {
        // 23505 => unique_violation
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("");
            return if constraint.contains("token") {
                Error::DuplicateKey(format!(
                    "token already registered (while creating bot_id={})",
                    config.bot_id
                ))
            } else {
                Error::DuplicateKey(format!("bot_id '{}' already exists", config.bot_id))
            };
        }
    }
    Error::Database(err)
}

#[async_trait]
impl BotConfigRepository for PostgresBotConfigRepository {
    async fn create(&self, config: &BotConfig) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO bot_configs (
                bot_id, name, token, description, created_at, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
            .bind(&config.bot_id)
            .bind(&config.name)
            .bind(&config.token)
            .bind(&config.description)
            .bind(config.created_at)
            .bind(config.is_active)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                info!(bot_id = %config.bot_id, name = %config.name, "created bot config");
                Ok(())
            }
            Err(e) => Err(classify_create_error(e, config)),
        }
    }

    async fn get_by_id(&self, bot_id: &str) -> Result<Option<BotConfig>, Error> {
        let row = sqlx::query_as::<_, BotConfig>(
            r#"
            SELECT bot_id, name, token, description, created_at, is_active
            FROM bot_configs
            WHERE bot_id = $1
            "#,
        )
            .bind(bot_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<BotConfig>, Error> {
        let row = sqlx::query_as::<_, BotConfig>(
            r#"
            SELECT bot_id, name, token, description, created_at, is_active
            FROM bot_configs
            WHERE token = $1
            "#,
        )
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn get_all(&self) -> Result<Vec<BotConfig>, Error> {
        let rows = sqlx::query_as::<_, BotConfig>(
            r#"
            SELECT bot_id, name, token, description, created_at, is_active
            FROM bot_configs
            ORDER BY created_at DESC
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn update(&self, config: &BotConfig) -> Result<BotConfig, Error> {
        // bot_id, token and created_at are immutable; only the mutable
        // columns appear in the SET list.
        sqlx::query(
            r#"
            UPDATE bot_configs
            SET name = $1,
                description = $2,
                is_active = $3
            WHERE bot_id = $4
            "#,
        )
            .bind(&config.name)
            .bind(&config.description)
            .bind(config.is_active)
            .bind(&config.bot_id)
            .execute(&self.pool)
            .await?;

        self.get_by_id(&config.bot_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("bot '{}'", config.bot_id)))
    }

    async fn delete(&self, bot_id: &str) -> Result<bool, Error> {
        // Both deletes run in one transaction; the schema-level FK cascade
        // is the backstop.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_interactions WHERE bot_id = $1")
            .bind(bot_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM bot_configs WHERE bot_id = $1")
            .bind(bot_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!(bot_id, "deleted bot config and its interactions");
        }
        Ok(removed)
    }
}
