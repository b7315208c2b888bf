// src/repositories/mod.rs

pub mod postgres;

pub use postgres::bot_config::PostgresBotConfigRepository;
pub use postgres::interactions::PostgresInteractionRepository;
pub use postgres::stats::PostgresStatsRepository;
