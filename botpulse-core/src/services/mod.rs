pub mod analytics_service;

pub use analytics_service::{AnalyticsService, BotRef, DEFAULT_TIMELINE_DAYS};
