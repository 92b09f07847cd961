//! Time command - current UTC time.

use crate::commands::CommandHandler;
use crate::error::BotResult;
use crate::interaction::Invocation;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
pub fn format_utc(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub struct TimeHandler {
    emoji: String,
}

impl TimeHandler {
    pub fn new(emoji: impl Into<String>) -> Self {
        Self {
            emoji: emoji.into(),
        }
    }
}

#[async_trait]
impl CommandHandler for TimeHandler {
    fn name(&self) -> &str {
        "time"
    }

    async fn execute(&self, _invocation: &Invocation) -> BotResult<String> {
        Ok(format!("{} Current time: {}", self.emoji, format_utc(Utc::now())))
    }
}
