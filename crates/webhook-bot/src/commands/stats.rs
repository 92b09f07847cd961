//! Stats command - bumps and reports the usage counter.

use crate::commands::{format_utc, CommandHandler};
use crate::error::BotResult;
use crate::interaction::Invocation;
use async_trait::async_trait;
use counter_store::CounterStore;
use std::sync::Arc;
use tracing::{info, warn};

pub struct StatsHandler {
    counter: Arc<dyn CounterStore>,
    key: String,
    emoji: String,
}

impl StatsHandler {
    pub fn new(
        counter: Arc<dyn CounterStore>,
        key: impl Into<String>,
        emoji: impl Into<String>,
    ) -> Self {
        Self {
            counter,
            key: key.into(),
            emoji: emoji.into(),
        }
    }
}

#[async_trait]
impl CommandHandler for StatsHandler {
    fn name(&self) -> &str {
        "stats"
    }

    fn records_usage(&self) -> bool {
        true
    }

    async fn execute(&self, _invocation: &Invocation) -> BotResult<String> {
        match self.counter.increment_and_get(&self.key).await {
            Ok(record) => {
                info!("Stats requested, counter {} at {}", self.key, record.count);

                let mut reply = format!("{} Commands processed: {}", self.emoji, record.count);
                if let Some(last_used) = record.last_used {
                    reply.push_str(&format!("\n🕐 Last used: {}", format_utc(last_used)));
                }
                Ok(reply)
            }
            Err(e) => {
                warn!("Counter store unavailable: {}", e);
                Ok(format!("{} Stats temporarily unavailable", self.emoji))
            }
        }
    }
}
