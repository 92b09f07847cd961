//! Ping command - liveness acknowledgement.

use crate::commands::CommandHandler;
use crate::error::BotResult;
use crate::interaction::Invocation;
use async_trait::async_trait;

pub struct PingHandler {
    mention_user: bool,
}

impl PingHandler {
    pub fn new(mention_user: bool) -> Self {
        Self { mention_user }
    }
}

#[async_trait]
impl CommandHandler for PingHandler {
    fn name(&self) -> &str {
        "ping"
    }

    async fn execute(&self, invocation: &Invocation) -> BotResult<String> {
        if self.mention_user {
            Ok(format!("🏓 Pong! Hi {}, the bot is alive ✅", invocation.user))
        } else {
            Ok("🏓 Pong! The bot is alive ✅".into())
        }
    }
}
