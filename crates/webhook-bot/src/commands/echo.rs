//! Echo command - repeats the caller's text.

use crate::commands::CommandHandler;
use crate::error::BotResult;
use crate::interaction::Invocation;
use async_trait::async_trait;

#[derive(Default)]
pub struct EchoHandler;

impl EchoHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandHandler for EchoHandler {
    fn name(&self) -> &str {
        "echo"
    }

    async fn execute(&self, invocation: &Invocation) -> BotResult<String> {
        let text = invocation.text();
        if text.trim().is_empty() {
            return Ok(format!(
                "🔊 {} didn't give me anything to repeat. Try `/echo hello`.",
                invocation.user
            ));
        }

        Ok(format!("🔊 {} says: {}", invocation.user, text))
    }
}
