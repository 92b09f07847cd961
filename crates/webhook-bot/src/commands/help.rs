//! Help command - displays available commands.

use crate::commands::CommandHandler;
use crate::error::BotResult;
use crate::interaction::Invocation;
use async_trait::async_trait;

pub struct HelpHandler;

impl HelpHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HelpHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for HelpHandler {
    fn name(&self) -> &str {
        "help"
    }

    async fn execute(&self, _invocation: &Invocation) -> BotResult<String> {
        Ok(r#"**Available commands:**
• `/help` - Show this help
• `/joke` - Tell a programming joke
• `/time` - Show the current UTC time
• `/stats` - Show how many commands the bot has processed
• `/ping` - Check that the bot is alive
• `/echo <text>` - Repeat your text back

Commands also work as messages starting with `!`, e.g. `!joke`."#
            .into())
    }
}
