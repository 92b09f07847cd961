//! Bot command handlers.

mod echo;
mod help;
mod joke;
mod ping;
mod stats;
mod time;

pub use echo::EchoHandler;
pub use help::HelpHandler;
pub use joke::{JokeHandler, JOKES};
pub use ping::PingHandler;
pub use stats::StatsHandler;
pub use time::{format_utc, TimeHandler};

use crate::error::BotResult;
use crate::interaction::Invocation;
use async_trait::async_trait;

/// Command handler trait.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Command name without prefix (e.g., "help", "joke").
    fn name(&self) -> &str;

    /// Whether the handler bumps the usage counter itself.
    fn records_usage(&self) -> bool {
        false
    }

    /// Execute the command.
    async fn execute(&self, invocation: &Invocation) -> BotResult<String>;
}

/// Fixed set of commands the bot answers.
#[derive(Default)]
pub struct CommandTable {
    handlers: Vec<Box<dyn CommandHandler>>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler. Later registrations never shadow earlier ones.
    pub fn register(&mut self, handler: Box<dyn CommandHandler>) -> &mut Self {
        self.handlers.push(handler);
        self
    }

    /// Find the handler for a normalized command name.
    pub fn find(&self, name: &str) -> Option<&dyn CommandHandler> {
        self.handlers
            .iter()
            .find(|h| h.name() == name)
            .map(|h| h.as_ref())
    }

    /// Names of all registered commands, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Reply for a command nobody handles.
pub fn unknown_command_reply(name: &str) -> String {
    format!(
        "❓ Command not recognized: `/{}`. Use `/help` to see available commands.",
        name
    )
}
