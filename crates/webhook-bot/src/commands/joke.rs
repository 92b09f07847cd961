//! Joke command - picks a random joke.

use crate::commands::CommandHandler;
use crate::error::{BotError, BotResult};
use crate::interaction::Invocation;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Mutex;

/// Built-in jokes.
pub const JOKES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs! 🐛",
    "What's the difference between HTML and HTML5? About four years of university 😅",
    "Why do developers hate nature? It has too many bugs 🌲🐛",
    "What do you call an algorithm that doesn't work? An algo-rhythm! 🎵",
];

pub struct JokeHandler {
    jokes: Vec<String>,
    rng: Mutex<StdRng>,
}

impl JokeHandler {
    /// Built-in jokes with an entropy-seeded generator.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Built-in jokes with a caller-supplied generator.
    pub fn with_rng(rng: StdRng) -> Self {
        Self::with_jokes(JOKES.iter().map(|j| j.to_string()).collect(), rng)
    }

    pub fn with_jokes(jokes: Vec<String>, rng: StdRng) -> Self {
        Self {
            jokes,
            rng: Mutex::new(rng),
        }
    }
}

impl Default for JokeHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for JokeHandler {
    fn name(&self) -> &str {
        "joke"
    }

    async fn execute(&self, _invocation: &Invocation) -> BotResult<String> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| BotError::Internal("joke generator lock poisoned".into()))?;

        self.jokes
            .choose(&mut *rng)
            .cloned()
            .ok_or_else(|| BotError::Internal("no jokes configured".into()))
    }
}
