//! Request dispatch: health checks, signature policy, classification and
//! command execution.

use crate::commands::{
    unknown_command_reply, CommandTable, EchoHandler, HelpHandler, JokeHandler, PingHandler,
    StatsHandler, TimeHandler,
};
use crate::config::Config;
use crate::error::{BotError, BotResult};
use crate::interaction::{Classified, Interaction, Invocation, Reply};
use crate::signature::SignatureVerifier;
use anyhow::anyhow;
use axum::http::{HeaderMap, Method};
use chrono::Utc;
use counter_store::CounterStore;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// What to do with the request signature.
#[derive(Debug, Clone)]
pub enum SignaturePolicy {
    /// No public key configured.
    Disabled,
    /// Verify, log failures, keep processing.
    Lenient(SignatureVerifier),
    /// Verify and reject failures with 401.
    Enforced(SignatureVerifier),
}

/// Entry point for every webhook request.
pub struct Dispatcher {
    commands: CommandTable,
    counter: Arc<dyn CounterStore>,
    counter_key: String,
    count_all_commands: bool,
    default_username: String,
    signature: SignaturePolicy,
}

impl Dispatcher {
    pub fn new(
        commands: CommandTable,
        counter: Arc<dyn CounterStore>,
        counter_key: impl Into<String>,
    ) -> Self {
        Self {
            commands,
            counter,
            counter_key: counter_key.into(),
            count_all_commands: false,
            default_username: "there".into(),
            signature: SignaturePolicy::Disabled,
        }
    }

    pub fn with_signature_policy(mut self, policy: SignaturePolicy) -> Self {
        self.signature = policy;
        self
    }

    pub fn with_default_username(mut self, name: impl Into<String>) -> Self {
        self.default_username = name.into();
        self
    }

    /// Also bump the counter for recognised commands that do not record
    /// usage themselves.
    pub fn with_count_all_commands(mut self, enabled: bool) -> Self {
        self.count_all_commands = enabled;
        self
    }

    /// Build the dispatcher with the standard command set.
    pub fn from_config(config: &Config, counter: Arc<dyn CounterStore>) -> BotResult<Self> {
        let signature = match &config.discord.public_key {
            None => SignaturePolicy::Disabled,
            Some(key) => {
                let verifier = SignatureVerifier::from_hex(key)
                    .map_err(|e| BotError::Config(anyhow!("DISCORD__PUBLIC_KEY: {}", e)))?;
                if config.discord.enforce_signature {
                    SignaturePolicy::Enforced(verifier)
                } else {
                    SignaturePolicy::Lenient(verifier)
                }
            }
        };

        let commands = standard_commands(config, counter.clone());

        Ok(Self::new(commands, counter, config.counter.key.clone())
            .with_signature_policy(signature)
            .with_default_username(config.reply.default_username.clone())
            .with_count_all_commands(config.counter.count_all_commands))
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Handle one raw HTTP request.
    #[instrument(skip(self, headers, body), fields(body_len = body.len()))]
    pub async fn dispatch(
        &self,
        method: &Method,
        headers: &HeaderMap,
        body: &[u8],
    ) -> BotResult<Reply> {
        if is_health_check(method) {
            return Ok(Reply::healthy(Utc::now()));
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(BotError::MissingBody);
        }

        self.check_signature(headers, body)?;

        let interaction = parse_interaction(body)?;
        self.handle(&interaction).await
    }

    /// Handle an already-parsed interaction.
    pub async fn handle(&self, interaction: &Interaction) -> BotResult<Reply> {
        match interaction.classify(&self.default_username) {
            Classified::Handshake => {
                debug!("Handshake received");
                Ok(Reply::pong())
            }
            Classified::Command(invocation) => {
                let content = self.run_command(&invocation).await?;
                Ok(Reply::message(content))
            }
            Classified::Ignored => {
                debug!(kind = ?interaction.kind, "Ignoring unhandled interaction");
                Ok(Reply::acknowledged())
            }
        }
    }

    async fn run_command(&self, invocation: &Invocation) -> BotResult<String> {
        let Some(handler) = self.commands.find(&invocation.name) else {
            info!(command = %invocation.name, "Unknown command");
            return Ok(unknown_command_reply(&invocation.name));
        };

        info!(command = %invocation.name, user = %invocation.user, "Executing command");
        let content = handler.execute(invocation).await?;

        if self.count_all_commands && !handler.records_usage() {
            if let Err(e) = self.counter.increment_and_get(&self.counter_key).await {
                warn!("Failed to record command usage: {}", e);
            }
        }

        Ok(content)
    }

    fn check_signature(&self, headers: &HeaderMap, body: &[u8]) -> BotResult<()> {
        match &self.signature {
            SignaturePolicy::Disabled => Ok(()),
            SignaturePolicy::Lenient(verifier) => {
                if let Err(e) = verifier.verify(headers, body) {
                    warn!("Invalid request signature ({}), processing anyway", e);
                }
                Ok(())
            }
            SignaturePolicy::Enforced(verifier) => verifier.verify(headers, body).map_err(|e| {
                warn!("Rejecting request with invalid signature: {}", e);
                BotError::from(e)
            }),
        }
    }
}

/// The standard command set, configured from `config`.
pub fn standard_commands(config: &Config, counter: Arc<dyn CounterStore>) -> CommandTable {
    let mut table = CommandTable::new();
    table
        .register(Box::new(HelpHandler::new()))
        .register(Box::new(JokeHandler::new()))
        .register(Box::new(TimeHandler::new(config.reply.time_emoji.clone())))
        .register(Box::new(PingHandler::new(config.reply.ping_mentions_user)))
        .register(Box::new(StatsHandler::new(
            counter,
            config.counter.key.clone(),
            config.reply.stats_emoji.clone(),
        )))
        .register(Box::new(EchoHandler::new()));
    table
}

fn is_health_check(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

fn parse_interaction(body: &[u8]) -> BotResult<Interaction> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(BotError::MalformedPayload("expected a JSON object".into()));
    }
    Ok(serde_json::from_value(value)?)
}
