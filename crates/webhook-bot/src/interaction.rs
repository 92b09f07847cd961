//! Inbound interaction payloads and outbound replies.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Interaction type sent by the platform to check the endpoint is alive.
pub const INTERACTION_PING: i64 = 1;
/// Interaction type for an application (slash) command.
pub const INTERACTION_APPLICATION_COMMAND: i64 = 2;

/// Reply type acknowledging a ping.
pub const RESPONSE_PONG: u8 = 1;
/// Reply type posting a message in the invoking channel.
pub const RESPONSE_CHANNEL_MESSAGE: u8 = 4;

/// Characters that introduce a command in free text.
pub const COMMAND_PREFIXES: [char; 2] = ['/', '!'];

/// Raw interaction as delivered to the webhook.
///
/// Fields are decoded leniently: a value of an unexpected JSON type reads
/// as absent instead of failing the whole payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type", default, deserialize_with = "lenient_int")]
    pub kind: Option<i64>,

    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<InteractionData>,

    /// Present for interactions inside a guild
    #[serde(default, deserialize_with = "lenient")]
    pub member: Option<Member>,

    /// Present for interactions in direct messages
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<User>,

    /// Present on message-style events
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionData {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub content: Option<String>,

    #[serde(default, deserialize_with = "lenient_options")]
    pub options: Vec<CommandOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Member {
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "lenient_text")]
    pub username: Option<String>,
}

/// Any value that does not decode as `T` becomes `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Integers, and floats with no fractional part (`1.0` reads as `1`).
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Number(n) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    }))
}

/// Strings as-is, numbers rendered as text, anything else absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Keeps the well-formed entries of an options array.
fn lenient_options<'de, D>(deserializer: D) -> Result<Vec<CommandOption>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect())
}

/// What the dispatcher should do with an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Handshake,
    Command(Invocation),
    Ignored,
}

/// A resolved command call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Lower-cased command name without prefix
    pub name: String,
    /// Display name of the invoking user
    pub user: String,
    /// Words following the command
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(name: &str, user: impl Into<String>) -> Self {
        Self {
            name: normalize_command_name(name),
            user: user.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Arguments joined by single spaces.
    pub fn text(&self) -> String {
        self.args.join(" ")
    }
}

impl Interaction {
    /// Username of whoever triggered the interaction, if any.
    pub fn username(&self) -> Option<&str> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
            .or(self.author.as_ref())
            .and_then(|u| u.username.as_deref())
            .filter(|name| !name.trim().is_empty())
    }

    /// Decide how to handle this interaction.
    pub fn classify(&self, default_username: &str) -> Classified {
        let user = self.username().unwrap_or(default_username);

        match self.kind {
            Some(INTERACTION_PING) => Classified::Handshake,
            Some(INTERACTION_APPLICATION_COMMAND) => {
                let data = self.data.as_ref();
                let name = data.and_then(|d| d.name.as_deref()).unwrap_or_default();
                let args = data
                    .map(|d| d.options.iter().filter_map(option_text).collect::<Vec<_>>())
                    .unwrap_or_default();

                Classified::Command(Invocation::new(name, user).with_args(args))
            }
            _ => match self.prefix_command() {
                Some((name, args)) => {
                    Classified::Command(Invocation::new(name, user).with_args(args))
                }
                None => Classified::Ignored,
            },
        }
    }

    /// Parse `data.content` as a prefixed text command (e.g. `!joke`).
    fn prefix_command(&self) -> Option<(&str, Vec<&str>)> {
        let content = self.data.as_ref()?.content.as_deref()?.trim();
        if !content.starts_with(COMMAND_PREFIXES) {
            return None;
        }

        let mut words = content.split_whitespace();
        let name = words.next()?;
        if name.trim_start_matches(COMMAND_PREFIXES).is_empty() {
            return None;
        }

        Some((name, words.collect()))
    }
}

/// Render an option value as plain text.
fn option_text(option: &CommandOption) -> Option<String> {
    match &option.value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Strip the leading prefix and lower-case a command name.
pub fn normalize_command_name(name: &str) -> String {
    name.trim()
        .trim_start_matches(COMMAND_PREFIXES)
        .to_lowercase()
}

/// JSON body returned to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Pong {
        #[serde(rename = "type")]
        kind: u8,
    },
    Message {
        #[serde(rename = "type")]
        kind: u8,
        data: MessageData,
    },
    Acknowledged {
        message: String,
    },
    Health {
        status: String,
        timestamp: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub content: String,
}

impl Reply {
    pub fn pong() -> Self {
        Reply::Pong {
            kind: RESPONSE_PONG,
        }
    }

    pub fn message(content: impl Into<String>) -> Self {
        Reply::Message {
            kind: RESPONSE_CHANNEL_MESSAGE,
            data: MessageData {
                content: content.into(),
            },
        }
    }

    pub fn acknowledged() -> Self {
        Reply::Acknowledged {
            message: "OK".into(),
        }
    }

    pub fn healthy(now: DateTime<Utc>) -> Self {
        Reply::Health {
            status: "healthy".into(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Message text, for command replies.
    pub fn content(&self) -> Option<&str> {
        match self {
            Reply::Message { data, .. } => Some(&data.content),
            _ => None,
        }
    }
}
