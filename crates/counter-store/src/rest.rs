//! Counter store backed by a Redis REST endpoint (Upstash-compatible).
//!
//! Each counter is a hash holding a count field and a last-used field.
//! Increments run as a `MULTI/EXEC` transaction with `HINCRBY`, so the
//! add-and-return is atomic on the server side.

use crate::error::StoreError;
use crate::store::CounterStore;
use crate::types::{CounterFields, CounterRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// One reply entry as returned by the REST endpoint.
#[derive(Debug, Deserialize)]
struct RestReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl RestReply {
    fn into_result(self) -> Result<Value, StoreError> {
        match self.error {
            Some(e) => Err(StoreError::Api(e)),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// Redis REST counter client.
///
/// The token is held as a `SecretString` so it never shows up in debug
/// output.
#[derive(Clone)]
pub struct RestCounterStore {
    client: Client,
    base_url: String,
    token: SecretString,
    fields: CounterFields,
    timeout: Duration,
}

impl RestCounterStore {
    /// Create a client. Every request is bounded by `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: SecretString::new(token.into()),
            fields: CounterFields::default(),
            timeout,
        })
    }

    /// Override the hash attribute names.
    pub fn with_fields(mut self, fields: CounterFields) -> Self {
        self.fields = fields;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a single command.
    async fn command(&self, args: &[&str]) -> Result<Value, StoreError> {
        let body = self.post(&self.base_url, args).await?;
        let reply: RestReply = serde_json::from_value(body)?;
        reply.into_result()
    }

    /// Run commands as one atomic transaction, one reply per command.
    async fn transaction(&self, commands: &[Vec<String>]) -> Result<Vec<RestReply>, StoreError> {
        let url = format!("{}/multi-exec", self.base_url);
        let body = self.post(&url, commands).await?;

        match body {
            Value::Array(entries) => entries
                .into_iter()
                .map(|entry| serde_json::from_value::<RestReply>(entry).map_err(Into::into))
                .collect(),
            other => {
                let reply: RestReply = serde_json::from_value(other)?;
                match reply.error {
                    Some(e) => Err(StoreError::Api(e)),
                    None => Err(StoreError::InvalidResponse(
                        "transaction reply is not an array".into(),
                    )),
                }
            }
        }
    }

    async fn post<B: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<Value, StoreError> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.token.expose_secret()))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let msg = serde_json::from_str::<RestReply>(&text)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or(text);
            warn!("Counter store returned {}: {}", status, msg);
            return Err(StoreError::Api(format!("{}: {}", status, msg)));
        }

        response.json().await.map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(self.timeout)
        } else {
            StoreError::Http(e)
        }
    }
}

#[async_trait]
impl CounterStore for RestCounterStore {
    #[instrument(skip(self))]
    async fn increment_and_get(&self, key: &str) -> Result<CounterRecord, StoreError> {
        let now = Utc::now();
        let commands = vec![
            vec![
                "HINCRBY".to_string(),
                key.to_string(),
                self.fields.count.clone(),
                "1".to_string(),
            ],
            vec![
                "HSET".to_string(),
                key.to_string(),
                self.fields.last_used.clone(),
                now.to_rfc3339(),
            ],
        ];

        let mut replies = self.transaction(&commands).await?.into_iter();

        let count = replies
            .next()
            .ok_or_else(|| StoreError::InvalidResponse("missing HINCRBY result".into()))?
            .into_result()?;
        let count = parse_count(&count)
            .ok_or_else(|| StoreError::InvalidResponse(format!("bad HINCRBY result: {}", count)))?;

        // The count is already committed; a failed timestamp write only loses last_used
        let last_used = match replies.next().map(RestReply::into_result) {
            Some(Ok(_)) => Some(now),
            Some(Err(e)) => {
                warn!("Counter {} incremented but last_used not written: {}", key, e);
                None
            }
            None => {
                warn!("Counter {} incremented but HSET reply missing", key);
                None
            }
        };

        debug!("Counter {} now at {}", key, count);

        Ok(CounterRecord {
            key: key.to_string(),
            count,
            last_used,
        })
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<CounterRecord>, StoreError> {
        let result = self
            .command(&[
                "HMGET",
                key,
                self.fields.count.as_str(),
                self.fields.last_used.as_str(),
            ])
            .await?;

        let values = result
            .as_array()
            .ok_or_else(|| StoreError::InvalidResponse("HMGET reply is not an array".into()))?;

        let Some(count) = values.first().and_then(parse_count) else {
            return Ok(None);
        };

        let last_used = values.get(1).and_then(parse_timestamp);

        Ok(Some(CounterRecord {
            key: key.to_string(),
            count,
            last_used,
        }))
    }

    async fn health_check(&self) -> bool {
        matches!(
            self.command(&["PING"]).await,
            Ok(Value::String(ref s)) if s == "PONG"
        )
    }
}

/// Hash values come back as strings, command results as integers.
fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            warn!("Ignoring unparseable last_used {:?}: {}", raw, e);
            None
        }
    }
}
