//! Chat interaction webhook responder.
//!
//! Receives interaction events over HTTP, answers the platform's liveness
//! handshake, runs a small fixed set of text commands and keeps a usage
//! counter in an external key-value store.

pub mod api;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod interaction;
pub mod signature;

pub use config::Config;
pub use dispatcher::{Dispatcher, SignaturePolicy};
pub use error::{BotError, BotResult};
pub use interaction::{Interaction, Invocation, Reply};
