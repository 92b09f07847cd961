//! Ed25519 request signature verification.
//!
//! The platform signs `timestamp || body` with the application key and
//! sends the result in the `X-Signature-Ed25519` header (hex) alongside
//! `X-Signature-Timestamp`.

use axum::http::HeaderMap;
use ed25519_dalek::{Signature, VerifyingKey};
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing header {0}")]
    MissingHeader(&'static str),

    #[error("signature is not valid hex or has the wrong length")]
    MalformedSignature,

    #[error("public key is not a valid Ed25519 key")]
    InvalidPublicKey,

    #[error("signature does not match")]
    Mismatch,
}

/// Verifies inbound webhook signatures against the application key.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    /// Build from the hex-encoded public key shown in the developer portal.
    pub fn from_hex(public_key: &str) -> Result<Self, SignatureError> {
        let raw = hex::decode(public_key.trim()).map_err(|_| SignatureError::InvalidPublicKey)?;
        let Ok(bytes) = <[u8; 32]>::try_from(raw.as_slice()) else {
            return Err(SignatureError::InvalidPublicKey);
        };
        let key = VerifyingKey::from_bytes(&bytes).map_err(|_| SignatureError::InvalidPublicKey)?;

        Ok(Self { key })
    }

    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Check the signature headers against the raw body.
    pub fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), SignatureError> {
        let signature = header_str(headers, SIGNATURE_HEADER)?;
        let timestamp = header_str(headers, TIMESTAMP_HEADER)?;

        let raw = hex::decode(signature).map_err(|_| SignatureError::MalformedSignature)?;
        let Ok(sig_bytes) = <[u8; 64]>::try_from(raw.as_slice()) else {
            return Err(SignatureError::MalformedSignature);
        };
        let signature = Signature::from_bytes(&sig_bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify_strict(&message, &signature)
            .map_err(|_| SignatureError::Mismatch)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, SignatureError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(SignatureError::MissingHeader(name))
}
