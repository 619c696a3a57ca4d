//! Bearer token decoding.
//!
//! Three decoders share the [`TokenDecoder`] interface:
//!
//! - [`UnverifiedDecoder`] reads the claims segment of a JWT-shaped token and
//!   performs **no signature check**. Anyone can mint a token it accepts, so it
//!   is only enabled through the explicit `unverified` auth mode for demos.
//! - [`Hs256Decoder`] verifies an HS256 signature (and `exp`) before reading
//!   the same claims.
//! - [`DisabledDecoder`] accepts nothing; every caller is anonymous.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::identity::IdentityRecord;

/// Why a token could not be turned into an identity.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("expected 3 dot-separated segments, found {0}")]
    Segments(usize),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("payload is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload has neither sub nor user_id")]
    MissingSubject,
}

/// Claims read from a token payload. Values of any JSON type are accepted;
/// non-string scalars are rendered as text.
#[derive(Debug, Default, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Value,
    #[serde(default)]
    user_id: Value,
    #[serde(default)]
    name: Value,
    #[serde(default)]
    email: Value,
    #[serde(default)]
    role: Value,
}

fn claim_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl Claims {
    fn into_identity(self) -> Result<IdentityRecord, DecodeError> {
        let user_id = claim_text(self.sub)
            .or_else(|| claim_text(self.user_id))
            .ok_or(DecodeError::MissingSubject)?;
        Ok(IdentityRecord {
            user_id,
            name: claim_text(self.name),
            email: claim_text(self.email),
            role: claim_text(self.role),
        })
    }
}

/// Restores `=` padding so the length is a multiple of 4.
fn pad_base64(segment: &str) -> String {
    let missing = (4 - segment.len() % 4) % 4;
    let mut padded = String::with_capacity(segment.len() + missing);
    padded.push_str(segment);
    padded.extend(std::iter::repeat('=').take(missing));
    padded
}

/// Decodes the claims segment of a JWT-shaped token without verifying it.
///
/// Pure function of the token string. Accepts both URL-safe and standard
/// base64 alphabets, with or without padding.
pub fn decode_unverified(token: &str) -> Result<IdentityRecord, DecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::Segments(segments.len()));
    }
    let padded = pad_base64(segments[1]);
    let bytes = URL_SAFE
        .decode(&padded)
        .or_else(|_| STANDARD.decode(&padded))?;
    let text = String::from_utf8(bytes)?;
    let claims: Claims = serde_json::from_str(&text)?;
    claims.into_identity()
}

/// Turns a bearer token into an identity. `None` means "no identity".
///
/// Implementations never fail loudly: a malformed or rejected token is logged
/// and reported as `None`.
pub trait TokenDecoder: Send + Sync {
    /// Short name for logs (e.g. `"unverified"`).
    fn name(&self) -> &'static str;

    fn decode(&self, token: &str) -> Option<IdentityRecord>;
}

/// Insecure demo decoder: reads claims, ignores the signature.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnverifiedDecoder;

impl TokenDecoder for UnverifiedDecoder {
    fn name(&self) -> &'static str {
        "unverified"
    }

    fn decode(&self, token: &str) -> Option<IdentityRecord> {
        match decode_unverified(token) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode token");
                None
            }
        }
    }
}

/// Verifies HS256-signed tokens with a shared secret.
pub struct Hs256Decoder {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256Decoder {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl TokenDecoder for Hs256Decoder {
    fn name(&self) -> &'static str {
        "hs256"
    }

    fn decode(&self, token: &str) -> Option<IdentityRecord> {
        let data = match jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "rejected token");
                return None;
            }
        };
        match data.claims.into_identity() {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!(error = %e, "verified token carries no subject");
                None
            }
        }
    }
}

/// Accepts no token.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledDecoder;

impl TokenDecoder for DisabledDecoder {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn decode(&self, _token: &str) -> Option<IdentityRecord> {
        None
    }
}
