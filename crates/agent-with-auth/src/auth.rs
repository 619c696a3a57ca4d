//! Authorization resolver: request config bag -> caller identity.

use langgraph::RunnableConfig;

use crate::identity::IdentityRecord;
use crate::token::TokenDecoder;

/// Prefix stripped from forwarded authorization values.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Removes a leading `"Bearer "` if present.
pub fn strip_bearer(value: &str) -> &str {
    value.strip_prefix(BEARER_PREFIX).unwrap_or(value)
}

/// Resolves the caller from the `authorization` value of the run config.
///
/// Returns `None` when no value is present or the decoder rejects it; callers
/// map that to the anonymous identity. Never fails.
pub fn resolve_identity(
    config: &RunnableConfig,
    decoder: &dyn TokenDecoder,
) -> Option<IdentityRecord> {
    let raw = config.authorization()?;
    let token = strip_bearer(raw);
    match decoder.decode(token) {
        Some(identity) => {
            tracing::info!(
                user_id = %identity.user_id,
                name = identity.name.as_deref().unwrap_or("-"),
                decoder = decoder.name(),
                "authenticated user"
            );
            Some(identity)
        }
        None => {
            tracing::warn!(decoder = decoder.name(), "failed to authenticate user from token");
            None
        }
    }
}
