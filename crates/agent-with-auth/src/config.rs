//! Server configuration: CLI flags with environment fallbacks.
//!
//! **Interaction**: `main` runs `dotenv::dotenv().ok()`, parses [`Args`] and
//! resolves them with [`Config::from_args`]. Errors here are fatal at startup.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use langgraph::llm::OpenAiConfig;
use thiserror::Error;

use crate::nodes::DEFAULT_MAX_TOOL_ROUNDS;
use crate::token::{DisabledDecoder, Hs256Decoder, TokenDecoder, UnverifiedDecoder};

/// How bearer tokens are turned into identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AuthMode {
    /// Ignore tokens; every caller is anonymous.
    #[default]
    Disabled,
    /// Read claims without checking the signature. Demo only.
    Unverified,
    /// Verify an HS256 signature with `JWT_SECRET`.
    Hs256,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set or empty (put it in .env or the environment)")]
    MissingApiKey,
    #[error("AUTH_MODE=hs256 requires JWT_SECRET")]
    MissingJwtSecret,
    #[error("--host must not be empty")]
    EmptyHost,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "agent-with-auth")]
#[command(about = "Chat agent that exposes backend tools only to authenticated callers")]
pub struct Args {
    /// Host name or IP address to listen on; names are resolved at bind time
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Chat model name
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o")]
    pub model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = langgraph::llm::DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "AUTH_MODE", value_enum, default_value_t = AuthMode::Disabled)]
    pub auth_mode: AuthMode,

    /// Shared secret for AUTH_MODE=hs256
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Backend tool rounds allowed per turn before tools are withheld
    #[arg(long, env = "MAX_TOOL_ROUNDS", default_value_t = DEFAULT_MAX_TOOL_ROUNDS)]
    pub max_tool_rounds: usize,

    /// Checkpoints kept per thread; unbounded when unset
    #[arg(long, env = "MAX_CHECKPOINTS")]
    pub max_checkpoints: Option<usize>,

    /// Maximum node executions per turn
    #[arg(long, env = "RECURSION_LIMIT", default_value_t = langgraph::DEFAULT_RECURSION_LIMIT)]
    pub recursion_limit: usize,
}

/// Resolved configuration.
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub openai: OpenAiConfig,
    pub auth_mode: AuthMode,
    jwt_secret: Option<String>,
    pub max_tool_rounds: usize,
    pub recursion_limit: usize,
    pub max_checkpoints: Option<usize>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("model", &self.openai.model)
            .field("base_url", &self.openai.base_url)
            .field("auth_mode", &self.auth_mode)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .field("recursion_limit", &self.recursion_limit)
            .field("max_checkpoints", &self.max_checkpoints)
            .finish_non_exhaustive()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let api_key = non_empty(args.api_key).ok_or(ConfigError::MissingApiKey)?;
        let jwt_secret = non_empty(args.jwt_secret);
        if args.auth_mode == AuthMode::Hs256 && jwt_secret.is_none() {
            return Err(ConfigError::MissingJwtSecret);
        }
        let host = args.host.trim().to_string();
        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }

        Ok(Self {
            host,
            port: args.port,
            openai: OpenAiConfig::new(api_key, args.model).with_base_url(args.base_url),
            auth_mode: args.auth_mode,
            jwt_secret,
            max_tool_rounds: args.max_tool_rounds,
            recursion_limit: args.recursion_limit,
            max_checkpoints: args.max_checkpoints,
        })
    }

    /// The decoder for the configured auth mode.
    pub fn token_decoder(&self) -> Arc<dyn TokenDecoder> {
        match (self.auth_mode, &self.jwt_secret) {
            (AuthMode::Unverified, _) => {
                tracing::warn!("AUTH_MODE=unverified: token signatures are NOT checked, demo use only");
                Arc::new(UnverifiedDecoder)
            }
            (AuthMode::Hs256, Some(secret)) => Arc::new(Hs256Decoder::new(secret.as_bytes())),
            _ => Arc::new(DisabledDecoder),
        }
    }
}
