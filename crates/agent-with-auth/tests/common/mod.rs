#![allow(dead_code)]

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use agent_with_auth::{Agent, AgentDeps, TokenDecoder, UnverifiedDecoder};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use langgraph::{MockLlm, ToolCall};
use serde_json::Value;

/// JWT-shaped token with the given payload and a junk signature.
pub fn unsigned_token(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}

/// HS256 token signed with `secret`, valid for an hour.
pub fn signed_token(payload: &Value, secret: &[u8]) -> String {
    let mut claims = payload.clone();
    claims["exp"] = Value::from(now_secs() + 3600);
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret),
    )
    .unwrap()
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

pub fn user_token() -> String {
    unsigned_token(&serde_json::json!({ "sub": "u1", "name": "Ann", "role": "admin" }))
}

pub fn weather_call(location: &str) -> ToolCall {
    ToolCall::new(
        "call_1",
        "get_weather",
        serde_json::json!({ "location": location }).to_string(),
    )
}

pub fn agent(llm: Arc<MockLlm>) -> Agent {
    agent_with_decoder(llm, Arc::new(UnverifiedDecoder))
}

pub fn agent_with_decoder(llm: Arc<MockLlm>, decoder: Arc<dyn TokenDecoder>) -> Agent {
    Agent::new(AgentDeps::new(llm, decoder)).unwrap()
}
