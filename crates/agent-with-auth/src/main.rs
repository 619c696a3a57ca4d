//! Entry point: load `.env`, parse flags, build the agent, serve HTTP.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use langgraph::{ChatOpenAI, LlmClient, MemorySaver};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_with_auth::{run_server, Agent, AgentDeps, AgentState, Args, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "agent_with_auth=info,langgraph=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_args(Args::parse()).context("invalid configuration")?;
    tracing::info!(?config, "starting agent server");

    let llm: Arc<dyn LlmClient> = Arc::new(ChatOpenAI::with_config(config.openai.clone()));
    let checkpointer: MemorySaver<AgentState> = match config.max_checkpoints {
        Some(max) => MemorySaver::new().with_max_checkpoints(max),
        None => MemorySaver::new(),
    };
    let deps = AgentDeps::new(llm, config.token_decoder())
        .with_checkpointer(Arc::new(checkpointer))
        .with_max_tool_rounds(config.max_tool_rounds)
        .with_recursion_limit(config.recursion_limit);
    let agent = Agent::new(deps).context("build agent graph")?;

    run_server(&config.host, config.port, agent).await.context("server error")?;
    Ok(())
}
