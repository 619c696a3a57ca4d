mod common;

use std::sync::Arc;

use agent_with_auth::nodes::{route_to_tool_node, tool_rounds_this_turn};
use agent_with_auth::{
    AgentState, AuthNode, BackendTools, ChatNode, IdentityRecord, ToolNode, TurnInput,
    UnverifiedDecoder, CHAT_NODE, TOOL_NODE,
};
use langgraph::{
    LlmResponse, Message, MockLlm, Next, Node, RunnableConfig, ToolCall, ToolSource, ToolSpec,
};
use serde_json::json;

use common::{user_token, weather_call};

fn backend() -> Arc<dyn ToolSource> {
    Arc::new(BackendTools::with_defaults())
}

fn state_for(identity: IdentityRecord, question: &str) -> AgentState {
    AgentState {
        messages: vec![Message::user(question)],
        authorization: Some(identity),
        ..AgentState::default()
    }
}

#[tokio::test]
async fn auth_node_records_decoded_identity() {
    let node = AuthNode::new(Arc::new(UnverifiedDecoder));
    let config = RunnableConfig::default().with_configurable("authorization", format!("Bearer {}", user_token()));
    let (state, next) = node.run(AgentState::default(), &config).await.unwrap();
    assert_eq!(next, Next::Continue);
    let identity = state.authorization.unwrap();
    assert_eq!(identity.user_id, "u1");
    assert_eq!(identity.name.as_deref(), Some("Ann"));
}

#[tokio::test]
async fn auth_node_falls_back_to_anonymous() {
    let node = AuthNode::new(Arc::new(UnverifiedDecoder));
    let config = RunnableConfig::default().with_configurable("authorization", "not-a-jwt");
    let (state, _) = node.run(AgentState::default(), &config).await.unwrap();
    assert_eq!(state.authorization, Some(IdentityRecord::anonymous()));

    let (state, _) = node
        .run(AgentState::default(), &RunnableConfig::default())
        .await
        .unwrap();
    assert_eq!(state.authorization, Some(IdentityRecord::anonymous()));
    assert!(state.messages.is_empty());
}

#[tokio::test]
async fn auth_node_is_idempotent_for_the_same_config() {
    let node = AuthNode::new(Arc::new(UnverifiedDecoder));
    let configs = [
        RunnableConfig::default().with_configurable("authorization", format!("Bearer {}", user_token())),
        RunnableConfig::default(),
    ];
    for config in configs {
        let (once, _) = node.run(AgentState::default(), &config).await.unwrap();
        let (twice, next) = node.run(once.clone(), &config).await.unwrap();
        assert_eq!(next, Next::Continue);
        assert!(once.authorization.is_some());
        assert_eq!(once.authorization, twice.authorization);
        assert_eq!(once.messages, twice.messages);
    }
}

#[tokio::test]
async fn chat_node_binds_backend_tools_only_for_authenticated_callers() {
    let caller_tool = ToolSpec::new("setTheme", "Change the UI theme", json!({ "type": "object" }));

    let llm = Arc::new(MockLlm::with_no_tool_calls("hello"));
    let node = ChatNode::new(llm.clone(), backend());
    let mut anon = state_for(IdentityRecord::anonymous(), "weather?");
    anon.tools = vec![caller_tool.clone()];
    node.run(anon, &RunnableConfig::default()).await.unwrap();

    let mut user = state_for(IdentityRecord::new("u1"), "weather?");
    user.tools = vec![caller_tool];
    node.run(user, &RunnableConfig::default()).await.unwrap();

    let requests = llm.requests();
    assert_eq!(requests[0].tool_names(), ["setTheme"]);
    assert_eq!(requests[1].tool_names(), ["setTheme", "get_weather"]);
    assert!(requests.iter().all(|r| !r.parallel_tool_calls));
}

#[tokio::test]
async fn chat_node_puts_system_prompt_first() {
    let llm = Arc::new(MockLlm::with_no_tool_calls("hi"));
    let node = ChatNode::new(llm.clone(), backend());
    let mut state = state_for(
        IdentityRecord::new("u1").with_name("Ann").with_role("admin"),
        "hello",
    );
    state.proverbs = vec!["Measure twice".into()];
    node.run(state, &RunnableConfig::default()).await.unwrap();

    let request = &llm.requests()[0];
    let Message::System { content } = &request.messages[0] else {
        panic!("expected system message first, got {:?}", request.messages[0]);
    };
    assert!(content.starts_with("You are a helpful assistant."));
    assert!(content.contains("The current user is Ann (ID: u1, Role: admin)."));
    assert!(content.contains(r#"["Measure twice"]"#));
    assert_eq!(request.messages[1], Message::user("hello"));
}

#[tokio::test]
async fn chat_node_routes_backend_call_to_tool_node() {
    let llm = Arc::new(MockLlm::scripted([LlmResponse::with_tool_calls(
        "",
        vec![weather_call("Paris")],
    )]));
    let node = ChatNode::new(llm, backend());
    let (state, next) = node
        .run(state_for(IdentityRecord::new("u1"), "weather in Paris?"), &RunnableConfig::default())
        .await
        .unwrap();
    assert_eq!(next, Next::Node(TOOL_NODE.to_string()));
    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.messages[1].tool_calls()[0].name, "get_weather");
}

#[tokio::test]
async fn chat_node_ends_on_plain_answer_and_caller_tool_calls() {
    let llm = Arc::new(MockLlm::scripted([
        LlmResponse::text("Sunny, probably."),
        LlmResponse::with_tool_calls("", vec![ToolCall::new("c2", "setTheme", r#"{"theme":"dark"}"#)]),
    ]));
    let node = ChatNode::new(llm, backend());
    let config = RunnableConfig::default();

    let (_, next) = node.run(state_for(IdentityRecord::new("u1"), "?"), &config).await.unwrap();
    assert_eq!(next, Next::End);

    let mut state = state_for(IdentityRecord::new("u1"), "dark mode");
    state.tools = vec![ToolSpec::new("setTheme", "", json!({}))];
    let (state, next) = node.run(state, &config).await.unwrap();
    assert_eq!(next, Next::End);
    assert_eq!(state.messages.last().unwrap().tool_calls()[0].name, "setTheme");
}

#[tokio::test]
async fn chat_node_never_routes_anonymous_backend_calls() {
    let llm = Arc::new(MockLlm::scripted([LlmResponse::with_tool_calls(
        "",
        vec![weather_call("Paris")],
    )]));
    let node = ChatNode::new(llm, backend());
    let (_, next) = node
        .run(state_for(IdentityRecord::anonymous(), "weather?"), &RunnableConfig::default())
        .await
        .unwrap();
    assert_eq!(next, Next::End);
}

#[tokio::test]
async fn chat_node_withholds_backend_tools_once_budget_is_spent() {
    let llm = Arc::new(MockLlm::with_no_tool_calls("done"));
    let node = ChatNode::new(llm.clone(), backend()).with_max_tool_rounds(1);
    let mut state = state_for(IdentityRecord::new("u1"), "weather?");
    state.messages.push(Message::assistant_with_tool_calls("", vec![weather_call("Paris")]));
    state.messages.push(Message::tool("call_1", Some("get_weather".into()), "70"));
    node.run(state, &RunnableConfig::default()).await.unwrap();
    assert!(llm.requests()[0].tools.is_empty());
}

#[test]
fn tool_rounds_count_only_the_current_turn() {
    let backend = vec!["get_weather".to_string()];
    let previous = AgentState {
        messages: vec![
            Message::user("first"),
            Message::assistant_with_tool_calls("", vec![weather_call("A")]),
            Message::tool("call_1", None, "x"),
            Message::assistant("answer"),
        ],
        ..AgentState::default()
    };
    let mut state = previous.apply_input(TurnInput::user("second"));
    assert_eq!(tool_rounds_this_turn(state.current_turn(), &backend), 0);

    state
        .messages
        .push(Message::assistant_with_tool_calls("", vec![weather_call("B")]));
    state.messages.push(Message::tool("call_1", None, "y"));
    assert_eq!(tool_rounds_this_turn(state.current_turn(), &backend), 1);
    assert_eq!(tool_rounds_this_turn(&state.messages, &backend), 2);
}

#[tokio::test]
async fn client_tool_results_start_a_fresh_tool_budget() {
    let previous = AgentState {
        messages: vec![
            Message::user("weather, then dark mode"),
            Message::assistant_with_tool_calls("", vec![weather_call("Paris")]),
            Message::tool("call_1", Some("get_weather".into()), "70"),
            Message::assistant_with_tool_calls(
                "",
                vec![ToolCall::new("c2", "setTheme", r#"{"theme":"dark"}"#)],
            ),
        ],
        authorization: Some(IdentityRecord::new("u1")),
        ..AgentState::default()
    };
    let state = previous.apply_input(TurnInput {
        messages: vec![Message::tool("c2", Some("setTheme".into()), "theme set")],
        ..TurnInput::default()
    });

    let llm = Arc::new(MockLlm::with_no_tool_calls("done"));
    let node = ChatNode::new(llm.clone(), backend()).with_max_tool_rounds(1);
    node.run(state, &RunnableConfig::default()).await.unwrap();
    assert_eq!(llm.requests()[0].tool_names(), ["get_weather"]);
}

#[test]
fn routing_requires_a_bound_backend_name() {
    let calls = vec![weather_call("Paris")];
    assert!(route_to_tool_node(&calls, &["get_weather".to_string()]));
    assert!(!route_to_tool_node(&calls, &[]));
    assert!(!route_to_tool_node(&[], &["get_weather".to_string()]));
}

#[tokio::test]
async fn tool_node_answers_every_call_in_order() {
    let node = ToolNode::new(backend());
    let mut state = state_for(IdentityRecord::new("u1"), "weather?");
    state.messages.push(Message::assistant_with_tool_calls(
        "",
        vec![
            ToolCall::new("a", "get_weather", r#"{"location":"Paris"}"#),
            ToolCall::new("b", "setTheme", r#"{"theme":"dark"}"#),
            ToolCall::new("c", "get_weather", r#"{"location":"Oslo"}"#),
        ],
    ));
    let (state, next) = node.run(state, &RunnableConfig::default()).await.unwrap();
    assert_eq!(next, Next::Continue);

    let results = &state.messages[2..];
    let ids: Vec<&str> = results
        .iter()
        .map(|m| match m {
            Message::Tool { tool_call_id, .. } => tool_call_id.as_str(),
            other => panic!("expected tool message, got {other:?}"),
        })
        .collect();
    assert_eq!(ids, ["a", "b", "c"]);
    assert_eq!(
        results[0],
        Message::tool("a", Some("get_weather".into()), "The weather for Paris is 70 degrees.")
    );
    assert!(results[1]
        .content()
        .starts_with("Error: setTheme is not a valid tool, try one of [get_weather]"));
    assert_eq!(
        results[2],
        Message::tool("c", Some("get_weather".into()), "The weather for Oslo is 70 degrees.")
    );
}

#[tokio::test]
async fn tool_node_reports_failures_as_tool_messages() {
    let node = ToolNode::new(backend());
    let mut state = state_for(IdentityRecord::new("u1"), "weather?");
    state.messages.push(Message::assistant_with_tool_calls(
        "",
        vec![
            ToolCall::new("a", "get_weather", "{}"),
            ToolCall::new("b", "get_weather", "{broken"),
        ],
    ));
    let (state, _) = node.run(state, &RunnableConfig::default()).await.unwrap();
    assert_eq!(state.messages.len(), 4);
    for message in &state.messages[2..] {
        assert!(message.content().starts_with("Error: "), "{}", message.content());
        assert!(message.content().ends_with("Please fix your mistakes."));
    }
}

#[tokio::test]
async fn tool_node_refuses_anonymous_callers() {
    let node = ToolNode::new(backend());
    let mut state = state_for(IdentityRecord::anonymous(), "weather?");
    state
        .messages
        .push(Message::assistant_with_tool_calls("", vec![weather_call("Paris")]));
    let (state, _) = node.run(state, &RunnableConfig::default()).await.unwrap();
    let reply = state.messages.last().unwrap().content();
    assert!(reply.contains("only available to authenticated users"));
    assert!(!reply.contains("70 degrees"));
}

#[test]
fn node_ids_match_graph_wiring() {
    let node = ChatNode::new(Arc::new(MockLlm::with_no_tool_calls("x")), backend());
    assert_eq!(node.id(), CHAT_NODE);
}
