//! System prompt assembly for the chat node.

use crate::identity::IdentityRecord;

/// Fixed persona that opens every system instruction.
pub const ASSISTANT_PERSONA: &str = "You are a helpful assistant.";

/// Sentence describing the caller.
///
/// Authenticated callers are named (name defaults to `Unknown`, role to
/// `user`). Anonymous callers get an explicit notice that the restricted tools
/// need a sign-in, so the model can refuse conversationally.
pub fn user_context_clause(identity: Option<&IdentityRecord>, restricted_tools: &[String]) -> String {
    match identity.filter(|i| i.is_authenticated()) {
        Some(user) => format!(
            " The current user is {} (ID: {}, Role: {}).",
            user.name.as_deref().unwrap_or("Unknown"),
            user.user_id,
            user.role.as_deref().unwrap_or("user"),
        ),
        None if restricted_tools.is_empty() => " The user is not authenticated.".to_string(),
        None => {
            let names = restricted_tools
                .iter()
                .map(|n| format!("`{n}`"))
                .collect::<Vec<_>>()
                .join(", ");
            let noun = if restricted_tools.len() == 1 { "tool is" } else { "tools are" };
            format!(
                " The user is not authenticated. The {names} {noun} only available to \
                 authenticated users. If asked for the weather or anything else that needs \
                 them, tell the user they need to sign in to use this feature."
            )
        }
    }
}

/// Full system instruction: persona, caller context, current proverbs.
pub fn build_system_prompt(
    identity: Option<&IdentityRecord>,
    proverbs: &[String],
    restricted_tools: &[String],
) -> String {
    let proverbs = serde_json::to_string(proverbs).unwrap_or_else(|_| "[]".to_string());
    format!(
        "{ASSISTANT_PERSONA}{} The current proverbs are {proverbs}.",
        user_context_clause(identity, restricted_tools)
    )
}
