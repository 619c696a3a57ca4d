//! Normalized caller identity.

use serde::{Deserialize, Serialize};

/// `user_id` of a caller without valid credentials.
pub const ANONYMOUS_USER_ID: &str = "anonymous";

/// Identity of the caller of one turn.
///
/// `user_id` is never empty: callers without valid credentials get the
/// [`ANONYMOUS_USER_ID`] sentinel with every other field unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl IdentityRecord {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: None,
            email: None,
            role: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_USER_ID)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id != ANONYMOUS_USER_ID
    }
}

/// True when an identity is present and not the anonymous sentinel.
pub fn is_authenticated(identity: Option<&IdentityRecord>) -> bool {
    identity.is_some_and(IdentityRecord::is_authenticated)
}
