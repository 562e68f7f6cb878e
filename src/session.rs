use serde::{Deserialize, Serialize};

/// Per-client authentication state. The only transition is
/// `Unauthenticated -> Authenticated`; there is no logout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated {
        username: String,
    },
}

impl SessionState {
    /// Transition on a login attempt. An authenticated session is terminal and
    /// keeps its identity whatever the outcome.
    pub fn on_login_result(self, username: &str, verified: bool) -> Self {
        match self {
            SessionState::Unauthenticated if verified => SessionState::Authenticated {
                username: username.to_string(),
            },
            other => other,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { username } => Some(username),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}
