use serde::{Deserialize, Serialize};

/// Minimal descriptor of the logged-in user, as returned by `/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// An authenticated session: bearer token plus who it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: Option<UserInfo>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: Option<UserInfo>) -> Self {
        Session {
            token: token.into(),
            user,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }
}
