use crate::domain::{deserialize_id, response::session::Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default, alias = "username")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl UserProfile {
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdateResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: UserProfile,
}
