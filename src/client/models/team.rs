//! Visualization backend team models

use serde::{Deserialize, Serialize};

/// Backend team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Backend-assigned numeric id
    pub id: i64,

    /// Team name; must be unique for lookups to be unambiguous
    pub name: String,
}

/// One member of a backend team
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    /// Backend user id of the member
    pub user_id: i64,

    /// Login, the membership diff key
    pub login: String,

    /// Contact email
    #[serde(default)]
    pub email: String,
}
