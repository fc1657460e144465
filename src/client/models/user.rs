//! Visualization backend user models

use serde::{Deserialize, Serialize};

/// Backend user account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendUser {
    /// Backend-assigned numeric id
    pub id: i64,

    /// Login, the identity key for all diffs
    pub login: String,

    /// Contact email
    #[serde(default)]
    pub email: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Backend admin flag
    #[serde(default)]
    pub is_admin: bool,

    /// Whether the account is disabled in the backend
    #[serde(default)]
    pub is_disabled: bool,
}
