//! Visualization backend folder and folder-permission models

use serde::{Deserialize, Deserializer, Serialize};

/// Backend folder
///
/// For managed folders the UID is the organization's registry UUID verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub uid: String,
    pub title: String,
}

/// One entry of a folder's permission list
///
/// Exactly one of `role`, `team_id`, `user_id` identifies the grantee. The
/// backend encodes "no team/user" as id 0; that normalizes to `None` here so
/// sync logic never has to special-case zero ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderPermission {
    /// Built-in role name (e.g. `Viewer`, `Editor`), when role-scoped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Team id, when team-scoped
    #[serde(default, deserialize_with = "zero_as_none", skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i64>,

    /// User id, when user-scoped
    #[serde(default, deserialize_with = "zero_as_none", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,

    /// Access level: 1 = view, 2 = edit, 4 = admin
    pub permission: i64,
}

/// View access level
pub const PERMISSION_VIEW: i64 = 1;
/// Edit access level
pub const PERMISSION_EDIT: i64 = 2;

impl FolderPermission {
    /// An edit-level entry for a team.
    pub fn team_edit(team_id: i64) -> Self {
        Self {
            role: None,
            team_id: Some(team_id),
            user_id: None,
            permission: PERMISSION_EDIT,
        }
    }
}

fn zero_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<i64>::deserialize(deserializer)?;
    Ok(value.filter(|id| *id != 0))
}
