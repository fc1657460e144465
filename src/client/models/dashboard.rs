//! Visualization backend dashboard models

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One dashboard search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardHit {
    /// Backend-assigned dashboard UID
    pub uid: String,

    /// Dashboard title
    #[serde(default)]
    pub title: String,

    /// UID of the containing folder; absent for dashboards at the root
    #[serde(default)]
    pub folder_uid: Option<String>,

    /// Version counter; search results may omit it
    #[serde(default)]
    pub version: Option<i64>,
}

/// Create-or-update dashboard request
///
/// The `dashboard` field is the rendered template, treated as an opaque JSON
/// object apart from the `uid`/`version` keys set on updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub dashboard: Value,

    pub folder_uid: String,

    #[serde(default)]
    pub overwrite: bool,
}
