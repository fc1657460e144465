//! Source registry API data models

use serde::{Deserialize, Serialize};

/// Registry user record (field-selected projection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryUser {
    /// Registry-assigned unique identifier
    pub uuid: String,

    /// Login, unique across the registry
    pub username: String,

    /// Contact email
    #[serde(default)]
    pub email: String,

    /// Display name
    #[serde(default)]
    pub full_name: String,

    /// Registry staff flag
    #[serde(default)]
    pub is_staff: bool,

    /// Registry support flag
    #[serde(default)]
    pub is_support: bool,

    /// Organization-scoped role grants
    #[serde(default)]
    pub permissions: Vec<OwnershipGrant>,
}

/// One organization-scoped role grant on a registry user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipGrant {
    /// Organization the grant applies to
    pub organization_uuid: String,

    /// Organization display name as embedded in the grant
    #[serde(default)]
    pub organization_name: String,

    /// Division name, when the registry includes it in the grant payload
    #[serde(default)]
    pub organization_division: Option<String>,

    /// Role name; only `owner` grants drive team membership
    pub role: String,
}

impl OwnershipGrant {
    pub fn is_owner(&self) -> bool {
        self.role == "owner"
    }
}

/// Registry organization record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryOrganization {
    /// Registry-assigned unique identifier, reused verbatim as folder UID
    pub uuid: String,

    /// Display name
    pub name: String,

    /// Short abbreviation, may be empty
    #[serde(default)]
    pub abbreviation: String,

    /// Country code or name
    #[serde(default)]
    pub country: String,

    /// Division the organization belongs to, when assigned
    #[serde(default)]
    pub division_name: Option<String>,

    /// Whether the organization acts as a service provider
    #[serde(default)]
    pub is_service_provider: bool,

    /// Users holding the owner role
    #[serde(default)]
    pub owners: Vec<RegistryOwner>,
}

/// Owner as embedded in an organization payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryOwner {
    pub uuid: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
}
