//! Source registry API trait

use async_trait::async_trait;

use crate::client::models::{RegistryOrganization, RegistryUser};
use crate::error::Result;

/// Read-only operations against the source registry
///
/// The registry is authoritative; the sync never writes to it. All listing
/// calls are paginated internally and return complete result sets.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// List active, non-archived organizations with a field-selected
    /// projection (name, abbreviation, country, division, uuid, owners,
    /// service-provider flag).
    async fn list_organizations(&self) -> Result<Vec<RegistryOrganization>>;

    /// List active users enrolled via the given registration method, with a
    /// field-selected projection (ownership grants, role flags, username,
    /// uuid, full name, email).
    async fn list_users(&self, registration_method: &str) -> Result<Vec<RegistryUser>>;

    /// Fetch one organization by UUID.
    ///
    /// Used as the capped fallback lookup when a listing payload omits the
    /// division name.
    async fn get_organization(&self, uuid: &str) -> Result<RegistryOrganization>;
}
