//! User administration API trait for the visualization backend

use async_trait::async_trait;

use crate::client::models::{BackendUser, Team};
use crate::error::Result;

/// User account operations on the visualization backend
#[async_trait]
pub trait UserAdminApi: Send + Sync {
    /// List all backend user accounts.
    async fn list_users(&self) -> Result<Vec<BackendUser>>;

    /// Look up one user by login or email.
    ///
    /// A miss is `BackendError::NotFound`, the normal trigger for the
    /// create-or-lookup pattern.
    async fn find_user(&self, login_or_email: &str) -> Result<BackendUser>;

    /// Create a user account and return its backend-assigned id.
    ///
    /// The backend requires a password at creation even though authentication
    /// is delegated externally; implementations generate a strong random one.
    async fn create_user(&self, name: &str, login: &str, email: &str) -> Result<i64>;

    /// Delete a user account by id.
    async fn delete_user(&self, user_id: i64) -> Result<()>;

    /// List the teams a user belongs to.
    async fn list_user_teams(&self, user_id: i64) -> Result<Vec<Team>>;
}
