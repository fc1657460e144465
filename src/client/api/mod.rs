//! API trait definitions split by responsibility
//!
//! The source registry side is one read-only trait, [`RegistryApi`]. The
//! visualization backend surface is split into focused sub-traits:
//! - [`UserAdminApi`] - user accounts and user-team membership lookups
//! - [`TeamApi`] - teams and team membership
//! - [`FolderApi`] - folders and folder permissions
//! - [`DashboardApi`] - dashboard search and create-or-update
//!
//! The [`BackendApi`] super-trait combines the four backend traits; anything
//! implementing all of them gets it via the blanket impl.

mod dashboard;
mod folder;
mod registry;
mod team;
mod user_admin;

pub use dashboard::DashboardApi;
pub use folder::FolderApi;
pub use registry::RegistryApi;
pub use team::TeamApi;
pub use user_admin::UserAdminApi;

/// The full visualization backend surface the reconciler works against.
pub trait BackendApi: UserAdminApi + TeamApi + FolderApi + DashboardApi {}

impl<T: UserAdminApi + TeamApi + FolderApi + DashboardApi> BackendApi for T {}
