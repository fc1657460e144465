//! Wire-level data models for both APIs
//!
//! Typed records for every resource the sync touches, one file per area.
//! Optional-field defaulting and zero-id normalization happen here at the
//! client boundary, never inside reconciliation logic.

mod dashboard;
mod folder;
mod registry;
mod team;
mod user;

pub use dashboard::{DashboardHit, DashboardPayload};
pub use folder::{Folder, FolderPermission, PERMISSION_EDIT, PERMISSION_VIEW};
pub use registry::{OwnershipGrant, RegistryOrganization, RegistryOwner, RegistryUser};
pub use team::{Team, TeamMember};
pub use user::BackendUser;
