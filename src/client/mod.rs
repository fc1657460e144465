//! API clients for the source registry and the visualization backend

pub mod api;
mod backend;
#[cfg(test)]
pub mod mock;
pub mod models;
mod registry;

#[allow(unused_imports)]
pub use api::{BackendApi, DashboardApi, FolderApi, RegistryApi, TeamApi, UserAdminApi};
pub use backend::BackendClient;
#[cfg(test)]
#[allow(unused_imports)]
pub use mock::{MockBackendClient, MockRegistryClient};
pub use registry::RegistryClient;
