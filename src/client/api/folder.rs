//! Folder API trait for the visualization backend

use async_trait::async_trait;

use crate::client::models::{Folder, FolderPermission};
use crate::error::Result;

/// Folder and folder-permission operations on the visualization backend
#[async_trait]
pub trait FolderApi: Send + Sync {
    /// List all folders.
    async fn list_folders(&self) -> Result<Vec<Folder>>;

    /// Create a folder with an explicit UID.
    async fn create_folder(&self, uid: &str, title: &str) -> Result<Folder>;

    /// Rename an existing folder, keeping its UID.
    async fn update_folder(&self, uid: &str, title: &str) -> Result<Folder>;

    /// Delete a folder by UID.
    async fn delete_folder(&self, uid: &str) -> Result<()>;

    /// Read the current permission list of a folder.
    async fn get_folder_permissions(&self, uid: &str) -> Result<Vec<FolderPermission>>;

    /// Replace the permission list of a folder wholesale.
    ///
    /// The backend treats this as a full replacement, so callers must merge
    /// entries they intend to preserve into `permissions`.
    async fn set_folder_permissions(
        &self,
        uid: &str,
        permissions: &[FolderPermission],
    ) -> Result<()>;
}
