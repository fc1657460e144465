//! Dashboard API trait for the visualization backend

use async_trait::async_trait;

use crate::client::models::{DashboardHit, DashboardPayload};
use crate::error::Result;

/// Dashboard operations on the visualization backend
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Search dashboards carrying the given tag.
    async fn search_dashboards(&self, tag: &str) -> Result<Vec<DashboardHit>>;

    /// Create or update a dashboard.
    ///
    /// Updates must carry the existing UID, the incremented version, and
    /// `overwrite = true` in the payload.
    async fn upsert_dashboard(&self, payload: &DashboardPayload) -> Result<()>;
}
