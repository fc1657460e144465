//! Dashboard sync
//!
//! Writes one rendered usage dashboard into every organization folder, each
//! cycle. Existing dashboards are updated through the backend's optimistic
//! versioning (version + 1 with overwrite), so concurrent manual edits lose
//! to the sync rather than wedging it.

use std::collections::{HashMap, HashSet};

use log::{debug, info};
use serde_json::Value;

use super::{CycleSummary, Reconciler};
use crate::client::models::{DashboardHit, DashboardPayload};
use crate::desired::DesiredState;
use crate::error::Result;

/// Tag carried by every dashboard this sync manages. The dashboard search is
/// scoped to it, so manually created dashboards are invisible here.
pub(super) const MANAGED_TAG: &str = "managed";

impl Reconciler<'_> {
    pub(super) async fn sync_dashboards(
        &self,
        desired: &DesiredState,
        summary: &mut CycleSummary,
    ) -> Result<()> {
        let folder_uids: HashSet<String> = self
            .backend
            .list_folders()
            .await?
            .into_iter()
            .map(|f| f.uid)
            .collect();
        let hits = self.backend.search_dashboards(MANAGED_TAG).await?;
        let by_folder: HashMap<&str, &DashboardHit> = hits
            .iter()
            .filter_map(|hit| hit.folder_uid.as_deref().map(|uid| (uid, hit)))
            .collect();

        for org in desired.organizations.values() {
            if !folder_uids.contains(&org.uuid) {
                // Folder creation was skipped or failed this cycle.
                debug!(
                    "organization {} has no folder, skipping its dashboard",
                    org.uuid
                );
                continue;
            }

            let existing = by_folder.get(org.uuid.as_str()).copied();
            if self.config.dry_run {
                match existing {
                    Some(hit) => info!(
                        "dry-run: would update dashboard {} in folder {}",
                        hit.uid, org.uuid
                    ),
                    None => info!("dry-run: would create dashboard in folder {}", org.uuid),
                }
                summary.dashboards_written += 1;
                continue;
            }

            let mut dashboard = self
                .template
                .render(&org.name, &self.config.datasource_uid)?;
            let overwrite = match existing {
                Some(hit) => {
                    stamp_revision(&mut dashboard, hit);
                    true
                }
                None => false,
            };
            let payload = DashboardPayload {
                dashboard,
                folder_uid: org.uuid.clone(),
                overwrite,
            };

            let result = self.backend.upsert_dashboard(&payload).await;
            let context = format!("writing dashboard for folder {}", org.uuid);
            if self.note_item_result(summary, &context, result)? {
                info!("dashboard for {} written to folder {}", org.name, org.uuid);
                summary.dashboards_written += 1;
            }
        }

        Ok(())
    }
}

/// Target an existing dashboard: reuse its UID and bump its version so the
/// backend accepts the write as an update.
fn stamp_revision(dashboard: &mut Value, hit: &DashboardHit) {
    dashboard["uid"] = Value::String(hit.uid.clone());
    dashboard["version"] = Value::from(hit.version.unwrap_or(0) + 1);
}
