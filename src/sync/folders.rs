//! Folder sync
//!
//! One folder per active organization, UID = the organization's registry
//! UUID verbatim. Folders with a UUID-shaped UID and no matching active
//! organization are deleted; manually created folders with other UIDs are
//! never touched. Title collisions skip creation rather than overwrite.

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};
use uuid::Uuid;

use super::teams::TeamLookup;
use super::{CycleSummary, Reconciler};
use crate::client::models::FolderPermission;
use crate::desired::{DesiredState, Organization};
use crate::error::Result;

impl Reconciler<'_> {
    pub(super) async fn sync_folders(
        &self,
        desired: &DesiredState,
        summary: &mut CycleSummary,
    ) -> Result<()> {
        let observed = self.backend.list_folders().await?;
        let by_uid: HashMap<&str, &str> = observed
            .iter()
            .map(|f| (f.uid.as_str(), f.title.as_str()))
            .collect();
        let mut titles: HashSet<String> = observed.iter().map(|f| f.title.clone()).collect();

        for org in desired.organizations.values() {
            let title = org.folder_title();
            match by_uid.get(org.uuid.as_str()) {
                Some(current_title) => {
                    if *current_title != title {
                        if self.config.dry_run {
                            info!(
                                "dry-run: would rename folder {}: {current_title} -> {title}",
                                org.uuid
                            );
                            summary.folders_updated += 1;
                        } else {
                            let result = self
                                .backend
                                .update_folder(&org.uuid, &title)
                                .await
                                .map(|_| ());
                            let context = format!("renaming folder {}", org.uuid);
                            if self.note_item_result(summary, &context, result)? {
                                info!("folder {}: {current_title} -> {title}", org.uuid);
                                summary.folders_updated += 1;
                            }
                        }
                    }
                }
                None => {
                    if titles.contains(&title) {
                        warn!(
                            "folder title {title:?} already exists, \
                             skipping creation for organization {}",
                            org.uuid
                        );
                        summary.skipped += 1;
                        continue;
                    }
                    if self.config.dry_run {
                        info!("dry-run: would create folder {title} with UID {}", org.uuid);
                        summary.folders_created += 1;
                        titles.insert(title);
                        // No permission sync without a real folder.
                        continue;
                    }
                    let result = self
                        .backend
                        .create_folder(&org.uuid, &title)
                        .await
                        .map(|_| ());
                    let context = format!("creating folder {title}");
                    if self.note_item_result(summary, &context, result)? {
                        info!("folder {title} created with UID {}", org.uuid);
                        summary.folders_created += 1;
                        titles.insert(title);
                    } else {
                        continue;
                    }
                }
            }

            if self.config.sync_folder_permissions && !self.config.dry_run {
                let result = self.merge_folder_permissions(org).await;
                let context = format!("updating permissions of folder {}", org.uuid);
                self.note_item_result(summary, &context, result)?;
            }
        }

        // Orphan cleanup. The UUID-shape heuristic keeps manually created
        // folders (non-UUID UIDs) out of reach.
        for folder in &observed {
            if Uuid::parse_str(&folder.uid).is_err()
                || desired.organizations.contains_key(&folder.uid)
            {
                continue;
            }
            if self.config.dry_run {
                info!(
                    "dry-run: would delete folder {} with UID {}",
                    folder.title, folder.uid
                );
                summary.folders_deleted += 1;
                continue;
            }
            let result = self.backend.delete_folder(&folder.uid).await;
            let context = format!("deleting folder {}", folder.uid);
            if self.note_item_result(summary, &context, result)? {
                info!("folder {} with UID {} deleted", folder.title, folder.uid);
                summary.folders_deleted += 1;
            }
        }

        Ok(())
    }

    /// Grant the organization's team edit access to its folder, preserving
    /// every other permission entry verbatim.
    async fn merge_folder_permissions(&self, org: &Organization) -> Result<()> {
        let Some(team_name) = DesiredState::org_team_name(org, self.config.grouping) else {
            debug!(
                "organization {} has no team under the current grouping, \
                 skipping folder permissions",
                org.uuid
            );
            return Ok(());
        };
        let team_id = match self.lookup_team(&team_name).await? {
            TeamLookup::Found(id) => id,
            TeamLookup::Missing | TeamLookup::Ambiguous(_) => {
                debug!(
                    "cannot resolve team {team_name} for folder {}, skipping permissions",
                    org.uuid
                );
                return Ok(());
            }
        };

        let existing = self.backend.get_folder_permissions(&org.uuid).await?;
        let mut merged: Vec<FolderPermission> = existing
            .into_iter()
            .filter(|entry| entry.team_id != Some(team_id))
            .collect();
        merged.push(FolderPermission::team_edit(team_id));
        self.backend.set_folder_permissions(&org.uuid, &merged).await
    }
}
