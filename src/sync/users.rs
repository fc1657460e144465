//! User sync
//!
//! Makes the backend's user set match desired users, keyed by login.
//! Protected logins are never deleted; members of special teams are shielded
//! from deletion unless configured otherwise.

use std::collections::HashSet;

use log::{debug, info};

use super::{CycleSummary, Reconciler};
use crate::client::models::BackendUser;
use crate::desired::DesiredState;
use crate::error::Result;

/// Outcome of evaluating one stale backend user.
enum Removal {
    Deleted,
    Planned,
    Shielded,
}

impl Reconciler<'_> {
    pub(super) async fn sync_users(
        &self,
        desired: &DesiredState,
        summary: &mut CycleSummary,
    ) -> Result<()> {
        let observed = self.backend.list_users().await?;
        let observed_logins: HashSet<&str> = observed.iter().map(|u| u.login.as_str()).collect();
        let desired_logins: HashSet<&str> = desired
            .users
            .iter()
            .map(|u| u.username.as_str())
            .collect();

        for user in &desired.users {
            if observed_logins.contains(user.username.as_str()) {
                continue;
            }
            if self.config.dry_run {
                info!(
                    "dry-run: would create user {} / {}",
                    user.username, user.email
                );
                summary.users_created += 1;
                continue;
            }
            let result = self
                .backend
                .create_user(&user.name, &user.username, &user.email)
                .await
                .map(|_| ());
            let context = format!("creating user {}", user.username);
            if self.note_item_result(summary, &context, result)? {
                info!("user {} / {} created", user.username, user.email);
                summary.users_created += 1;
            }
        }

        for user in &observed {
            if desired_logins.contains(user.login.as_str())
                || self.config.is_protected_username(&user.login)
            {
                continue;
            }
            let context = format!("deleting user {}", user.login);
            match self.remove_stale_user(user).await {
                Ok(Removal::Deleted) => {
                    info!("user {} / {} deleted", user.login, user.email);
                    summary.users_deleted += 1;
                }
                Ok(Removal::Planned) => {
                    info!("dry-run: would delete user {} / {}", user.login, user.email);
                    summary.users_deleted += 1;
                }
                Ok(Removal::Shielded) => {
                    debug!("user {} is in a special team, keeping", user.login);
                }
                Err(err) => {
                    self.note_item_result(summary, &context, Err(err))?;
                }
            }
        }

        Ok(())
    }

    /// Delete one stale user unless special-team membership shields them.
    async fn remove_stale_user(&self, user: &BackendUser) -> Result<Removal> {
        if self.config.preserve_special_members {
            let teams = self.backend.list_user_teams(user.id).await?;
            if teams.iter().any(|t| self.config.is_special_team(&t.name)) {
                return Ok(Removal::Shielded);
            }
        }
        if self.config.dry_run {
            return Ok(Removal::Planned);
        }
        self.backend.delete_user(user.id).await?;
        Ok(Removal::Deleted)
    }
}
