//! Team sync
//!
//! Generic membership convergence for one named team, plus the
//! organization-team pass that creates one team per grouping key and cleans
//! up teams no longer backed by any organization.

use std::collections::HashMap;

use log::{debug, info, warn};

use super::{CycleSummary, Reconciler};
use crate::desired::{DesiredState, User};
use crate::error::{BackendError, Error, Result};

/// Result of resolving a team by name.
pub(super) enum TeamLookup {
    Found(i64),
    Missing,
    Ambiguous(usize),
}

impl Reconciler<'_> {
    /// Converge one team's membership to exactly the desired member set,
    /// keyed by login. Creates the team when missing.
    pub(super) async fn converge_team(
        &self,
        team_name: &str,
        desired_members: &[&User],
        summary: &mut CycleSummary,
    ) -> Result<()> {
        let team_id = match self.lookup_team(team_name).await? {
            TeamLookup::Found(id) => id,
            TeamLookup::Ambiguous(count) => {
                warn!("team name {team_name:?} matches {count} teams, skipping");
                summary.skipped += 1;
                return Ok(());
            }
            TeamLookup::Missing => {
                if self.config.dry_run {
                    info!(
                        "dry-run: would create team {team_name}, \
                         skipping membership sync this cycle"
                    );
                    summary.teams_created += 1;
                    return Ok(());
                }
                match self.backend.create_team(team_name).await {
                    Ok(id) => {
                        info!("team {team_name} created");
                        summary.teams_created += 1;
                        id
                    }
                    Err(err) => {
                        let context = format!("creating team {team_name}");
                        self.note_item_result(summary, &context, Err(err))?;
                        return Ok(());
                    }
                }
            }
        };

        let observed = self.backend.list_team_members(team_id).await?;
        let desired_map: HashMap<&str, &User> = desired_members
            .iter()
            .map(|u| (u.username.as_str(), *u))
            .collect();
        let observed_logins: Vec<&str> = observed.iter().map(|m| m.login.as_str()).collect();

        for member in &observed {
            if desired_map.contains_key(member.login.as_str()) {
                continue;
            }
            if self.config.dry_run {
                info!(
                    "dry-run: would remove {} from team {team_name}",
                    member.login
                );
                summary.members_removed += 1;
                continue;
            }
            let result = self
                .backend
                .remove_team_member(team_id, member.user_id)
                .await;
            let context = format!("removing {} from team {team_name}", member.login);
            if self.note_item_result(summary, &context, result)? {
                info!("user {} removed from team {team_name}", member.login);
                summary.members_removed += 1;
            }
        }

        for (login, user) in &desired_map {
            if observed_logins.contains(login) {
                continue;
            }
            if self.config.dry_run {
                info!("dry-run: would add {login} to team {team_name}");
                summary.members_added += 1;
                continue;
            }
            let result = self.add_member(team_id, user).await;
            let context = format!("adding {login} to team {team_name}");
            if self.note_item_result(summary, &context, result)? {
                info!("user {login} added to team {team_name}");
                summary.members_added += 1;
            }
        }

        Ok(())
    }

    /// One team per grouping key with the organization owners as members,
    /// then a cleanup pass over teams backed by nothing.
    pub(super) async fn sync_organization_teams(
        &self,
        desired: &DesiredState,
        summary: &mut CycleSummary,
    ) -> Result<()> {
        let desired_teams = desired.desired_teams(self.config.grouping);
        let observed = self.backend.search_teams(None).await?;

        for (name, members) in &desired_teams {
            self.converge_team(name, members, summary).await?;
        }

        for team in &observed {
            if desired_teams.contains_key(&team.name) || self.config.is_special_team(&team.name) {
                continue;
            }
            self.remove_stale_team(&team.name, summary).await?;
        }

        Ok(())
    }

    /// Delete a team that no desired grouping key backs.
    ///
    /// Re-resolves the team by name immediately before deleting so a stale
    /// id from the listing at the start of the pass is never acted on.
    async fn remove_stale_team(&self, name: &str, summary: &mut CycleSummary) -> Result<()> {
        if self.config.dry_run {
            info!("dry-run: would delete team {name}");
            summary.teams_deleted += 1;
            return Ok(());
        }
        match self.lookup_team(name).await? {
            TeamLookup::Missing => {
                debug!("team {name} already gone, skipping");
            }
            TeamLookup::Ambiguous(count) => {
                warn!("team name {name:?} matches {count} teams, skipping deletion");
                summary.skipped += 1;
            }
            TeamLookup::Found(id) => {
                let result = self.backend.delete_team(id).await;
                let context = format!("deleting team {name}");
                if self.note_item_result(summary, &context, result)? {
                    info!("team {name} deleted");
                    summary.teams_deleted += 1;
                }
            }
        }
        Ok(())
    }

    pub(super) async fn lookup_team(&self, name: &str) -> Result<TeamLookup> {
        let matches = self.backend.search_teams(Some(name)).await?;
        Ok(match matches.len() {
            0 => TeamLookup::Missing,
            1 => TeamLookup::Found(matches[0].id),
            count => TeamLookup::Ambiguous(count),
        })
    }

    /// Add a desired user to a team, creating their backend account first if
    /// it does not exist yet (lookup by login, create only on not-found).
    async fn add_member(&self, team_id: i64, user: &User) -> Result<()> {
        let user_id = match self.backend.find_user(&user.username).await {
            Ok(existing) => existing.id,
            Err(Error::Backend(BackendError::NotFound(_))) => {
                let id = self
                    .backend
                    .create_user(&user.name, &user.username, &user.email)
                    .await?;
                info!("user {} / {} created", user.username, user.email);
                id
            }
            Err(err) => return Err(err),
        };
        self.backend.add_team_member(team_id, user_id).await
    }
}
