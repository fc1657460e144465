//! The reconciler
//!
//! Computes per-resource diffs between desired state (from the source
//! registry) and observed state (from the visualization backend) and applies
//! the minimal set of create/update/delete operations. One cycle runs the
//! sub-syncs strictly in sequence: users, organization teams, role teams,
//! folders, dashboards.
//!
//! Failure policy: connectivity-class errors abort the cycle; anything else
//! is handled per item (logged, counted, loop continues). Protected
//! usernames and team names are never deleted or modified.

mod dashboards;
mod folders;
mod teams;
mod users;

use std::fmt;

use chrono::{DateTime, Utc};
use log::{info, warn};
use tokio::sync::watch;

use crate::client::api::{BackendApi, RegistryApi};
use crate::config::Config;
use crate::desired::DesiredState;
use crate::error::Result;
use crate::template::DashboardTemplate;

/// Counters for one reconciliation cycle.
///
/// In dry-run mode the counters count planned mutations; no mutating call is
/// made.
#[derive(Debug, Clone)]
pub struct CycleSummary {
    pub started_at: DateTime<Utc>,
    pub users_created: usize,
    pub users_deleted: usize,
    pub teams_created: usize,
    pub teams_deleted: usize,
    pub members_added: usize,
    pub members_removed: usize,
    pub folders_created: usize,
    pub folders_updated: usize,
    pub folders_deleted: usize,
    pub dashboards_written: usize,
    /// Operations skipped due to ambiguity or title collisions.
    pub skipped: usize,
    /// Non-fatal per-item failures.
    pub failures: usize,
    /// True when a shutdown request ended the cycle between steps.
    pub interrupted: bool,
}

impl CycleSummary {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            users_created: 0,
            users_deleted: 0,
            teams_created: 0,
            teams_deleted: 0,
            members_added: 0,
            members_removed: 0,
            folders_created: 0,
            folders_updated: 0,
            folders_deleted: 0,
            dashboards_written: 0,
            skipped: 0,
            failures: 0,
            interrupted: false,
        }
    }
}

impl fmt::Display for CycleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "users +{}/-{}, teams +{}/-{}, members +{}/-{}, \
             folders +{}/~{}/-{}, dashboards {}, skipped {}, failures {}",
            self.users_created,
            self.users_deleted,
            self.teams_created,
            self.teams_deleted,
            self.members_added,
            self.members_removed,
            self.folders_created,
            self.folders_updated,
            self.folders_deleted,
            self.dashboards_written,
            self.skipped,
            self.failures,
        )
    }
}

/// Drives one reconciliation cycle against the two APIs.
///
/// Holds only borrowed collaborators; a fresh desired state is computed on
/// every [`run_cycle`](Self::run_cycle) call.
pub struct Reconciler<'a> {
    config: &'a Config,
    registry: &'a dyn RegistryApi,
    backend: &'a dyn BackendApi,
    template: &'a DashboardTemplate,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        config: &'a Config,
        registry: &'a dyn RegistryApi,
        backend: &'a dyn BackendApi,
        template: &'a DashboardTemplate,
    ) -> Self {
        Self {
            config,
            registry,
            backend,
            template,
        }
    }

    /// Run one full reconciliation cycle.
    ///
    /// The shutdown flag is checked between steps; a requested shutdown ends
    /// the cycle early with `interrupted` set rather than failing it.
    pub async fn run_cycle(&self, shutdown: &watch::Receiver<bool>) -> Result<CycleSummary> {
        let mut summary = CycleSummary::new();
        if self.config.dry_run {
            info!("dry-run mode: mutations are logged, not applied");
        }

        let desired = DesiredState::build(self.registry, self.config).await?;
        info!(
            "desired state: {} users, {} organizations",
            desired.users.len(),
            desired.organizations.len()
        );

        let stop_before = |name: &str, summary: &mut CycleSummary| {
            if *shutdown.borrow() {
                warn!("shutdown requested, ending cycle before {name} sync");
                summary.interrupted = true;
                true
            } else {
                false
            }
        };

        self.sync_users(&desired, &mut summary).await?;

        if stop_before("team", &mut summary) {
            return Ok(summary);
        }
        self.sync_organization_teams(&desired, &mut summary).await?;
        self.converge_team(&self.config.staff_team, &desired.staff_users(), &mut summary)
            .await?;
        self.converge_team(
            &self.config.support_team,
            &desired.support_users(),
            &mut summary,
        )
        .await?;

        if stop_before("folder", &mut summary) {
            return Ok(summary);
        }
        self.sync_folders(&desired, &mut summary).await?;

        if stop_before("dashboard", &mut summary) {
            return Ok(summary);
        }
        self.sync_dashboards(&desired, &mut summary).await?;

        Ok(summary)
    }

    /// Handle the outcome of one item-level mutation.
    ///
    /// Connectivity-class errors propagate and abort the cycle; anything else
    /// is logged and counted, and the caller's loop continues. Returns
    /// whether the item succeeded.
    fn note_item_result(
        &self,
        summary: &mut CycleSummary,
        context: &str,
        result: Result<()>,
    ) -> Result<bool> {
        match result {
            Ok(()) => Ok(true),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                warn!("{context} failed: {err}");
                summary.failures += 1;
                Ok(false)
            }
        }
    }
}
