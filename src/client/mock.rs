//! Mock registry and backend clients for testing
//!
//! Stateful in-memory implementations of the API traits: mutations actually
//! change the mock's state, so running a second reconciliation cycle against
//! the same mock observes the effects of the first. Call counts and captured
//! payloads support exact-call-count assertions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::api::{DashboardApi, FolderApi, RegistryApi, TeamApi, UserAdminApi};
use super::models::{
    BackendUser, DashboardHit, DashboardPayload, Folder, FolderPermission, RegistryOrganization,
    RegistryUser, Team, TeamMember,
};
use crate::error::{BackendError, RegistryError, Result};

// ============================================================================
// Registry mock
// ============================================================================

/// Tracks registry call counts for test verification.
#[derive(Default, Debug, Clone)]
pub struct RegistryCallCounts {
    pub list_organizations: usize,
    pub list_users: usize,
    pub get_organization: usize,
}

/// Mock source registry.
#[derive(Default)]
pub struct MockRegistryClient {
    organizations: Arc<Mutex<Vec<RegistryOrganization>>>,
    users: Arc<Mutex<Vec<RegistryUser>>>,
    /// Per-UUID payloads for `get_organization` (division backfill lookups).
    details: Arc<Mutex<HashMap<String, RegistryOrganization>>>,
    /// Error to return from the next call, consumed on first use.
    error: Arc<Mutex<Option<RegistryError>>>,
    calls: Arc<Mutex<RegistryCallCounts>>,
}

impl MockRegistryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_organizations(self, organizations: Vec<RegistryOrganization>) -> Self {
        *self.organizations.lock().await = organizations;
        self
    }

    pub async fn with_users(self, users: Vec<RegistryUser>) -> Self {
        *self.users.lock().await = users;
        self
    }

    pub async fn with_organization_detail(self, detail: RegistryOrganization) -> Self {
        self.details
            .lock()
            .await
            .insert(detail.uuid.clone(), detail);
        self
    }

    pub async fn with_error(self, error: RegistryError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    pub async fn call_counts(&self) -> RegistryCallCounts {
        self.calls.lock().await.clone()
    }

    async fn take_error(&self) -> Option<RegistryError> {
        self.error.lock().await.take()
    }
}

#[async_trait]
impl RegistryApi for MockRegistryClient {
    async fn list_organizations(&self) -> Result<Vec<RegistryOrganization>> {
        self.calls.lock().await.list_organizations += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        Ok(self.organizations.lock().await.clone())
    }

    async fn list_users(&self, _registration_method: &str) -> Result<Vec<RegistryUser>> {
        self.calls.lock().await.list_users += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        Ok(self.users.lock().await.clone())
    }

    async fn get_organization(&self, uuid: &str) -> Result<RegistryOrganization> {
        self.calls.lock().await.get_organization += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        self.details
            .lock()
            .await
            .get(uuid)
            .cloned()
            .ok_or_else(|| {
                RegistryError::InvalidResponse(format!("unknown organization {uuid}")).into()
            })
    }
}

// ============================================================================
// Backend mock
// ============================================================================

/// Tracks backend call counts for test verification.
#[derive(Default, Debug, Clone)]
pub struct BackendCallCounts {
    pub list_users: usize,
    pub find_user: usize,
    pub create_user: usize,
    pub delete_user: usize,
    pub list_user_teams: usize,
    pub search_teams: usize,
    pub create_team: usize,
    pub delete_team: usize,
    pub list_team_members: usize,
    pub add_team_member: usize,
    pub remove_team_member: usize,
    pub list_folders: usize,
    pub create_folder: usize,
    pub update_folder: usize,
    pub delete_folder: usize,
    pub get_folder_permissions: usize,
    pub set_folder_permissions: usize,
    pub search_dashboards: usize,
    pub upsert_dashboard: usize,
}

impl BackendCallCounts {
    /// Total number of mutating calls made.
    pub fn mutations(&self) -> usize {
        self.create_user
            + self.delete_user
            + self.create_team
            + self.delete_team
            + self.add_team_member
            + self.remove_team_member
            + self.create_folder
            + self.update_folder
            + self.delete_folder
            + self.set_folder_permissions
            + self.upsert_dashboard
    }

    /// Mutating calls excluding the per-cycle rewrites: the dashboard upsert
    /// and the permission replacement both fire every cycle for every
    /// folder-backed organization, by design.
    pub fn diff_mutations(&self) -> usize {
        self.mutations() - self.upsert_dashboard - self.set_folder_permissions
    }
}

#[derive(Default)]
struct BackendState {
    users: Vec<BackendUser>,
    next_user_id: i64,
    teams: Vec<Team>,
    next_team_id: i64,
    members: HashMap<i64, Vec<TeamMember>>,
    folders: Vec<Folder>,
    permissions: HashMap<String, Vec<FolderPermission>>,
    dashboards: Vec<DashboardHit>,
}

/// Mock visualization backend.
///
/// Ids are assigned sequentially, continuing above the highest seeded id.
#[derive(Default)]
pub struct MockBackendClient {
    state: Arc<Mutex<BackendState>>,
    /// Logins whose `create_user` call fails with a server error.
    failing_logins: Arc<Mutex<Vec<String>>>,
    /// Error to return from the next call, consumed on first use.
    error: Arc<Mutex<Option<BackendError>>>,
    calls: Arc<Mutex<BackendCallCounts>>,
    captured_dashboards: Arc<Mutex<Vec<DashboardPayload>>>,
    captured_permissions: Arc<Mutex<Vec<(String, Vec<FolderPermission>)>>>,
}

impl MockBackendClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_users(self, users: Vec<BackendUser>) -> Self {
        {
            let mut state = self.state.lock().await;
            state.next_user_id = users.iter().map(|u| u.id).max().unwrap_or(0);
            state.users = users;
        }
        self
    }

    pub async fn with_teams(self, teams: Vec<Team>) -> Self {
        {
            let mut state = self.state.lock().await;
            state.next_team_id = teams.iter().map(|t| t.id).max().unwrap_or(0);
            state.teams = teams;
        }
        self
    }

    pub async fn with_team_members(self, team_id: i64, members: Vec<TeamMember>) -> Self {
        self.state.lock().await.members.insert(team_id, members);
        self
    }

    pub async fn with_folders(self, folders: Vec<Folder>) -> Self {
        self.state.lock().await.folders = folders;
        self
    }

    pub async fn with_folder_permissions(
        self,
        uid: &str,
        permissions: Vec<FolderPermission>,
    ) -> Self {
        self.state
            .lock()
            .await
            .permissions
            .insert(uid.to_string(), permissions);
        self
    }

    pub async fn with_dashboards(self, dashboards: Vec<DashboardHit>) -> Self {
        self.state.lock().await.dashboards = dashboards;
        self
    }

    /// Make `create_user` fail with a server error for the given login.
    pub async fn failing_create_user(self, login: &str) -> Self {
        self.failing_logins.lock().await.push(login.to_string());
        self
    }

    pub async fn with_error(self, error: BackendError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    pub async fn call_counts(&self) -> BackendCallCounts {
        self.calls.lock().await.clone()
    }

    /// Reset call counts, keeping state. Use between cycles in idempotence
    /// tests.
    pub async fn reset_call_counts(&self) {
        *self.calls.lock().await = BackendCallCounts::default();
    }

    pub async fn captured_dashboards(&self) -> Vec<DashboardPayload> {
        self.captured_dashboards.lock().await.clone()
    }

    pub async fn captured_permissions(&self) -> Vec<(String, Vec<FolderPermission>)> {
        self.captured_permissions.lock().await.clone()
    }

    /// Current user logins, sorted, for convergence assertions.
    pub async fn user_logins(&self) -> Vec<String> {
        let mut logins: Vec<String> = self
            .state
            .lock()
            .await
            .users
            .iter()
            .map(|u| u.login.clone())
            .collect();
        logins.sort();
        logins
    }

    /// Current member logins of a team, sorted.
    pub async fn member_logins(&self, team_id: i64) -> Vec<String> {
        let mut logins: Vec<String> = self
            .state
            .lock()
            .await
            .members
            .get(&team_id)
            .map(|members| members.iter().map(|m| m.login.clone()).collect())
            .unwrap_or_default();
        logins.sort();
        logins
    }

    /// Current team names, sorted.
    pub async fn team_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .state
            .lock()
            .await
            .teams
            .iter()
            .map(|t| t.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Current folder UIDs, sorted.
    pub async fn folder_uids(&self) -> Vec<String> {
        let mut uids: Vec<String> = self
            .state
            .lock()
            .await
            .folders
            .iter()
            .map(|f| f.uid.clone())
            .collect();
        uids.sort();
        uids
    }

    async fn take_error(&self) -> Option<BackendError> {
        self.error.lock().await.take()
    }
}

#[async_trait]
impl UserAdminApi for MockBackendClient {
    async fn list_users(&self) -> Result<Vec<BackendUser>> {
        self.calls.lock().await.list_users += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        Ok(self.state.lock().await.users.clone())
    }

    async fn find_user(&self, login_or_email: &str) -> Result<BackendUser> {
        self.calls.lock().await.find_user += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        self.state
            .lock()
            .await
            .users
            .iter()
            .find(|u| u.login == login_or_email || u.email == login_or_email)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(login_or_email.to_string()).into())
    }

    async fn create_user(&self, name: &str, login: &str, email: &str) -> Result<i64> {
        self.calls.lock().await.create_user += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        if self.failing_logins.lock().await.iter().any(|l| l == login) {
            return Err(BackendError::ServerError(format!("create {login}")).into());
        }
        let mut state = self.state.lock().await;
        state.next_user_id += 1;
        let id = state.next_user_id;
        state.users.push(BackendUser {
            id,
            login: login.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            is_admin: false,
            is_disabled: false,
        });
        Ok(id)
    }

    async fn delete_user(&self, user_id: i64) -> Result<()> {
        self.calls.lock().await.delete_user += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        let mut state = self.state.lock().await;
        state.users.retain(|u| u.id != user_id);
        for members in state.members.values_mut() {
            members.retain(|m| m.user_id != user_id);
        }
        Ok(())
    }

    async fn list_user_teams(&self, user_id: i64) -> Result<Vec<Team>> {
        self.calls.lock().await.list_user_teams += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        let state = self.state.lock().await;
        Ok(state
            .teams
            .iter()
            .filter(|team| {
                state
                    .members
                    .get(&team.id)
                    .is_some_and(|members| members.iter().any(|m| m.user_id == user_id))
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TeamApi for MockBackendClient {
    async fn search_teams(&self, name: Option<&str>) -> Result<Vec<Team>> {
        self.calls.lock().await.search_teams += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        let state = self.state.lock().await;
        Ok(state
            .teams
            .iter()
            .filter(|t| name.is_none_or(|n| t.name == n))
            .cloned()
            .collect())
    }

    async fn create_team(&self, name: &str) -> Result<i64> {
        self.calls.lock().await.create_team += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        let mut state = self.state.lock().await;
        state.next_team_id += 1;
        let id = state.next_team_id;
        state.teams.push(Team {
            id,
            name: name.to_string(),
        });
        state.members.insert(id, Vec::new());
        Ok(id)
    }

    async fn delete_team(&self, team_id: i64) -> Result<()> {
        self.calls.lock().await.delete_team += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        let mut state = self.state.lock().await;
        state.teams.retain(|t| t.id != team_id);
        state.members.remove(&team_id);
        Ok(())
    }

    async fn list_team_members(&self, team_id: i64) -> Result<Vec<TeamMember>> {
        self.calls.lock().await.list_team_members += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        Ok(self
            .state
            .lock()
            .await
            .members
            .get(&team_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_team_member(&self, team_id: i64, user_id: i64) -> Result<()> {
        self.calls.lock().await.add_team_member += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        let mut state = self.state.lock().await;
        let member = state
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| TeamMember {
                user_id: u.id,
                login: u.login.clone(),
                email: u.email.clone(),
            })
            .ok_or_else(|| BackendError::NotFound(format!("user {user_id}")))?;
        state.members.entry(team_id).or_default().push(member);
        Ok(())
    }

    async fn remove_team_member(&self, team_id: i64, user_id: i64) -> Result<()> {
        self.calls.lock().await.remove_team_member += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        let mut state = self.state.lock().await;
        if let Some(members) = state.members.get_mut(&team_id) {
            members.retain(|m| m.user_id != user_id);
        }
        Ok(())
    }
}

#[async_trait]
impl FolderApi for MockBackendClient {
    async fn list_folders(&self) -> Result<Vec<Folder>> {
        self.calls.lock().await.list_folders += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        Ok(self.state.lock().await.folders.clone())
    }

    async fn create_folder(&self, uid: &str, title: &str) -> Result<Folder> {
        self.calls.lock().await.create_folder += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        let folder = Folder {
            uid: uid.to_string(),
            title: title.to_string(),
        };
        self.state.lock().await.folders.push(folder.clone());
        Ok(folder)
    }

    async fn update_folder(&self, uid: &str, title: &str) -> Result<Folder> {
        self.calls.lock().await.update_folder += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        let mut state = self.state.lock().await;
        let folder = state
            .folders
            .iter_mut()
            .find(|f| f.uid == uid)
            .ok_or_else(|| BackendError::NotFound(format!("folder {uid}")))?;
        folder.title = title.to_string();
        Ok(folder.clone())
    }

    async fn delete_folder(&self, uid: &str) -> Result<()> {
        self.calls.lock().await.delete_folder += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        let mut state = self.state.lock().await;
        state.folders.retain(|f| f.uid != uid);
        state.permissions.remove(uid);
        Ok(())
    }

    async fn get_folder_permissions(&self, uid: &str) -> Result<Vec<FolderPermission>> {
        self.calls.lock().await.get_folder_permissions += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        Ok(self
            .state
            .lock()
            .await
            .permissions
            .get(uid)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_folder_permissions(
        &self,
        uid: &str,
        permissions: &[FolderPermission],
    ) -> Result<()> {
        self.calls.lock().await.set_folder_permissions += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        self.captured_permissions
            .lock()
            .await
            .push((uid.to_string(), permissions.to_vec()));
        self.state
            .lock()
            .await
            .permissions
            .insert(uid.to_string(), permissions.to_vec());
        Ok(())
    }
}

#[async_trait]
impl DashboardApi for MockBackendClient {
    async fn search_dashboards(&self, _tag: &str) -> Result<Vec<DashboardHit>> {
        self.calls.lock().await.search_dashboards += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        Ok(self.state.lock().await.dashboards.clone())
    }

    async fn upsert_dashboard(&self, payload: &DashboardPayload) -> Result<()> {
        self.calls.lock().await.upsert_dashboard += 1;
        if let Some(err) = self.take_error().await {
            return Err(err.into());
        }
        self.captured_dashboards.lock().await.push(payload.clone());

        let uid = payload
            .dashboard
            .get("uid")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let version = payload
            .dashboard
            .get("version")
            .and_then(|v| v.as_i64())
            .unwrap_or(1);
        let title = payload
            .dashboard
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let mut state = self.state.lock().await;
        let existing = uid
            .as_deref()
            .and_then(|uid| state.dashboards.iter().position(|d| d.uid == uid));
        match existing {
            Some(index) => {
                let hit = &mut state.dashboards[index];
                hit.version = Some(version);
                hit.title = title;
            }
            None => {
                let generated = format!("dash-{}", state.dashboards.len() + 1);
                state.dashboards.push(DashboardHit {
                    uid: uid.unwrap_or(generated),
                    title,
                    folder_uid: Some(payload.folder_uid.clone()),
                    version: Some(version),
                });
            }
        }
        Ok(())
    }
}
