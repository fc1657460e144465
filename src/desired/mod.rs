//! Desired-state builder
//!
//! Transforms raw registry records into normalized domain entities. Desired
//! state is recomputed from scratch every cycle; nothing here is mutated
//! after construction.

use std::collections::BTreeMap;

use log::debug;

use crate::client::api::RegistryApi;
use crate::client::models::{RegistryOrganization, RegistryUser};
use crate::config::{Config, TeamGrouping};
use crate::error::Result;

/// A user that should exist in the visualization backend.
///
/// Identity key is `username` (login), everywhere. Registry users with no
/// staff, support, or ownership role never become domain users.
#[derive(Debug, Clone)]
pub struct User {
    pub uuid: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub is_staff: bool,
    pub is_support: bool,
    /// UUIDs of organizations this user owns.
    pub owned_orgs: Vec<String>,
}

/// An active organization from the registry.
///
/// The UUID string is carried verbatim; it doubles as the backend folder UID.
#[derive(Debug, Clone)]
pub struct Organization {
    pub uuid: String,
    pub name: String,
    pub abbreviation: String,
    pub country: String,
    pub division: Option<String>,
    pub is_service_provider: bool,
    pub owners: Vec<User>,
}

impl Organization {
    /// Folder (and organization-team) title: `"{name} ({abbreviation})"`, or
    /// just the name when there is no abbreviation.
    pub fn folder_title(&self) -> String {
        if self.abbreviation.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.abbreviation)
        }
    }
}

/// Everything that should exist in the backend, derived from the registry.
#[derive(Debug, Default)]
pub struct DesiredState {
    pub users: Vec<User>,
    /// Keyed by UUID; BTreeMap so per-cycle processing order is
    /// deterministic.
    pub organizations: BTreeMap<String, Organization>,
}

impl DesiredState {
    /// Fetch and normalize the full desired state for one cycle.
    ///
    /// Any registry failure propagates and aborts the cycle before a single
    /// mutation is attempted.
    pub async fn build(registry: &dyn RegistryApi, config: &Config) -> Result<Self> {
        let raw_orgs = registry.list_organizations().await?;
        let raw_users = registry.list_users(&config.registration_method).await?;

        let mut organizations = BTreeMap::new();
        for raw in raw_orgs {
            let org = map_organization(registry, raw).await?;
            organizations.insert(org.uuid.clone(), org);
        }

        let users = raw_users.into_iter().filter_map(map_user).collect();

        Ok(Self {
            users,
            organizations,
        })
    }

    pub fn staff_users(&self) -> Vec<&User> {
        self.users.iter().filter(|u| u.is_staff).collect()
    }

    pub fn support_users(&self) -> Vec<&User> {
        self.users.iter().filter(|u| u.is_support).collect()
    }

    /// Desired team-name to member-set map under the given grouping.
    ///
    /// Organization grouping yields one team per organization, named like its
    /// folder, members = owners. Division grouping yields one team per
    /// distinct division name, members = the union of its organizations'
    /// owners, deduplicated by login. Organizations without a division are
    /// skipped under division grouping.
    pub fn desired_teams(&self, grouping: TeamGrouping) -> BTreeMap<String, Vec<&User>> {
        let mut teams: BTreeMap<String, Vec<&User>> = BTreeMap::new();
        for org in self.organizations.values() {
            let name = match grouping {
                TeamGrouping::Organization => org.folder_title(),
                TeamGrouping::Division => match &org.division {
                    Some(division) => division.clone(),
                    None => {
                        debug!(
                            "organization {} has no division, skipping in division grouping",
                            org.name
                        );
                        continue;
                    }
                },
            };
            let members = teams.entry(name).or_default();
            for owner in &org.owners {
                if !members.iter().any(|m| m.username == owner.username) {
                    members.push(owner);
                }
            }
        }
        teams
    }

    /// The team an organization's folder grants access to, under the given
    /// grouping. `None` for division grouping when the organization has no
    /// division.
    pub fn org_team_name(org: &Organization, grouping: TeamGrouping) -> Option<String> {
        match grouping {
            TeamGrouping::Organization => Some(org.folder_title()),
            TeamGrouping::Division => org.division.clone(),
        }
    }
}

/// Normalize one registry organization, backfilling a missing division with
/// at most one supplementary lookup.
async fn map_organization(
    registry: &dyn RegistryApi,
    raw: RegistryOrganization,
) -> Result<Organization> {
    let division = match normalize_division(raw.division_name.clone()) {
        Some(division) => Some(division),
        None => {
            debug!("backfilling division for organization {}", raw.uuid);
            let detail = registry.get_organization(&raw.uuid).await?;
            normalize_division(detail.division_name)
        }
    };

    let owners = raw
        .owners
        .into_iter()
        .map(|owner| User {
            uuid: owner.uuid,
            username: owner.username,
            email: owner.email,
            name: owner.full_name,
            is_staff: false,
            is_support: false,
            owned_orgs: vec![raw.uuid.clone()],
        })
        .collect();

    Ok(Organization {
        uuid: raw.uuid,
        name: raw.name,
        abbreviation: raw.abbreviation,
        country: raw.country,
        division,
        is_service_provider: raw.is_service_provider,
        owners,
    })
}

/// Normalize one registry user; users with no managed role map to `None`.
fn map_user(raw: RegistryUser) -> Option<User> {
    let owned_orgs: Vec<String> = raw
        .permissions
        .iter()
        .filter(|grant| grant.is_owner())
        .map(|grant| grant.organization_uuid.clone())
        .collect();

    if !raw.is_staff && !raw.is_support && owned_orgs.is_empty() {
        return None;
    }

    Some(User {
        uuid: raw.uuid,
        username: raw.username,
        email: raw.email,
        name: raw.full_name,
        is_staff: raw.is_staff,
        is_support: raw.is_support,
        owned_orgs,
    })
}

/// An empty division string from the registry means "no division".
fn normalize_division(raw: Option<String>) -> Option<String> {
    raw.filter(|d| !d.trim().is_empty())
}
