//! Configuration management for dashsync
//!
//! Every option is a named CLI flag with an environment-variable fallback.
//! The parsed arguments are converted into one immutable [`Config`] at
//! startup; nothing else in the program reads the environment.

use std::collections::HashSet;
use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::error::{ConfigError, Result};

/// How organization owners are grouped into backend teams.
///
/// The choice determines the entire team topology, so it is an explicit
/// configuration value rather than something inferred from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TeamGrouping {
    /// One team per organization, named like the organization's folder.
    Organization,
    /// One team per division, members pooled across its organizations.
    Division,
}

/// Options shared by the `run` and `once` subcommands.
#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    /// Source registry base URL
    #[arg(long, env = "REGISTRY_API_URL")]
    pub registry_url: String,

    /// Source registry API token
    #[arg(long, env = "REGISTRY_API_TOKEN", hide_env_values = true)]
    pub registry_token: String,

    /// Visualization backend base URL
    #[arg(long, env = "BACKEND_API_URL")]
    pub backend_url: String,

    /// Visualization backend basic-auth user
    #[arg(long, env = "BACKEND_API_USER")]
    pub backend_user: String,

    /// Visualization backend basic-auth password
    #[arg(long, env = "BACKEND_API_PASSWORD", hide_env_values = true)]
    pub backend_password: String,

    /// Only registry users enrolled via this registration method are synced
    #[arg(long, env = "REGISTRATION_METHOD", default_value = "eduteams")]
    pub registration_method: String,

    /// Name of the backend team holding registry staff
    #[arg(long, env = "STAFF_TEAM_NAME", default_value = "staff")]
    pub staff_team: String,

    /// Name of the backend team holding registry support
    #[arg(long, env = "SUPPORT_TEAM_NAME", default_value = "support")]
    pub support_team: String,

    /// Backend logins the sync must never delete or modify
    #[arg(
        long,
        env = "PROTECTED_USERNAMES",
        value_delimiter = ',',
        default_value = "admin"
    )]
    pub protected_usernames: Vec<String>,

    /// Backend team names the sync must never delete or modify
    #[arg(
        long,
        env = "PROTECTED_TEAMS",
        value_delimiter = ',',
        default_value = "Development,Management"
    )]
    pub protected_teams: Vec<String>,

    /// Data source UID substituted into the dashboard template
    #[arg(long, env = "DATASOURCE_UID")]
    pub datasource_uid: String,

    /// Path to a dashboard template JSON (defaults to the embedded template)
    #[arg(long, env = "DASHBOARD_TEMPLATE")]
    pub template: Option<PathBuf>,

    /// Team topology: one team per organization or per division
    #[arg(long, env = "TEAM_GROUPING", value_enum, default_value = "organization")]
    pub grouping: TeamGrouping,

    /// Compute and log every operation without mutating the backend
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: bool,

    /// Skip the folder permission merge step
    #[arg(long, env = "SKIP_FOLDER_PERMISSIONS")]
    pub skip_folder_permissions: bool,

    /// Delete stale users even when they are members of a special team
    #[arg(long)]
    pub no_preserve_special_members: bool,
}

/// Immutable application configuration, built once at startup and passed by
/// reference into the reconciler.
#[derive(Debug, Clone)]
pub struct Config {
    pub registry_url: String,
    pub registry_token: String,
    pub backend_url: String,
    pub backend_user: String,
    pub backend_password: String,
    pub registration_method: String,
    pub staff_team: String,
    pub support_team: String,
    pub protected_usernames: Vec<String>,
    pub protected_teams: Vec<String>,
    pub datasource_uid: String,
    pub template_path: Option<PathBuf>,
    pub grouping: TeamGrouping,
    pub dry_run: bool,
    pub sync_folder_permissions: bool,
    pub preserve_special_members: bool,
}

impl Config {
    /// Build and validate the configuration from parsed arguments.
    ///
    /// The backend basic-auth login is always appended to the protected
    /// usernames so a sync can never delete its own service account.
    pub fn from_args(args: &SyncArgs) -> Result<Self> {
        let registry_url = parse_base_url("registry", &args.registry_url)?;
        let backend_url = parse_base_url("backend", &args.backend_url)?;

        require_nonempty("registry token", &args.registry_token)?;
        require_nonempty("backend user", &args.backend_user)?;
        require_nonempty("backend password", &args.backend_password)?;
        require_nonempty("datasource UID", &args.datasource_uid)?;
        require_nonempty("staff team name", &args.staff_team)?;
        require_nonempty("support team name", &args.support_team)?;

        let mut protected_usernames = clean_list(&args.protected_usernames);
        if !protected_usernames.iter().any(|u| u == &args.backend_user) {
            protected_usernames.push(args.backend_user.clone());
        }

        Ok(Self {
            registry_url,
            registry_token: args.registry_token.clone(),
            backend_url,
            backend_user: args.backend_user.clone(),
            backend_password: args.backend_password.clone(),
            registration_method: args.registration_method.clone(),
            staff_team: args.staff_team.clone(),
            support_team: args.support_team.clone(),
            protected_usernames,
            protected_teams: clean_list(&args.protected_teams),
            datasource_uid: args.datasource_uid.clone(),
            template_path: args.template.clone(),
            grouping: args.grouping,
            dry_run: args.dry_run,
            sync_folder_permissions: !args.skip_folder_permissions,
            preserve_special_members: !args.no_preserve_special_members,
        })
    }

    /// Whether a backend login must never be deleted or modified.
    pub fn is_protected_username(&self, login: &str) -> bool {
        self.protected_usernames.iter().any(|u| u == login)
    }

    /// Role teams plus protected teams: names that team cleanup must leave
    /// alone and that shield their members from user deletion.
    pub fn special_teams(&self) -> HashSet<&str> {
        let mut names: HashSet<&str> = self.protected_teams.iter().map(String::as_str).collect();
        names.insert(self.staff_team.as_str());
        names.insert(self.support_team.as_str());
        names
    }

    /// Whether a backend team name is a role team or protected.
    pub fn is_special_team(&self, name: &str) -> bool {
        self.special_teams().contains(name)
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            registry_url: "http://registry.test".to_string(),
            registry_token: "token".to_string(),
            backend_url: "http://backend.test".to_string(),
            backend_user: "sync-bot".to_string(),
            backend_password: "secret".to_string(),
            registration_method: "eduteams".to_string(),
            staff_team: "staff".to_string(),
            support_team: "support".to_string(),
            protected_usernames: vec!["admin".to_string(), "sync-bot".to_string()],
            protected_teams: vec!["Development".to_string(), "Management".to_string()],
            datasource_uid: "usage-ds".to_string(),
            template_path: None,
            grouping: TeamGrouping::Organization,
            dry_run: false,
            sync_folder_permissions: true,
            preserve_special_members: true,
        }
    }
}

/// Validate a base URL and strip any trailing slash so path joins stay clean.
fn parse_base_url(which: &str, raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(ConfigError::Missing(format!("{which} URL")).into());
    }
    let url = reqwest::Url::parse(raw)
        .map_err(|e| ConfigError::Invalid(format!("{which} URL {raw:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!(
            "{which} URL {raw:?}: expected http or https"
        ))
        .into());
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn require_nonempty(which: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::Missing(which.to_string()).into());
    }
    Ok(())
}

/// Trim entries and drop empties, preserving order.
fn clean_list(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
