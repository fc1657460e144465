//! Team API trait for the visualization backend

use async_trait::async_trait;

use crate::client::models::{Team, TeamMember};
use crate::error::Result;

/// Team and team-membership operations on the visualization backend
#[async_trait]
pub trait TeamApi: Send + Sync {
    /// Search teams, optionally filtered to an exact name.
    ///
    /// Callers resolving a single team must treat more than one match as
    /// ambiguous and abort that operation rather than guess.
    async fn search_teams(&self, name: Option<&str>) -> Result<Vec<Team>>;

    /// Create a team and return its backend-assigned id.
    async fn create_team(&self, name: &str) -> Result<i64>;

    /// Delete a team by id.
    async fn delete_team(&self, team_id: i64) -> Result<()>;

    /// List the members of a team.
    async fn list_team_members(&self, team_id: i64) -> Result<Vec<TeamMember>>;

    /// Add an existing backend user to a team.
    async fn add_team_member(&self, team_id: i64, user_id: i64) -> Result<()>;

    /// Remove a user from a team.
    ///
    /// The user account itself is untouched.
    async fn remove_team_member(&self, team_id: i64, user_id: i64) -> Result<()>;
}
