//! Visualization backend HTTP client

use std::time::Duration;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::api::{DashboardApi, FolderApi, TeamApi, UserAdminApi};
use super::models::{
    BackendUser, DashboardHit, DashboardPayload, Folder, FolderPermission, Team, TeamMember,
};
use crate::config::Config;
use crate::error::{BackendError, Result};

/// Generated credential length.
///
/// The backend requires a password at user creation even though
/// authentication is delegated externally; nobody ever logs in with it.
const PASSWORD_LENGTH: usize = 20;

/// HTTP client for the visualization backend API
pub struct BackendClient {
    http: HttpClient,
    base_url: String,
    user: String,
    password: String,
}

impl BackendClient {
    /// Create a client from the application configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.backend_url.clone(),
            user: config.backend_user.clone(),
            password: config.backend_password.clone(),
        })
    }

    /// Issue a request and map the response status into the error taxonomy.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http
            .request(method, &url)
            .basic_auth(&self.user, Some(&self.password));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(BackendError::from)?;
        let status = response.status();
        match status {
            StatusCode::OK => response.json::<T>().await.map_err(|e| {
                BackendError::InvalidResponse(format!("failed to parse {path}: {e}")).into()
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(BackendError::Unauthorized.into())
            }
            StatusCode::NOT_FOUND => Err(BackendError::NotFound(path.to_string()).into()),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::CONFLICT => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "bad request".to_string());
                Err(BackendError::BadRequest(format!("{path}: {message}")).into())
            }
            status if status.is_server_error() => {
                Err(BackendError::ServerError(format!("{path} returned {status}")).into())
            }
            _ => Err(BackendError::InvalidResponse(format!(
                "{path} returned unexpected status {status}"
            ))
            .into()),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let _: Value = self.request(Method::DELETE, path, None).await?;
        Ok(())
    }
}

/// A random strong credential: alphanumeric, drawn from the thread-local
/// CSPRNG.
fn generate_password() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

#[async_trait]
impl UserAdminApi for BackendClient {
    async fn list_users(&self) -> Result<Vec<BackendUser>> {
        self.get("/api/users").await
    }

    async fn find_user(&self, login_or_email: &str) -> Result<BackendUser> {
        let path = format!(
            "/api/users/lookup?loginOrEmail={}",
            urlencode(login_or_email)
        );
        self.get(&path).await
    }

    async fn create_user(&self, name: &str, login: &str, email: &str) -> Result<i64> {
        #[derive(serde::Deserialize)]
        struct Created {
            id: i64,
        }

        let body = json!({
            "name": name,
            "login": login,
            "email": email,
            "password": generate_password(),
        });
        let created: Created = self.post("/api/admin/users", &body).await?;
        Ok(created.id)
    }

    async fn delete_user(&self, user_id: i64) -> Result<()> {
        self.delete(&format!("/api/admin/users/{user_id}")).await
    }

    async fn list_user_teams(&self, user_id: i64) -> Result<Vec<Team>> {
        self.get(&format!("/api/users/{user_id}/teams")).await
    }
}

#[async_trait]
impl TeamApi for BackendClient {
    async fn search_teams(&self, name: Option<&str>) -> Result<Vec<Team>> {
        #[derive(serde::Deserialize)]
        struct SearchResponse {
            teams: Vec<Team>,
        }

        let path = match name {
            Some(name) => format!("/api/teams/search?perpage=1000&name={}", urlencode(name)),
            None => "/api/teams/search?perpage=1000".to_string(),
        };
        let response: SearchResponse = self.get(&path).await?;
        Ok(response.teams)
    }

    async fn create_team(&self, name: &str) -> Result<i64> {
        #[derive(serde::Deserialize)]
        struct Created {
            #[serde(rename = "teamId")]
            team_id: i64,
        }

        let created: Created = self.post("/api/teams", &json!({ "name": name })).await?;
        Ok(created.team_id)
    }

    async fn delete_team(&self, team_id: i64) -> Result<()> {
        self.delete(&format!("/api/teams/{team_id}")).await
    }

    async fn list_team_members(&self, team_id: i64) -> Result<Vec<TeamMember>> {
        self.get(&format!("/api/teams/{team_id}/members")).await
    }

    async fn add_team_member(&self, team_id: i64, user_id: i64) -> Result<()> {
        let _: Value = self
            .post(
                &format!("/api/teams/{team_id}/members"),
                &json!({ "userId": user_id }),
            )
            .await?;
        Ok(())
    }

    async fn remove_team_member(&self, team_id: i64, user_id: i64) -> Result<()> {
        self.delete(&format!("/api/teams/{team_id}/members/{user_id}"))
            .await
    }
}

#[async_trait]
impl FolderApi for BackendClient {
    async fn list_folders(&self) -> Result<Vec<Folder>> {
        self.get("/api/folders?limit=1000").await
    }

    async fn create_folder(&self, uid: &str, title: &str) -> Result<Folder> {
        self.post("/api/folders", &json!({ "uid": uid, "title": title }))
            .await
    }

    async fn update_folder(&self, uid: &str, title: &str) -> Result<Folder> {
        let body = json!({ "title": title, "overwrite": true });
        self.request(Method::PUT, &format!("/api/folders/{uid}"), Some(&body))
            .await
    }

    async fn delete_folder(&self, uid: &str) -> Result<()> {
        self.delete(&format!("/api/folders/{uid}")).await
    }

    async fn get_folder_permissions(&self, uid: &str) -> Result<Vec<FolderPermission>> {
        self.get(&format!("/api/folders/{uid}/permissions")).await
    }

    async fn set_folder_permissions(
        &self,
        uid: &str,
        permissions: &[FolderPermission],
    ) -> Result<()> {
        let body = json!({ "items": permissions });
        let _: Value = self
            .post(&format!("/api/folders/{uid}/permissions"), &body)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DashboardApi for BackendClient {
    async fn search_dashboards(&self, tag: &str) -> Result<Vec<DashboardHit>> {
        let path = format!("/api/search?type=dash-db&tag={}", urlencode(tag));
        self.get(&path).await
    }

    async fn upsert_dashboard(&self, payload: &DashboardPayload) -> Result<()> {
        let body = serde_json::to_value(payload)?;
        let _: Value = self.post("/api/dashboards/db", &body).await?;
        Ok(())
    }
}

/// Percent-encode a query-string value.
fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
