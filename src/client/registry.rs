//! Source registry HTTP client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

use super::api::RegistryApi;
use super::models::{RegistryOrganization, RegistryUser};
use crate::config::Config;
use crate::error::{RegistryError, Result};

/// Items requested per page.
const PAGE_SIZE: usize = 200;

/// Fields requested for organization listings.
const ORGANIZATION_FIELDS: &[&str] = &[
    "name",
    "abbreviation",
    "country",
    "division_name",
    "uuid",
    "owners",
    "is_service_provider",
];

/// Fields requested for user listings.
const USER_FIELDS: &[&str] = &[
    "permissions",
    "is_staff",
    "is_support",
    "username",
    "uuid",
    "full_name",
    "email",
];

/// HTTP client for the source registry API
pub struct RegistryClient {
    http: HttpClient,
    base_url: String,
    token: String,
}

impl RegistryClient {
    /// Create a client from the application configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.registry_url.clone(),
            token: config.registry_token.clone(),
        })
    }

    /// GET one page of results.
    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .query(query)
            .send()
            .await
            .map_err(RegistryError::from)?;

        let status = response.status();
        match status {
            StatusCode::OK => response.json::<T>().await.map_err(|e| {
                RegistryError::InvalidResponse(format!("failed to parse {path}: {e}")).into()
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(RegistryError::Unauthorized.into())
            }
            status if status.is_server_error() => Err(RegistryError::Unavailable(format!(
                "{path} returned {status}"
            ))
            .into()),
            _ => Err(RegistryError::InvalidResponse(format!(
                "{path} returned unexpected status {status}"
            ))
            .into()),
        }
    }

    /// GET all pages of a listing endpoint.
    ///
    /// Pages until a short page arrives; the registry returns plain arrays,
    /// so a page shorter than `PAGE_SIZE` marks the end.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut results = Vec::new();
        let mut page = 1usize;
        loop {
            let mut query: Vec<(&str, String)> = vec![
                ("page", page.to_string()),
                ("page_size", PAGE_SIZE.to_string()),
            ];
            query.extend_from_slice(filters);

            let batch: Vec<T> = self.get_page(path, &query).await?;
            let len = batch.len();
            results.extend(batch);
            if len < PAGE_SIZE {
                return Ok(results);
            }
            page += 1;
        }
    }
}

#[async_trait]
impl RegistryApi for RegistryClient {
    async fn list_organizations(&self) -> Result<Vec<RegistryOrganization>> {
        let mut filters: Vec<(&str, String)> = vec![
            ("archived", "false".to_string()),
            ("is_active", "true".to_string()),
        ];
        for field in ORGANIZATION_FIELDS {
            filters.push(("field", (*field).to_string()));
        }
        self.get_all("/api/organizations/", &filters).await
    }

    async fn list_users(&self, registration_method: &str) -> Result<Vec<RegistryUser>> {
        let mut filters: Vec<(&str, String)> = vec![
            ("is_active", "true".to_string()),
            ("registration_method", registration_method.to_string()),
        ];
        for field in USER_FIELDS {
            filters.push(("field", (*field).to_string()));
        }
        self.get_all("/api/users/", &filters).await
    }

    async fn get_organization(&self, uuid: &str) -> Result<RegistryOrganization> {
        let path = format!("/api/organizations/{uuid}/");
        self.get_page(&path, &[]).await
    }
}
