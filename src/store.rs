//! Tenant records and the datastore they live in.
//!
//! [`TenantStore`] is the seam the provisioner and resolver talk to;
//! [`PostgrestStore`] implements it against a hosted PostgREST endpoint
//! (`<url>/rest/v1/<table>`).

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::DatastoreConfig;

/// Postgres `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// One tenant, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub slug: String,
    pub business_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Assigned by the datastore; passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A tenant about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSite {
    pub slug: String,
    pub business_name: String,
    pub email: String,
    pub phone: String,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A row with the same slug already exists.
    #[error("{message}")]
    Conflict { message: String },

    /// The datastore refused our key.
    #[error("datastore rejected the configured credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Any other error the datastore reported; `message` is its own text.
    #[error("{message}")]
    Query { status: u16, code: Option<String>, message: String },

    #[error("datastore request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected datastore response: {0}")]
    Decode(String),
}

impl StoreError {
    /// The datastore's own error code, when it sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Conflict { .. } => Some(UNIQUE_VIOLATION),
            Self::Query { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Inserts `site` and returns the stored row.
    async fn insert(&self, site: &NewSite) -> Result<Site, StoreError>;

    /// Exact-match lookup. `Ok(None)` when no row has this slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Site>, StoreError>;

    /// Cheap round-trip used by the readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// PostgREST-backed [`TenantStore`].
pub struct PostgrestStore {
    http: Client,
    endpoint: String,
    service_key: String,
    read_key: String,
}

#[derive(Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

impl PostgrestStore {
    pub fn new(http: Client, config: &DatastoreConfig) -> Self {
        Self {
            http,
            endpoint: format!("{}/rest/v1/{}", config.url, config.table),
            service_key: config.service_key.clone(),
            read_key: config.read_key().to_owned(),
        }
    }

    fn request(&self, method: Method, key: &str) -> RequestBuilder {
        self.http
            .request(method, &self.endpoint)
            .header("apikey", key)
            .bearer_auth(key)
    }

    async fn rows(response: Response) -> Result<Vec<Site>, StoreError> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        response
            .json::<Vec<Site>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn error_from(response: Response) -> StoreError {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return StoreError::Unauthorized { status: status.as_u16() };
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<PostgrestError>(&body) {
            Ok(err) => (err.code, err.message),
            Err(_) => (None, None),
        };
        let message = message.unwrap_or_else(|| {
            if body.is_empty() {
                format!("datastore returned HTTP {status}")
            } else {
                body.chars().take(200).collect()
            }
        });

        if status == StatusCode::CONFLICT || code.as_deref() == Some(UNIQUE_VIOLATION) {
            StoreError::Conflict { message }
        } else {
            StoreError::Query { status: status.as_u16(), code, message }
        }
    }
}

#[async_trait]
impl TenantStore for PostgrestStore {
    async fn insert(&self, site: &NewSite) -> Result<Site, StoreError> {
        debug!(slug = %site.slug, "inserting site");
        let response = self
            .request(Method::POST, &self.service_key)
            .header("Prefer", "return=representation")
            .json(site)
            .send()
            .await?;

        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no row".into()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Site>, StoreError> {
        debug!(slug, "looking up site");
        let filter = format!("eq.{slug}");
        let response = self
            .request(Method::GET, &self.read_key)
            .query(&[("slug", filter.as_str()), ("select", "*")])
            .send()
            .await?;

        Ok(Self::rows(response).await?.into_iter().next())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .request(Method::GET, &self.read_key)
            .query(&[("select", "slug"), ("limit", "1")])
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }
}
