//! Hosting-platform domain mapping.
//!
//! Attaches `<slug>.<root domain>` to the deployed project so the platform
//! serves the tenant subdomain. [`VercelDomains`] talks to a Vercel-compatible
//! projects API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::DomainMappingConfig;
use crate::provision::Provisioned;

const DOMAIN_ALREADY_IN_USE: &str = "domain_already_in_use";

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("failed to add domain: HTTP {status}{}", code_suffix(.code))]
    Api { status: u16, code: Option<String> },

    #[error("domain API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default()
}

#[async_trait]
pub trait DomainMapper: Send + Sync {
    /// Maps `domain` onto the project. A domain that is already mapped is
    /// reported as [`Provisioned::AlreadyPresent`], not as an error.
    async fn add_domain(&self, domain: &str) -> Result<Provisioned, DomainError>;
}

/// Vercel projects API client scoped to one project.
pub struct VercelDomains {
    http: Client,
    domains_url: String,
    api_token: String,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: Option<String>,
}

impl VercelDomains {
    pub fn new(http: Client, config: &DomainMappingConfig) -> Self {
        Self {
            http,
            domains_url: format!("{}/v10/projects/{}/domains", config.api_base, config.project_id),
            api_token: config.api_token.clone(),
        }
    }
}

#[async_trait]
impl DomainMapper for VercelDomains {
    async fn add_domain(&self, domain: &str) -> Result<Provisioned, DomainError> {
        let response = self
            .http
            .post(&self.domains_url)
            .bearer_auth(&self.api_token)
            .json(&json!({ "name": domain }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(Provisioned::Created);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        let code = body.error.and_then(|e| e.code);

        if status == StatusCode::CONFLICT || code.as_deref() == Some(DOMAIN_ALREADY_IN_USE) {
            return Ok(Provisioned::AlreadyPresent);
        }

        Err(DomainError::Api { status: status.as_u16(), code })
    }
}
