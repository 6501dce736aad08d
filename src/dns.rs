//! DNS provider integration.
//!
//! Each tenant gets a CNAME `<slug>.<root domain>` pointing at the hosting
//! platform. [`CloudflareDns`] talks to a Cloudflare-compatible v4 API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::DnsConfig;

#[derive(Debug, Error)]
pub enum DnsError {
    #[error("failed to check existing records: HTTP {0}")]
    Lookup(u16),

    #[error("failed to create DNS record: HTTP {0}")]
    Create(u16),

    /// The provider answered 2xx but with `success: false`.
    #[error("DNS provider rejected the record: {0}")]
    Rejected(String),

    #[error("DNS provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl DnsError {
    /// HTTP failures and transport errors may clear up on their own; an
    /// explicit rejection will not.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Whether a CNAME record with exactly this name exists.
    async fn cname_exists(&self, name: &str) -> Result<bool, DnsError>;

    /// Creates `name CNAME target` with automatic TTL.
    async fn create_cname(&self, name: &str, target: &str) -> Result<(), DnsError>;
}

/// Cloudflare v4 API client scoped to one zone.
pub struct CloudflareDns {
    http: Client,
    records_url: String,
    api_token: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

#[derive(Serialize)]
struct NewRecord<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
    content: &'a str,
    /// `1` means "automatic".
    ttl: u32,
}

impl CloudflareDns {
    pub fn new(http: Client, config: &DnsConfig) -> Self {
        Self {
            http,
            records_url: format!("{}/zones/{}/dns_records", config.api_base, config.zone_id),
            api_token: config.api_token.clone(),
        }
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.api_token)
    }
}

#[async_trait]
impl DnsProvider for CloudflareDns {
    async fn cname_exists(&self, name: &str) -> Result<bool, DnsError> {
        let response = self
            .authed(self.http.get(&self.records_url))
            .query(&[("type", "CNAME"), ("name", name)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DnsError::Lookup(status.as_u16()));
        }

        let body: Envelope<Vec<serde_json::Value>> = response.json().await?;
        let found = body.result.map_or(0, |records| records.len());
        debug!(name, found, "checked existing DNS records");
        Ok(found > 0)
    }

    async fn create_cname(&self, name: &str, target: &str) -> Result<(), DnsError> {
        let record = NewRecord { kind: "CNAME", name, content: target, ttl: 1 };
        let response = self
            .authed(self.http.post(&self.records_url))
            .json(&record)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DnsError::Create(status.as_u16()));
        }

        let body: Envelope<serde_json::Value> = response.json().await?;
        if body.success {
            Ok(())
        } else {
            let reason = body
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            Err(DnsError::Rejected(if reason.is_empty() {
                "API returned success: false".to_owned()
            } else {
                reason
            }))
        }
    }
}
