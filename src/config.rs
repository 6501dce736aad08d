//! Process configuration.
//!
//! Read once from the environment at startup and passed by reference to the
//! provisioner and resolver. The datastore settings are required; the DNS and
//! domain-mapping credentials are optional and each one gates its integration.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_TABLE: &str = "sites";
pub const DEFAULT_ROOT_DOMAIN: &str = "stonesystems.io";
pub const DEFAULT_CNAME_TARGET: &str = "cname.vercel-dns.com";
pub const DEFAULT_CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_VERCEL_API_BASE: &str = "https://api.vercel.com";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Hosted datastore (PostgREST) settings.
#[derive(Debug, Clone)]
pub struct DatastoreConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Key used for inserts.
    pub service_key: String,
    /// Key used for reads; falls back to `service_key`.
    pub anon_key: Option<String>,
    pub table: String,
}

impl DatastoreConfig {
    pub fn read_key(&self) -> &str {
        self.anon_key.as_deref().unwrap_or(&self.service_key)
    }
}

/// DNS provider credentials.
#[derive(Debug, Clone)]
pub struct DnsConfig {
    pub api_token: String,
    pub zone_id: String,
    pub api_base: String,
}

/// Hosting-platform credentials for the domain mapping.
#[derive(Debug, Clone)]
pub struct DomainMappingConfig {
    pub api_token: String,
    pub project_id: String,
    pub api_base: String,
}

/// Everything sitegen needs to run.
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub datastore: DatastoreConfig,
    /// `None` disables DNS record creation.
    pub dns: Option<DnsConfig>,
    /// `None` disables domain mapping.
    pub domains: Option<DomainMappingConfig>,
    /// Apex domain tenants are provisioned under, e.g. `stonesystems.io`.
    pub root_domain: String,
    /// What each tenant's CNAME points at.
    pub cname_target: String,
    /// First labels that still count as the root site, e.g. `www`.
    pub reserved_subdomains: Vec<String>,
    /// Applied to every outbound HTTP call. `None` waits indefinitely.
    pub outbound_timeout: Option<Duration>,
}

impl Config {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr = get("SITEGEN_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_owned())
            .parse::<SocketAddr>()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "SITEGEN_ADDR",
                reason: e.to_string(),
            })?;

        let datastore = DatastoreConfig {
            url: get("SUPABASE_URL")
                .or_else(|| get("NEXT_PUBLIC_SUPABASE_URL"))
                .ok_or(ConfigError::Missing("SUPABASE_URL"))?
                .trim_end_matches('/')
                .to_owned(),
            service_key: get("SUPABASE_SERVICE_ROLE_KEY")
                .ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?,
            anon_key: get("SUPABASE_ANON_KEY"),
            table: get("SITES_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_owned()),
        };

        let dns = match (get("CLOUDFLARE_API_TOKEN"), get("CLOUDFLARE_ZONE_ID")) {
            (Some(api_token), Some(zone_id)) => Some(DnsConfig {
                api_token,
                zone_id,
                api_base: api_base(get("CLOUDFLARE_API_BASE"), DEFAULT_CLOUDFLARE_API_BASE),
            }),
            (None, None) => None,
            _ => {
                warn!("only one of CLOUDFLARE_API_TOKEN / CLOUDFLARE_ZONE_ID is set, DNS provisioning disabled");
                None
            }
        };

        let domains = match (get("VERCEL_API_TOKEN"), get("VERCEL_PROJECT_ID")) {
            (Some(api_token), Some(project_id)) => Some(DomainMappingConfig {
                api_token,
                project_id,
                api_base: api_base(get("VERCEL_API_BASE"), DEFAULT_VERCEL_API_BASE),
            }),
            (None, None) => None,
            _ => {
                warn!("only one of VERCEL_API_TOKEN / VERCEL_PROJECT_ID is set, domain mapping disabled");
                None
            }
        };

        let reserved_subdomains = get("RESERVED_SUBDOMAINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_ascii_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["www".to_owned()]);

        let outbound_timeout = get("OUTBOUND_TIMEOUT_SECS")
            .map(|v| {
                v.trim().parse::<u64>().map(Duration::from_secs).map_err(|e| ConfigError::Invalid {
                    name: "OUTBOUND_TIMEOUT_SECS",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            addr,
            datastore,
            dns,
            domains,
            root_domain: get("ROOT_DOMAIN")
                .unwrap_or_else(|| DEFAULT_ROOT_DOMAIN.to_owned())
                .to_ascii_lowercase(),
            cname_target: get("CNAME_TARGET").unwrap_or_else(|| DEFAULT_CNAME_TARGET.to_owned()),
            reserved_subdomains,
            outbound_timeout,
        })
    }

    /// Builds the shared outbound HTTP client.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.outbound_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

fn api_base(value: Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).trim_end_matches('/').to_owned()
}
