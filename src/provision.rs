//! Tenant provisioning.
//!
//! Creating a site is one required step and two best-effort ones, run in
//! order:
//!
//! 1. insert the tenant row (failure fails the request),
//! 2. ensure a CNAME for `<slug>.<root domain>` exists (check, then create;
//!    retried per [`RetryPolicy`]),
//! 3. map the domain onto the hosting project (a conflict counts as done).
//!
//! Steps 2 and 3 never fail the request. Their outcomes are reported next to
//! the stored record. An integration without credentials is skipped and left
//! out of the report. Nothing is rolled back: a tenant whose integrations
//! both failed stays stored without working routing.

use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::dns::{CloudflareDns, DnsError, DnsProvider};
use crate::domains::{DomainMapper, VercelDomains};
use crate::retry::RetryPolicy;
use crate::slug::slugify;
use crate::store::{NewSite, Site, StoreError, TenantStore};

/// What an idempotent external call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    /// The resource was already there; nothing was written.
    AlreadyPresent,
}

/// Reported result of one best-effort integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Created,
    AlreadyPresent,
    Failed { error: String },
}

impl From<Provisioned> for Outcome {
    fn from(p: Provisioned) -> Self {
        match p {
            Provisioned::Created => Self::Created,
            Provisioned::AlreadyPresent => Self::AlreadyPresent,
        }
    }
}

/// Outcomes of the best-effort steps. `None` means not configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_record: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_mapping: Option<Outcome>,
}

/// The body of a create request. Every field is required; they are optional
/// here so a missing one is reported as such instead of as malformed JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSite {
    pub business_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
}

/// A stored tenant plus what happened to its subdomain.
#[derive(Debug, Clone, Serialize)]
pub struct Provisioning {
    pub data: Site,
    pub slug: String,
    pub dns: IntegrationReport,
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Missing required fields: businessName, email, phone, description")]
    MissingFields,

    #[error("businessName must contain at least one letter or digit")]
    EmptySlug,

    #[error("A site with slug `{slug}` already exists")]
    SlugTaken { slug: String },

    #[error(transparent)]
    Store(StoreError),
}

impl CreateSite {
    /// Checks required fields and derives the slug. Values are stored as sent.
    pub fn validate(self) -> Result<NewSite, ProvisionError> {
        fn present(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.trim().is_empty())
        }

        let (Some(business_name), Some(email), Some(phone), Some(description)) = (
            present(self.business_name),
            present(self.email),
            present(self.phone),
            present(self.description),
        ) else {
            return Err(ProvisionError::MissingFields);
        };

        let slug = slugify(&business_name);
        if slug.is_empty() {
            return Err(ProvisionError::EmptySlug);
        }

        Ok(NewSite { slug, business_name, email, phone, description })
    }
}

/// Creates tenants and their subdomain routing.
pub struct Provisioner {
    store: Arc<dyn TenantStore>,
    dns: Option<Arc<dyn DnsProvider>>,
    domains: Option<Arc<dyn DomainMapper>>,
    retry: RetryPolicy,
    root_domain: String,
    cname_target: String,
}

impl Provisioner {
    /// A provisioner with no integrations and the default retry policy.
    pub fn new(
        store: Arc<dyn TenantStore>,
        root_domain: impl Into<String>,
        cname_target: impl Into<String>,
    ) -> Self {
        Self {
            store,
            dns: None,
            domains: None,
            retry: RetryPolicy::default(),
            root_domain: root_domain.into(),
            cname_target: cname_target.into(),
        }
    }

    /// Wires up whichever integrations `config` has credentials for.
    pub fn from_config(config: &Config, http: &Client, store: Arc<dyn TenantStore>) -> Self {
        let mut provisioner = Self::new(store, &config.root_domain, &config.cname_target);

        match &config.dns {
            Some(dns) => provisioner = provisioner.with_dns(Arc::new(CloudflareDns::new(http.clone(), dns))),
            None => warn!("DNS credentials not configured, tenant DNS records will not be created"),
        }
        match &config.domains {
            Some(domains) => {
                provisioner = provisioner.with_domains(Arc::new(VercelDomains::new(http.clone(), domains)));
            }
            None => warn!("domain-mapping credentials not configured, tenant domains will not be mapped"),
        }

        provisioner
    }

    pub fn with_dns(mut self, dns: Arc<dyn DnsProvider>) -> Self {
        self.dns = Some(dns);
        self
    }

    pub fn with_domains(mut self, domains: Arc<dyn DomainMapper>) -> Self {
        self.domains = Some(domains);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The fully-qualified tenant hostname, e.g. `acme.stonesystems.io`.
    pub fn domain_for(&self, slug: &str) -> String {
        format!("{slug}.{}", self.root_domain)
    }

    /// Validates `request`, stores the tenant, then provisions its subdomain.
    pub async fn provision(&self, request: CreateSite) -> Result<Provisioning, ProvisionError> {
        let site = request.validate()?;
        let slug = site.slug.clone();

        let data = self.store.insert(&site).await.map_err(|e| match e {
            StoreError::Conflict { message } => {
                warn!(%slug, %message, "slug already taken");
                ProvisionError::SlugTaken { slug: slug.clone() }
            }
            other => {
                error!(%slug, error = %other, "failed to store site");
                ProvisionError::Store(other)
            }
        })?;
        info!(%slug, "site stored");

        let domain = self.domain_for(&slug);
        let mut report = IntegrationReport::default();

        match &self.dns {
            Some(dns) => report.dns_record = Some(self.ensure_dns_record(dns.as_ref(), &domain).await),
            None => debug!(%domain, "DNS provider not configured, skipping DNS record creation"),
        }

        match &self.domains {
            Some(domains) => report.domain_mapping = Some(Self::map_domain(domains.as_ref(), &domain).await),
            None => debug!(%domain, "domain mapping not configured, skipping domain addition"),
        }

        Ok(Provisioning { data, slug, dns: report })
    }

    /// Check-then-create under the retry policy. Both calls sit inside one
    /// attempt so a record created by a lost response is found next time.
    async fn ensure_dns_record(&self, dns: &dyn DnsProvider, domain: &str) -> Outcome {
        let target = self.cname_target.as_str();
        let attempt = || async move {
            if dns.cname_exists(domain).await? {
                return Ok::<_, DnsError>(Provisioned::AlreadyPresent);
            }
            dns.create_cname(domain, target).await?;
            Ok(Provisioned::Created)
        };

        match self.retry.run("dns record", attempt, DnsError::is_transient).await {
            Ok(Provisioned::AlreadyPresent) => {
                info!(%domain, "DNS record already exists, skipping");
                Outcome::AlreadyPresent
            }
            Ok(Provisioned::Created) => {
                info!(%domain, "DNS record created");
                Outcome::Created
            }
            Err(exhausted) => {
                error!(%domain, attempts = exhausted.attempts, error = %exhausted.error, "DNS record creation failed");
                Outcome::Failed { error: exhausted.error.to_string() }
            }
        }
    }

    async fn map_domain(domains: &dyn DomainMapper, domain: &str) -> Outcome {
        match domains.add_domain(domain).await {
            Ok(done) => {
                if done == Provisioned::AlreadyPresent {
                    info!(%domain, "domain already mapped, skipping");
                } else {
                    info!(%domain, "domain mapped");
                }
                done.into()
            }
            Err(e) => {
                error!(%domain, error = %e, "domain mapping failed");
                Outcome::Failed { error: e.to_string() }
            }
        }
    }
}
