//! Tenant lookup by subdomain.
//!
//! Every call is a fresh read from the store; nothing is cached.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

use crate::slug;
use crate::store::{Site, StoreError, TenantStore};
use crate::subdomain::{Classifier, HostKind};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Slug is required")]
    MissingSlug,

    #[error("Invalid slug")]
    InvalidSlug,

    #[error("Site not found")]
    NotFound { slug: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Resolver {
    store: Arc<dyn TenantStore>,
    classifier: Classifier,
}

impl Resolver {
    pub fn new(store: Arc<dyn TenantStore>, classifier: Classifier) -> Self {
        Self { store, classifier }
    }

    /// Looks up the tenant whose slug is exactly `label`.
    pub async fn resolve(&self, label: &str) -> Result<Site, ResolveError> {
        if label.is_empty() {
            return Err(ResolveError::MissingSlug);
        }
        if !slug::is_canonical(label) {
            debug!(label, "rejecting malformed slug");
            return Err(ResolveError::InvalidSlug);
        }

        match self.store.find_by_slug(label).await {
            Ok(Some(site)) => Ok(site),
            Ok(None) => {
                debug!(slug = label, "no site for slug");
                Err(ResolveError::NotFound { slug: label.to_owned() })
            }
            Err(e) => {
                error!(slug = label, error = %e, "site lookup failed");
                Err(e.into())
            }
        }
    }

    /// Resolves the tenant addressed by a `Host` header value.
    ///
    /// Root and unrecognised hosts carry no slug.
    pub async fn resolve_host(&self, host: Option<&str>) -> Result<Site, ResolveError> {
        match host.map(|h| self.classifier.classify(h)) {
            Some(HostKind::Tenant(label)) => self.resolve(&label).await,
            _ => Err(ResolveError::MissingSlug),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::store::NewSite;

    struct MapStore(HashMap<String, Site>);

    #[async_trait]
    impl TenantStore for MapStore {
        async fn insert(&self, _site: &NewSite) -> Result<Site, StoreError> {
            unreachable!("resolver never writes")
        }

        async fn find_by_slug(&self, slug: &str) -> Result<Option<Site>, StoreError> {
            if slug == "broken" {
                return Err(StoreError::Decode("bad row".into()));
            }
            Ok(self.0.get(slug).cloned())
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn resolver() -> Resolver {
        let acme = Site {
            slug: "acme".into(),
            business_name: "Acme".into(),
            email: "a@acme.test".into(),
            phone: "555".into(),
            description: None,
            created_at: None,
        };
        let store = MapStore(HashMap::from([("acme".to_owned(), acme)]));
        Resolver::new(Arc::new(store), Classifier::default())
    }

    #[tokio::test]
    async fn finds_exact_slug() {
        assert_eq!(resolver().resolve("acme").await.unwrap().business_name, "Acme");
    }

    #[tokio::test]
    async fn three_outcomes() {
        let r = resolver();
        assert!(matches!(r.resolve("nobody").await, Err(ResolveError::NotFound { slug }) if slug == "nobody"));
        assert!(matches!(r.resolve("broken").await, Err(ResolveError::Store(_))));
    }

    #[tokio::test]
    async fn malformed_labels_never_reach_the_store() {
        let r = resolver();
        assert!(matches!(r.resolve("").await, Err(ResolveError::MissingSlug)));
        assert!(matches!(r.resolve("ACME").await, Err(ResolveError::InvalidSlug)));
        assert!(matches!(r.resolve("acme;drop").await, Err(ResolveError::InvalidSlug)));
    }

    #[tokio::test]
    async fn resolves_from_host() {
        let r = resolver();
        assert_eq!(r.resolve_host(Some("acme.stonesystems.io:443")).await.unwrap().slug, "acme");
        assert_eq!(r.resolve_host(Some("Acme.StoneSystems.io")).await.unwrap().slug, "acme");
        assert!(matches!(r.resolve_host(Some("www.stonesystems.io")).await, Err(ResolveError::MissingSlug)));
        assert!(matches!(r.resolve_host(None).await, Err(ResolveError::MissingSlug)));
    }
}
