//! HTTP surface: route table and handlers.
//!
//! Handlers translate between JSON and the provisioner/resolver, and map
//! their errors onto status codes. Every error body is `{"error": ...}`,
//! sometimes with extra context keys.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::health;
use crate::legal;
use crate::method::Method;
use crate::provision::{CreateSite, ProvisionError, Provisioner};
use crate::request::Request;
use crate::resolve::{ResolveError, Resolver};
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;
use crate::store::{Site, StoreError, TenantStore};

/// Shared, immutable application state.
pub struct AppState {
    pub provisioner: Provisioner,
    pub resolver: Resolver,
    pub store: Arc<dyn TenantStore>,
}

#[derive(Serialize)]
struct SiteBody<'a> {
    data: &'a Site,
}

/// Builds the route table.
///
/// | Method | Path | |
/// |---|---|---|
/// | POST | `/api/create` | provision a tenant |
/// | GET | `/api/site` | tenant addressed by the `Host` header |
/// | GET | `/api/site/{slug}` | tenant by slug |
/// | GET | `/api/site/{slug}/privacy` | Privacy Policy text |
/// | GET | `/api/site/{slug}/terms` | Terms of Service text |
/// | GET | `/healthz`, `/readyz` | probes |
pub fn router(state: Arc<AppState>) -> Router {
    // Each route gets its own handle on the state; the closure clones it per
    // request so the handler future owns what it uses.
    macro_rules! with_state {
        ($handler:path) => {{
            let state = Arc::clone(&state);
            move |req| $handler(Arc::clone(&state), req)
        }};
    }

    Router::new()
        .on(Method::Post, "/api/create", with_state!(create_site))
        .on(Method::Get, "/api/site", with_state!(site_for_host))
        .on(Method::Get, "/api/site/{slug}", with_state!(site_by_slug))
        .on(Method::Get, "/api/site/{slug}/privacy", with_state!(privacy_policy))
        .on(Method::Get, "/api/site/{slug}/terms", with_state!(terms_of_service))
        .on(Method::Get, "/healthz", health::liveness)
        .on(Method::Get, "/readyz", with_state!(health::readiness))
}

// POST /api/create
async fn create_site(state: Arc<AppState>, req: Request) -> Response {
    let body = if req.body().iter().all(u8::is_ascii_whitespace) {
        CreateSite::default()
    } else {
        match req.json::<CreateSite>() {
            Ok(body) => body,
            Err(e) => {
                warn!("rejecting malformed create body: {e}");
                return Response::error(Status::BadRequest, "Request body must be a JSON object");
            }
        }
    };

    match state.provisioner.provision(body).await {
        Ok(result) => {
            info!(slug = %result.slug, "site created");
            Response::json_value(Status::Ok, &result)
        }
        Err(e @ (ProvisionError::MissingFields | ProvisionError::EmptySlug)) => {
            Response::error(Status::BadRequest, e.to_string())
        }
        Err(ProvisionError::SlugTaken { slug }) => Response::json_value(
            Status::Conflict,
            &json!({ "error": format!("A site with slug `{slug}` already exists"), "slug": slug }),
        ),
        Err(ProvisionError::Store(e)) => store_failure(&e),
    }
}

// GET /api/site/{slug}
async fn site_by_slug(state: Arc<AppState>, req: Request) -> Response {
    let slug = req.param("slug").unwrap_or_default();
    match state.resolver.resolve(slug).await {
        Ok(site) => Response::json_value(Status::Ok, &SiteBody { data: &site }),
        Err(e) => resolve_failure(e, slug),
    }
}

// GET /api/site — the slug comes from the Host header.
async fn site_for_host(state: Arc<AppState>, req: Request) -> Response {
    match state.resolver.resolve_host(req.host()).await {
        Ok(site) => Response::json_value(Status::Ok, &SiteBody { data: &site }),
        Err(e) => resolve_failure(e, req.host().unwrap_or_default()),
    }
}

// GET /api/site/{slug}/privacy
async fn privacy_policy(state: Arc<AppState>, req: Request) -> Response {
    legal_page(&state, &req, |site| {
        legal::privacy_policy(site, chrono::Local::now().date_naive())
    })
    .await
}

// GET /api/site/{slug}/terms
async fn terms_of_service(state: Arc<AppState>, req: Request) -> Response {
    legal_page(&state, &req, legal::terms_of_service).await
}

async fn legal_page(state: &AppState, req: &Request, render: impl Fn(&Site) -> String) -> Response {
    let slug = req.param("slug").unwrap_or_default();
    match state.resolver.resolve(slug).await {
        Ok(site) => Response::text(render(&site)),
        Err(e) => resolve_failure(e, slug),
    }
}

fn resolve_failure(e: ResolveError, requested: &str) -> Response {
    match e {
        ResolveError::MissingSlug | ResolveError::InvalidSlug => Response::json_value(
            Status::BadRequest,
            &json!({ "error": e.to_string(), "received": requested }),
        ),
        ResolveError::NotFound { ref slug } => Response::json_value(
            Status::NotFound,
            &json!({ "error": e.to_string(), "slug": slug }),
        ),
        ResolveError::Store(ref store) => store_failure(store),
    }
}

fn store_failure(e: &StoreError) -> Response {
    match e.code() {
        Some(code) => Response::json_value(
            Status::InternalServerError,
            &json!({ "error": e.to_string(), "code": code }),
        ),
        None => Response::error(Status::InternalServerError, e.to_string()),
    }
}
