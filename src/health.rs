//! Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Readiness is gated on the datastore: without it neither endpoint can do
//! anything useful. The DNS and domain-mapping APIs are best-effort and are
//! not checked.

use std::sync::Arc;

use tracing::warn;

use crate::api::AppState;
use crate::{Request, Response, Status};

/// Always `200 OK` with body `"ok"`. If the process can respond to HTTP at
/// all, it is alive.
pub async fn liveness(_req: Request) -> &'static str {
    "ok"
}

/// `200 OK` with body `"ready"` when the datastore answers, `503` otherwise.
pub async fn readiness(state: Arc<AppState>, _req: Request) -> Response {
    match state.store.ping().await {
        Ok(()) => Response::text("ready"),
        Err(e) => {
            warn!(error = %e, "readiness check failed");
            Response::error(Status::ServiceUnavailable, "datastore unavailable")
        }
    }
}
