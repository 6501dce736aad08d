//! HTTP server and graceful shutdown.
//!
//! On **SIGTERM** (Kubernetes pod termination) or **Ctrl-C** the server:
//! 1. Immediately stops `listener.accept()` — no new connections are made.
//! 2. Tells every open connection to shut down gracefully: requests already
//!    in flight (including provisioning sleeping between DNS retries) finish,
//!    idle keep-alive connections close at once.
//! 3. Returns from [`Server::serve`], which lets `main` exit cleanly.
//!
//! Provisioning can take several seconds when the DNS provider is failing
//! (1 s + 2 s of backoff plus the calls themselves), so keep
//! `terminationGracePeriodSeconds` comfortably above that.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::{Route, Router};
use crate::status::Status;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    pub fn bind(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Binds, then accepts connections until SIGTERM or Ctrl-C and drains.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        Self::serve_on(listener, router, shutdown_signal()).await
    }

    /// Serves on an already-bound listener until `shutdown` resolves, then
    /// waits for in-flight connections to finish.
    ///
    /// Tests bind `127.0.0.1:0` themselves to learn the port before serving.
    pub async fn serve_on(
        listener: TcpListener,
        router: Router,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let router = Arc::new(router);

        info!(addr = %listener.local_addr()?, "sitegen listening");

        let mut tasks = tokio::task::JoinSet::new();

        // Flipped once the accept loop stops; every connection task watches it
        // so idle keep-alive connections close instead of holding the drain open.
        let (drain_tx, drain_rx) = watch::channel(false);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);
                    let mut drain = drain_rx.clone();

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { dispatch(router, req, remote_addr).await }
                        });

                        let builder = ConnBuilder::new(TokioExecutor::new());
                        let conn = builder.serve_connection(io, svc);
                        tokio::pin!(conn);

                        // In-flight requests finish; the connection then closes
                        // rather than waiting for the next keep-alive request.
                        let mut draining = false;
                        let result = loop {
                            tokio::select! {
                                res = conn.as_mut() => break res,
                                Ok(()) = drain.changed(), if !draining => {
                                    draining = true;
                                    conn.as_mut().graceful_shutdown();
                                }
                            }
                        };

                        if let Err(e) = result {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        let _ = drain_tx.send(true);
        while tasks.join_next().await.is_some() {}

        info!("sitegen stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one response.
///
/// Every failure is turned into a response here, so hyper never sees an error.
async fn dispatch(
    router: Arc<Router>,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = Method::try_from(req.method()).ok();
    let path = req.uri().path().to_owned();

    let response = match router.lookup(method, &path) {
        Route::Found(handler, params) => {
            let (parts, body) = req.into_parts();
            match body.collect().await {
                Ok(collected) => {
                    let request = Request::new(parts, collected.to_bytes(), params);
                    handler.call(request).await
                }
                Err(e) => {
                    warn!(peer = %remote_addr, %path, "failed to read request body: {e}");
                    Response::error(Status::BadRequest, "Failed to read request body")
                }
            }
        }
        Route::MethodNotAllowed => Response::error(Status::MethodNotAllowed, "Method not allowed"),
        Route::NotFound => Response::error(Status::NotFound, "Not found"),
    };

    debug!(
        peer = %remote_addr,
        method = method.map_or("?", Method::as_str),
        %path,
        status = response.status_code().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );

    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C) the process receives.
/// On Windows only Ctrl-C is available.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
