//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. A path that is registered
//! under some other method resolves to [`Route::MethodNotAllowed`] so the
//! server can answer `405` instead of `404`.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// Outcome of a router lookup.
pub(crate) enum Route {
    Found(BoxedHandler, HashMap<String, String>),
    MethodNotAllowed,
    NotFound,
}

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each [`Router::on`] call returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use sitegen::{Method, Request, Response, Router};
    /// # async fn resolve_site(_: Request) -> Response { Response::text("") }
    /// # async fn create_site(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get,  "/api/site/{slug}", resolve_site)
    ///     .on(Method::Post, "/api/create",      create_site);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(&self, method: Option<Method>, path: &str) -> Route {
        if let Some(tree) = method.and_then(|m| self.routes.get(&m)) {
            if let Ok(matched) = tree.at(path) {
                let handler = Arc::clone(matched.value);
                let params = matched.params.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                return Route::Found(handler, params);
            }
        }

        let elsewhere = self.routes.iter()
            .filter(|(m, _)| Some(**m) != method)
            .any(|(_, tree)| tree.at(path).is_ok());

        if elsewhere { Route::MethodNotAllowed } else { Route::NotFound }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
