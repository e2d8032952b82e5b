//! Radix-tree request router.
//!
//! One tree per HTTP method plus one for method-agnostic routes, O(path-length)
//! lookup. Middleware registered
//! with [`Router::layer`] wraps the whole table, so unmatched requests (404,
//! 405) pass through the same stack as routed ones.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::middleware::{self, Middleware};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve)
/// or turn it into a [`Service`] to drive it in-process.
pub struct Router {
    routes: Routes,
    layers: Vec<Box<dyn Middleware>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Routes::default(), layers: Vec::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .by_method
            .entry(method)
            .or_default()
            .insert(path, Arc::new(handler) as BoxedHandler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Register a handler for `path` regardless of method. Routes registered
    /// with [`Router::on`] for the same path take precedence.
    ///
    /// # Panics
    ///
    /// Same as [`Router::on`].
    pub fn any(mut self, path: &str, handler: impl Handler) -> Self {
        self.routes
            .any
            .insert(path, Arc::new(handler) as BoxedHandler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Wrap everything registered so far, and every layer added before, in
    /// `layer`. The last layer added is the outermost: it sees the request
    /// first and the response last.
    ///
    /// ```rust
    /// use fabuverse::Router;
    /// use fabuverse::middleware::{Logging, Trace};
    ///
    /// // Trace runs first, so Logging can read the trace context.
    /// let app = Router::new().layer(Logging::new()).layer(Trace::new());
    /// ```
    pub fn layer(mut self, layer: impl Middleware) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// Freeze the routing table and its middleware into a callable [`Service`].
    pub fn into_service(self) -> Service {
        let endpoint: BoxedHandler = Arc::new(self.routes);
        Service { stack: middleware::chain(endpoint, self.layers) }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

// ── Service ───────────────────────────────────────────────────────────────────

/// A frozen router plus middleware stack. Cheap to clone; one clone per
/// connection is what the server does.
#[derive(Clone)]
pub struct Service {
    stack: BoxedHandler,
}

impl Service {
    /// Run one request through the middleware stack and the routing table.
    pub async fn call(&self, req: Request) -> Response {
        self.stack.call(req).await
    }
}

// ── Routing table ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Routes {
    by_method: HashMap<Method, MatchitRouter<BoxedHandler>>,
    any: MatchitRouter<BoxedHandler>,
}

enum Lookup {
    Found(BoxedHandler, HashMap<String, String>),
    MethodNotAllowed,
    NotFound,
}

impl Routes {
    fn lookup(&self, method: &Method, path: &str) -> Lookup {
        let matched = self.by_method.get(method)
            .and_then(|tree| tree.at(path).ok())
            .or_else(|| self.any.at(path).ok());
        if let Some(matched) = matched {
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Lookup::Found(Arc::clone(matched.value), params);
        }

        let other_method = self.by_method.iter()
            .any(|(m, tree)| m != method && tree.at(path).is_ok());
        if other_method {
            Lookup::MethodNotAllowed
        } else {
            Lookup::NotFound
        }
    }
}

impl Handler for Routes {
    fn call(&self, mut req: Request) -> BoxFuture {
        match self.lookup(req.method(), req.path()) {
            Lookup::Found(handler, params) => {
                req.set_params(params);
                handler.call(req)
            }
            Lookup::MethodNotAllowed => {
                Box::pin(async { Response::status(StatusCode::METHOD_NOT_ALLOWED) })
            }
            Lookup::NotFound => Box::pin(async { Response::status(StatusCode::NOT_FOUND) }),
        }
    }
}
