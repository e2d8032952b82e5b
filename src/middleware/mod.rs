//! Middleware layer.
//!
//! Middleware intercepts a request before it reaches the router and sees the
//! response on the way back out. It is the home of cross-cutting concerns:
//!
//! - [`Trace`] stamps every request with trace / span / parent identifiers
//! - [`Logging`] writes one structured log line per request and turns a
//!   panicking handler into a `500`
//!
//! Layers compose left to right with [`Router::layer`](crate::Router::layer):
//! each new layer wraps everything added before it.

use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

pub mod logging;
pub mod trace;

pub use logging::Logging;
pub use trace::{Trace, TraceConfig, TraceContext};

/// A request/response interceptor.
///
/// ```rust
/// use fabuverse::{BoxFuture, Request};
/// use fabuverse::middleware::{Middleware, Next};
///
/// struct Hello;
///
/// impl Middleware for Hello {
///     fn call(&self, req: Request, next: Next) -> BoxFuture {
///         Box::pin(async move {
///             let mut res = next.run(req).await;
///             res.headers_mut().insert("x-hello", "world".parse().unwrap());
///             res
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// The rest of the stack below a middleware: further layers, then the router.
pub struct Next {
    inner: BoxedHandler,
}

impl Next {
    pub(crate) fn new(inner: BoxedHandler) -> Self {
        Self { inner }
    }

    /// Hand the request to the next layer. The inner handler is only invoked
    /// once the returned future is polled.
    pub async fn run(self, req: Request) -> Response {
        self.inner.call(req).await
    }
}

/// Wraps `endpoint` in `layers`, first layer innermost.
pub(crate) fn chain(endpoint: BoxedHandler, layers: Vec<Box<dyn Middleware>>) -> BoxedHandler {
    layers.into_iter().fold(endpoint, |inner, layer| {
        Arc::new(Layered { layer, inner }) as BoxedHandler
    })
}

struct Layered {
    layer: Box<dyn Middleware>,
    inner: BoxedHandler,
}

impl Handler for Layered {
    fn call(&self, req: Request) -> BoxFuture {
        self.layer.call(req, Next::new(Arc::clone(&self.inner)))
    }
}
