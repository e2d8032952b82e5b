//! The one trait every stage of a request goes through.
//!
//! Route handlers, middleware layers and the routing table are all
//! [`Handler`]s, shared as `Arc<dyn Handler>` so a single frozen stack serves
//! every connection.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;

/// The future a [`Handler`] or [`Middleware`](crate::middleware::Middleware)
/// returns.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Answers a request.
///
/// Any `async fn(Request) -> Response` is a handler, as is a closure
/// returning such a future.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        Box::pin(self(req))
    }
}

pub(crate) type BoxedHandler = Arc<dyn Handler>;
