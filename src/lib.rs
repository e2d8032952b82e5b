//! # fabuverse
//!
//! A word-reversing HTTP service and the small framework it runs on.
//!
//! The framework part is a hyper-based router with type-erased async
//! handlers, graceful shutdown, and a middleware layer. The interesting bit
//! is the [`Trace`](middleware::Trace) middleware: every request gets a
//! trace id (shared across a whole call chain), a fresh span id and the
//! caller's span as parent id, stamped on the response headers and handed to
//! handlers as a typed [`TraceContext`](middleware::TraceContext).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use fabuverse::middleware::{Logging, Trace};
//! use fabuverse::{Request, Response, Router, Server};
//! use http::Method;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fabuverse::Error> {
//!     let app = Router::new()
//!         .on(Method::GET, "/hello/{name}", hello)
//!         .layer(Logging::new())
//!         .layer(Trace::new());
//!
//!     Server::bind("0.0.0.0:3345")?.serve(app).await
//! }
//!
//! async fn hello(req: Request) -> Response {
//!     let trace_id = req.trace().map(|t| t.trace_id()).unwrap_or("-");
//!     tracing::info!(trace_id, "saying hello");
//!     Response::text(format!("hello {}", req.param("name").unwrap_or("you")))
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;
pub mod service;

pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use request::Request;
pub use response::{Response, ResponseBuilder};
pub use router::{Router, Service};
pub use server::Server;
