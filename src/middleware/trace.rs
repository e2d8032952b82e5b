//! Request-tracing middleware.
//!
//! Every request gets a trace identity made of three identifiers:
//!
//! | Header      | Inbound                      | Outbound                                 |
//! |-------------|------------------------------|------------------------------------------|
//! | `Trace-Id`  | the caller's trace, if any   | the same value, or a fresh one at origin |
//! | `Span-Id`   | the caller's own span        | always a fresh value for this request    |
//! | `Parent-Id` | ignored                      | the inbound `Span-Id`, empty at origin   |
//!
//! The trace id is shared by every hop of a call chain; the span id names
//! one hop; the parent id points back at the caller's span. Handlers read the
//! identity through [`Request::trace`](crate::Request::trace) instead of
//! re-parsing headers.
//!
//! ```rust
//! use fabuverse::Router;
//! use fabuverse::middleware::{Trace, TraceConfig};
//! use http::HeaderName;
//!
//! let app = Router::new().layer(Trace::with_config(
//!     TraceConfig::default().span_header(HeaderName::from_static("x-span")),
//! ));
//! ```

use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use tracing::error;
use uuid::Uuid;

use crate::error::Error;
use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Default header carrying the chain-wide trace id (`Trace-Id`).
pub static DEFAULT_TRACE_HEADER: HeaderName = HeaderName::from_static("trace-id");
/// Default header carrying the span id (`Span-Id`).
pub static DEFAULT_SPAN_HEADER: HeaderName = HeaderName::from_static("span-id");
/// Default header carrying the parent span id (`Parent-Id`).
pub static DEFAULT_PARENT_HEADER: HeaderName = HeaderName::from_static("parent-id");

/// Produces a fresh identifier on every call. Shared by all in-flight
/// requests, so it must be safe to call concurrently.
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// The default generator: a random (v4) UUID in hyphenated form.
pub fn uuid_v4() -> String {
    Uuid::new_v4().to_string()
}

// ── TraceContext ──────────────────────────────────────────────────────────────

/// The trace identity of one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: String,
    span_id: String,
    parent_id: Option<String>,
}

impl TraceContext {
    pub fn trace_id(&self) -> &str { &self.trace_id }
    pub fn span_id(&self) -> &str { &self.span_id }

    /// The caller's span id; `None` when the caller sent none.
    pub fn parent_id(&self) -> Option<&str> { self.parent_id.as_deref() }
}

// ── TraceConfig ───────────────────────────────────────────────────────────────

/// Configuration for [`Trace`].
///
/// Every field is optional; unset fields resolve to their defaults when read,
/// so overriding one header name leaves the others alone.
#[derive(Clone, Default)]
pub struct TraceConfig {
    trace_header: Option<HeaderName>,
    span_header: Option<HeaderName>,
    parent_header: Option<HeaderName>,
    generator: Option<IdGenerator>,
    detach_context: bool,
}

impl TraceConfig {
    pub fn trace_header(mut self, name: HeaderName) -> Self {
        self.trace_header = Some(name);
        self
    }

    pub fn span_header(mut self, name: HeaderName) -> Self {
        self.span_header = Some(name);
        self
    }

    pub fn parent_header(mut self, name: HeaderName) -> Self {
        self.parent_header = Some(name);
        self
    }

    /// Replace the identifier generator, e.g. with a fixed value in tests.
    pub fn generator(mut self, generator: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.generator = Some(Arc::new(generator));
        self
    }

    /// Whether handlers can read the identity via `Request::trace`. On by default.
    pub fn attach_context(mut self, attach: bool) -> Self {
        self.detach_context = !attach;
        self
    }

    pub fn trace_header_name(&self) -> &HeaderName {
        self.trace_header.as_ref().unwrap_or(&DEFAULT_TRACE_HEADER)
    }

    pub fn span_header_name(&self) -> &HeaderName {
        self.span_header.as_ref().unwrap_or(&DEFAULT_SPAN_HEADER)
    }

    pub fn parent_header_name(&self) -> &HeaderName {
        self.parent_header.as_ref().unwrap_or(&DEFAULT_PARENT_HEADER)
    }

    pub fn attaches_context(&self) -> bool {
        !self.detach_context
    }

    /// Produce one identifier with the configured (or default) generator.
    pub fn generate_id(&self) -> String {
        match &self.generator {
            Some(generator) => generator(),
            None => uuid_v4(),
        }
    }

    fn fresh_id(&self) -> Result<(String, HeaderValue), Error> {
        let id = self.generate_id();
        if id.is_empty() {
            return Err(Error::InvalidId(id));
        }
        match HeaderValue::from_str(&id) {
            Ok(value) => Ok((id, value)),
            Err(_) => Err(Error::InvalidId(id)),
        }
    }
}

impl fmt::Debug for TraceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceConfig")
            .field("trace_header", self.trace_header_name())
            .field("span_header", self.span_header_name())
            .field("parent_header", self.parent_header_name())
            .field("custom_generator", &self.generator.is_some())
            .field("attach_context", &self.attaches_context())
            .finish()
    }
}

// ── Trace middleware ──────────────────────────────────────────────────────────

/// Middleware that establishes or continues a trace for every request.
#[derive(Clone, Debug, Default)]
pub struct Trace {
    config: Arc<TraceConfig>,
}

/// What `Trace` decided for one request: the typed context for handlers and
/// the exact header values to put on the response.
struct Stamp {
    context: TraceContext,
    headers: [(HeaderName, HeaderValue); 3],
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TraceConfig) -> Self {
        Self { config: Arc::new(config) }
    }

    fn stamp(&self, inbound: &HeaderMap) -> Result<Stamp, Error> {
        let config = &*self.config;

        // Inherited trace ids are echoed byte for byte.
        let (trace_id, trace_value) = match non_empty(inbound, config.trace_header_name()) {
            Some(value) => (lossy(value), value.clone()),
            None => config.fresh_id()?,
        };

        let (span_id, span_value) = config.fresh_id()?;

        // The caller's span is our parent.
        let (parent_id, parent_value) = match non_empty(inbound, config.span_header_name()) {
            Some(value) => (Some(lossy(value)), value.clone()),
            None => (None, HeaderValue::from_static("")),
        };

        Ok(Stamp {
            context: TraceContext { trace_id, span_id, parent_id },
            headers: [
                (config.trace_header_name().clone(), trace_value),
                (config.span_header_name().clone(), span_value),
                (config.parent_header_name().clone(), parent_value),
            ],
        })
    }
}

impl Middleware for Trace {
    fn call(&self, mut req: Request, next: Next) -> BoxFuture {
        let Stamp { context, headers } = match self.stamp(req.headers()) {
            Ok(stamp) => stamp,
            Err(e) => {
                error!(error = %e, path = req.path(), "could not establish trace identity");
                return Box::pin(async { Response::status(StatusCode::INTERNAL_SERVER_ERROR) });
            }
        };

        if self.config.attaches_context() {
            req.set_trace(context);
        }

        Box::pin(async move {
            let mut response = next.run(req).await;
            for (name, value) in headers {
                response.headers_mut().insert(name, value);
            }
            response
        })
    }
}

fn non_empty<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a HeaderValue> {
    headers.get(name).filter(|v| !v.is_empty())
}

fn lossy(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}
