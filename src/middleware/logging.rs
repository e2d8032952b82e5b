//! Request logging and the panic boundary.
//!
//! [`Logging`] writes one `info!` line per request:
//!
//! ```text
//! http request status=200 method=GET path=/reverse duration=212.4µs size=7
//!              trace_id=… span_id=… parent_id=…
//! ```
//!
//! The trace fields come from the request's [`TraceContext`] when a
//! [`Trace`](super::Trace) layer runs outside this one. Without a context they
//! are read back from the default trace headers on the response.
//!
//! Everything downstream runs inside a `request` span that carries the same
//! trace fields, so handler logs are correlated without any extra work.
//!
//! A handler that panics is answered with `500 Internal Server Error` and
//! logged at `error`. The connection stays up.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures_util::FutureExt;
use http::{HeaderName, StatusCode};
use tracing::{Instrument, error, field, info, info_span};

use super::trace::{DEFAULT_PARENT_HEADER, DEFAULT_SPAN_HEADER, DEFAULT_TRACE_HEADER, TraceContext};
use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Structured request logging with panic recovery.
#[derive(Clone, Copy, Debug, Default)]
pub struct Logging;

impl Logging {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for Logging {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_owned();
        let context = req.trace().cloned();

        let span = info_span!(
            "request",
            trace_id = field::Empty,
            span_id = field::Empty,
            parent_id = field::Empty,
        );
        if let Some(ctx) = &context {
            span.record("trace_id", ctx.trace_id());
            span.record("span_id", ctx.span_id());
            span.record("parent_id", ctx.parent_id().unwrap_or(""));
        }

        let fut = async move {
            let response = match AssertUnwindSafe(next.run(req)).catch_unwind().await {
                Ok(response) => response,
                Err(panic) => {
                    error!(
                        method = %method,
                        path = %path,
                        err = panic_message(panic.as_ref()),
                        "http request error",
                    );
                    Response::status(StatusCode::INTERNAL_SERVER_ERROR)
                }
            };

            let ids = TraceFields::resolve(context.as_ref(), &response);
            info!(
                status = response.code().as_u16(),
                method = %method,
                path = %path,
                duration = ?start.elapsed(),
                size = response.body().len(),
                trace_id = %ids.trace_id,
                span_id = %ids.span_id,
                parent_id = %ids.parent_id,
                "http request",
            );
            response
        };

        Box::pin(fut.instrument(span))
    }
}

/// The three trace fields of a log line. Empty when neither a context nor the
/// response headers provide them.
struct TraceFields {
    trace_id: String,
    span_id: String,
    parent_id: String,
}

impl TraceFields {
    fn resolve(context: Option<&TraceContext>, response: &Response) -> Self {
        match context {
            Some(ctx) => Self {
                trace_id: ctx.trace_id().to_owned(),
                span_id: ctx.span_id().to_owned(),
                parent_id: ctx.parent_id().unwrap_or_default().to_owned(),
            },
            None => {
                let read = |name: &HeaderName| {
                    response.headers().get(name)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_owned()
                };
                Self {
                    trace_id: read(&DEFAULT_TRACE_HEADER),
                    span_id: read(&DEFAULT_SPAN_HEADER),
                    parent_id: read(&DEFAULT_PARENT_HEADER),
                }
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "handler panicked"
    }
}
