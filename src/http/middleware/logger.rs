//! Request logging middleware.

use std::time::Instant;

use crate::http::context::Context;

/// Logs status, method, URI and elapsed time once the rest of the chain
/// has run.
pub fn logger() -> impl Fn(&mut Context) + Send + Sync + 'static {
    |ctx: &mut Context| {
        let start = Instant::now();
        ctx.next();
        tracing::info!(
            status = ctx.status_code().as_u16(),
            method = %ctx.method(),
            uri = %ctx.request().uri(),
            request_id = ctx.request_id().unwrap_or("unknown"),
            elapsed = ?start.elapsed(),
            "Request handled"
        );
    }
}
