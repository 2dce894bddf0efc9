//! Request tracing.

use std::future::Future;
use std::time::Instant;

use tracing::{Instrument, info, info_span};

use crate::response::Response;

/// Runs `fut` inside a `request` span and logs its outcome.
///
/// Every event a handler emits (store mutations, validation failures)
/// inherits the span's `method` and `path` fields.
pub async fn trace<F>(method: &str, path: &str, fut: F) -> Response
where
    F: Future<Output = Response>,
{
    let span = info_span!("request", method = %method, path = %path);
    let started = Instant::now();
    let res = fut.instrument(span.clone()).await;
    span.in_scope(|| {
        info!(
            status = u16::from(res.status_code()),
            latency_us = started.elapsed().as_micros() as u64,
            "request completed"
        );
    });
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    #[tokio::test]
    async fn passes_the_response_through() {
        let res = trace("GET", "/", async { Response::status(Status::NotFound) }).await;
        assert_eq!(res.status_code(), Status::NotFound);
    }
}
