//! Request body decompression

use bytes::Bytes;
use flate2::read::MultiGzDecoder;
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH};
use http::StatusCode;
use squeeze_core::Context;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, warn};

/// Hook run for requests that declare `Content-Encoding: gzip`
pub type DecompressFn = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// Default cap on a decoded request body (10 MiB)
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: usize = 10 * 1024 * 1024;

/// Replace a gzip request body with its decoded bytes
///
/// Uses [`DEFAULT_MAX_DECOMPRESSED_SIZE`] as the limit. See
/// [`decompress_limited`].
pub fn default_decompress(ctx: &mut Context) {
    decompress_limited(ctx, DEFAULT_MAX_DECOMPRESSED_SIZE);
}

/// Replace a gzip request body with its decoded bytes, up to `max_size` bytes
///
/// Empty bodies are left alone. On success `Content-Encoding` and
/// `Content-Length` are removed from the request headers. A body that fails to
/// decode aborts the request with `400 Bad Request`, one that decodes to more
/// than `max_size` bytes with `413 Payload Too Large`.
pub fn decompress_limited(ctx: &mut Context, max_size: usize) {
    let body = ctx.request().body().clone();
    if body.is_empty() {
        return;
    }

    let mut decoded = Vec::with_capacity(body.len().saturating_mul(3).min(max_size));
    let limit = u64::try_from(max_size).unwrap_or(u64::MAX).saturating_add(1);
    if let Err(e) = MultiGzDecoder::new(&body[..])
        .take(limit)
        .read_to_end(&mut decoded)
    {
        warn!(error = %e, "Failed to decompress gzip request body");
        ctx.abort_with_status(StatusCode::BAD_REQUEST);
        return;
    }

    if decoded.len() > max_size {
        warn!(
            compressed = body.len(),
            limit = max_size,
            "Decompressed gzip request body exceeds limit"
        );
        ctx.abort_with_status(StatusCode::PAYLOAD_TOO_LARGE);
        return;
    }

    debug!(
        compressed = body.len(),
        decompressed = decoded.len(),
        "Decompressed gzip request body"
    );

    let request = ctx.request_mut();
    request.headers_mut().remove(CONTENT_ENCODING);
    request.headers_mut().remove(CONTENT_LENGTH);
    *request.body_mut() = Bytes::from(decoded);
}

/// [`decompress_limited`] with `max_size` as a shareable [`DecompressFn`]
pub fn default_decompress_fn(max_size: usize) -> DecompressFn {
    Arc::new(move |ctx: &mut Context| decompress_limited(ctx, max_size))
}
