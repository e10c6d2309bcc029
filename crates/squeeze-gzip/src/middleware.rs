//! Gzip middleware

use crate::level::CompressionLevel;
use crate::options::GzipOptions;
use crate::pool::GzipPool;
use crate::writer::GzipWriter;
use async_trait::async_trait;
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, VARY};
use http::HeaderValue;
use squeeze_core::{Context, Middleware, Next, Result};
use std::fmt;
use tracing::{debug, trace};

/// Gzip middleware
///
/// Compresses the response body of eligible requests through a pooled
/// encoder and optionally decodes gzip request bodies first.
#[derive(Clone)]
pub struct Gzip {
    level: CompressionLevel,
    options: GzipOptions,
    pool: GzipPool,
}

impl Gzip {
    /// Create the middleware, validating the compression level
    ///
    /// `-1` selects the codec default. Levels outside `-1..=9` are rejected.
    pub fn new(level: i32, options: GzipOptions) -> Result<Self> {
        let level = CompressionLevel::new(level)?;
        Ok(Self::with_level(level, options))
    }

    /// Create the middleware from an already validated level
    pub fn with_level(level: CompressionLevel, options: GzipOptions) -> Self {
        let pool = GzipPool::with_max_idle(level, options.max_idle_encoders());
        pool.prewarm(options.prewarm());

        Self {
            level,
            options,
            pool,
        }
    }

    /// Compression level
    pub fn level(&self) -> CompressionLevel {
        self.level
    }

    /// Options this middleware was built with
    pub fn options(&self) -> &GzipOptions {
        &self.options
    }

    /// Encoder pool
    pub fn pool(&self) -> &GzipPool {
        &self.pool
    }

    /// Check if the request in `ctx` is eligible for compression
    pub fn should_compress(&self, ctx: &Context) -> bool {
        let request = ctx.request();
        self.options
            .matcher()
            .should_compress(request.headers(), request.uri().path())
    }
}

impl Default for Gzip {
    fn default() -> Self {
        Self::with_level(CompressionLevel::DEFAULT, GzipOptions::default())
    }
}

impl fmt::Debug for Gzip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gzip")
            .field("level", &self.level)
            .field("options", &self.options)
            .field("pool", &self.pool)
            .finish()
    }
}

#[async_trait]
impl Middleware for Gzip {
    async fn call(&self, ctx: &mut Context, next: Next) -> Result<()> {
        if let Some(decompress) = self.options.decompress_fn() {
            if ctx.request_header(CONTENT_ENCODING) == "gzip" {
                decompress(ctx);
                if ctx.is_aborted() {
                    return Ok(());
                }
            }
        }

        if !self.should_compress(ctx) {
            trace!(path = %ctx.request().uri().path(), "Passing response through uncompressed");
            return next.run(ctx).await;
        }

        let encoder = self.pool.acquire();

        let headers = ctx.writer_mut().headers_mut();
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(VARY, HeaderValue::from_static("Accept-Encoding"));
        headers.remove(CONTENT_LENGTH);
        ctx.wrap_writer(|inner| Box::new(GzipWriter::new(inner, encoder)));

        let result = next.run(ctx).await;

        // Finish the stream even when downstream failed
        let closed = ctx.writer_mut().close();
        let size = ctx.writer().size();
        ctx.writer_mut()
            .headers_mut()
            .insert(CONTENT_LENGTH, HeaderValue::from(size));

        debug!(
            path = %ctx.request().uri().path(),
            level = %self.level,
            compressed = size,
            "Compressed response"
        );

        result?;
        closed?;
        Ok(())
    }
}
