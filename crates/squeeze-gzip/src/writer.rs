//! Compressing response writer

use crate::pool::PooledEncoder;
use http::header::CONTENT_LENGTH;
use http::{HeaderMap, Response, StatusCode};
use squeeze_core::{Body, BodySink, ResponseWriter, Result};
use std::fmt;
use std::io;
use tracing::warn;

/// Response writer that gzips the body into the writer it wraps
///
/// Headers and status go straight to the wrapped writer. Body bytes go
/// through the checked-out encoder, which writes the compressed stream to the
/// wrapped writer, so [`ResponseWriter::size`] reports compressed bytes.
pub struct GzipWriter {
    inner: Box<dyn ResponseWriter>,
    encoder: Option<PooledEncoder>,
}

impl GzipWriter {
    /// Wrap `inner`, compressing with `encoder`
    pub fn new(inner: Box<dyn ResponseWriter>, encoder: PooledEncoder) -> Self {
        Self {
            inner,
            encoder: Some(encoder),
        }
    }

    /// Whether the gzip stream has been finished
    pub fn is_closed(&self) -> bool {
        self.encoder.is_none()
    }

    /// Finish the gzip stream and give the encoder back to its pool
    fn finish_stream(&mut self) -> io::Result<()> {
        if let Some(mut encoder) = self.encoder.take() {
            encoder.finish(&mut BodySink::new(self.inner.as_mut()))?;
        }
        Ok(())
    }
}

impl ResponseWriter for GzipWriter {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn status(&self) -> StatusCode {
        self.inner.status()
    }

    fn set_status(&mut self, status: StatusCode) {
        self.inner.headers_mut().remove(CONTENT_LENGTH);
        self.inner.set_status(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.encoder.as_mut() {
            Some(encoder) => encoder.write(buf, &mut BodySink::new(self.inner.as_mut())),
            None => {
                warn!(len = buf.len(), "Write after gzip stream was closed");
                Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "write after gzip stream was closed",
                ))
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.encoder.as_mut() {
            Some(encoder) => encoder.flush(&mut BodySink::new(self.inner.as_mut())),
            None => self.inner.flush(),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        self.finish_stream()?;
        self.inner.close()
    }

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn written(&self) -> bool {
        self.inner.written()
    }

    fn into_response(mut self: Box<Self>) -> Result<Response<Body>> {
        self.finish_stream()?;
        let GzipWriter { inner, .. } = *self;
        inner.into_response()
    }
}

impl fmt::Debug for GzipWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GzipWriter")
            .field("size", &self.inner.size())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::CompressionLevel;
    use crate::pool::GzipPool;
    use flate2::read::GzDecoder;
    use http::header::CONTENT_TYPE;
    use http_body_util::BodyExt;
    use squeeze_core::BufferedWriter;
    use std::io::Read;

    fn gunzip(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    fn writer(pool: &GzipPool) -> GzipWriter {
        GzipWriter::new(Box::new(BufferedWriter::new()), pool.acquire())
    }

    #[tokio::test]
    async fn test_body_is_compressed_into_inner() {
        let pool = GzipPool::new(CompressionLevel::DEFAULT);
        let mut writer = writer(&pool);
        writer
            .headers_mut()
            .insert(CONTENT_TYPE, "text/plain".parse().unwrap());

        let body = "compress me please ".repeat(64);
        assert_eq!(writer.write_str(&body).unwrap(), body.len());
        writer.close().unwrap();

        assert!(writer.is_closed());
        assert_eq!(pool.idle(), 1);
        let compressed_len = writer.size();
        assert!(compressed_len < body.len());

        let response = Box::new(writer).into_response().unwrap();
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes.len(), compressed_len);
        assert_eq!(gunzip(&bytes), body.as_bytes());
    }

    #[test]
    fn test_set_status_drops_content_length() {
        let pool = GzipPool::new(CompressionLevel::DEFAULT);
        let mut writer = writer(&pool);
        writer
            .headers_mut()
            .insert(CONTENT_LENGTH, "12".parse().unwrap());

        writer.set_status(StatusCode::ACCEPTED);
        assert_eq!(writer.status(), StatusCode::ACCEPTED);
        assert!(!writer.headers().contains_key(CONTENT_LENGTH));
    }

    #[test]
    fn test_write_after_close() {
        let pool = GzipPool::new(CompressionLevel::DEFAULT);
        let mut writer = writer(&pool);
        writer.close().unwrap();
        writer.close().unwrap();

        let err = writer.write(b"late").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn test_into_response_finishes_open_stream() {
        let pool = GzipPool::new(CompressionLevel::BEST_SPEED);
        let mut writer = writer(&pool);
        writer.write_all(b"not closed explicitly").unwrap();

        let response = Box::new(writer).into_response().unwrap();
        assert_eq!(pool.idle(), 1);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(gunzip(&bytes), b"not closed explicitly");
    }

    #[test]
    fn test_dropped_writer_returns_encoder() {
        let pool = GzipPool::new(CompressionLevel::DEFAULT);
        {
            let mut writer = writer(&pool);
            writer.write_all(b"abandoned mid-stream").unwrap();
        }
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_flush_pushes_bytes() {
        let pool = GzipPool::new(CompressionLevel::DEFAULT);
        let mut writer = writer(&pool);
        writer.write_all(b"tick").unwrap();
        let before = writer.size();
        writer.flush().unwrap();
        assert!(writer.size() > before);
    }
}
