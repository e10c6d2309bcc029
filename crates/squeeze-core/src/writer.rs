//! Response writers
//!
//! A [`ResponseWriter`] is the streaming write surface handed to middleware:
//! headers and status can be changed until the response is produced, and the
//! body is appended through [`ResponseWriter::write`]. Decorators (such as a
//! compressing writer) wrap another writer and forward to it.

use crate::{Body, Result};
use bytes::BytesMut;
use http::{HeaderMap, Response, StatusCode};
use http_body_util::Full;
use std::fmt;
use std::io;

/// Streaming response writer
pub trait ResponseWriter: Send {
    /// Response headers
    fn headers(&self) -> &HeaderMap;

    /// Mutable response headers
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Current status code
    fn status(&self) -> StatusCode;

    /// Set the status code
    fn set_status(&mut self, status: StatusCode);

    /// Append bytes to the body, returning how many input bytes were accepted
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Append a string to the body
    fn write_str(&mut self, s: &str) -> io::Result<usize> {
        self.write(s.as_bytes())
    }

    /// Append the whole buffer
    fn write_all(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.write(buf)? {
                0 => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write whole buffer",
                    ))
                }
                n => buf = &buf[n..],
            }
        }
        Ok(())
    }

    /// Push any buffered body bytes down to the underlying writer
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Mark the end of the body. Writes after close fail.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Number of body bytes that reached the underlying body so far
    fn size(&self) -> usize;

    /// Whether any body bytes were written
    fn written(&self) -> bool {
        self.size() > 0
    }

    /// Consume the writer and produce the final response
    fn into_response(self: Box<Self>) -> Result<Response<Body>>;
}

/// Writer that collects the response in memory
pub struct BufferedWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    closed: bool,
}

impl BufferedWriter {
    /// Create an empty `200 OK` writer
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
            closed: false,
        }
    }

    /// Body collected so far
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Whether [`ResponseWriter::close`] was called
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Default for BufferedWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BufferedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedWriter")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("size", &self.body.len())
            .field("closed", &self.closed)
            .finish()
    }
}

impl ResponseWriter for BufferedWriter {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn status(&self) -> StatusCode {
        self.status
    }

    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "write after response body was closed",
            ));
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }

    fn size(&self) -> usize {
        self.body.len()
    }

    fn into_response(self: Box<Self>) -> Result<Response<Body>> {
        let BufferedWriter {
            status,
            headers,
            body,
            ..
        } = *self;

        let mut response = Response::new(Full::new(body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// [`io::Write`] view over the body of a [`ResponseWriter`]
pub struct BodySink<'a> {
    inner: &'a mut dyn ResponseWriter,
}

impl<'a> BodySink<'a> {
    /// Borrow a writer as an [`io::Write`] sink
    pub fn new(inner: &'a mut dyn ResponseWriter) -> Self {
        Self { inner }
    }
}

impl fmt::Debug for BodySink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodySink")
            .field("size", &self.inner.size())
            .finish()
    }
}

impl io::Write for BodySink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
