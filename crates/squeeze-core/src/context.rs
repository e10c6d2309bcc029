//! Per-request context

use crate::writer::{BufferedWriter, ResponseWriter};
use crate::{Body, Result};
use bytes::Bytes;
use http::header::{HeaderName, CONTENT_TYPE};
use http::{HeaderValue, Request, Response, StatusCode};
use std::fmt;
use std::io;

/// Request/response pair handed to every middleware
pub struct Context {
    request: Request<Bytes>,
    writer: Box<dyn ResponseWriter>,
    aborted: bool,
}

impl Context {
    /// Create a context writing into the given writer
    pub fn new(request: Request<Bytes>, writer: Box<dyn ResponseWriter>) -> Self {
        Self {
            request,
            writer,
            aborted: false,
        }
    }

    /// Create a context backed by a [`BufferedWriter`]
    pub fn buffered(request: Request<Bytes>) -> Self {
        Self::new(request, Box::new(BufferedWriter::new()))
    }

    /// The incoming request
    pub fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    /// Mutable access to the incoming request
    pub fn request_mut(&mut self) -> &mut Request<Bytes> {
        &mut self.request
    }

    /// First value of a request header as a string, empty when absent
    pub fn request_header(&self, name: impl http::header::AsHeaderName) -> &str {
        self.request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    /// The current response writer
    pub fn writer(&self) -> &dyn ResponseWriter {
        self.writer.as_ref()
    }

    /// Mutable access to the current response writer
    pub fn writer_mut(&mut self) -> &mut dyn ResponseWriter {
        self.writer.as_mut()
    }

    /// Replace the current writer with a decorator around it
    pub fn wrap_writer<F>(&mut self, wrap: F)
    where
        F: FnOnce(Box<dyn ResponseWriter>) -> Box<dyn ResponseWriter>,
    {
        let inner = std::mem::replace(&mut self.writer, Box::new(Detached::default()));
        self.writer = wrap(inner);
    }

    /// Set a response header. An empty value removes the header.
    pub fn header(&mut self, name: HeaderName, value: &str) -> Result<()> {
        let headers = self.writer.headers_mut();
        if value.is_empty() {
            headers.remove(name);
            return Ok(());
        }
        let value = HeaderValue::from_str(value)
            .map_err(|e| crate::Error::Internal(format!("Invalid header value: {e}")))?;
        headers.insert(name, value);
        Ok(())
    }

    /// Set the response status
    pub fn status(&mut self, status: StatusCode) {
        self.writer.set_status(status);
    }

    /// Write bytes to the response body
    pub fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.writer.write_all(buf)?;
        Ok(())
    }

    /// Write a `text/plain` response
    pub fn text(&mut self, status: StatusCode, body: impl AsRef<str>) -> Result<()> {
        self.writer.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.writer.set_status(status);
        self.write(body.as_ref().as_bytes())
    }

    /// Stop the remaining middleware chain
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    /// Stop the remaining middleware chain and set the status
    pub fn abort_with_status(&mut self, status: StatusCode) {
        self.writer.set_status(status);
        self.abort();
    }

    /// Whether the chain was aborted
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Consume the context and produce the response
    pub fn into_response(self) -> Result<Response<Body>> {
        self.writer.into_response()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", self.request.method())
            .field("uri", self.request.uri())
            .field("status", &self.writer.status())
            .field("aborted", &self.aborted)
            .finish()
    }
}

/// Placeholder writer used only while swapping writers
#[derive(Default)]
struct Detached {
    headers: http::HeaderMap,
}

impl ResponseWriter for Detached {
    fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut http::HeaderMap {
        &mut self.headers
    }

    fn status(&self) -> StatusCode {
        StatusCode::OK
    }

    fn set_status(&mut self, _status: StatusCode) {}

    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::ErrorKind::NotConnected.into())
    }

    fn size(&self) -> usize {
        0
    }

    fn into_response(self: Box<Self>) -> Result<Response<Body>> {
        Err(crate::Error::Internal("detached writer".to_string()))
    }
}
