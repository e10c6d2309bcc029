//! # Squeeze Core
//!
//! Host pipeline abstractions used by the Squeeze middleware:
//! - Error types
//! - Streaming response writers
//! - Per-request context
//! - Middleware trait and pipeline

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod context;
pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod writer;

pub use context::Context;
pub use error::{Error, Result};
pub use middleware::{Middleware, Next};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use writer::{BodySink, BufferedWriter, ResponseWriter};

// Re-export commonly used HTTP types
pub use bytes::Bytes;
pub use http::{Request, Response, StatusCode};

/// Response body type
pub type Body = http_body_util::Full<Bytes>;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::context::Context;
    pub use crate::error::{Error, Result};
    pub use crate::middleware::{Middleware, Next};
    pub use crate::pipeline::{Pipeline, PipelineBuilder};
    pub use crate::writer::{BufferedWriter, ResponseWriter};
}
