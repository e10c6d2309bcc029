//! # Squeeze Gzip
//!
//! Gzip response compression middleware for the Squeeze pipeline.
//!
//! Eligible responses are compressed on the fly through encoders checked out
//! of a shared pool. Requests are skipped when the client does not accept
//! gzip, asks for a connection upgrade or an event stream, or targets an
//! excluded extension, path or path pattern. Gzip request bodies can
//! optionally be decoded before the rest of the chain sees them.
//!
//! ```rust,no_run
//! use squeeze_core::Pipeline;
//! use squeeze_gzip::{Gzip, GzipOptions};
//!
//! # fn main() -> squeeze_core::Result<()> {
//! let options = GzipOptions::builder()
//!     .excluded_paths(["/metrics"])
//!     .default_decompress()
//!     .build()?;
//!
//! let pipeline = Pipeline::builder()
//!     .with(Gzip::new(6, options)?)
//!     .build();
//! # let _ = pipeline;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod decompress;
pub mod encoder;
pub mod level;
pub mod matcher;
pub mod middleware;
pub mod options;
pub mod pool;
pub mod writer;

pub use decompress::{
    decompress_limited, default_decompress, default_decompress_fn, DecompressFn,
    DEFAULT_MAX_DECOMPRESSED_SIZE,
};
pub use encoder::GzipEncoder;
pub use level::CompressionLevel;
pub use matcher::{
    ExcludedExtensions, ExcludedPathRegexes, ExcludedPaths, Matcher, DEFAULT_EXCLUDED_EXTENSIONS,
};
pub use middleware::Gzip;
pub use options::{GzipOptions, GzipOptionsBuilder};
pub use pool::{GzipPool, PooledEncoder};
pub use writer::GzipWriter;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::level::CompressionLevel;
    pub use crate::middleware::Gzip;
    pub use crate::options::{GzipOptions, GzipOptionsBuilder};
}
