//! Middleware options

use crate::decompress::{default_decompress_fn, DecompressFn, DEFAULT_MAX_DECOMPRESSED_SIZE};
use crate::matcher::{
    ExcludedExtensions, ExcludedPathRegexes, ExcludedPaths, Matcher, DEFAULT_EXCLUDED_EXTENSIONS,
};
use crate::pool::DEFAULT_MAX_IDLE;
use squeeze_core::{Context, Result};
use std::fmt;
use std::sync::Arc;

/// Immutable options for one [`Gzip`](crate::Gzip) handler
#[derive(Clone)]
pub struct GzipOptions {
    matcher: Matcher,
    decompress_fn: Option<DecompressFn>,
    max_decompressed_size: usize,
    max_idle_encoders: usize,
    prewarm: usize,
}

impl GzipOptions {
    /// Start building options
    pub fn builder() -> GzipOptionsBuilder {
        GzipOptionsBuilder::default()
    }

    /// Exclusion rules
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Request decompression hook, if any
    pub fn decompress_fn(&self) -> Option<&DecompressFn> {
        self.decompress_fn.as_ref()
    }

    /// Limit on a decoded request body for the default hook
    pub fn max_decompressed_size(&self) -> usize {
        self.max_decompressed_size
    }

    /// Cap on idle pooled encoders
    pub fn max_idle_encoders(&self) -> usize {
        self.max_idle_encoders
    }

    /// Encoders constructed before the first request
    pub fn prewarm(&self) -> usize {
        self.prewarm
    }
}

impl Default for GzipOptions {
    fn default() -> Self {
        Self {
            matcher: Matcher::new(
                ExcludedExtensions::new(DEFAULT_EXCLUDED_EXTENSIONS),
                ExcludedPaths::default(),
                ExcludedPathRegexes::default(),
            ),
            decompress_fn: None,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
            max_idle_encoders: DEFAULT_MAX_IDLE,
            prewarm: 0,
        }
    }
}

impl fmt::Debug for GzipOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GzipOptions")
            .field("matcher", &self.matcher)
            .field("decompress_fn", &self.decompress_fn.is_some())
            .field("max_decompressed_size", &self.max_decompressed_size)
            .field("max_idle_encoders", &self.max_idle_encoders)
            .field("prewarm", &self.prewarm)
            .finish()
    }
}

/// Builder for [`GzipOptions`]
///
/// Each exclusion setter replaces the corresponding set. Without a call to
/// [`excluded_extensions`](GzipOptionsBuilder::excluded_extensions) the common
/// image extensions are excluded.
#[derive(Default)]
pub struct GzipOptionsBuilder {
    excluded_extensions: Option<Vec<String>>,
    excluded_paths: Vec<String>,
    excluded_path_regexes: Vec<String>,
    decompress_fn: Option<DecompressFn>,
    default_decompress: bool,
    max_decompressed_size: Option<usize>,
    max_idle_encoders: Option<usize>,
    prewarm: usize,
}

impl GzipOptionsBuilder {
    /// Extensions (with leading dot) that are never compressed
    #[must_use]
    pub fn excluded_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    /// Exact request paths that are never compressed
    #[must_use]
    pub fn excluded_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Path regular expressions that are never compressed
    #[must_use]
    pub fn excluded_path_regexes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_path_regexes = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Hook for requests with a gzip-encoded body
    #[must_use]
    pub fn decompress_fn<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.decompress_fn = Some(Arc::new(hook));
        self.default_decompress = false;
        self
    }

    /// Use [`decompress_limited`](crate::decompress::decompress_limited) as
    /// hook, bounded by [`max_decompressed_size`](Self::max_decompressed_size)
    #[must_use]
    pub fn default_decompress(mut self) -> Self {
        self.decompress_fn = None;
        self.default_decompress = true;
        self
    }

    /// Limit on a decoded request body, 10 MiB unless set
    #[must_use]
    pub fn max_decompressed_size(mut self, max_size: usize) -> Self {
        self.max_decompressed_size = Some(max_size);
        self
    }

    /// Cap on idle pooled encoders
    #[must_use]
    pub fn max_idle_encoders(mut self, max_idle: usize) -> Self {
        self.max_idle_encoders = Some(max_idle);
        self
    }

    /// Number of encoders to construct up front
    #[must_use]
    pub fn prewarm(mut self, count: usize) -> Self {
        self.prewarm = count;
        self
    }

    /// Compile the rules
    pub fn build(self) -> Result<GzipOptions> {
        let excluded_extensions = match self.excluded_extensions {
            Some(extensions) => ExcludedExtensions::new(extensions),
            None => ExcludedExtensions::new(DEFAULT_EXCLUDED_EXTENSIONS),
        };
        let excluded_path_regexes = ExcludedPathRegexes::new(&self.excluded_path_regexes)?;
        let max_decompressed_size = self
            .max_decompressed_size
            .unwrap_or(DEFAULT_MAX_DECOMPRESSED_SIZE);
        let decompress_fn = if self.default_decompress {
            Some(default_decompress_fn(max_decompressed_size))
        } else {
            self.decompress_fn
        };

        Ok(GzipOptions {
            matcher: Matcher::new(
                excluded_extensions,
                ExcludedPaths::new(self.excluded_paths),
                excluded_path_regexes,
            ),
            decompress_fn,
            max_decompressed_size,
            max_idle_encoders: self.max_idle_encoders.unwrap_or(DEFAULT_MAX_IDLE),
            prewarm: self.prewarm,
        })
    }
}

impl fmt::Debug for GzipOptionsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GzipOptionsBuilder")
            .field("excluded_extensions", &self.excluded_extensions)
            .field("excluded_paths", &self.excluded_paths)
            .field("excluded_path_regexes", &self.excluded_path_regexes)
            .field("decompress_fn", &self.decompress_fn.is_some())
            .field("default_decompress", &self.default_decompress)
            .field("max_decompressed_size", &self.max_decompressed_size)
            .field("max_idle_encoders", &self.max_idle_encoders)
            .field("prewarm", &self.prewarm)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = GzipOptions::default();
        let extensions = options.matcher().excluded_extensions();
        assert_eq!(extensions.len(), 4);
        assert!(extensions.contains(".png"));
        assert!(extensions.contains(".jpeg"));
        assert!(options.matcher().excluded_paths().is_empty());
        assert!(options.decompress_fn().is_none());
        assert_eq!(options.max_idle_encoders(), DEFAULT_MAX_IDLE);
        assert_eq!(
            options.max_decompressed_size(),
            DEFAULT_MAX_DECOMPRESSED_SIZE
        );
    }

    #[test]
    fn test_builder_replaces_sets() {
        let options = GzipOptions::builder()
            .excluded_extensions([".wasm"])
            .excluded_paths(["/healthz", "/metrics"])
            .excluded_path_regexes([r"^/stream/"])
            .default_decompress()
            .max_decompressed_size(4096)
            .max_idle_encoders(8)
            .prewarm(2)
            .build()
            .unwrap();

        let matcher = options.matcher();
        assert!(matcher.excluded_extensions().contains(".wasm"));
        assert!(!matcher.excluded_extensions().contains(".png"));
        assert_eq!(matcher.excluded_paths().len(), 2);
        assert_eq!(matcher.excluded_path_regexes().len(), 1);
        assert!(options.decompress_fn().is_some());
        assert_eq!(options.max_decompressed_size(), 4096);
        assert_eq!(options.max_idle_encoders(), 8);
        assert_eq!(options.prewarm(), 2);
    }

    #[test]
    fn test_builder_without_extensions_uses_defaults() {
        let options = GzipOptions::builder().build().unwrap();
        assert_eq!(options.matcher().excluded_extensions().len(), 4);

        let none = GzipOptions::builder()
            .excluded_extensions(Vec::<String>::new())
            .build()
            .unwrap();
        assert!(none.matcher().excluded_extensions().is_empty());
    }

    #[test]
    fn test_invalid_regex_fails_build() {
        let result = GzipOptions::builder()
            .excluded_path_regexes(["[a-"])
            .build();
        assert!(result.is_err());
    }
}
