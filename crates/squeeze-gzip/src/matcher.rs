//! Compression eligibility

use http::header::{ACCEPT, ACCEPT_ENCODING, CONNECTION};
use http::HeaderMap;
use regex::RegexSet;
use squeeze_core::{Error, Result};
use std::collections::HashSet;

/// Extensions excluded when no other set is configured
pub const DEFAULT_EXCLUDED_EXTENSIONS: [&str; 4] = [".png", ".gif", ".jpeg", ".jpg"];

/// File extensions that are never compressed, compared case-sensitively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedExtensions(HashSet<String>);

impl ExcludedExtensions {
    /// Build from a list of extensions including the leading dot
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(extensions.into_iter().map(Into::into).collect())
    }

    /// Whether `extension` is excluded
    pub fn contains(&self, extension: &str) -> bool {
        self.0.contains(extension)
    }

    /// Number of excluded extensions
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no extension is excluded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Request paths that are never compressed, matched exactly
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedPaths(HashSet<String>);

impl ExcludedPaths {
    /// Build from a list of paths
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(paths.into_iter().map(Into::into).collect())
    }

    /// Whether `path` is excluded
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    /// Number of excluded paths
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no path is excluded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Path patterns that are never compressed
#[derive(Debug, Clone)]
pub struct ExcludedPathRegexes(RegexSet);

impl ExcludedPathRegexes {
    /// Compile a list of patterns
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        RegexSet::new(patterns)
            .map(Self)
            .map_err(|e| Error::Config(format!("Invalid excluded path regex: {e}")))
    }

    /// Whether any pattern matches `path`
    pub fn contains(&self, path: &str) -> bool {
        self.0.is_match(path)
    }

    /// Number of patterns
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no patterns
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ExcludedPathRegexes {
    fn default() -> Self {
        Self(RegexSet::empty())
    }
}

/// Decides whether a request is eligible for gzip
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    excluded_extensions: ExcludedExtensions,
    excluded_paths: ExcludedPaths,
    excluded_path_regexes: ExcludedPathRegexes,
}

impl Matcher {
    /// Create a matcher from the three exclusion sets
    pub fn new(
        excluded_extensions: ExcludedExtensions,
        excluded_paths: ExcludedPaths,
        excluded_path_regexes: ExcludedPathRegexes,
    ) -> Self {
        Self {
            excluded_extensions,
            excluded_paths,
            excluded_path_regexes,
        }
    }

    /// Whether a request with these headers and path should be compressed
    pub fn should_compress(&self, headers: &HeaderMap, path: &str) -> bool {
        if !header_contains(headers, ACCEPT_ENCODING, b"gzip")
            || header_contains(headers, CONNECTION, b"Upgrade")
            || header_contains(headers, ACCEPT, b"text/event-stream")
        {
            return false;
        }

        if self.excluded_extensions.contains(extension(path)) {
            return false;
        }

        if self.excluded_paths.contains(path) {
            return false;
        }
        if self.excluded_path_regexes.contains(path) {
            return false;
        }

        true
    }

    /// Excluded extensions
    pub fn excluded_extensions(&self) -> &ExcludedExtensions {
        &self.excluded_extensions
    }

    /// Excluded exact paths
    pub fn excluded_paths(&self) -> &ExcludedPaths {
        &self.excluded_paths
    }

    /// Excluded path patterns
    pub fn excluded_path_regexes(&self) -> &ExcludedPathRegexes {
        &self.excluded_path_regexes
    }
}

/// Substring match on the raw header bytes, so obs-text values still match
fn header_contains(headers: &HeaderMap, name: http::header::HeaderName, needle: &[u8]) -> bool {
    headers
        .get(name)
        .map(|v| v.as_bytes().windows(needle.len()).any(|w| w == needle))
        .unwrap_or(false)
}

/// Extension of the last path segment, starting at its final dot
///
/// Returns an empty string when the last segment has no dot.
pub fn extension(path: &str) -> &str {
    match path.rfind(|c: char| c == '.' || c == '/') {
        Some(i) if path.as_bytes()[i] == b'.' => &path[i..],
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(pairs: &[(http::header::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    fn gzip_headers() -> HeaderMap {
        headers(&[(ACCEPT_ENCODING, "gzip, deflate, br")])
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("/img/logo.png"), ".png");
        assert_eq!(extension("/archive.tar.gz"), ".gz");
        assert_eq!(extension("/dir.d/file"), "");
        assert_eq!(extension("/api/data"), "");
        assert_eq!(extension("/.hidden"), ".hidden");
        assert_eq!(extension("/trailing."), ".");
        assert_eq!(extension(""), "");
    }

    #[test]
    fn test_requires_gzip_accept_encoding() {
        let matcher = Matcher::default();
        assert!(!matcher.should_compress(&HeaderMap::new(), "/api/data"));
        assert!(!matcher.should_compress(
            &headers(&[(ACCEPT_ENCODING, "deflate, br")]),
            "/api/data"
        ));
        assert!(matcher.should_compress(&gzip_headers(), "/api/data"));
    }

    #[test]
    fn test_upgrade_and_event_stream_are_skipped() {
        let matcher = Matcher::default();
        let upgrade = headers(&[
            (ACCEPT_ENCODING, "gzip"),
            (CONNECTION, "keep-alive, Upgrade"),
        ]);
        assert!(!matcher.should_compress(&upgrade, "/ws"));

        let sse = headers(&[(ACCEPT_ENCODING, "gzip"), (ACCEPT, "text/event-stream")]);
        assert!(!matcher.should_compress(&sse, "/events"));
    }

    #[test]
    fn test_non_ascii_header_values_still_match() {
        let matcher = Matcher::default();

        let mut accept = HeaderMap::new();
        accept.insert(
            ACCEPT_ENCODING,
            HeaderValue::from_bytes(b"gzip, x-caf\xe9").unwrap(),
        );
        assert!(accept[ACCEPT_ENCODING].to_str().is_err());
        assert!(matcher.should_compress(&accept, "/api/data"));

        let mut upgrade = gzip_headers();
        upgrade.insert(
            CONNECTION,
            HeaderValue::from_bytes(b"\xe9t\xe9, Upgrade").unwrap(),
        );
        assert!(!matcher.should_compress(&upgrade, "/ws"));

        let mut sse = gzip_headers();
        sse.insert(
            ACCEPT,
            HeaderValue::from_bytes(b"text/event-stream; x=\xff").unwrap(),
        );
        assert!(!matcher.should_compress(&sse, "/events"));
    }

    #[test]
    fn test_excluded_extensions() {
        let matcher = Matcher::new(
            ExcludedExtensions::new([".png"]),
            ExcludedPaths::default(),
            ExcludedPathRegexes::default(),
        );
        assert!(!matcher.should_compress(&gzip_headers(), "/img/logo.png"));
        assert!(matcher.should_compress(&gzip_headers(), "/img/logo.jpg"));
        // case-sensitive
        assert!(matcher.should_compress(&gzip_headers(), "/img/logo.PNG"));
    }

    #[test]
    fn test_excluded_paths_are_exact() {
        let matcher = Matcher::new(
            ExcludedExtensions::default(),
            ExcludedPaths::new(["/metrics"]),
            ExcludedPathRegexes::default(),
        );
        assert!(!matcher.should_compress(&gzip_headers(), "/metrics"));
        assert!(matcher.should_compress(&gzip_headers(), "/metrics/detail"));
    }

    #[test]
    fn test_excluded_path_regexes() {
        let matcher = Matcher::new(
            ExcludedExtensions::default(),
            ExcludedPaths::default(),
            ExcludedPathRegexes::new([r"^/api/v\d+/stream", r"\.bin$"]).unwrap(),
        );
        assert!(!matcher.should_compress(&gzip_headers(), "/api/v2/stream/live"));
        assert!(!matcher.should_compress(&gzip_headers(), "/download/blob.bin"));
        assert!(matcher.should_compress(&gzip_headers(), "/api/users"));
    }

    #[test]
    fn test_invalid_regex_is_config_error() {
        let err = ExcludedPathRegexes::new(["(unclosed"]).unwrap_err();
        assert!(err.is_config());
    }
}
