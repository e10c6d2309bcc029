//! Configuration types

use serde::{Deserialize, Serialize};
use squeeze_core::Result;
use squeeze_gzip::pool::DEFAULT_MAX_IDLE;
use squeeze_gzip::{GzipOptions, DEFAULT_EXCLUDED_EXTENSIONS, DEFAULT_MAX_DECOMPRESSED_SIZE};
use std::net::SocketAddr;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// HTTP server
    #[serde(default)]
    pub server: ServerConfig,

    /// Gzip middleware
    #[serde(default)]
    pub gzip: GzipConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Max request body size (bytes) as received on the wire
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10 MiB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Gzip middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GzipConfig {
    /// Compression level, `-1` for the codec default or `0..=9`
    #[serde(default = "default_level")]
    pub level: i32,

    /// Extensions (with leading dot) that are never compressed
    #[serde(default = "default_excluded_extensions")]
    pub excluded_extensions: Vec<String>,

    /// Exact request paths that are never compressed
    #[serde(default)]
    pub excluded_paths: Vec<String>,

    /// Path regular expressions that are never compressed
    #[serde(default)]
    pub excluded_path_regexes: Vec<String>,

    /// Decode gzip request bodies before the handler runs
    #[serde(default)]
    pub decompress_requests: bool,

    /// Max size (bytes) of a decompressed request body
    #[serde(default = "default_max_decompressed_size")]
    pub max_decompressed_size: usize,

    /// Cap on idle pooled encoders
    #[serde(default = "default_max_idle_encoders")]
    pub max_idle_encoders: usize,

    /// Encoders constructed at startup
    #[serde(default)]
    pub prewarm: usize,
}

fn default_level() -> i32 {
    -1
}

fn default_excluded_extensions() -> Vec<String> {
    DEFAULT_EXCLUDED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_max_decompressed_size() -> usize {
    DEFAULT_MAX_DECOMPRESSED_SIZE
}

fn default_max_idle_encoders() -> usize {
    DEFAULT_MAX_IDLE
}

impl Default for GzipConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            excluded_extensions: default_excluded_extensions(),
            excluded_paths: Vec::new(),
            excluded_path_regexes: Vec::new(),
            decompress_requests: false,
            max_decompressed_size: default_max_decompressed_size(),
            max_idle_encoders: default_max_idle_encoders(),
            prewarm: 0,
        }
    }
}

impl GzipConfig {
    /// Build middleware options from this configuration
    pub fn to_options(&self) -> Result<GzipOptions> {
        let mut builder = GzipOptions::builder()
            .excluded_extensions(self.excluded_extensions.iter().cloned())
            .excluded_paths(self.excluded_paths.iter().cloned())
            .excluded_path_regexes(self.excluded_path_regexes.iter().cloned())
            .max_decompressed_size(self.max_decompressed_size)
            .max_idle_encoders(self.max_idle_encoders)
            .prewarm(self.prewarm);

        if self.decompress_requests {
            builder = builder.default_decompress();
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.listen.to_string(), "127.0.0.1:8080");
        assert_eq!(config.gzip.level, -1);
        assert_eq!(config.gzip.excluded_extensions.len(), 4);
        assert_eq!(config.server.max_body_size, 10 * 1024 * 1024);
        assert!(!config.gzip.decompress_requests);
        assert_eq!(
            config.gzip.max_decompressed_size,
            DEFAULT_MAX_DECOMPRESSED_SIZE
        );
        assert_eq!(config.gzip.max_idle_encoders, DEFAULT_MAX_IDLE);
    }

    #[test]
    fn test_to_options() {
        let config = GzipConfig {
            excluded_extensions: vec![".zip".to_string()],
            excluded_paths: vec!["/healthz".to_string()],
            excluded_path_regexes: vec![r"^/ws/".to_string()],
            decompress_requests: true,
            max_decompressed_size: 2048,
            prewarm: 3,
            ..GzipConfig::default()
        };

        let options = config.to_options().unwrap();
        let matcher = options.matcher();
        assert!(matcher.excluded_extensions().contains(".zip"));
        assert!(!matcher.excluded_extensions().contains(".png"));
        assert!(matcher.excluded_paths().contains("/healthz"));
        assert_eq!(matcher.excluded_path_regexes().len(), 1);
        assert!(options.decompress_fn().is_some());
        assert_eq!(options.max_decompressed_size(), 2048);
        assert_eq!(options.prewarm(), 3);
    }

    #[test]
    fn test_to_options_rejects_bad_regex() {
        let config = GzipConfig {
            excluded_path_regexes: vec!["([".to_string()],
            ..GzipConfig::default()
        };
        assert!(config.to_options().is_err());
    }
}
