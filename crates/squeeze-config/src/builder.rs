//! Configuration builder

use crate::types::{Config, GzipConfig};
use squeeze_core::Result;
use std::net::SocketAddr;

/// Builder for constructing configuration programmatically
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder starting from the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set listen address
    pub fn listen(mut self, addr: SocketAddr) -> Self {
        self.config.server.listen = addr;
        self
    }

    /// Replace the gzip section
    pub fn gzip(mut self, gzip: GzipConfig) -> Self {
        self.config.gzip = gzip;
        self
    }

    /// Set the compression level
    pub fn level(mut self, level: i32) -> Self {
        self.config.gzip.level = level;
        self
    }

    /// Add an exact excluded path
    pub fn exclude_path(mut self, path: impl Into<String>) -> Self {
        self.config.gzip.excluded_paths.push(path.into());
        self
    }

    /// Add an excluded path pattern
    pub fn exclude_path_regex(mut self, pattern: impl Into<String>) -> Self {
        self.config.gzip.excluded_path_regexes.push(pattern.into());
        self
    }

    /// Decode gzip request bodies
    pub fn decompress_requests(mut self, enabled: bool) -> Self {
        self.config.gzip.decompress_requests = enabled;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<Config> {
        crate::validator::validate_config(&self.config)?;
        Ok(self.config)
    }
}
