//! Configuration validation

use crate::Config;
use squeeze_core::{Error, Result};
use squeeze_gzip::{CompressionLevel, ExcludedPathRegexes};

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_server(config)?;
    validate_gzip(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<()> {
    if config.server.max_body_size == 0 {
        return Err(Error::Config("server.max_body_size must be > 0".to_string()));
    }
    Ok(())
}

fn validate_gzip(config: &Config) -> Result<()> {
    let gzip = &config.gzip;

    CompressionLevel::new(gzip.level)
        .map_err(|_| Error::Config(format!("gzip.level must be -1 or 0..=9, got {}", gzip.level)))?;

    for ext in &gzip.excluded_extensions {
        if !ext.starts_with('.') {
            return Err(Error::Config(format!(
                "excluded extension must start with '.': {ext}"
            )));
        }
    }

    for path in &gzip.excluded_paths {
        if !path.starts_with('/') {
            return Err(Error::Config(format!(
                "excluded path must start with '/': {path}"
            )));
        }
    }

    ExcludedPathRegexes::new(&gzip.excluded_path_regexes)?;

    if gzip.max_decompressed_size == 0 {
        return Err(Error::Config(
            "gzip.max_decompressed_size must be > 0".to_string(),
        ));
    }

    if gzip.prewarm > gzip.max_idle_encoders {
        tracing::warn!(
            prewarm = gzip.prewarm,
            max_idle = gzip.max_idle_encoders,
            "prewarm exceeds max_idle_encoders, extra encoders will not be kept"
        );
    }

    Ok(())
}
