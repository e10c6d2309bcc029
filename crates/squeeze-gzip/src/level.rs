//! Compression levels

use squeeze_core::{Error, Result};
use std::fmt;

/// A validated gzip compression level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressionLevel(u32);

impl CompressionLevel {
    /// Store blocks without compressing them
    pub const NO_COMPRESSION: Self = Self(0);
    /// Fastest compression
    pub const BEST_SPEED: Self = Self(1);
    /// Codec default
    pub const DEFAULT: Self = Self(6);
    /// Smallest output
    pub const BEST_COMPRESSION: Self = Self(9);

    /// Sentinel accepted by [`CompressionLevel::new`] for the codec default
    pub const DEFAULT_SENTINEL: i32 = -1;

    /// Validate a raw level
    ///
    /// `-1` selects [`CompressionLevel::DEFAULT`], `0..=9` are taken as-is and
    /// everything else is rejected.
    pub fn new(level: i32) -> Result<Self> {
        match level {
            Self::DEFAULT_SENTINEL => Ok(Self::DEFAULT),
            0..=9 => Ok(Self(level as u32)),
            _ => Err(Error::InvalidCompressionLevel(level)),
        }
    }

    /// The numeric level
    pub fn get(self) -> u32 {
        self.0
    }

    /// Value of the gzip header XFL byte for this level
    pub(crate) fn extra_flags(self) -> u8 {
        match self {
            Self::BEST_COMPRESSION => 2,
            Self::BEST_SPEED => 4,
            _ => 0,
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<CompressionLevel> for flate2::Compression {
    fn from(level: CompressionLevel) -> Self {
        flate2::Compression::new(level.0)
    }
}

impl TryFrom<i32> for CompressionLevel {
    type Error = Error;

    fn try_from(level: i32) -> Result<Self> {
        Self::new(level)
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
